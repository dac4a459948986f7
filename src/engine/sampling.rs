//! Uniform random walks and hop-by-hop neighbor sampling

use super::{HostEngine, SampledEdge, SamplingEngine, WalkOutput};
use crate::options::{PriorSourcesBehavior, SamplingOptions};
use crate::storage::CsrGraph;
use rand::seq::index;
use rand::Rng;
use std::collections::HashSet;

impl SamplingEngine for HostEngine {
    fn uniform_random_walks<R: Rng + ?Sized>(graph: &CsrGraph, starts: &[u32], max_length: usize, rng: &mut R) -> WalkOutput {
        let mut paths = Vec::with_capacity(starts.len() * (max_length + 1));
        let mut weights = Vec::with_capacity(starts.len() * max_length);

        for &start in starts {
            paths.push(Some(start));
            let mut current = Some(start);
            for _ in 0..max_length {
                let step = current.and_then(|u| {
                    let degree = graph.out_degree(u);
                    (degree > 0).then(|| {
                        let pick = rng.gen_range(0..degree);
                        graph.out_edges(u).nth(pick)
                    })?
                });
                match step {
                    Some((v, e)) => {
                        paths.push(Some(v));
                        weights.push(graph.weight(e));
                        current = Some(v);
                    }
                    None => {
                        paths.push(None);
                        weights.push(0.0);
                        current = None;
                    }
                }
            }
        }

        WalkOutput { paths, weights }
    }

    fn uniform_neighbor_sample<R: Rng + ?Sized>(
        graph: &CsrGraph,
        seeds: &[(u32, i32)],
        fan_out: &[i32],
        options: &SamplingOptions,
        rng: &mut R,
    ) -> Vec<SampledEdge> {
        let mut sampled = Vec::new();
        let mut frontier: Vec<(u32, i32)> = seeds.to_vec();
        let mut prior_sources: HashSet<(u32, i32)> = HashSet::new();

        for (hop, &fan) in fan_out.iter().enumerate() {
            if options.dedupe_sources() {
                frontier.sort_unstable_by_key(|&(v, label)| (label, v));
                frontier.dedup();
            }

            let mut next = Vec::new();
            for &(u, label) in &frontier {
                let edges: Vec<(u32, usize)> = graph.out_edges(u).collect();
                if edges.is_empty() {
                    continue;
                }
                let picks: Vec<usize> = match usize::try_from(fan) {
                    Err(_) => (0..edges.len()).collect(),
                    Ok(f) if options.with_replacement() => (0..f).map(|_| rng.gen_range(0..edges.len())).collect(),
                    Ok(f) if f >= edges.len() => (0..edges.len()).collect(),
                    Ok(f) => {
                        let mut picks = index::sample(rng, edges.len(), f).into_vec();
                        picks.sort_unstable();
                        picks
                    }
                };
                for i in picks {
                    let (v, e) = edges[i];
                    sampled.push(SampledEdge {
                        src: u,
                        dst: v,
                        edge: e,
                        hop,
                        label,
                    });
                    next.push((v, label));
                }
            }

            prior_sources.extend(frontier.iter().copied());
            frontier = match options.prior_sources_behavior() {
                PriorSourcesBehavior::Default => next,
                PriorSourcesBehavior::Exclude => next
                    .into_iter()
                    .filter(|source| !prior_sources.contains(source))
                    .collect(),
                PriorSourcesBehavior::CarryOver => {
                    let mut carried = frontier;
                    carried.extend(next);
                    carried.sort_unstable_by_key(|&(v, label)| (label, v));
                    carried.dedup();
                    carried
                }
            };
        }

        sampled
    }
}
