//! Centrality kernels: `PageRank`, Katz, eigenvector, betweenness, HITS
//!
//! `PageRank` is power iteration over the in-edges:
//!
//! ```text
//! PR(v) = (1 - a) p(v) + a * (Σ PR(u) w(u,v) / W(u) + D p(v))
//! ```
//!
//! with `p` the teleport distribution (uniform unless personalized), `W(u)`
//! the out-weight sum of `u` and `D` the rank held by dangling vertices.

use super::{CentralityEngine, HitsOutput, HostEngine, IterativeOutput, PageRankInputs};
use crate::options::{BetweennessOptions, EigenvectorOptions, HitsOptions, KatzOptions, PageRankOptions};
use crate::storage::CsrGraph;
use std::collections::VecDeque;

impl CentralityEngine for HostEngine {
    #[allow(clippy::cast_precision_loss)]
    fn pagerank(graph: &CsrGraph, options: &PageRankOptions, inputs: &PageRankInputs) -> IterativeOutput {
        let n = graph.num_vertices();
        if n == 0 {
            return IterativeOutput {
                values: Vec::new(),
                iterations: 0,
                converged: true,
            };
        }

        let alpha = options.alpha;
        let teleport = inputs
            .personalization
            .as_deref()
            .and_then(normalized)
            .unwrap_or_else(|| vec![1.0 / n as f64; n]);
        let mut ranks = inputs
            .initial_guess
            .as_deref()
            .and_then(normalized)
            .unwrap_or_else(|| vec![1.0 / n as f64; n]);
        let out_weights = inputs
            .out_weight_sums
            .clone()
            .unwrap_or_else(|| graph.out_weight_sums());
        let mut new_ranks = vec![0.0; n];

        let mut iterations = 0;
        let mut converged = false;
        while iterations < options.max_iterations {
            iterations += 1;

            let dangling: f64 = (0..n)
                .filter(|&u| out_weights[u] <= 0.0)
                .map(|u| ranks[u])
                .sum();
            for (r, p) in new_ranks.iter_mut().zip(&teleport) {
                *r = (1.0 - alpha + alpha * dangling) * p;
            }

            // Distribute rank from each node to its neighbors
            for u in super::vertex_ids(n) {
                let total = out_weights[u as usize];
                if total <= 0.0 {
                    continue;
                }
                let share = alpha * ranks[u as usize] / total;
                for (target, e) in graph.out_edges(u) {
                    new_ranks[target as usize] += share * graph.weight(e);
                }
            }

            // Check convergence (L1 norm)
            let diff: f64 = new_ranks.iter().zip(&ranks).map(|(a, b)| (a - b).abs()).sum();
            std::mem::swap(&mut ranks, &mut new_ranks);
            if diff < options.epsilon {
                converged = true;
                break;
            }
        }

        tracing::debug!(iterations, converged, "pagerank finished");
        IterativeOutput {
            values: ranks,
            iterations,
            converged,
        }
    }

    fn katz(graph: &CsrGraph, options: &KatzOptions, betas: &[f64]) -> IterativeOutput {
        let n = graph.num_vertices();
        let mut values = vec![0.0; n];
        let mut next = vec![0.0; n];

        let mut iterations = 0;
        let mut converged = n == 0;
        while !converged && iterations < options.max_iterations {
            iterations += 1;
            next.copy_from_slice(betas);
            for u in super::vertex_ids(n) {
                let x = values[u as usize];
                if x == 0.0 {
                    continue;
                }
                for (target, e) in graph.out_edges(u) {
                    next[target as usize] += options.alpha * graph.weight(e) * x;
                }
            }
            let diff: f64 = next.iter().zip(&values).map(|(a, b)| (a - b).abs()).sum();
            std::mem::swap(&mut values, &mut next);
            if !diff.is_finite() {
                break;
            }
            converged = diff < options.epsilon;
        }

        if options.normalize {
            scale_to_unit_l2(&mut values);
        }
        IterativeOutput {
            values,
            iterations,
            converged,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn eigenvector(graph: &CsrGraph, options: &EigenvectorOptions) -> IterativeOutput {
        let n = graph.num_vertices();
        let mut values = vec![1.0 / n.max(1) as f64; n];
        let mut next = vec![0.0; n];

        let mut iterations = 0;
        let mut converged = n == 0;
        while !converged && iterations < options.max_iterations {
            iterations += 1;
            // (A^T + I) x keeps the iteration from oscillating on bipartite graphs
            next.copy_from_slice(&values);
            for u in super::vertex_ids(n) {
                let x = values[u as usize];
                for (target, e) in graph.out_edges(u) {
                    next[target as usize] += graph.weight(e) * x;
                }
            }
            scale_to_unit_l2(&mut next);
            let diff: f64 = next.iter().zip(&values).map(|(a, b)| (a - b).abs()).sum();
            std::mem::swap(&mut values, &mut next);
            converged = diff < options.epsilon * n as f64;
        }

        IterativeOutput {
            values,
            iterations,
            converged,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn betweenness(
        graph: &CsrGraph,
        options: &BetweennessOptions,
        sources: Option<&[u32]>,
        symmetric: bool,
    ) -> Vec<f64> {
        let n = graph.num_vertices();
        let mut scores = vec![0.0; n];
        let all: Vec<u32>;
        let sources = if let Some(s) = sources {
            s
        } else {
            all = super::vertex_ids(n).collect();
            &all
        };

        for &s in sources {
            accumulate_from(graph, s, options.include_endpoints, &mut scores);
        }

        let nf = n as f64;
        let mut scale = if options.normalized {
            let pairs = if options.include_endpoints {
                nf * (nf - 1.0)
            } else {
                (nf - 1.0) * (nf - 2.0)
            };
            (pairs > 0.0).then(|| 1.0 / pairs)
        } else if symmetric {
            Some(0.5)
        } else {
            None
        };
        if let Some(sc) = scale.as_mut() {
            if !sources.is_empty() && sources.len() < n {
                *sc *= nf / sources.len() as f64;
            }
        }
        if let Some(sc) = scale {
            for x in &mut scores {
                *x *= sc;
            }
        }
        scores
    }

    #[allow(clippy::cast_precision_loss)]
    fn hits(graph: &CsrGraph, options: &HitsOptions, initial_hubs: Option<&[f64]>) -> HitsOutput {
        let n = graph.num_vertices();
        let mut hubs = initial_hubs
            .and_then(normalized)
            .unwrap_or_else(|| vec![1.0 / n.max(1) as f64; n]);
        let mut authorities = vec![0.0; n];

        let mut iterations = 0;
        let mut difference = f64::MAX;
        let mut converged = n == 0;
        while !converged && iterations < options.max_iterations {
            iterations += 1;

            authorities.fill(0.0);
            for u in super::vertex_ids(n) {
                for &v in graph.out_neighbors(u) {
                    authorities[v as usize] += hubs[u as usize];
                }
            }
            scale_to_unit_max(&mut authorities);

            let mut next = vec![0.0; n];
            for (u, h) in super::vertex_ids(n).zip(next.iter_mut()) {
                *h = graph.out_neighbors(u).iter().map(|&v| authorities[v as usize]).sum();
            }
            scale_to_unit_max(&mut next);

            difference = next.iter().zip(&hubs).map(|(a, b)| (a - b).abs()).sum();
            hubs = next;
            converged = difference < options.epsilon;
        }

        if options.normalize {
            scale_to_unit_sum(&mut hubs);
            scale_to_unit_sum(&mut authorities);
        }
        HitsOutput {
            hubs,
            authorities,
            hub_score_difference: if iterations == 0 { 0.0 } else { difference },
            iterations,
            converged,
        }
    }
}

/// Brandes dependency accumulation from one source (unweighted paths)
#[allow(clippy::cast_precision_loss)]
fn accumulate_from(graph: &CsrGraph, s: u32, include_endpoints: bool, scores: &mut [f64]) {
    let n = graph.num_vertices();
    let mut order = Vec::with_capacity(n);
    let mut preds: Vec<Vec<u32>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0_f64; n];
    let mut dist: Vec<Option<usize>> = vec![None; n];
    let mut queue = VecDeque::new();

    sigma[s as usize] = 1.0;
    dist[s as usize] = Some(0);
    queue.push_back(s);
    while let Some(u) = queue.pop_front() {
        order.push(u);
        let du = dist[u as usize].unwrap_or(0);
        for &v in graph.out_neighbors(u) {
            let vi = v as usize;
            if dist[vi].is_none() {
                dist[vi] = Some(du + 1);
                queue.push_back(v);
            }
            if dist[vi] == Some(du + 1) {
                sigma[vi] += sigma[u as usize];
                preds[vi].push(u);
            }
        }
    }

    let mut delta = vec![0.0_f64; n];
    if include_endpoints {
        scores[s as usize] += (order.len() - 1) as f64;
    }
    for &w in order.iter().rev() {
        let wi = w as usize;
        for &v in &preds[wi] {
            delta[v as usize] += sigma[v as usize] / sigma[wi] * (1.0 + delta[wi]);
        }
        if w != s {
            scores[wi] += delta[wi] + if include_endpoints { 1.0 } else { 0.0 };
        }
    }
}

/// Copy scaled to sum 1; `None` when the input sums to zero
fn normalized(values: &[f64]) -> Option<Vec<f64>> {
    let sum: f64 = values.iter().sum();
    (sum > 0.0).then(|| values.iter().map(|v| v / sum).collect())
}

fn scale_to_unit_l2(values: &mut [f64]) {
    let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        values.iter_mut().for_each(|v| *v /= norm);
    }
}

fn scale_to_unit_max(values: &mut [f64]) {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if max > 0.0 {
        values.iter_mut().for_each(|v| *v /= max);
    }
}

fn scale_to_unit_sum(values: &mut [f64]) {
    let sum: f64 = values.iter().sum();
    if sum > 0.0 {
        values.iter_mut().for_each(|v| *v /= sum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::EdgeList;

    fn graph(n: usize, src: &[u32], dst: &[u32]) -> CsrGraph {
        let edges = EdgeList {
            src: src.to_vec(),
            dst: dst.to_vec(),
            ..EdgeList::default()
        };
        CsrGraph::from_edge_list(n, edges).unwrap()
    }

    #[test]
    fn test_pagerank_chain_reference() {
        let g = graph(4, &[0, 1, 2], &[1, 2, 3]);
        let out = HostEngine::pagerank(&g, &PageRankOptions::default(), &PageRankInputs::default());
        assert!(out.converged);
        let expected = [0.116_156, 0.214_888, 0.298_811, 0.370_145];
        for (got, want) in out.values.iter().zip(expected) {
            assert!((got - want).abs() < 1e-3, "{got} vs {want}");
        }
    }

    #[test]
    fn test_pagerank_single_iteration() {
        let g = graph(4, &[0, 1, 2], &[1, 2, 3]);
        let options = PageRankOptions {
            max_iterations: 1,
            ..PageRankOptions::default()
        };
        let out = HostEngine::pagerank(&g, &options, &PageRankInputs::default());
        assert!(!out.converged);
        assert_eq!(out.iterations, 1);
        assert!((out.values[0] - 0.090_625).abs() < 1e-9);
        assert!((out.values[3] - 0.303_125).abs() < 1e-9);
    }

    #[test]
    fn test_pagerank_cycle_uniform() {
        let g = graph(3, &[0, 1, 2], &[1, 2, 0]);
        let out = HostEngine::pagerank(&g, &PageRankOptions::default(), &PageRankInputs::default());
        for score in &out.values {
            assert!((*score - 1.0 / 3.0).abs() < 1e-6, "Score = {score}");
        }
    }

    #[test]
    fn test_personalized_pagerank_favors_source() {
        let g = graph(3, &[0, 1, 2], &[1, 2, 0]);
        let inputs = PageRankInputs {
            personalization: Some(vec![1.0, 0.0, 0.0]),
            ..PageRankInputs::default()
        };
        let out = HostEngine::pagerank(&g, &PageRankOptions::default(), &inputs);
        assert!(out.values[0] > out.values[2]);
        assert!((out.values.iter().sum::<f64>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_katz_star() {
        let g = graph(4, &[1, 2, 3], &[0, 0, 0]);
        let out = HostEngine::katz(&g, &KatzOptions::default(), &[1.0; 4]);
        assert!(out.converged);
        assert!((out.values[0] - 1.3).abs() < 1e-9);
        assert!((out.values[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_katz_divergence_does_not_converge() {
        let g = graph(2, &[0, 1], &[1, 0]);
        let options = KatzOptions {
            alpha: 2.0,
            max_iterations: 50,
            ..KatzOptions::default()
        };
        assert!(!HostEngine::katz(&g, &options, &[1.0; 2]).converged);
    }

    #[test]
    fn test_eigenvector_symmetric_triangle() {
        let g = graph(3, &[0, 1, 1, 2, 2, 0], &[1, 0, 2, 1, 0, 2]);
        let out = HostEngine::eigenvector(&g, &EigenvectorOptions::default());
        assert!(out.converged);
        for v in &out.values {
            assert!((v - 1.0 / 3.0_f64.sqrt()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_betweenness_path() {
        // 0 - 1 - 2 undirected
        let g = graph(3, &[0, 1, 1, 2], &[1, 0, 2, 1]);
        let options = BetweennessOptions {
            normalized: false,
            include_endpoints: false,
        };
        let scores = HostEngine::betweenness(&g, &options, None, true);
        assert_eq!(scores, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_hits_star() {
        let g = graph(4, &[1, 2, 3], &[0, 0, 0]);
        let out = HostEngine::hits(&g, &HitsOptions::default(), None);
        assert!(out.converged);
        assert!((out.authorities[0] - 1.0).abs() < 1e-9);
        assert!(out.hubs[0].abs() < 1e-9);
        assert!((out.hubs[1] - 1.0 / 3.0).abs() < 1e-9);
    }
}
