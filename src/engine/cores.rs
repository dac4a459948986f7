//! Core decomposition by minimum-degree peeling and k-truss by support pruning

use super::{CoreEngine, HostEngine};
use crate::storage::CsrGraph;
use crate::types::DegreeType;
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

impl CoreEngine for HostEngine {
    #[allow(clippy::cast_possible_truncation)]
    fn core_number(graph: &CsrGraph, degree_type: DegreeType) -> Vec<u32> {
        let n = graph.num_vertices();
        let counts_in = matches!(degree_type, DegreeType::In | DegreeType::InOut);
        let counts_out = matches!(degree_type, DegreeType::Out | DegreeType::InOut);

        let mut degree = vec![0_usize; n];
        for v in super::vertex_ids(n) {
            if counts_in {
                degree[v as usize] += graph.in_neighbors(v).iter().filter(|&&u| u != v).count();
            }
            if counts_out {
                degree[v as usize] += graph.out_neighbors(v).iter().filter(|&&u| u != v).count();
            }
        }

        let mut heap: BinaryHeap<Reverse<(usize, u32)>> =
            super::vertex_ids(n).map(|v| Reverse((degree[v as usize], v))).collect();
        let mut removed = vec![false; n];
        let mut core = vec![0_u32; n];
        let mut k = 0;

        while let Some(Reverse((d, v))) = heap.pop() {
            let vi = v as usize;
            if removed[vi] || d != degree[vi] {
                continue;
            }
            removed[vi] = true;
            k = k.max(d);
            core[vi] = k as u32;

            // Neighbors whose counted degree included an edge to v
            let mut touch = |u: u32| {
                let ui = u as usize;
                if u != v && !removed[ui] {
                    degree[ui] -= 1;
                    heap.push(Reverse((degree[ui], u)));
                }
            };
            if counts_in {
                graph.out_neighbors(v).iter().for_each(|&u| touch(u));
            }
            if counts_out {
                graph.in_neighbors(v).iter().for_each(|&u| touch(u));
            }
        }
        core
    }

    fn k_truss(graph: &CsrGraph, k: usize) -> Vec<usize> {
        let mut adj: Vec<BTreeSet<u32>> = graph
            .undirected_adjacency()
            .into_iter()
            .map(|nbrs| nbrs.into_iter().collect())
            .collect();
        let min_support = k.saturating_sub(2);

        loop {
            let mut doomed = Vec::new();
            for (u, nbrs) in adj.iter().enumerate() {
                for &v in nbrs.range(u as u32 + 1..) {
                    if adj[u].intersection(&adj[v as usize]).count() < min_support {
                        doomed.push((u, v as usize));
                    }
                }
            }
            if doomed.is_empty() {
                break;
            }
            #[allow(clippy::cast_possible_truncation)]
            for (u, v) in doomed {
                adj[u].remove(&(v as u32));
                adj[v].remove(&(u as u32));
            }
        }

        let edges = graph.edges();
        (0..edges.len())
            .filter(|&e| {
                let (s, d) = (edges.src[e], edges.dst[e]);
                s != d && adj[s as usize].contains(&d)
            })
            .collect()
    }
}
