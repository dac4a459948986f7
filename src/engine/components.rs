//! Connectivity labelings: weakly connected components and Kosaraju SCC
//!
//! Both labelings name a component after its smallest internal id. Internal
//! ids are assigned in ascending label order, so the external label of a
//! component is its smallest vertex label as well.

use super::{ComponentsEngine, HostEngine};
use crate::storage::CsrGraph;

impl ComponentsEngine for HostEngine {
    fn weakly_connected(graph: &CsrGraph) -> Vec<u32> {
        let n = graph.num_vertices();
        let mut labels: Vec<Option<u32>> = vec![None; n];
        let mut stack = Vec::new();

        for start in super::vertex_ids(n) {
            if labels[start as usize].is_some() {
                continue;
            }
            // Ascending scan: `start` is the smallest id of its component
            labels[start as usize] = Some(start);
            stack.push(start);
            while let Some(u) = stack.pop() {
                // Follow outgoing and incoming edges (treat as undirected)
                for &v in graph.out_neighbors(u).iter().chain(graph.in_neighbors(u)) {
                    if labels[v as usize].is_none() {
                        labels[v as usize] = Some(start);
                        stack.push(v);
                    }
                }
            }
        }

        labels.into_iter().map(|l| l.unwrap_or_default()).collect()
    }

    fn strongly_connected(graph: &CsrGraph) -> Vec<u32> {
        let n = graph.num_vertices();

        // Step 1: DFS to get finish order
        let mut visited = vec![false; n];
        let mut finish_order = Vec::with_capacity(n);
        for start in super::vertex_ids(n) {
            if !visited[start as usize] {
                finish_order_from(graph, start, &mut visited, &mut finish_order);
            }
        }

        // Step 2: DFS on transpose in reverse finish order
        let mut component_of: Vec<Option<usize>> = vec![None; n];
        let mut components: Vec<Vec<u32>> = Vec::new();
        let mut stack = Vec::new();
        for &root in finish_order.iter().rev() {
            if component_of[root as usize].is_some() {
                continue;
            }
            let id = components.len();
            let mut members = vec![root];
            component_of[root as usize] = Some(id);
            stack.push(root);
            while let Some(u) = stack.pop() {
                // Follow incoming edges (transpose of outgoing)
                for &v in graph.in_neighbors(u) {
                    if component_of[v as usize].is_none() {
                        component_of[v as usize] = Some(id);
                        members.push(v);
                        stack.push(v);
                    }
                }
            }
            components.push(members);
        }

        let smallest: Vec<u32> = components
            .iter()
            .map(|members| members.iter().copied().min().unwrap_or_default())
            .collect();
        component_of
            .into_iter()
            .map(|c| c.map_or(0, |c| smallest[c]))
            .collect()
    }
}

/// Iterative post-order DFS along out edges
fn finish_order_from(graph: &CsrGraph, start: u32, visited: &mut [bool], finish_order: &mut Vec<u32>) {
    let mut stack: Vec<(u32, usize)> = vec![(start, 0)];
    visited[start as usize] = true;
    while let Some(top) = stack.last_mut() {
        let u = top.0;
        if let Some(&v) = graph.out_neighbors(u).get(top.1) {
            top.1 += 1;
            if !visited[v as usize] {
                visited[v as usize] = true;
                stack.push((v, 0));
            }
        } else {
            finish_order.push(u);
            stack.pop();
        }
    }
}
