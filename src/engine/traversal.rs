//! Frontier traversal (BFS) and Dijkstra shortest paths

use super::{BfsOutput, HostEngine, SsspOutput, TraversalEngine};
use crate::error::{Error, Result};
use crate::storage::CsrGraph;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Frontiers larger than `n / BOTTOM_UP_DIVISOR` switch to bottom-up steps
const BOTTOM_UP_DIVISOR: usize = 20;

impl TraversalEngine for HostEngine {
    fn bfs(graph: &CsrGraph, sources: &[u32], depth_limit: usize, direction_optimizing: bool) -> BfsOutput {
        let n = graph.num_vertices();
        let mut distances = vec![None; n];
        let mut predecessors = vec![None; n];

        let mut frontier: Vec<u32> = Vec::with_capacity(sources.len());
        for &s in sources {
            if distances[s as usize].is_none() {
                distances[s as usize] = Some(0);
                frontier.push(s);
            }
        }
        frontier.sort_unstable();

        let mut depth = 0_u32;
        while !frontier.is_empty() && (depth as usize) < depth_limit {
            depth += 1;
            let next = if direction_optimizing && frontier.len() > n / BOTTOM_UP_DIVISOR {
                bottom_up_step(graph, &frontier, depth, &mut distances, &mut predecessors)
            } else {
                top_down_step(graph, &frontier, depth, &mut distances, &mut predecessors)
            };
            frontier = next;
        }

        BfsOutput {
            distances,
            predecessors,
        }
    }

    fn sssp(graph: &CsrGraph, source: u32, cutoff: f64) -> Result<SsspOutput> {
        let n = graph.num_vertices();
        if let Some(weights) = &graph.edges().weights {
            if let Some(w) = weights.iter().find(|w| **w < 0.0) {
                return Err(Error::invalid_input(format!(
                    "shortest paths require non-negative weights, found {w}"
                )));
            }
        }

        let mut distances: Vec<Option<f64>> = vec![None; n];
        let mut predecessors = vec![None; n];
        let mut heap = BinaryHeap::new();

        distances[source as usize] = Some(0.0);
        heap.push(State {
            cost: 0.0,
            node: source,
        });

        while let Some(State { cost, node }) = heap.pop() {
            // Skip if we've found a better path
            if distances[node as usize].is_some_and(|d| cost > d) {
                continue;
            }

            for (neighbor, e) in graph.out_edges(node) {
                let next_cost = cost + graph.weight(e);
                if next_cost > cutoff {
                    continue;
                }
                let is_shorter = distances[neighbor as usize].map_or(true, |d| next_cost < d);
                if is_shorter {
                    distances[neighbor as usize] = Some(next_cost);
                    predecessors[neighbor as usize] = Some(node);
                    heap.push(State {
                        cost: next_cost,
                        node: neighbor,
                    });
                }
            }
        }

        Ok(SsspOutput {
            distances,
            predecessors,
        })
    }
}

/// Expand the (sorted) frontier along out edges
///
/// Frontier vertices are visited in ascending order, so every newly reached
/// vertex records its smallest frontier predecessor.
fn top_down_step(
    graph: &CsrGraph,
    frontier: &[u32],
    depth: u32,
    distances: &mut [Option<u32>],
    predecessors: &mut [Option<u32>],
) -> Vec<u32> {
    let mut next = Vec::new();
    for &u in frontier {
        for &v in graph.out_neighbors(u) {
            if distances[v as usize].is_none() {
                distances[v as usize] = Some(depth);
                predecessors[v as usize] = Some(u);
                next.push(v);
            }
        }
    }
    next.sort_unstable();
    next
}

/// Every unvisited vertex looks for a parent among its in-neighbors
///
/// In-neighbors are sorted, so the first hit is the smallest frontier
/// predecessor, matching the top-down step.
fn bottom_up_step(
    graph: &CsrGraph,
    frontier: &[u32],
    depth: u32,
    distances: &mut [Option<u32>],
    predecessors: &mut [Option<u32>],
) -> Vec<u32> {
    let mut in_frontier = vec![false; distances.len()];
    for &u in frontier {
        in_frontier[u as usize] = true;
    }

    let mut next = Vec::new();
    for v in super::vertex_ids(distances.len()) {
        if distances[v as usize].is_some() {
            continue;
        }
        if let Some(&parent) = graph.in_neighbors(v).iter().find(|&&u| in_frontier[u as usize]) {
            distances[v as usize] = Some(depth);
            predecessors[v as usize] = Some(parent);
            next.push(v);
        }
    }
    next
}

/// State for Dijkstra's priority queue
#[derive(Clone, Copy)]
struct State {
    cost: f64,
    node: u32,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
