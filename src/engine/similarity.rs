//! Neighborhood similarity (Jaccard, Sørensen, overlap) and two-hop pairs
//!
//! The neighborhood of `u` is its set of out-neighbors. Weighted variants
//! sum parallel edge weights per neighbor and replace counts by
//! `Σ min(w_a, w_b)` over the intersection and `Σ max(w_a, w_b)` over the
//! union. A zero denominator yields a coefficient of zero.

use super::{HostEngine, SimilarityEngine, SimilarityMetric};
use crate::storage::CsrGraph;
use std::cmp::Ordering;
use std::collections::BTreeSet;

impl SimilarityEngine for HostEngine {
    fn similarity(graph: &CsrGraph, metric: SimilarityMetric, pairs: &[(u32, u32)], use_weight: bool) -> Vec<f64> {
        pairs
            .iter()
            .map(|&(u, v)| {
                let a = neighborhood(graph, u, use_weight);
                let b = neighborhood(graph, v, use_weight);
                coefficient(metric, &a, &b)
            })
            .collect()
    }

    fn all_pairs_similarity(
        graph: &CsrGraph,
        metric: SimilarityMetric,
        vertices: &[u32],
        use_weight: bool,
    ) -> Vec<(u32, u32, f64)> {
        let mut scored = Vec::new();
        for (u, v) in Self::two_hop_neighbors(graph, vertices) {
            let a = neighborhood(graph, u, use_weight);
            let b = neighborhood(graph, v, use_weight);
            let c = coefficient(metric, &a, &b);
            if c > 0.0 {
                scored.push((u, v, c));
            }
        }

        scored
    }

    fn two_hop_neighbors(graph: &CsrGraph, starts: &[u32]) -> Vec<(u32, u32)> {
        let starts: BTreeSet<u32> = starts.iter().copied().collect();
        let mut pairs = Vec::new();
        for u in starts {
            let reach: BTreeSet<u32> = graph
                .out_neighbors(u)
                .iter()
                .flat_map(|&x| graph.out_neighbors(x).iter().copied())
                .filter(|&w| w != u)
                .collect();
            pairs.extend(reach.into_iter().map(|w| (u, w)));
        }
        pairs
    }
}

/// Sorted `(neighbor, weight)` pairs, parallel edges summed
fn neighborhood(graph: &CsrGraph, u: u32, use_weight: bool) -> Vec<(u32, f64)> {
    let mut nbrs: Vec<(u32, f64)> = Vec::with_capacity(graph.out_degree(u));
    for (v, e) in graph.out_edges(u) {
        let w = if use_weight { graph.weight(e) } else { 1.0 };
        match nbrs.last_mut() {
            Some((last, acc)) if *last == v => {
                if use_weight {
                    *acc += w;
                }
            }
            _ => nbrs.push((v, w)),
        }
    }
    nbrs
}

fn coefficient(metric: SimilarityMetric, a: &[(u32, f64)], b: &[(u32, f64)]) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut intersection = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                intersection += a[i].1.min(b[j].1);
                i += 1;
                j += 1;
            }
        }
    }
    let sum_a: f64 = a.iter().map(|(_, w)| w).sum();
    let sum_b: f64 = b.iter().map(|(_, w)| w).sum();

    let (numerator, denominator) = match metric {
        // Σ max over the union = |A| + |B| - Σ min over the intersection
        SimilarityMetric::Jaccard => (intersection, sum_a + sum_b - intersection),
        SimilarityMetric::Sorensen => (2.0 * intersection, sum_a + sum_b),
        SimilarityMetric::Overlap => (intersection, sum_a.min(sum_b)),
    };
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::EdgeList;

    /// Symmetric: 0-1, 0-2, 1-2, 2-3
    fn graph(weights: Option<Vec<f64>>) -> CsrGraph {
        let edges = EdgeList {
            src: vec![0, 1, 0, 2, 1, 2, 2, 3],
            dst: vec![1, 0, 2, 0, 2, 1, 3, 2],
            weights,
            ..EdgeList::default()
        };
        CsrGraph::from_edge_list(4, edges).unwrap()
    }

    #[test]
    fn test_unweighted_coefficients() {
        let g = graph(None);
        // N(0) = {1, 2}, N(3) = {2}
        let pairs = [(0, 3), (3, 0)];
        let jaccard = HostEngine::similarity(&g, SimilarityMetric::Jaccard, &pairs, false);
        assert_eq!(jaccard, vec![0.5, 0.5]);
        let sorensen = HostEngine::similarity(&g, SimilarityMetric::Sorensen, &pairs, false);
        assert!((sorensen[0] - 2.0 / 3.0).abs() < 1e-12);
        let overlap = HostEngine::similarity(&g, SimilarityMetric::Overlap, &pairs, false);
        assert_eq!(overlap, vec![1.0, 1.0]);
    }

    #[test]
    fn test_weighted_jaccard() {
        let g = graph(Some(vec![1.0, 1.0, 2.0, 2.0, 1.0, 1.0, 4.0, 4.0]));
        // N(0) = {1:1, 2:2}, N(3) = {2:4}: min 2, max 1 + 4
        let c = HostEngine::similarity(&g, SimilarityMetric::Jaccard, &[(0, 3)], true);
        assert!((c[0] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_isolated_pair_is_zero() {
        let edges = EdgeList {
            src: vec![0],
            dst: vec![1],
            ..EdgeList::default()
        };
        let g = CsrGraph::from_edge_list(3, edges).unwrap();
        let c = HostEngine::similarity(&g, SimilarityMetric::Jaccard, &[(1, 2)], false);
        assert_eq!(c, vec![0.0]);
    }

    #[test]
    fn test_two_hop() {
        let g = graph(None);
        let pairs = HostEngine::two_hop_neighbors(&g, &[3, 0]);
        assert_eq!(pairs, vec![(0, 1), (0, 2), (0, 3), (3, 0), (3, 1)]);
    }

    #[test]
    fn test_all_pairs_scores_two_hop_pairs() {
        let g = graph(None);
        let all = HostEngine::all_pairs_similarity(&g, SimilarityMetric::Overlap, &[0, 1, 2, 3], false);
        let pairs: Vec<(u32, u32)> = all.iter().map(|&(u, v, _)| (u, v)).collect();
        let two_hop = HostEngine::two_hop_neighbors(&g, &[0, 1, 2, 3]);
        assert!(pairs.iter().all(|p| two_hop.contains(p)));
        assert!(all.iter().all(|&(u, v, c)| u != v && c > 0.0 && c <= 1.0));
    }
}
