//! Jaccard, Sørensen and overlap coefficients
//!
//! Neighborhoods are out-neighbor sets. With `use_weight` the kernels sum
//! `min` / `max` edge weights over the intersection and union instead of
//! counting vertices.

use super::pairs::{pairs_result, read_pairs};
use super::{agree, internal_vertices, owned_vertices};
use crate::array::convert::weight_array;
use crate::array::TypeErasedDeviceArrayView;
use crate::engine::{DefaultEngine, SimilarityEngine, SimilarityMetric};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::resource::ResourceHandle;
use crate::results::{SimilarityResult, VertexPairsResult};
use crate::storage::CsrGraph;

fn check_weighted(graph: &Graph, use_weight: bool) -> Result<()> {
    if use_weight && !graph.is_weighted() {
        return Err(Error::invalid_input("use_weight requires a weighted graph"));
    }
    Ok(())
}

fn check_non_negative(topology: &CsrGraph) -> Result<()> {
    match topology.edges().weights.iter().flatten().find(|w| w.is_nan() || **w < 0.0) {
        Some(w) => Err(Error::invalid_input(format!("edge weight {w} is negative or NaN"))),
        None => Ok(()),
    }
}

fn similarity_result(
    handle: &ResourceHandle,
    graph: &Graph,
    pairs: &[(u32, u32)],
    coefficients: &[f64],
) -> Result<SimilarityResult> {
    Ok(SimilarityResult {
        pairs: pairs_result(handle, graph, pairs)?,
        coefficients: weight_array(handle, graph.weight_type(), coefficients)?,
    })
}

fn coefficients(
    handle: &ResourceHandle,
    graph: &Graph,
    metric: SimilarityMetric,
    vertex_pairs: &VertexPairsResult,
    use_weight: bool,
    do_expensive_check: bool,
) -> Result<SimilarityResult> {
    check_weighted(graph, use_weight)?;
    let local = read_pairs(handle, graph, vertex_pairs);
    let pairs = agree(handle, "similarity.pairs", local)?;
    let topology = graph.topology(handle)?;
    if do_expensive_check && use_weight {
        check_non_negative(&topology)?;
    }

    let values = DefaultEngine::similarity(&topology, metric, &pairs, use_weight);
    similarity_result(handle, graph, &pairs, &values)
}

/// Jaccard coefficient `|A ∩ B| / |A ∪ B|` of every pair
///
/// # Errors
///
/// `InvalidInput` for `use_weight` on an unweighted graph or pair labels not
/// in the graph
pub fn jaccard_coefficients(
    handle: &ResourceHandle,
    graph: &Graph,
    vertex_pairs: &VertexPairsResult,
    use_weight: bool,
    do_expensive_check: bool,
) -> Result<SimilarityResult> {
    coefficients(handle, graph, SimilarityMetric::Jaccard, vertex_pairs, use_weight, do_expensive_check)
}

/// Sørensen coefficient `2 |A ∩ B| / (|A| + |B|)` of every pair
///
/// # Errors
///
/// Same as [`jaccard_coefficients`]
pub fn sorensen_coefficients(
    handle: &ResourceHandle,
    graph: &Graph,
    vertex_pairs: &VertexPairsResult,
    use_weight: bool,
    do_expensive_check: bool,
) -> Result<SimilarityResult> {
    coefficients(handle, graph, SimilarityMetric::Sorensen, vertex_pairs, use_weight, do_expensive_check)
}

/// Overlap coefficient `|A ∩ B| / min(|A|, |B|)` of every pair
///
/// # Errors
///
/// Same as [`jaccard_coefficients`]
pub fn overlap_coefficients(
    handle: &ResourceHandle,
    graph: &Graph,
    vertex_pairs: &VertexPairsResult,
    use_weight: bool,
    do_expensive_check: bool,
) -> Result<SimilarityResult> {
    coefficients(handle, graph, SimilarityMetric::Overlap, vertex_pairs, use_weight, do_expensive_check)
}

fn all_pairs(
    handle: &ResourceHandle,
    graph: &Graph,
    metric: SimilarityMetric,
    vertices: Option<&TypeErasedDeviceArrayView>,
    use_weight: bool,
    topk: Option<usize>,
    do_expensive_check: bool,
) -> Result<SimilarityResult> {
    check_weighted(graph, use_weight)?;
    let local = vertices.map(|view| internal_vertices(handle, graph, view)).transpose();
    let local = agree(handle, "all_pairs.vertices", local)?;
    let topology = graph.topology(handle)?;
    if do_expensive_check && use_weight {
        check_non_negative(&topology)?;
    }
    let vertices = match local {
        Some(vertices) => vertices,
        None => owned_vertices(handle, graph)?,
    };

    let mut scored = DefaultEngine::all_pairs_similarity(&topology, metric, &vertices, use_weight);
    if let Some(k) = topk {
        // The best k across every rank; each rank keeps its own share
        let rank = handle.rank();
        let tagged = scored.into_iter().map(|(u, v, c)| (rank, u, v, c)).collect();
        let mut candidates = handle.all_gather_concat("all_pairs.topk", tagged)?;
        candidates.sort_by(|x, y| y.3.total_cmp(&x.3).then_with(|| (x.1, x.2, x.0).cmp(&(y.1, y.2, y.0))));
        candidates.truncate(k);
        scored = candidates
            .into_iter()
            .filter(|candidate| candidate.0 == rank)
            .map(|(_, u, v, c)| (u, v, c))
            .collect();
    }
    tracing::debug!(?metric, pairs = scored.len(), "all-pairs similarity");

    let pairs: Vec<(u32, u32)> = scored.iter().map(|&(u, v, _)| (u, v)).collect();
    let values: Vec<f64> = scored.iter().map(|&(_, _, c)| c).collect();
    similarity_result(handle, graph, &pairs, &values)
}

/// Jaccard coefficients of every two-hop pair with a positive score
///
/// # Arguments
///
/// * `vertices` - First members of the pairs; every owned vertex when `None`
/// * `topk` - Keep only the `k` highest scores (across all ranks)
///
/// # Errors
///
/// Same as [`jaccard_coefficients`]
pub fn all_pairs_jaccard_coefficients(
    handle: &ResourceHandle,
    graph: &Graph,
    vertices: Option<&TypeErasedDeviceArrayView>,
    use_weight: bool,
    topk: Option<usize>,
    do_expensive_check: bool,
) -> Result<SimilarityResult> {
    all_pairs(handle, graph, SimilarityMetric::Jaccard, vertices, use_weight, topk, do_expensive_check)
}

/// Sørensen coefficients of every two-hop pair with a positive score
///
/// # Errors
///
/// Same as [`jaccard_coefficients`]
pub fn all_pairs_sorensen_coefficients(
    handle: &ResourceHandle,
    graph: &Graph,
    vertices: Option<&TypeErasedDeviceArrayView>,
    use_weight: bool,
    topk: Option<usize>,
    do_expensive_check: bool,
) -> Result<SimilarityResult> {
    all_pairs(handle, graph, SimilarityMetric::Sorensen, vertices, use_weight, topk, do_expensive_check)
}

/// Overlap coefficients of every two-hop pair with a positive score
///
/// # Errors
///
/// Same as [`jaccard_coefficients`]
pub fn all_pairs_overlap_coefficients(
    handle: &ResourceHandle,
    graph: &Graph,
    vertices: Option<&TypeErasedDeviceArrayView>,
    use_weight: bool,
    topk: Option<usize>,
    do_expensive_check: bool,
) -> Result<SimilarityResult> {
    all_pairs(handle, graph, SimilarityMetric::Overlap, vertices, use_weight, topk, do_expensive_check)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::create_vertex_pairs;
    use crate::algorithms::fixtures;
    use crate::array::TypeErasedDeviceArray;
    use crate::types::GraphProperties;
    use crate::StatusCode;

    fn pairs(handle: &ResourceHandle, graph: &Graph, a: &[i32], b: &[i32]) -> VertexPairsResult {
        let a = TypeErasedDeviceArray::from_slice(handle, a).unwrap();
        let b = TypeErasedDeviceArray::from_slice(handle, b).unwrap();
        create_vertex_pairs(handle, graph, &a.view(), &b.view(), false).unwrap()
    }

    #[test]
    fn test_coefficients_on_core_fixture() {
        let handle = ResourceHandle::new();
        let graph = fixtures::core_graph(&handle);
        // N(0) = {1, 2}, N(3) = {1, 2, 4, 5}
        let p = pairs(&handle, &graph, &[0], &[3]);

        let jaccard = jaccard_coefficients(&handle, &graph, &p, false, false).unwrap();
        assert!((jaccard.coefficients().to_vec::<f32>().unwrap()[0] - 0.5).abs() < 1e-6);
        let sorensen = sorensen_coefficients(&handle, &graph, &p, false, false).unwrap();
        assert!((sorensen.coefficients().to_vec::<f32>().unwrap()[0] - 2.0 / 3.0).abs() < 1e-6);
        let overlap = overlap_coefficients(&handle, &graph, &p, false, false).unwrap();
        assert!((overlap.coefficients().to_vec::<f32>().unwrap()[0] - 1.0).abs() < 1e-6);
        assert_eq!(overlap.vertex_pairs().first().to_vec::<i32>().unwrap(), vec![0]);

        let err = jaccard_coefficients(&handle, &graph, &p, true, true).unwrap_err();
        assert_eq!(err.code(), StatusCode::InvalidInput);
    }

    #[test]
    fn test_all_pairs_topk() {
        let handle = ResourceHandle::new();
        let graph = fixtures::core_graph(&handle);
        let all = all_pairs_jaccard_coefficients(&handle, &graph, None, false, None, false).unwrap();
        let scores = all.coefficients().to_vec::<f32>().unwrap();
        assert!(scores.iter().all(|&c| c > 0.0));

        let top = all_pairs_jaccard_coefficients(&handle, &graph, None, false, Some(3), false).unwrap();
        let mut best = top.coefficients().to_vec::<f32>().unwrap();
        assert_eq!(best.len(), 3);
        let mut sorted = scores;
        sorted.sort_by(|a, b| b.total_cmp(a));
        best.sort_by(|a, b| b.total_cmp(a));
        assert_eq!(best, sorted[..3].to_vec());
    }

    #[test]
    fn test_weighted_jaccard() {
        let handle = ResourceHandle::new();
        // N(0) = {2: 1.0, 3: 3.0}, N(1) = {2: 2.0, 3: 1.0}
        let graph = fixtures::graph(
            &handle,
            &[0, 0, 1, 1],
            &[2, 3, 2, 3],
            Some(&[1.0, 3.0, 2.0, 1.0]),
            GraphProperties::directed(),
            false,
        );
        let p = pairs(&handle, &graph, &[0], &[1]);
        let result = jaccard_coefficients(&handle, &graph, &p, true, false).unwrap();
        // (1 + 1) / (2 + 3)
        assert!((result.coefficients().to_vec::<f32>().unwrap()[0] - 0.4).abs() < 1e-6);
    }
}
