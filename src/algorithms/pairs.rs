//! Vertex pair lists: caller-built pairs and two-hop neighborhoods

use super::{agree, internal_vertices, label_array, owned_vertices};
use crate::array::TypeErasedDeviceArrayView;
use crate::engine::{DefaultEngine, SimilarityEngine};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::resource::ResourceHandle;
use crate::results::VertexPairsResult;

/// Package internal id pairs as a pairs result
pub(crate) fn pairs_result(
    handle: &ResourceHandle,
    graph: &Graph,
    pairs: &[(u32, u32)],
) -> Result<VertexPairsResult> {
    let (first, second): (Vec<u32>, Vec<u32>) = pairs.iter().copied().unzip();
    Ok(VertexPairsResult {
        first: label_array(handle, graph, &first)?,
        second: label_array(handle, graph, &second)?,
    })
}

/// Internal id pairs of a pairs result
pub(crate) fn read_pairs(
    handle: &ResourceHandle,
    graph: &Graph,
    pairs: &VertexPairsResult,
) -> Result<Vec<(u32, u32)>> {
    let first = internal_vertices(handle, graph, &pairs.first())?;
    let second = internal_vertices(handle, graph, &pairs.second())?;
    Ok(first.into_iter().zip(second).collect())
}

/// Zip two label views into a pairs result
///
/// The pairs stay on the calling rank.
///
/// # Errors
///
/// `InvalidValue` for views of different lengths, `TypeMismatch` for labels
/// of another vertex type, `InvalidInput` for labels not in the graph
pub fn create_vertex_pairs(
    handle: &ResourceHandle,
    graph: &Graph,
    first: &TypeErasedDeviceArrayView,
    second: &TypeErasedDeviceArrayView,
    do_expensive_check: bool,
) -> Result<VertexPairsResult> {
    if first.size() != second.size() {
        return Err(Error::invalid_value(format!(
            "first has {} labels, second has {}",
            first.size(),
            second.size()
        )));
    }
    let first = internal_vertices(handle, graph, first)?;
    let second = internal_vertices(handle, graph, second)?;
    let pairs: Vec<(u32, u32)> = first.into_iter().zip(second).collect();
    if do_expensive_check {
        tracing::debug!(pairs = pairs.len(), "create vertex pairs");
    }
    pairs_result(handle, graph, &pairs)
}

/// Every `(u, w)` with `w` reachable from `u` in exactly two hops, `w != u`
///
/// # Arguments
///
/// * `start_vertices` - Labels to start from; every owned vertex when `None`
///
/// # Returns
///
/// Pairs sorted by `u` then `w`, without duplicates
///
/// # Errors
///
/// `TypeMismatch` or `InvalidInput` for bad start labels
pub fn two_hop_neighbors(
    handle: &ResourceHandle,
    graph: &Graph,
    start_vertices: Option<&TypeErasedDeviceArrayView>,
    do_expensive_check: bool,
) -> Result<VertexPairsResult> {
    let local = start_vertices.map(|view| internal_vertices(handle, graph, view)).transpose();
    let local = agree(handle, "two_hop.starts", local)?;
    let topology = graph.topology(handle)?;
    let starts = match local {
        Some(vertices) => vertices,
        None => owned_vertices(handle, graph)?,
    };
    if do_expensive_check {
        tracing::debug!(starts = starts.len(), "two-hop neighbors");
    }

    let pairs = DefaultEngine::two_hop_neighbors(&topology, &starts);
    pairs_result(handle, graph, &pairs)
}
