//! Induced subgraphs and ego networks
//!
//! Both extractions return one edge list per requested vertex set, laid out
//! back to back with `subgraph_offsets` marking the boundaries. Every rank
//! extracts the subgraphs for the sets it supplied.

use super::{agree, edge_arrays, internal_vertices, reject_duplicates};
use crate::array::convert::{read_offsets, size_array};
use crate::array::TypeErasedDeviceArrayView;
use crate::engine::{DefaultEngine, TraversalEngine};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::resource::ResourceHandle;
use crate::results::InducedSubgraphResult;
use crate::storage::CsrGraph;
use std::collections::HashSet;

/// Edges with both endpoints in `members`, sorted by `(src, dst)`
fn induced_edges(topology: &CsrGraph, members: &HashSet<u32>) -> Vec<usize> {
    let mut sorted: Vec<u32> = members.iter().copied().collect();
    sorted.sort_unstable();
    let mut selected = Vec::new();
    for u in sorted {
        let mut edges: Vec<(u32, usize)> = topology.out_edges(u).filter(|(v, _)| members.contains(v)).collect();
        edges.sort_unstable();
        selected.extend(edges.into_iter().map(|(_, e)| e));
    }
    selected
}

fn package(
    handle: &ResourceHandle,
    graph: &Graph,
    topology: &CsrGraph,
    sets: &[HashSet<u32>],
) -> Result<InducedSubgraphResult> {
    let mut selected = Vec::new();
    let mut offsets = Vec::with_capacity(sets.len() + 1);
    offsets.push(0);
    for members in sets {
        selected.extend(induced_edges(topology, members));
        offsets.push(selected.len());
    }

    let arrays = edge_arrays(handle, graph, topology, &selected)?;
    Ok(InducedSubgraphResult {
        sources: arrays.sources,
        destinations: arrays.destinations,
        weights: arrays.weights,
        edge_ids: arrays.edge_ids,
        edge_types: arrays.edge_types,
        subgraph_offsets: size_array(handle, &offsets)?,
    })
}

/// Vertex sets described by CSR-style `offsets` over `vertices`
fn read_vertex_sets(
    handle: &ResourceHandle,
    graph: &Graph,
    offsets: &TypeErasedDeviceArrayView,
    vertices: &TypeErasedDeviceArrayView,
    do_expensive_check: bool,
) -> Result<Vec<HashSet<u32>>> {
    offsets.check_handle(handle)?;
    let offsets = read_offsets(offsets)?;
    let ids = internal_vertices(handle, graph, vertices)?;
    let well_formed = offsets.first() == Some(&0)
        && offsets.windows(2).all(|w| w[0] <= w[1])
        && offsets.last() == Some(&ids.len());
    if !well_formed {
        return Err(Error::invalid_value(format!(
            "subgraph offsets must run from 0 to {} without decreasing",
            ids.len()
        )));
    }

    offsets
        .windows(2)
        .map(|w| {
            let set = &ids[w[0]..w[1]];
            if do_expensive_check {
                reject_duplicates(graph, set)?;
            }
            Ok(set.iter().copied().collect())
        })
        .collect()
}

/// Subgraphs induced by vertex sets
///
/// # Arguments
///
/// * `subgraph_offsets` - `n + 1` integral offsets into `subgraph_vertices`
/// * `subgraph_vertices` - Vertex labels of the `n` sets, back to back
///
/// # Returns
///
/// Edges of every induced subgraph (weights, edge ids and edge types when the
/// graph carries them) and `n + 1` `SIZE_T` offsets
///
/// # Errors
///
/// `InvalidValue` for malformed offsets, `InvalidInput` for unknown labels or
/// (with the expensive check) a label repeated within a set
pub fn extract_induced_subgraph(
    handle: &ResourceHandle,
    graph: &Graph,
    subgraph_offsets: &TypeErasedDeviceArrayView,
    subgraph_vertices: &TypeErasedDeviceArrayView,
    do_expensive_check: bool,
) -> Result<InducedSubgraphResult> {
    let local = read_vertex_sets(handle, graph, subgraph_offsets, subgraph_vertices, do_expensive_check);
    let sets = agree(handle, "induced_subgraph.sets", local)?;
    let topology = graph.topology(handle)?;
    package(handle, graph, &topology, &sets)
}

/// Ego networks: the subgraph induced by vertices within `radius` hops
///
/// # Errors
///
/// `TypeMismatch` or `InvalidInput` for bad source labels
pub fn extract_ego(
    handle: &ResourceHandle,
    graph: &Graph,
    source_vertices: &TypeErasedDeviceArrayView,
    radius: usize,
    do_expensive_check: bool,
) -> Result<InducedSubgraphResult> {
    let local = internal_vertices(handle, graph, source_vertices);
    let sources = agree(handle, "ego.sources", local)?;
    let topology = graph.topology(handle)?;
    if do_expensive_check {
        tracing::debug!(sources = sources.len(), radius, "ego");
    }

    let sets: Vec<HashSet<u32>> = sources
        .iter()
        .map(|&s| {
            let reached = DefaultEngine::bfs(&topology, &[s], radius, false);
            crate::engine::vertex_ids(reached.distances.len())
                .filter(|&v| reached.distances[v as usize].is_some())
                .collect()
        })
        .collect();
    package(handle, graph, &topology, &sets)
}
