//! Algorithm entry points
//!
//! Every entry point has the same shape:
//!
//! ```text
//! algorithm(handle, graph, inputs..., &options, do_expensive_check) -> Result<R>
//! ```
//!
//! Inputs arrive as views in external labels. The dispatch layer checks them,
//! translates labels to internal ids, runs the [`DefaultEngine`] kernel over
//! the graph topology and packages the output as an opaque result in
//! external labels of the graph's vertex type.
//!
//! On multi-partition graphs every call is collective. Local input failures
//! are agreed on before any other collective step, so a bad input on one rank
//! fails the call on every rank instead of leaving peers waiting.
//!
//! [`DefaultEngine`]: crate::engine::DefaultEngine

pub mod centrality;
pub mod community;
pub mod components;
pub mod cores;
pub mod generators;
pub mod pairs;
pub mod sampling;
pub mod similarity;
pub mod structure;
pub mod subgraph;
pub mod traversal;

pub use centrality::{
    betweenness_centrality, eigenvector_centrality, hits, katz_centrality, pagerank,
    pagerank_allow_nonconvergence, personalized_pagerank, personalized_pagerank_allow_nonconvergence,
    PageRankViews,
};
pub use community::{
    analyze_clustering_edge_cut, analyze_clustering_modularity, analyze_clustering_ratio_cut,
    balanced_cut_clustering, ecg, louvain, spectral_modularity_maximization, triangle_count,
};
pub use components::{strongly_connected_components, weakly_connected_components};
pub use cores::{core_number, k_core, k_truss_subgraph};
pub use generators::{
    generate_edge_ids, generate_edge_types, generate_edge_weights, generate_rmat_edgelist,
    generate_rmat_edgelists,
};
pub use pairs::{create_vertex_pairs, two_hop_neighbors};
pub use sampling::{biased_random_walks, node2vec_random_walks, uniform_neighbor_sample, uniform_random_walks};
pub use similarity::{
    all_pairs_jaccard_coefficients, all_pairs_overlap_coefficients, all_pairs_sorensen_coefficients,
    jaccard_coefficients, overlap_coefficients, sorensen_coefficients,
};
pub use structure::{degrees, in_degrees, out_degrees};
pub use subgraph::{extract_ego, extract_induced_subgraph};
pub use traversal::{bfs, sssp};

use crate::array::convert::{edge_id_array, read_vertices, read_weights, vertex_array, weight_array};
use crate::array::{TypeErasedDeviceArray, TypeErasedDeviceArrayView};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::resource::ResourceHandle;
use crate::storage::CsrGraph;
use crate::types::DataType;
use std::collections::HashSet;

/// Vertex labels with one value each
#[derive(Debug, Clone, Copy)]
pub struct VertexValues<'a> {
    /// Vertex labels (graph vertex type)
    pub vertices: &'a TypeErasedDeviceArrayView,
    /// Values (`FLOAT32` or `FLOAT64`)
    pub values: &'a TypeErasedDeviceArrayView,
}

/// Settle local input failures across the group
///
/// Every rank contributes its failure message (if any). A rank whose own
/// input failed returns its error; the others report the first failing rank.
pub(crate) fn agree<T>(handle: &ResourceHandle, tag: &'static str, local: Result<T>) -> Result<T> {
    let failure = local.as_ref().err().map(ToString::to_string);
    let peers = handle.all_gather(tag, failure)?;
    let local = local?;
    if let Some((rank, message)) = peers
        .iter()
        .enumerate()
        .find_map(|(rank, failure)| failure.as_ref().map(|m| (rank, m)))
    {
        return Err(Error::invalid_input(format!("rank {rank} rejected its input: {message}")));
    }
    Ok(local)
}

/// Internal ids of the labels in `view`
pub(crate) fn internal_vertices(
    handle: &ResourceHandle,
    graph: &Graph,
    view: &TypeErasedDeviceArrayView,
) -> Result<Vec<u32>> {
    view.check_handle(handle)?;
    if view.dtype() != graph.vertex_type() {
        return Err(Error::type_mismatch(format!(
            "vertex input is {}, graph vertices are {}",
            view.dtype(),
            graph.vertex_type()
        )));
    }
    graph.renumber_map().internalize(&read_vertices(view)?)
}

/// `(internal id, value)` pairs of a vertex-keyed float input
pub(crate) fn internal_vertex_values(
    handle: &ResourceHandle,
    graph: &Graph,
    input: VertexValues<'_>,
) -> Result<Vec<(u32, f64)>> {
    input.values.check_handle(handle)?;
    if input.vertices.size() != input.values.size() {
        return Err(Error::invalid_value(format!(
            "{} vertices with {} values",
            input.vertices.size(),
            input.values.size()
        )));
    }
    let vertices = internal_vertices(handle, graph, input.vertices)?;
    let values = read_weights(input.values)?;
    Ok(vertices.into_iter().zip(values).collect())
}

/// Dense vector over all vertices, zero where no value was supplied
pub(crate) fn densify(num_vertices: usize, pairs: &[(u32, f64)]) -> Vec<f64> {
    let mut dense = vec![0.0; num_vertices];
    for &(v, value) in pairs {
        dense[v as usize] = value;
    }
    dense
}

/// Internal ids whose vertex-keyed outputs this rank reports
pub(crate) fn owned_vertices(handle: &ResourceHandle, graph: &Graph) -> Result<Vec<u32>> {
    Ok(graph.owned_range(handle)?.collect())
}

/// `InvalidInput` naming the first label that appears twice
pub(crate) fn reject_duplicates(graph: &Graph, ids: &[u32]) -> Result<()> {
    let mut seen = HashSet::with_capacity(ids.len());
    match ids.iter().find(|&&v| !seen.insert(v)) {
        Some(&dup) => Err(Error::invalid_input(format!(
            "vertex {} given more than once",
            graph.renumber_map().to_external(dup)
        ))),
        None => Ok(()),
    }
}

pub(crate) fn require_symmetric(graph: &Graph, algorithm: &str) -> Result<()> {
    if graph.properties().is_symmetric {
        Ok(())
    } else {
        Err(Error::invalid_input(format!("{algorithm} requires a symmetric graph")))
    }
}

/// Log when an algorithm that walks in-edges runs on source-major storage
pub(crate) fn note_orientation(graph: &Graph, algorithm: &'static str) {
    if !graph.store_transposed() {
        tracing::debug!(algorithm, "graph stored source-major, reading the transposed view");
    }
}

/// External labels of `ids` in the graph's vertex type
pub(crate) fn label_array(handle: &ResourceHandle, graph: &Graph, ids: &[u32]) -> Result<TypeErasedDeviceArray> {
    vertex_array(handle, graph.vertex_type(), &graph.renumber_map().externalize(ids))
}

/// Optional internal ids as labels, `-1` for `None`
pub(crate) fn optional_label_array(
    handle: &ResourceHandle,
    graph: &Graph,
    ids: &[Option<u32>],
) -> Result<TypeErasedDeviceArray> {
    let map = graph.renumber_map();
    let labels: Vec<i64> = ids.iter().map(|id| id.map_or(-1, |id| map.to_external(id))).collect();
    vertex_array(handle, graph.vertex_type(), &labels)
}

/// Largest value of a vertex-typed array
pub(crate) const fn vertex_type_max(dtype: DataType) -> i64 {
    match dtype {
        DataType::Int32 => i32::MAX as i64,
        _ => i64::MAX,
    }
}

/// Largest finite value of a weight-typed array
pub(crate) fn weight_type_max(dtype: DataType) -> f64 {
    match dtype {
        DataType::Float32 => f64::from(f32::MAX),
        _ => f64::MAX,
    }
}

/// Edge columns of selected input edges
pub(crate) struct EdgeArrays {
    pub(crate) sources: TypeErasedDeviceArray,
    pub(crate) destinations: TypeErasedDeviceArray,
    pub(crate) weights: Option<TypeErasedDeviceArray>,
    pub(crate) edge_ids: Option<TypeErasedDeviceArray>,
    pub(crate) edge_types: Option<TypeErasedDeviceArray>,
}

/// Package edges `selected` (input edge indices) in external labels
pub(crate) fn edge_arrays(
    handle: &ResourceHandle,
    graph: &Graph,
    topology: &CsrGraph,
    selected: &[usize],
) -> Result<EdgeArrays> {
    let edges = topology.edges();
    let src: Vec<u32> = selected.iter().map(|&e| edges.src[e]).collect();
    let dst: Vec<u32> = selected.iter().map(|&e| edges.dst[e]).collect();

    let weights = match graph.signature().weight {
        Some(dtype) => {
            let values: Vec<f64> = selected.iter().map(|&e| edges.weight(e)).collect();
            Some(weight_array(handle, dtype, &values)?)
        }
        None => None,
    };
    let edge_ids = match (graph.edge_id_type(), &edges.edge_ids) {
        (Some(dtype), Some(ids)) => {
            let values: Vec<i64> = selected.iter().map(|&e| ids[e]).collect();
            Some(edge_id_array(handle, dtype, &values)?)
        }
        _ => None,
    };
    let edge_types = match &edges.edge_types {
        Some(types) => {
            let values: Vec<i32> = selected.iter().map(|&e| types[e]).collect();
            Some(TypeErasedDeviceArray::from_slice(handle, &values)?)
        }
        None => None,
    };

    Ok(EdgeArrays {
        sources: label_array(handle, graph, &src)?,
        destinations: label_array(handle, graph, &dst)?,
        weights,
        edge_ids,
        edge_types,
    })
}
