//! Breadth-first search and single-source shortest paths

use super::{
    agree, internal_vertices, label_array, optional_label_array, owned_vertices, reject_duplicates,
    require_symmetric, vertex_type_max, weight_type_max,
};
use crate::array::convert::{vertex_array, weight_array};
use crate::array::TypeErasedDeviceArrayView;
use crate::engine::{DefaultEngine, TraversalEngine};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::options::{BfsOptions, SsspOptions};
use crate::resource::ResourceHandle;
use crate::results::PathsResult;

/// Multi-source breadth-first search
///
/// # Arguments
///
/// * `sources` - Seed labels; on multi-partition graphs each rank passes its
///   share (possibly empty) and the union seeds the search
/// * `options` - Depth limit, predecessor tracking, direction optimization
/// * `do_expensive_check` - Reject duplicate seeds
///
/// # Returns
///
/// Hop count per owned vertex (the vertex type's maximum when unreached) and
/// predecessor labels (`-1` for seeds and unreached vertices)
///
/// # Errors
///
/// `TypeMismatch` for seeds of another vertex type, `InvalidInput` for
/// unknown or (with the expensive check) repeated seeds, and for direction
/// optimization on a graph not marked symmetric
///
/// # Example
///
/// ```
/// use trueno_graph_api::algorithms::bfs;
/// use trueno_graph_api::graph::{sg_graph_create, EdgeListViews, GraphBuildOptions};
/// use trueno_graph_api::{BfsOptions, GraphProperties, ResourceHandle, TypeErasedDeviceArray};
///
/// let handle = ResourceHandle::new();
/// let src = TypeErasedDeviceArray::from_slice(&handle, &[0_i32, 1]).unwrap();
/// let dst = TypeErasedDeviceArray::from_slice(&handle, &[1_i32, 2]).unwrap();
/// let (sv, dv) = (src.view(), dst.view());
/// let graph = sg_graph_create(
///     &handle,
///     GraphProperties::directed(),
///     &EdgeListViews::new(&sv, &dv),
///     &GraphBuildOptions::default(),
/// )
/// .unwrap();
///
/// let seeds = TypeErasedDeviceArray::from_slice(&handle, &[0_i32]).unwrap();
/// let result = bfs(&handle, &graph, &seeds.view(), &BfsOptions::default(), false).unwrap();
/// assert_eq!(result.distances().to_vec::<i32>().unwrap(), vec![0, 1, 2]);
/// ```
pub fn bfs(
    handle: &ResourceHandle,
    graph: &Graph,
    sources: &TypeErasedDeviceArrayView,
    options: &BfsOptions,
    do_expensive_check: bool,
) -> Result<PathsResult> {
    if options.direction_optimizing {
        require_symmetric(graph, "direction-optimizing bfs")?;
    }
    let local = internal_vertices(handle, graph, sources).and_then(|ids| {
        if do_expensive_check {
            reject_duplicates(graph, &ids)?;
        }
        Ok(ids)
    });
    let local = agree(handle, "bfs.sources", local)?;
    let seeds = handle.all_gather_concat("bfs.seeds", local)?;
    let topology = graph.topology(handle)?;

    tracing::debug!(seeds = seeds.len(), depth_limit = options.depth_limit, "bfs");
    let out = DefaultEngine::bfs(&topology, &seeds, options.depth_limit, options.direction_optimizing);

    let owned = owned_vertices(handle, graph)?;
    let unreached = vertex_type_max(graph.vertex_type());
    let distances: Vec<i64> = owned
        .iter()
        .map(|&v| out.distances[v as usize].map_or(unreached, i64::from))
        .collect();
    let predecessors: Vec<Option<u32>> = if options.compute_predecessors {
        owned.iter().map(|&v| out.predecessors[v as usize]).collect()
    } else {
        vec![None; owned.len()]
    };

    Ok(PathsResult {
        vertices: label_array(handle, graph, &owned)?,
        distances: vertex_array(handle, graph.vertex_type(), &distances)?,
        predecessors: optional_label_array(handle, graph, &predecessors)?,
    })
}

/// Single-source shortest paths over non-negative weights
///
/// Unweighted graphs count every edge as 1. On multi-partition graphs every
/// rank passes the same `source`.
///
/// # Errors
///
/// `InvalidValue` for a negative or NaN cutoff, `InvalidInput` for an unknown
/// source, a negative edge weight or (with the expensive check) a non-finite one
pub fn sssp(
    handle: &ResourceHandle,
    graph: &Graph,
    source: i64,
    options: &SsspOptions,
    do_expensive_check: bool,
) -> Result<PathsResult> {
    options.validate()?;
    let local = graph
        .renumber_map()
        .to_internal(source)
        .ok_or_else(|| Error::invalid_input(format!("source {source} is not in the graph")));
    let source = agree(handle, "sssp.source", local)?;
    let topology = graph.topology(handle)?;
    if do_expensive_check {
        if let Some(w) = topology.edges().weights.iter().flatten().find(|w| !w.is_finite()) {
            return Err(Error::invalid_input(format!("edge weight {w} is not finite")));
        }
    }

    let out = DefaultEngine::sssp(&topology, source, options.cutoff)?;

    let owned = owned_vertices(handle, graph)?;
    let unreached = weight_type_max(graph.weight_type());
    let distances: Vec<f64> = owned
        .iter()
        .map(|&v| out.distances[v as usize].unwrap_or(unreached))
        .collect();
    let predecessors: Vec<Option<u32>> = if options.compute_predecessors {
        owned.iter().map(|&v| out.predecessors[v as usize]).collect()
    } else {
        vec![None; owned.len()]
    };

    Ok(PathsResult {
        vertices: label_array(handle, graph, &owned)?,
        distances: weight_array(handle, graph.weight_type(), &distances)?,
        predecessors: optional_label_array(handle, graph, &predecessors)?,
    })
}
