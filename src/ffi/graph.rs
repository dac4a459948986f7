//! Graph construction, accessors and release

use super::convert::data_type_id;
use super::{ffi_create, optional, release, required, required_list, Bool, ErrorObject};
use crate::array::TypeErasedDeviceArrayView;
use crate::error::{Error, Result, StatusCode};
use crate::graph::{
    mg_graph_create, sg_graph_create, sg_graph_create_from_csr, CsrViews, EdgeListViews, Graph,
    GraphBuildOptions, MgEdgeListChunks,
};
use crate::resource::ResourceHandle;
use crate::types::GraphProperties;
use std::os::raw::c_int;

type View = TypeErasedDeviceArrayView;

#[no_mangle]
/// Build a single-partition graph from an edge list
///
/// `vertices`, `weights`, `edge_ids` and `edge_types` may be null.
///
/// # Safety
/// Every non-null pointer must reference a live object; `graph` and `error`
/// must be valid for writes.
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_graph_create_sg(
    handle: *const ResourceHandle,
    properties: *const GraphProperties,
    vertices: *const View,
    src: *const View,
    dst: *const View,
    weights: *const View,
    edge_ids: *const View,
    edge_types: *const View,
    store_transposed: Bool,
    renumber: Bool,
    symmetrize: Bool,
    drop_self_loops: Bool,
    drop_multi_edges: Bool,
    do_expensive_check: Bool,
    graph: *mut *mut Graph,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_graph_create_sg", graph, error, || {
            let handle = required(handle, "resource handle")?;
            let input = EdgeListViews {
                vertices: optional(vertices),
                src: required(src, "src")?,
                dst: required(dst, "dst")?,
                weights: optional(weights),
                edge_ids: optional(edge_ids),
                edge_types: optional(edge_types),
            };
            let options = GraphBuildOptions {
                store_transposed: store_transposed.into(),
                renumber: renumber.into(),
                symmetrize: symmetrize.into(),
                drop_self_loops: drop_self_loops.into(),
                drop_multi_edges: drop_multi_edges.into(),
                do_expensive_check: do_expensive_check.into(),
            };
            sg_graph_create(handle, *required(properties, "graph properties")?, &input, &options)
        })
    }
}

#[no_mangle]
/// Build a single-partition graph from CSR arrays
///
/// `weights`, `edge_ids` and `edge_types` may be null.
///
/// # Safety
/// Same as [`tg_graph_create_sg`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_graph_create_sg_from_csr(
    handle: *const ResourceHandle,
    properties: *const GraphProperties,
    offsets: *const View,
    indices: *const View,
    weights: *const View,
    edge_ids: *const View,
    edge_types: *const View,
    store_transposed: Bool,
    renumber: Bool,
    do_expensive_check: Bool,
    graph: *mut *mut Graph,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_graph_create_sg_from_csr", graph, error, || {
            let handle = required(handle, "resource handle")?;
            let input = CsrViews {
                offsets: required(offsets, "offsets")?,
                indices: required(indices, "indices")?,
                weights: optional(weights),
                edge_ids: optional(edge_ids),
                edge_types: optional(edge_types),
            };
            let options = GraphBuildOptions {
                store_transposed: store_transposed.into(),
                renumber: renumber.into(),
                do_expensive_check: do_expensive_check.into(),
                ..GraphBuildOptions::default()
            };
            sg_graph_create_from_csr(handle, *required(properties, "graph properties")?, &input, &options)
        })
    }
}

/// Chunk list of an optional role: null means the role is absent
unsafe fn optional_chunks<'a>(ptrs: *const *const View, num_arrays: usize, what: &str) -> Result<Option<Vec<&'a View>>> {
    if ptrs.is_null() {
        Ok(None)
    } else {
        unsafe { required_list(ptrs, num_arrays, what) }.map(Some)
    }
}

#[no_mangle]
/// Build a graph partitioned over every rank of the handle's group
///
/// Every role is an array of `num_arrays` view pointers. `vertices`,
/// `weights`, `edge_ids` and `edge_types` may be null. Collective.
///
/// # Safety
/// Every non-null role must be valid for `num_arrays` reads of live views;
/// `graph` and `error` must be valid for writes.
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_graph_create_mg(
    handle: *const ResourceHandle,
    properties: *const GraphProperties,
    vertices: *const *const View,
    src: *const *const View,
    dst: *const *const View,
    weights: *const *const View,
    edge_ids: *const *const View,
    edge_types: *const *const View,
    store_transposed: Bool,
    num_arrays: usize,
    symmetrize: Bool,
    drop_self_loops: Bool,
    drop_multi_edges: Bool,
    do_expensive_check: Bool,
    graph: *mut *mut Graph,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_graph_create_mg", graph, error, || {
            let handle = required(handle, "resource handle")?;
            if num_arrays > 0 && (src.is_null() || dst.is_null()) {
                return Err(Error::InvalidPointer("src and dst chunk lists are required".to_string()));
            }
            let src = required_list(src, num_arrays, "src chunk")?;
            let dst = required_list(dst, num_arrays, "dst chunk")?;
            let vertices = optional_chunks(vertices, num_arrays, "vertex chunk")?;
            let weights = optional_chunks(weights, num_arrays, "weight chunk")?;
            let edge_ids = optional_chunks(edge_ids, num_arrays, "edge id chunk")?;
            let edge_types = optional_chunks(edge_types, num_arrays, "edge type chunk")?;
            let chunks = MgEdgeListChunks {
                vertices: vertices.as_deref(),
                src: &src,
                dst: &dst,
                weights: weights.as_deref(),
                edge_ids: edge_ids.as_deref(),
                edge_types: edge_types.as_deref(),
            };
            let options = GraphBuildOptions {
                store_transposed: store_transposed.into(),
                renumber: true,
                symmetrize: symmetrize.into(),
                drop_self_loops: drop_self_loops.into(),
                drop_multi_edges: drop_multi_edges.into(),
                do_expensive_check: do_expensive_check.into(),
            };
            mg_graph_create(handle, *required(properties, "graph properties")?, &chunks, &options)
        })
    }
}

#[no_mangle]
/// Release a graph of either family
///
/// # Safety
/// `graph` must be null or live, freed at most once.
pub unsafe extern "C" fn tg_graph_free(graph: *mut Graph) {
    unsafe { release(graph) }
}

#[no_mangle]
/// Release a graph built by a single-partition constructor
///
/// # Safety
/// Same as [`tg_graph_free`].
pub unsafe extern "C" fn tg_sg_graph_free(graph: *mut Graph) {
    if !graph.is_null() {
        unsafe { Box::from_raw(graph) }.sg_free();
    }
}

#[no_mangle]
/// Release a graph built by the multi-partition constructor
///
/// # Safety
/// Same as [`tg_graph_free`].
pub unsafe extern "C" fn tg_mg_graph_free(graph: *mut Graph) {
    if !graph.is_null() {
        unsafe { Box::from_raw(graph) }.mg_free();
    }
}

#[no_mangle]
/// Number of vertices across all partitions (0 for null)
///
/// # Safety
/// `graph` must be null or live.
pub unsafe extern "C" fn tg_graph_number_of_vertices(graph: *const Graph) -> usize {
    unsafe { graph.as_ref() }.map_or(0, Graph::number_of_vertices)
}

#[no_mangle]
/// Number of edges across all partitions (0 for null)
///
/// # Safety
/// `graph` must be null or live.
pub unsafe extern "C" fn tg_graph_number_of_edges(graph: *const Graph) -> usize {
    unsafe { graph.as_ref() }.map_or(0, Graph::number_of_edges)
}

#[no_mangle]
/// Vertex type id of the graph (`NTYPES` for null)
///
/// # Safety
/// `graph` must be null or live.
pub unsafe extern "C" fn tg_graph_vertex_type(graph: *const Graph) -> c_int {
    unsafe { graph.as_ref() }.map_or(super::convert::NTYPES, |g| data_type_id(g.vertex_type()))
}

#[no_mangle]
/// Weight type id of the graph (`NTYPES` for null)
///
/// # Safety
/// `graph` must be null or live.
pub unsafe extern "C" fn tg_graph_weight_type(graph: *const Graph) -> c_int {
    unsafe { graph.as_ref() }.map_or(super::convert::NTYPES, |g| data_type_id(g.weight_type()))
}

#[no_mangle]
/// Properties after construction (default properties for null)
///
/// # Safety
/// `graph` must be null or live.
pub unsafe extern "C" fn tg_graph_properties(graph: *const Graph) -> GraphProperties {
    unsafe { graph.as_ref() }.map(Graph::properties).unwrap_or_default()
}

#[no_mangle]
/// `True` for graphs built collectively
///
/// # Safety
/// `graph` must be null or live.
pub unsafe extern "C" fn tg_graph_is_multi_partition(graph: *const Graph) -> Bool {
    unsafe { graph.as_ref() }.is_some_and(Graph::is_multi_partition).into()
}
