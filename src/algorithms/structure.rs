//! Vertex degrees
//!
//! # Example
//!
//! ```
//! use trueno_graph_api::algorithms::degrees;
//! use trueno_graph_api::graph::{sg_graph_create, EdgeListViews, GraphBuildOptions};
//! use trueno_graph_api::{GraphProperties, ResourceHandle, TypeErasedDeviceArray};
//!
//! // 0 → 1, 0 → 2, 1 → 2
//! let handle = ResourceHandle::new();
//! let src = TypeErasedDeviceArray::from_slice(&handle, &[0_i32, 0, 1]).unwrap();
//! let dst = TypeErasedDeviceArray::from_slice(&handle, &[1_i32, 2, 2]).unwrap();
//! let (sv, dv) = (src.view(), dst.view());
//! let graph = sg_graph_create(
//!     &handle,
//!     GraphProperties::directed(),
//!     &EdgeListViews::new(&sv, &dv),
//!     &GraphBuildOptions::default(),
//! )
//! .unwrap();
//!
//! let result = degrees(&handle, &graph, None, false).unwrap();
//! assert_eq!(result.out_degrees().unwrap().to_vec::<i32>().unwrap(), vec![2, 1, 0]);
//! assert_eq!(result.in_degrees().unwrap().to_vec::<i32>().unwrap(), vec![0, 1, 2]);
//! ```

use super::{agree, internal_vertices, label_array, owned_vertices, reject_duplicates};
use crate::array::convert::vertex_array;
use crate::array::{TypeErasedDeviceArray, TypeErasedDeviceArrayView};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::resource::ResourceHandle;
use crate::results::DegreesResult;
use crate::storage::CsrGraph;

#[derive(Debug, Clone, Copy)]
struct Directions {
    incoming: bool,
    outgoing: bool,
}

fn degree_column(
    handle: &ResourceHandle,
    graph: &Graph,
    vertices: &[u32],
    degree: impl Fn(u32) -> usize,
) -> Result<TypeErasedDeviceArray> {
    let values = vertices
        .iter()
        .map(|&v| i64::try_from(degree(v)).map_err(|_| Error::invalid_value("degree overflows int64")))
        .collect::<Result<Vec<i64>>>()?;
    vertex_array(handle, graph.vertex_type(), &values)
}

fn compute(
    handle: &ResourceHandle,
    graph: &Graph,
    source_vertices: Option<&TypeErasedDeviceArrayView>,
    directions: Directions,
    do_expensive_check: bool,
) -> Result<DegreesResult> {
    let local = source_vertices
        .map(|view| {
            let ids = internal_vertices(handle, graph, view)?;
            if do_expensive_check {
                reject_duplicates(graph, &ids)?;
            }
            Ok(ids)
        })
        .transpose();
    let local = agree(handle, "degrees.vertices", local)?;
    let topology = graph.topology(handle)?;
    let vertices = match local {
        Some(vertices) => vertices,
        None => owned_vertices(handle, graph)?,
    };

    let csr: &CsrGraph = &topology;
    let in_degrees = if directions.incoming {
        Some(degree_column(handle, graph, &vertices, |v| csr.in_degree(v))?)
    } else {
        None
    };
    let out_degrees = if directions.outgoing {
        Some(degree_column(handle, graph, &vertices, |v| csr.out_degree(v))?)
    } else {
        None
    };

    Ok(DegreesResult {
        vertices: label_array(handle, graph, &vertices)?,
        in_degrees,
        out_degrees,
    })
}

/// In- and out-degree of `source_vertices`, or of every owned vertex
///
/// # Errors
///
/// `TypeMismatch` or `InvalidInput` for bad labels, and repeated labels with
/// the expensive check
pub fn degrees(
    handle: &ResourceHandle,
    graph: &Graph,
    source_vertices: Option<&TypeErasedDeviceArrayView>,
    do_expensive_check: bool,
) -> Result<DegreesResult> {
    let directions = Directions {
        incoming: true,
        outgoing: true,
    };
    compute(handle, graph, source_vertices, directions, do_expensive_check)
}

/// In-degrees only
///
/// # Errors
///
/// Same as [`degrees`]
pub fn in_degrees(
    handle: &ResourceHandle,
    graph: &Graph,
    source_vertices: Option<&TypeErasedDeviceArrayView>,
    do_expensive_check: bool,
) -> Result<DegreesResult> {
    let directions = Directions {
        incoming: true,
        outgoing: false,
    };
    compute(handle, graph, source_vertices, directions, do_expensive_check)
}

/// Out-degrees only
///
/// # Errors
///
/// Same as [`degrees`]
pub fn out_degrees(
    handle: &ResourceHandle,
    graph: &Graph,
    source_vertices: Option<&TypeErasedDeviceArrayView>,
    do_expensive_check: bool,
) -> Result<DegreesResult> {
    let directions = Directions {
        incoming: false,
        outgoing: true,
    };
    compute(handle, graph, source_vertices, directions, do_expensive_check)
}
