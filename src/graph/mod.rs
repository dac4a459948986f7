//! Opaque graph objects and their construction
//!
//! A [`Graph`] only exists once construction succeeded; dropping it releases
//! it. Single-partition graphs own a forward and reverse CSR over the full edge
//! set. Multi-partition graphs own the global renumber map, the vertex
//! partition and the edges whose major vertex (source, or destination when
//! stored transposed) belongs to the calling rank. Kernels see the full
//! topology: multi-partition graphs gather it collectively at call time.

mod build;
mod mg;
mod partition;
mod renumber;

pub use build::{sg_graph_create, sg_graph_create_from_csr, CsrViews, EdgeListViews, GraphBuildOptions};
pub use mg::{mg_graph_create, MgEdgeListChunks};
pub use partition::VertexPartition;
pub use renumber::RenumberMap;

use crate::error::{Error, Result};
use crate::resource::ResourceHandle;
use crate::storage::{CsrGraph, EdgeList};
use crate::types::{DataType, GraphProperties};
use std::ops::Range;
use std::sync::Arc;

/// Construction family of a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphKind {
    /// Built by `sg_graph_create` / `sg_graph_create_from_csr`
    SinglePartition,
    /// Built collectively by `mg_graph_create`
    MultiPartition,
}

/// Element types fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeTypeSignature {
    /// Vertex label type (`INT32` or `INT64`)
    pub vertex: DataType,
    /// Weight type, if the graph is weighted
    pub weight: Option<DataType>,
    /// Edge id type, if edge ids were supplied
    pub edge_id: Option<DataType>,
    /// Edge type type, if edge types were supplied
    pub edge_type: Option<DataType>,
}

#[derive(Debug)]
enum Topology {
    Local(Arc<CsrGraph>),
    Distributed {
        partition: VertexPartition,
        local: EdgeList,
        num_edges: usize,
    },
}

/// Opaque graph handle
#[derive(Debug)]
pub struct Graph {
    properties: GraphProperties,
    store_transposed: bool,
    signature: EdgeTypeSignature,
    renumber: Arc<RenumberMap>,
    topology: Topology,
}

impl Graph {
    pub(crate) fn single(
        properties: GraphProperties,
        store_transposed: bool,
        signature: EdgeTypeSignature,
        renumber: RenumberMap,
        csr: Arc<CsrGraph>,
    ) -> Self {
        Self {
            properties,
            store_transposed,
            signature,
            renumber: Arc::new(renumber),
            topology: Topology::Local(csr),
        }
    }

    pub(crate) fn distributed(
        properties: GraphProperties,
        store_transposed: bool,
        signature: EdgeTypeSignature,
        renumber: RenumberMap,
        partition: VertexPartition,
        local: EdgeList,
        num_edges: usize,
    ) -> Self {
        Self {
            properties,
            store_transposed,
            signature,
            renumber: Arc::new(renumber),
            topology: Topology::Distributed {
                partition,
                local,
                num_edges,
            },
        }
    }

    /// Construction family
    #[must_use]
    pub const fn kind(&self) -> GraphKind {
        match self.topology {
            Topology::Local(_) => GraphKind::SinglePartition,
            Topology::Distributed { .. } => GraphKind::MultiPartition,
        }
    }

    /// `true` for graphs built collectively
    #[must_use]
    pub const fn is_multi_partition(&self) -> bool {
        matches!(self.topology, Topology::Distributed { .. })
    }

    /// Properties after construction (symmetrize marks the graph symmetric)
    #[must_use]
    pub const fn properties(&self) -> GraphProperties {
        self.properties
    }

    /// Preferred storage orientation
    #[must_use]
    pub const fn store_transposed(&self) -> bool {
        self.store_transposed
    }

    /// Element types fixed at construction
    #[must_use]
    pub const fn signature(&self) -> EdgeTypeSignature {
        self.signature
    }

    /// Vertex label type
    #[must_use]
    pub const fn vertex_type(&self) -> DataType {
        self.signature.vertex
    }

    /// Weight type (`FLOAT32` for unweighted graphs)
    #[must_use]
    pub fn weight_type(&self) -> DataType {
        self.signature.weight.unwrap_or(DataType::Float32)
    }

    /// Edge id type, if edge ids were supplied
    #[must_use]
    pub const fn edge_id_type(&self) -> Option<DataType> {
        self.signature.edge_id
    }

    /// Edge type type, if edge types were supplied
    #[must_use]
    pub const fn edge_type_type(&self) -> Option<DataType> {
        self.signature.edge_type
    }

    /// `true` if weights were supplied
    #[must_use]
    pub const fn is_weighted(&self) -> bool {
        self.signature.weight.is_some()
    }

    /// Number of vertices across all partitions
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.renumber.len()
    }

    /// Number of edges across all partitions
    #[must_use]
    pub fn number_of_edges(&self) -> usize {
        match &self.topology {
            Topology::Local(csr) => csr.num_edges(),
            Topology::Distributed { num_edges, .. } => *num_edges,
        }
    }

    /// Number of edges stored by this rank
    #[must_use]
    pub fn number_of_local_edges(&self) -> usize {
        match &self.topology {
            Topology::Local(csr) => csr.num_edges(),
            Topology::Distributed { local, .. } => local.len(),
        }
    }

    /// Internal id <-> external label map
    #[must_use]
    pub fn renumber_map(&self) -> &RenumberMap {
        &self.renumber
    }

    /// Vertex partition (a single block for single-partition graphs)
    #[must_use]
    pub fn partition(&self) -> VertexPartition {
        match &self.topology {
            Topology::Local(_) => VertexPartition::new(self.number_of_vertices(), 1),
            Topology::Distributed { partition, .. } => *partition,
        }
    }

    /// Internal ids whose outputs this rank reports
    pub(crate) fn owned_range(&self, handle: &ResourceHandle) -> Result<Range<u32>> {
        let range = match &self.topology {
            Topology::Local(_) => 0..self.number_of_vertices(),
            Topology::Distributed { partition, .. } => partition.range(handle.rank()),
        };
        owned_ids(range)
    }

    /// `true` if this rank reports edge `(src, dst)`
    pub(crate) fn owns_edge(&self, handle: &ResourceHandle, src: u32, dst: u32) -> bool {
        match &self.topology {
            Topology::Local(_) => true,
            Topology::Distributed { partition, .. } => {
                let major = if self.store_transposed { dst } else { src };
                partition.owner(major) == handle.rank()
            }
        }
    }

    /// Full topology for the kernels
    ///
    /// Collective for multi-partition graphs: every rank must call it.
    pub(crate) fn topology(&self, handle: &ResourceHandle) -> Result<Arc<CsrGraph>> {
        match &self.topology {
            Topology::Local(csr) => Ok(Arc::clone(csr)),
            Topology::Distributed { partition, local, .. } => {
                if handle.comm_size() != partition.size() {
                    return Err(Error::invalid_handle(format!(
                        "graph partitioned over {} ranks used with a handle of {} ranks",
                        partition.size(),
                        handle.comm_size()
                    )));
                }
                let parts = handle.all_gather("graph.topology", local.clone())?;
                let mut merged = EdgeList::default();
                for part in parts {
                    merged.src.extend(part.src);
                    merged.dst.extend(part.dst);
                    append(&mut merged.weights, part.weights);
                    append(&mut merged.edge_ids, part.edge_ids);
                    append(&mut merged.edge_types, part.edge_types);
                }
                Ok(Arc::new(CsrGraph::from_edge_list(self.number_of_vertices(), merged)?))
            }
        }
    }

    /// Release a graph built by the single-partition constructors
    pub fn sg_free(self) {
        if self.is_multi_partition() {
            tracing::warn!("multi-partition graph released through the single-partition free");
        }
    }

    /// Release a graph built by the multi-partition constructor
    pub fn mg_free(self) {
        if !self.is_multi_partition() {
            tracing::warn!("single-partition graph released through the multi-partition free");
        }
    }
}

/// Narrow an owned block of vertex ids to the internal id type
fn owned_ids(range: Range<usize>) -> Result<Range<u32>> {
    let narrow = |v: usize| {
        u32::try_from(v).map_err(|_| Error::invalid_value(format!("vertex id {v} exceeds the 32-bit id space")))
    };
    Ok(narrow(range.start)?..narrow(range.end)?)
}

fn append<T>(dst: &mut Option<Vec<T>>, src: Option<Vec<T>>) {
    if let Some(src) = src {
        dst.get_or_insert_with(Vec::new).extend(src);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::TypeErasedDeviceArray;
    use crate::StatusCode;

    fn build(
        handle: &ResourceHandle,
        src: &[i32],
        dst: &[i32],
        properties: GraphProperties,
        options: &GraphBuildOptions,
    ) -> Result<Graph> {
        let s = TypeErasedDeviceArray::from_slice(handle, src)?;
        let d = TypeErasedDeviceArray::from_slice(handle, dst)?;
        let (sv, dv) = (s.view(), d.view());
        sg_graph_create(handle, properties, &EdgeListViews::new(&sv, &dv), options)
    }

    #[test]
    fn test_sg_accessors() {
        let handle = ResourceHandle::new();
        let graph = build(
            &handle,
            &[0, 1, 1, 2, 2, 2, 3, 4],
            &[1, 3, 4, 0, 1, 3, 5, 5],
            GraphProperties::directed(),
            &GraphBuildOptions::default(),
        )
        .unwrap();

        assert_eq!(graph.kind(), GraphKind::SinglePartition);
        assert_eq!(graph.number_of_vertices(), 6);
        assert_eq!(graph.number_of_edges(), 8);
        assert_eq!(graph.vertex_type(), DataType::Int32);
        assert_eq!(graph.weight_type(), DataType::Float32);
        assert!(!graph.is_weighted());
        assert_eq!(graph.owned_range(&handle).unwrap(), 0..6);
    }

    #[test]
    fn test_owned_ids_reject_wide_ranges() {
        assert_eq!(owned_ids(3..7).unwrap(), 3..7);
        let end = u32::MAX as usize;
        assert_eq!(owned_ids(0..end).unwrap(), 0..u32::MAX);
        let err = owned_ids(0..end + 1).unwrap_err();
        assert_eq!(err.code(), StatusCode::InvalidValue);
    }

    #[test]
    fn test_symmetry_enforced_with_expensive_check() {
        let handle = ResourceHandle::new();
        let options = GraphBuildOptions {
            do_expensive_check: true,
            ..GraphBuildOptions::default()
        };
        let err = build(
            &handle,
            &[0, 1, 1, 2, 2, 2, 3, 4],
            &[1, 3, 4, 0, 1, 3, 5, 5],
            GraphProperties::symmetric(),
            &options,
        )
        .unwrap_err();
        assert_eq!(err.code(), StatusCode::InvalidInput);
    }

    #[test]
    fn test_symmetrize_marks_graph_symmetric() {
        let handle = ResourceHandle::new();
        let options = GraphBuildOptions {
            symmetrize: true,
            do_expensive_check: true,
            ..GraphBuildOptions::default()
        };
        let graph = build(&handle, &[0, 1], &[1, 2], GraphProperties::symmetric(), &options).unwrap();
        assert!(graph.properties().is_symmetric);
        assert_eq!(graph.number_of_edges(), 4);
    }

    #[test]
    fn test_length_and_type_mismatch() {
        let handle = ResourceHandle::new();
        let s = TypeErasedDeviceArray::from_slice(&handle, &[0_i32, 1]).unwrap();
        let d = TypeErasedDeviceArray::from_slice(&handle, &[1_i32]).unwrap();
        let d64 = TypeErasedDeviceArray::from_slice(&handle, &[1_i64, 0]).unwrap();
        let w = TypeErasedDeviceArray::from_slice(&handle, &[1.0_f32]).unwrap();
        let (sv, dv, d64v, wv) = (s.view(), d.view(), d64.view(), w.view());
        let options = GraphBuildOptions::default();
        let props = GraphProperties::directed();

        let err = sg_graph_create(&handle, props, &EdgeListViews::new(&sv, &dv), &options).unwrap_err();
        assert_eq!(err.code(), StatusCode::InvalidValue);

        let err = sg_graph_create(&handle, props, &EdgeListViews::new(&sv, &d64v), &options).unwrap_err();
        assert_eq!(err.code(), StatusCode::TypeMismatch);

        let input = EdgeListViews::new(&sv, &sv).with_weights(&wv);
        let err = sg_graph_create(&handle, props, &input, &options).unwrap_err();
        assert_eq!(err.code(), StatusCode::InvalidValue);
    }

    #[test]
    fn test_csr_construction() {
        let handle = ResourceHandle::new();
        let offsets = TypeErasedDeviceArray::from_slice(&handle, &[0_i32, 2, 3, 3]).unwrap();
        let indices = TypeErasedDeviceArray::from_slice(&handle, &[1_i32, 2, 2]).unwrap();
        let (ov, iv) = (offsets.view(), indices.view());
        let input = CsrViews {
            offsets: &ov,
            indices: &iv,
            weights: None,
            edge_ids: None,
            edge_types: None,
        };
        let graph = sg_graph_create_from_csr(
            &handle,
            GraphProperties::directed(),
            &input,
            &GraphBuildOptions::default(),
        )
        .unwrap();
        assert_eq!(graph.number_of_vertices(), 3);
        assert_eq!(graph.number_of_edges(), 3);

        let topology = graph.topology(&handle).unwrap();
        assert_eq!(topology.out_neighbors(0), &[1, 2]);
    }

    #[test]
    fn test_csr_malformed() {
        let handle = ResourceHandle::new();
        let indices = TypeErasedDeviceArray::from_slice(&handle, &[1_i32, 0]).unwrap();
        let iv = indices.view();
        let options = GraphBuildOptions::default();
        let props = GraphProperties::directed();

        let cases: [(&[i32], StatusCode); 3] = [
            (&[1, 2], StatusCode::InvalidInput),
            (&[0, 2, 1], StatusCode::InvalidInput),
            (&[0, 1, 3], StatusCode::InvalidValue),
        ];
        for (offsets, code) in cases {
            let offsets = TypeErasedDeviceArray::from_slice(&handle, offsets).unwrap();
            let ov = offsets.view();
            let input = CsrViews {
                offsets: &ov,
                indices: &iv,
                weights: None,
                edge_ids: None,
                edge_types: None,
            };
            let err = sg_graph_create_from_csr(&handle, props, &input, &options).unwrap_err();
            assert_eq!(err.code(), code);
        }

        let offsets = TypeErasedDeviceArray::from_slice(&handle, &[0_i32, 2]).unwrap();
        let ov = offsets.view();
        let input = CsrViews {
            offsets: &ov,
            indices: &iv,
            weights: None,
            edge_ids: None,
            edge_types: None,
        };
        let err = sg_graph_create_from_csr(&handle, props, &input, &options).unwrap_err();
        assert_eq!(err.code(), StatusCode::InvalidInput);
    }
}
