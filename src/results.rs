//! Opaque algorithm results
//!
//! A result owns its arrays. Accessors hand out views that stay valid until
//! the result is dropped; reading such a view afterwards yields
//! `InvalidHandle`. Copy data out (`copy_to_host`, `to_vec`) before dropping
//! the result.

use crate::array::{TypeErasedDeviceArray, TypeErasedDeviceArrayView};

fn opt_view(array: Option<&TypeErasedDeviceArray>) -> Option<TypeErasedDeviceArrayView> {
    array.map(TypeErasedDeviceArray::view)
}

/// BFS / SSSP output
#[derive(Debug)]
pub struct PathsResult {
    pub(crate) vertices: TypeErasedDeviceArray,
    pub(crate) distances: TypeErasedDeviceArray,
    pub(crate) predecessors: TypeErasedDeviceArray,
}

impl PathsResult {
    /// Vertex labels
    #[must_use]
    pub fn vertices(&self) -> TypeErasedDeviceArrayView {
        self.vertices.view()
    }

    /// Hop counts (BFS, vertex type) or path lengths (SSSP, weight type);
    /// unreached vertices hold the type's maximum
    #[must_use]
    pub fn distances(&self) -> TypeErasedDeviceArrayView {
        self.distances.view()
    }

    /// Predecessor labels, `-1` for sources and unreached vertices
    #[must_use]
    pub fn predecessors(&self) -> TypeErasedDeviceArrayView {
        self.predecessors.view()
    }
}

/// Per-vertex centrality scores
#[derive(Debug)]
pub struct CentralityResult {
    pub(crate) vertices: TypeErasedDeviceArray,
    pub(crate) values: TypeErasedDeviceArray,
    pub(crate) num_iterations: usize,
    pub(crate) converged: bool,
}

impl CentralityResult {
    /// Vertex labels
    #[must_use]
    pub fn vertices(&self) -> TypeErasedDeviceArrayView {
        self.vertices.view()
    }

    /// Scores (weight type)
    #[must_use]
    pub fn values(&self) -> TypeErasedDeviceArrayView {
        self.values.view()
    }

    /// Iterations performed (0 for non-iterative algorithms)
    #[must_use]
    pub const fn num_iterations(&self) -> usize {
        self.num_iterations
    }

    /// `false` only for the `_allow_nonconvergence` variants
    #[must_use]
    pub const fn converged(&self) -> bool {
        self.converged
    }
}

/// HITS hubs and authorities
#[derive(Debug)]
pub struct HitsResult {
    pub(crate) vertices: TypeErasedDeviceArray,
    pub(crate) hubs: TypeErasedDeviceArray,
    pub(crate) authorities: TypeErasedDeviceArray,
    pub(crate) hub_score_difference: f64,
    pub(crate) number_of_iterations: usize,
}

impl HitsResult {
    /// Vertex labels
    #[must_use]
    pub fn vertices(&self) -> TypeErasedDeviceArrayView {
        self.vertices.view()
    }

    /// Hub scores
    #[must_use]
    pub fn hubs(&self) -> TypeErasedDeviceArrayView {
        self.hubs.view()
    }

    /// Authority scores
    #[must_use]
    pub fn authorities(&self) -> TypeErasedDeviceArrayView {
        self.authorities.view()
    }

    /// L1 change of the hub vector in the last iteration
    #[must_use]
    pub const fn hub_score_difference(&self) -> f64 {
        self.hub_score_difference
    }

    /// Iterations performed
    #[must_use]
    pub const fn number_of_iterations(&self) -> usize {
        self.number_of_iterations
    }
}

/// Louvain / ECG assignment with modularity
#[derive(Debug)]
pub struct HierarchicalClusteringResult {
    pub(crate) vertices: TypeErasedDeviceArray,
    pub(crate) clusters: TypeErasedDeviceArray,
    pub(crate) modularity: f64,
}

impl HierarchicalClusteringResult {
    /// Vertex labels
    #[must_use]
    pub fn vertices(&self) -> TypeErasedDeviceArrayView {
        self.vertices.view()
    }

    /// Cluster id per vertex (`INT32`)
    #[must_use]
    pub fn clusters(&self) -> TypeErasedDeviceArrayView {
        self.clusters.view()
    }

    /// Modularity of the final assignment
    #[must_use]
    pub const fn modularity(&self) -> f64 {
        self.modularity
    }
}

/// Spectral clustering assignment
#[derive(Debug)]
pub struct ClusteringResult {
    pub(crate) vertices: TypeErasedDeviceArray,
    pub(crate) clusters: TypeErasedDeviceArray,
}

impl ClusteringResult {
    /// Vertex labels
    #[must_use]
    pub fn vertices(&self) -> TypeErasedDeviceArrayView {
        self.vertices.view()
    }

    /// Cluster id per vertex (`INT32`)
    #[must_use]
    pub fn clusters(&self) -> TypeErasedDeviceArrayView {
        self.clusters.view()
    }
}

/// Triangles through each vertex
#[derive(Debug)]
pub struct TriangleCountResult {
    pub(crate) vertices: TypeErasedDeviceArray,
    pub(crate) counts: TypeErasedDeviceArray,
}

impl TriangleCountResult {
    /// Vertex labels
    #[must_use]
    pub fn vertices(&self) -> TypeErasedDeviceArrayView {
        self.vertices.view()
    }

    /// Triangle counts (`INT64`)
    #[must_use]
    pub fn counts(&self) -> TypeErasedDeviceArrayView {
        self.counts.view()
    }
}

/// Core number per vertex
#[derive(Debug)]
pub struct CoreResult {
    pub(crate) vertices: TypeErasedDeviceArray,
    pub(crate) core_numbers: TypeErasedDeviceArray,
}

impl CoreResult {
    /// Vertex labels
    #[must_use]
    pub fn vertices(&self) -> TypeErasedDeviceArrayView {
        self.vertices.view()
    }

    /// Core numbers (vertex type)
    #[must_use]
    pub fn core_numbers(&self) -> TypeErasedDeviceArrayView {
        self.core_numbers.view()
    }
}

/// Edge list of a k-core or k-truss
#[derive(Debug)]
pub struct KCoreResult {
    pub(crate) sources: TypeErasedDeviceArray,
    pub(crate) destinations: TypeErasedDeviceArray,
    pub(crate) weights: Option<TypeErasedDeviceArray>,
}

impl KCoreResult {
    /// Edge sources
    #[must_use]
    pub fn sources(&self) -> TypeErasedDeviceArrayView {
        self.sources.view()
    }

    /// Edge destinations
    #[must_use]
    pub fn destinations(&self) -> TypeErasedDeviceArrayView {
        self.destinations.view()
    }

    /// Edge weights of weighted graphs
    #[must_use]
    pub fn weights(&self) -> Option<TypeErasedDeviceArrayView> {
        opt_view(self.weights.as_ref())
    }
}

/// Component label per vertex
#[derive(Debug)]
pub struct LabelingResult {
    pub(crate) vertices: TypeErasedDeviceArray,
    pub(crate) labels: TypeErasedDeviceArray,
}

impl LabelingResult {
    /// Vertex labels
    #[must_use]
    pub fn vertices(&self) -> TypeErasedDeviceArrayView {
        self.vertices.view()
    }

    /// Component labels (vertex type)
    #[must_use]
    pub fn labels(&self) -> TypeErasedDeviceArrayView {
        self.labels.view()
    }
}

/// Parallel arrays of vertex pairs
#[derive(Debug)]
pub struct VertexPairsResult {
    pub(crate) first: TypeErasedDeviceArray,
    pub(crate) second: TypeErasedDeviceArray,
}

impl VertexPairsResult {
    /// First vertex of every pair
    #[must_use]
    pub fn first(&self) -> TypeErasedDeviceArrayView {
        self.first.view()
    }

    /// Second vertex of every pair
    #[must_use]
    pub fn second(&self) -> TypeErasedDeviceArrayView {
        self.second.view()
    }

    /// Number of pairs
    #[must_use]
    pub const fn len(&self) -> usize {
        self.first.size()
    }

    /// `true` without pairs
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Similarity coefficient per vertex pair
#[derive(Debug)]
pub struct SimilarityResult {
    pub(crate) pairs: VertexPairsResult,
    pub(crate) coefficients: TypeErasedDeviceArray,
}

impl SimilarityResult {
    /// Scored pairs (the input pairs, or the selected pairs of all-pairs calls)
    #[must_use]
    pub const fn vertex_pairs(&self) -> &VertexPairsResult {
        &self.pairs
    }

    /// Coefficient per pair (weight type)
    #[must_use]
    pub fn coefficients(&self) -> TypeErasedDeviceArrayView {
        self.coefficients.view()
    }
}

/// Edges of one or more extracted subgraphs
#[derive(Debug)]
pub struct InducedSubgraphResult {
    pub(crate) sources: TypeErasedDeviceArray,
    pub(crate) destinations: TypeErasedDeviceArray,
    pub(crate) weights: Option<TypeErasedDeviceArray>,
    pub(crate) edge_ids: Option<TypeErasedDeviceArray>,
    pub(crate) edge_types: Option<TypeErasedDeviceArray>,
    pub(crate) subgraph_offsets: TypeErasedDeviceArray,
}

impl InducedSubgraphResult {
    /// Edge sources
    #[must_use]
    pub fn sources(&self) -> TypeErasedDeviceArrayView {
        self.sources.view()
    }

    /// Edge destinations
    #[must_use]
    pub fn destinations(&self) -> TypeErasedDeviceArrayView {
        self.destinations.view()
    }

    /// Edge weights of weighted graphs
    #[must_use]
    pub fn weights(&self) -> Option<TypeErasedDeviceArrayView> {
        opt_view(self.weights.as_ref())
    }

    /// Edge ids, if the graph carries them
    #[must_use]
    pub fn edge_ids(&self) -> Option<TypeErasedDeviceArrayView> {
        opt_view(self.edge_ids.as_ref())
    }

    /// Edge types, if the graph carries them
    #[must_use]
    pub fn edge_types(&self) -> Option<TypeErasedDeviceArrayView> {
        opt_view(self.edge_types.as_ref())
    }

    /// Edge range of subgraph `i` is `offsets[i]..offsets[i + 1]` (`SIZE_T`)
    #[must_use]
    pub fn subgraph_offsets(&self) -> TypeErasedDeviceArrayView {
        self.subgraph_offsets.view()
    }
}

/// Random walk paths
#[derive(Debug)]
pub struct RandomWalkResult {
    pub(crate) paths: TypeErasedDeviceArray,
    pub(crate) weights: TypeErasedDeviceArray,
    pub(crate) max_path_length: usize,
}

impl RandomWalkResult {
    /// `max_path_length + 1` vertices per start, `-1` after a walk got stuck
    #[must_use]
    pub fn paths(&self) -> TypeErasedDeviceArrayView {
        self.paths.view()
    }

    /// `max_path_length` edge weights per start, `0` after a walk got stuck
    #[must_use]
    pub fn weights(&self) -> TypeErasedDeviceArrayView {
        self.weights.view()
    }

    /// Steps per walk
    #[must_use]
    pub const fn max_path_length(&self) -> usize {
        self.max_path_length
    }
}

/// Sampled edges in COO or compressed layout
///
/// COO: `majors`/`minors` are sources/destinations, edges are ordered by
/// seed label then hop, and `label_hop_offsets` (present with labels or
/// hops) marks every `(label, hop)` group of edges.
///
/// Compressed layouts always renumber. Edges are grouped per label (or per
/// `(label, hop)` with `compress_per_hop`); CSC/DCSC use destinations as the
/// major axis. CSR/CSC have one row per renumbered vertex of the label and no
/// `majors`; DCSR/DCSC keep only the distinct majors, listed in `majors`.
/// Row `r` spans `minors[major_offsets[r]..major_offsets[r + 1]]` and
/// `label_hop_offsets` marks the first row of every group.
#[derive(Debug)]
pub struct SampleResult {
    pub(crate) majors: Option<TypeErasedDeviceArray>,
    pub(crate) minors: TypeErasedDeviceArray,
    pub(crate) major_offsets: Option<TypeErasedDeviceArray>,
    pub(crate) weights: Option<TypeErasedDeviceArray>,
    pub(crate) edge_ids: Option<TypeErasedDeviceArray>,
    pub(crate) edge_types: Option<TypeErasedDeviceArray>,
    pub(crate) hops: Option<TypeErasedDeviceArray>,
    pub(crate) labels: Option<TypeErasedDeviceArray>,
    pub(crate) label_hop_offsets: Option<TypeErasedDeviceArray>,
    pub(crate) renumber_map: Option<TypeErasedDeviceArray>,
    pub(crate) renumber_map_offsets: Option<TypeErasedDeviceArray>,
}

impl SampleResult {
    /// Sources (COO), distinct majors (DCSR/DCSC), absent for CSR/CSC
    #[must_use]
    pub fn majors(&self) -> Option<TypeErasedDeviceArrayView> {
        opt_view(self.majors.as_ref())
    }

    /// Destinations (COO) or minor ids of every row
    #[must_use]
    pub fn minors(&self) -> TypeErasedDeviceArrayView {
        self.minors.view()
    }

    /// Row offsets of compressed layouts (`SIZE_T`)
    #[must_use]
    pub fn major_offsets(&self) -> Option<TypeErasedDeviceArrayView> {
        opt_view(self.major_offsets.as_ref())
    }

    /// Edge weights of weighted graphs
    #[must_use]
    pub fn weights(&self) -> Option<TypeErasedDeviceArrayView> {
        opt_view(self.weights.as_ref())
    }

    /// Edge ids, if the graph carries them
    #[must_use]
    pub fn edge_ids(&self) -> Option<TypeErasedDeviceArrayView> {
        opt_view(self.edge_ids.as_ref())
    }

    /// Edge types, if the graph carries them
    #[must_use]
    pub fn edge_types(&self) -> Option<TypeErasedDeviceArrayView> {
        opt_view(self.edge_types.as_ref())
    }

    /// Hop per edge (COO with `return_hops`, `INT32`)
    #[must_use]
    pub fn hops(&self) -> Option<TypeErasedDeviceArrayView> {
        opt_view(self.hops.as_ref())
    }

    /// Seed label per edge (COO with labeled seeds, `INT32`)
    #[must_use]
    pub fn labels(&self) -> Option<TypeErasedDeviceArrayView> {
        opt_view(self.labels.as_ref())
    }

    /// Start of every `(label, hop)` group (`SIZE_T`)
    #[must_use]
    pub fn label_hop_offsets(&self) -> Option<TypeErasedDeviceArrayView> {
        opt_view(self.label_hop_offsets.as_ref())
    }

    /// Original label of every renumbered id, per seed label
    #[must_use]
    pub fn renumber_map(&self) -> Option<TypeErasedDeviceArrayView> {
        opt_view(self.renumber_map.as_ref())
    }

    /// Start of every seed label's slice of the renumber map (`SIZE_T`)
    #[must_use]
    pub fn renumber_map_offsets(&self) -> Option<TypeErasedDeviceArrayView> {
        opt_view(self.renumber_map_offsets.as_ref())
    }
}

/// Generated edge list
#[derive(Debug)]
pub struct CooResult {
    pub(crate) sources: TypeErasedDeviceArray,
    pub(crate) destinations: TypeErasedDeviceArray,
    pub(crate) weights: Option<TypeErasedDeviceArray>,
    pub(crate) edge_ids: Option<TypeErasedDeviceArray>,
    pub(crate) edge_types: Option<TypeErasedDeviceArray>,
}

impl CooResult {
    /// Edge sources
    #[must_use]
    pub fn sources(&self) -> TypeErasedDeviceArrayView {
        self.sources.view()
    }

    /// Edge destinations
    #[must_use]
    pub fn destinations(&self) -> TypeErasedDeviceArrayView {
        self.destinations.view()
    }

    /// Weights, once generated
    #[must_use]
    pub fn weights(&self) -> Option<TypeErasedDeviceArrayView> {
        opt_view(self.weights.as_ref())
    }

    /// Edge ids, once generated
    #[must_use]
    pub fn edge_ids(&self) -> Option<TypeErasedDeviceArrayView> {
        opt_view(self.edge_ids.as_ref())
    }

    /// Edge types, once generated
    #[must_use]
    pub fn edge_types(&self) -> Option<TypeErasedDeviceArrayView> {
        opt_view(self.edge_types.as_ref())
    }

    /// Number of edges
    #[must_use]
    pub const fn len(&self) -> usize {
        self.sources.size()
    }

    /// `true` without edges
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Several generated edge lists
#[derive(Debug)]
pub struct CooListResult {
    pub(crate) coos: Vec<CooResult>,
}

impl CooListResult {
    /// Number of edge lists
    #[must_use]
    pub fn size(&self) -> usize {
        self.coos.len()
    }

    /// Edge list `i`
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&CooResult> {
        self.coos.get(i)
    }

    /// All edge lists
    pub fn iter(&self) -> impl Iterator<Item = &CooResult> {
        self.coos.iter()
    }
}

/// In and out degrees
#[derive(Debug)]
pub struct DegreesResult {
    pub(crate) vertices: TypeErasedDeviceArray,
    pub(crate) in_degrees: Option<TypeErasedDeviceArray>,
    pub(crate) out_degrees: Option<TypeErasedDeviceArray>,
}

impl DegreesResult {
    /// Vertex labels
    #[must_use]
    pub fn vertices(&self) -> TypeErasedDeviceArrayView {
        self.vertices.view()
    }

    /// In-degrees in the vertex type, absent for `out_degrees` calls
    #[must_use]
    pub fn in_degrees(&self) -> Option<TypeErasedDeviceArrayView> {
        opt_view(self.in_degrees.as_ref())
    }

    /// Out-degrees in the vertex type, absent for `in_degrees` calls
    #[must_use]
    pub fn out_degrees(&self) -> Option<TypeErasedDeviceArrayView> {
        opt_view(self.out_degrees.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceHandle;
    use crate::StatusCode;

    #[test]
    fn test_copied_values_survive_result_drop() {
        let handle = ResourceHandle::new();
        let result = LabelingResult {
            vertices: TypeErasedDeviceArray::from_slice(&handle, &[0_i32, 1, 2]).unwrap(),
            labels: TypeErasedDeviceArray::from_slice(&handle, &[0_i32, 0, 2]).unwrap(),
        };
        let view = result.labels();
        let mut host = [0_i32; 3];
        view.copy_to_slice(&handle, &mut host).unwrap();
        drop(result);

        assert_eq!(host, [0, 0, 2]);
        assert_eq!(view.to_vec::<i32>().unwrap_err().code(), StatusCode::InvalidHandle);
        assert_eq!(handle.live_arrays(), 0);
    }
}
