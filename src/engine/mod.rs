//! Numeric kernels behind capability traits
//!
//! Every algorithm family is one trait; an engine is a type implementing the
//! traits it supports. Kernels see dense internal ids (`u32`) over a
//! [`CsrGraph`] and return plain vectors; label translation, partition
//! filtering and result packaging happen in [`crate::algorithms`].
//!
//! The engine is chosen at compile time through [`DefaultEngine`]. The crate
//! ships the host engine only.
//!
//! Traversal and `PageRank` follow Ligra-style level-synchronous frontiers
//! (Shun & Blelloch, `PPoPP` 2013) and power iteration (Page et al., 1999).

mod centrality;
mod community;
mod components;
mod cores;
mod generators;
mod sampling;
mod similarity;
mod traversal;

use crate::error::Result;
use crate::options::{
    BetweennessOptions, EcgOptions, EigenvectorOptions, HitsOptions, KatzOptions, LouvainOptions,
    PageRankOptions, RmatOptions, SamplingOptions, SpectralOptions,
};
use crate::storage::CsrGraph;
use crate::types::DegreeType;
use rand::Rng;

/// Reference engine running every kernel on the host
#[derive(Debug, Clone, Copy, Default)]
pub struct HostEngine;

/// Engine used by the dispatch layer
pub type DefaultEngine = HostEngine;

/// Level-synchronous traversal output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BfsOutput {
    /// Hop count per vertex, `None` when unreached
    pub distances: Vec<Option<u32>>,
    /// Predecessor per vertex, `None` for sources and unreached vertices
    pub predecessors: Vec<Option<u32>>,
}

/// Weighted shortest path output
#[derive(Debug, Clone, PartialEq)]
pub struct SsspOutput {
    /// Distance per vertex, `None` when unreached or beyond the cutoff
    pub distances: Vec<Option<f64>>,
    /// Predecessor per vertex
    pub predecessors: Vec<Option<u32>>,
}

/// Output of an iterative solver
#[derive(Debug, Clone, PartialEq)]
pub struct IterativeOutput {
    /// Value per vertex
    pub values: Vec<f64>,
    /// Iterations performed
    pub iterations: usize,
    /// `true` when the threshold was met within the iteration cap
    pub converged: bool,
}

/// HITS output
#[derive(Debug, Clone, PartialEq)]
pub struct HitsOutput {
    /// Hub score per vertex
    pub hubs: Vec<f64>,
    /// Authority score per vertex
    pub authorities: Vec<f64>,
    /// L1 difference of the hub vectors of the last two iterations
    pub hub_score_difference: f64,
    /// Iterations performed
    pub iterations: usize,
    /// `true` when the threshold was met within the iteration cap
    pub converged: bool,
}

/// Dense `PageRank` inputs, indexed by internal id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRankInputs {
    /// Teleport distribution (uniform when `None`)
    pub personalization: Option<Vec<f64>>,
    /// Starting vector (uniform when `None`)
    pub initial_guess: Option<Vec<f64>>,
    /// Out-weight sums overriding the ones computed from the graph
    pub out_weight_sums: Option<Vec<f64>>,
}

/// Community assignment with its modularity
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringOutput {
    /// Dense cluster id per vertex (`0..num_clusters`)
    pub clusters: Vec<u32>,
    /// Modularity of the assignment
    pub modularity: f64,
}

/// Coefficient definition of the neighborhood similarity kernels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimilarityMetric {
    /// `|A ∩ B| / |A ∪ B|`
    Jaccard,
    /// `2 |A ∩ B| / (|A| + |B|)`
    Sorensen,
    /// `|A ∩ B| / min(|A|, |B|)`
    Overlap,
}

/// Random walk output, `max_length + 1` vertices per start
#[derive(Debug, Clone, PartialEq)]
pub struct WalkOutput {
    /// Visited vertices, `None` once a walk is stuck
    pub paths: Vec<Option<u32>>,
    /// Traversed edge weights, `0.0` once a walk is stuck
    pub weights: Vec<f64>,
}

/// One sampled edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampledEdge {
    /// Source vertex
    pub src: u32,
    /// Destination vertex
    pub dst: u32,
    /// Input edge index (weights, ids and types are looked up through it)
    pub edge: usize,
    /// Hop at which the edge was sampled
    pub hop: usize,
    /// Label of the seed the edge descends from
    pub label: i32,
}

/// Breadth-first search and shortest paths
pub trait TraversalEngine {
    /// Multi-source BFS following out edges, at most `depth_limit` levels
    fn bfs(graph: &CsrGraph, sources: &[u32], depth_limit: usize, direction_optimizing: bool) -> BfsOutput;

    /// Single-source shortest paths over non-negative weights
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the graph carries a negative weight
    fn sssp(graph: &CsrGraph, source: u32, cutoff: f64) -> Result<SsspOutput>;
}

/// Vertex importance scores
pub trait CentralityEngine {
    /// Power iteration `PageRank`
    fn pagerank(graph: &CsrGraph, options: &PageRankOptions, inputs: &PageRankInputs) -> IterativeOutput;

    /// Katz centrality with per-vertex `betas`
    fn katz(graph: &CsrGraph, options: &KatzOptions, betas: &[f64]) -> IterativeOutput;

    /// Eigenvector centrality over incoming edges
    fn eigenvector(graph: &CsrGraph, options: &EigenvectorOptions) -> IterativeOutput;

    /// Brandes betweenness from `sources` (every vertex when `None`)
    ///
    /// Unnormalized scores of symmetric graphs count each undirected path once.
    fn betweenness(
        graph: &CsrGraph,
        options: &BetweennessOptions,
        sources: Option<&[u32]>,
        symmetric: bool,
    ) -> Vec<f64>;

    /// Hubs and authorities
    fn hits(graph: &CsrGraph, options: &HitsOptions, initial_hubs: Option<&[f64]>) -> HitsOutput;
}

/// Community detection and clustering quality
pub trait CommunityEngine {
    /// Multi-level Louvain; every level's assignment is composed into the first
    fn louvain(graph: &CsrGraph, options: &LouvainOptions) -> ClusteringOutput;

    /// Ensemble clustering: Louvain over ensemble-reweighted edges
    fn ecg<R: Rng + ?Sized>(graph: &CsrGraph, options: &EcgOptions, rng: &mut R) -> ClusteringOutput;

    /// Spectral embedding of the modularity matrix followed by k-means
    fn spectral_modularity(graph: &CsrGraph, options: &SpectralOptions) -> Vec<u32>;

    /// Spectral embedding of the graph Laplacian followed by k-means
    fn balanced_cut(graph: &CsrGraph, options: &SpectralOptions) -> Vec<u32>;

    /// Modularity of `clusters`
    fn modularity(graph: &CsrGraph, clusters: &[u32]) -> f64;

    /// Total weight of edges crossing clusters
    fn edge_cut(graph: &CsrGraph, clusters: &[u32]) -> f64;

    /// Sum over clusters of cut weight divided by cluster size
    fn ratio_cut(graph: &CsrGraph, clusters: &[u32]) -> f64;

    /// Triangles through each vertex of an undirected graph
    fn triangle_count(graph: &CsrGraph) -> Vec<u64>;
}

/// Core decompositions
pub trait CoreEngine {
    /// Core number per vertex under `degree_type`
    fn core_number(graph: &CsrGraph, degree_type: DegreeType) -> Vec<u32>;

    /// Input edge indices of the `k`-truss
    fn k_truss(graph: &CsrGraph, k: usize) -> Vec<usize>;
}

/// Connectivity labelings
pub trait ComponentsEngine {
    /// Weakly connected components, labeled by their smallest id
    fn weakly_connected(graph: &CsrGraph) -> Vec<u32>;

    /// Strongly connected components, labeled by their smallest id
    fn strongly_connected(graph: &CsrGraph) -> Vec<u32>;
}

/// Neighborhood overlap
pub trait SimilarityEngine {
    /// Coefficient of every pair
    fn similarity(graph: &CsrGraph, metric: SimilarityMetric, pairs: &[(u32, u32)], use_weight: bool) -> Vec<f64>;

    /// Positive coefficients of every `u` in `vertices` against its two-hop
    /// neighborhood
    fn all_pairs_similarity(
        graph: &CsrGraph,
        metric: SimilarityMetric,
        vertices: &[u32],
        use_weight: bool,
    ) -> Vec<(u32, u32, f64)>;

    /// Pairs `(u, w)` with `w` exactly two out-hops from `u`, `w != u`
    fn two_hop_neighbors(graph: &CsrGraph, starts: &[u32]) -> Vec<(u32, u32)>;
}

/// Randomized traversal
pub trait SamplingEngine {
    /// Uniform random walks of `max_length` steps
    fn uniform_random_walks<R: Rng + ?Sized>(graph: &CsrGraph, starts: &[u32], max_length: usize, rng: &mut R) -> WalkOutput;

    /// Hop-by-hop uniform neighbor sampling from labeled seeds
    ///
    /// A negative fan-out takes every out edge of the frontier.
    fn uniform_neighbor_sample<R: Rng + ?Sized>(
        graph: &CsrGraph,
        seeds: &[(u32, i32)],
        fan_out: &[i32],
        options: &SamplingOptions,
        rng: &mut R,
    ) -> Vec<SampledEdge>;
}

/// Synthetic graph data
pub trait GeneratorEngine {
    /// R-MAT edge list over `2^scale` vertices
    fn rmat<R: Rng + ?Sized>(options: &RmatOptions, rng: &mut R) -> (Vec<i64>, Vec<i64>);

    /// `n` values uniform in `[min, max)`
    fn uniform_values<R: Rng + ?Sized>(n: usize, min: f64, max: f64, rng: &mut R) -> Vec<f64>;

    /// `n` integers uniform in `[min, max]`
    fn uniform_integers<R: Rng + ?Sized>(n: usize, min: i32, max: i32, rng: &mut R) -> Vec<i32>;
}

#[allow(clippy::cast_possible_truncation)] // ids are u32 by construction
pub(crate) fn vertex_ids(n: usize) -> impl Iterator<Item = u32> {
    (0..n).map(|v| v as u32)
}
