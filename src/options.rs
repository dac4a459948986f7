//! Option records read by the algorithm entry points
//!
//! Options are plain values: created with `Default`, adjusted through fields
//! or setters, passed by reference and dropped independently of any call
//! that read them. Every record validates itself before a kernel runs.

use crate::error::{Error, Result};

fn check_epsilon(epsilon: f64) -> Result<()> {
    if epsilon.is_finite() && epsilon >= 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_value(format!("epsilon must be finite and >= 0, got {epsilon}")))
    }
}

fn check_max_iterations(max_iterations: usize) -> Result<()> {
    if max_iterations == 0 {
        return Err(Error::invalid_value("max_iterations must be at least 1"));
    }
    Ok(())
}

/// Breadth-first search options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BfsOptions {
    /// Stop expanding after this many levels
    pub depth_limit: usize,
    /// Report predecessors (all `-1` otherwise)
    pub compute_predecessors: bool,
    /// Switch to bottom-up steps on large frontiers (symmetric graphs only)
    pub direction_optimizing: bool,
}

impl Default for BfsOptions {
    fn default() -> Self {
        Self {
            depth_limit: usize::MAX,
            compute_predecessors: true,
            direction_optimizing: false,
        }
    }
}

/// Single-source shortest path options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SsspOptions {
    /// Paths longer than this are not expanded
    pub cutoff: f64,
    /// Report predecessors (all `-1` otherwise)
    pub compute_predecessors: bool,
}

impl Default for SsspOptions {
    fn default() -> Self {
        Self {
            cutoff: f64::MAX,
            compute_predecessors: true,
        }
    }
}

impl SsspOptions {
    /// # Errors
    ///
    /// `InvalidValue` for a negative or NaN cutoff
    pub fn validate(&self) -> Result<()> {
        if self.cutoff.is_nan() || self.cutoff < 0.0 {
            return Err(Error::invalid_value(format!("cutoff must be >= 0, got {}", self.cutoff)));
        }
        Ok(())
    }
}

/// `PageRank` and personalized `PageRank` options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRankOptions {
    /// Damping factor
    pub alpha: f64,
    /// L1 convergence threshold between iterates
    pub epsilon: f64,
    /// Iteration cap
    pub max_iterations: usize,
}

impl Default for PageRankOptions {
    fn default() -> Self {
        Self {
            alpha: 0.85,
            epsilon: 1.0e-6,
            max_iterations: 500,
        }
    }
}

impl PageRankOptions {
    /// # Errors
    ///
    /// `InvalidValue` when `alpha` is outside `(0, 1)`, `epsilon` is negative
    /// or `max_iterations` is zero
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(Error::invalid_value(format!("alpha must be in (0, 1), got {}", self.alpha)));
        }
        check_epsilon(self.epsilon)?;
        check_max_iterations(self.max_iterations)
    }
}

/// Katz centrality options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KatzOptions {
    /// Attenuation factor
    pub alpha: f64,
    /// Constant bias when no per-vertex betas are supplied
    pub beta: f64,
    /// L1 convergence threshold
    pub epsilon: f64,
    /// Iteration cap
    pub max_iterations: usize,
    /// Scale the result to unit L2 norm
    pub normalize: bool,
}

impl Default for KatzOptions {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            beta: 1.0,
            epsilon: 1.0e-6,
            max_iterations: 500,
            normalize: false,
        }
    }
}

impl KatzOptions {
    /// # Errors
    ///
    /// `InvalidValue` for a non-positive `alpha`, a negative `epsilon` or a
    /// zero iteration cap
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha.is_finite()) {
            return Err(Error::invalid_value(format!("alpha must be > 0, got {}", self.alpha)));
        }
        check_epsilon(self.epsilon)?;
        check_max_iterations(self.max_iterations)
    }
}

/// Eigenvector centrality options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EigenvectorOptions {
    /// Convergence threshold, scaled by the number of vertices
    pub epsilon: f64,
    /// Iteration cap
    pub max_iterations: usize,
}

impl Default for EigenvectorOptions {
    fn default() -> Self {
        Self {
            epsilon: 1.0e-6,
            max_iterations: 500,
        }
    }
}

impl EigenvectorOptions {
    /// # Errors
    ///
    /// `InvalidValue` for a negative `epsilon` or a zero iteration cap
    pub fn validate(&self) -> Result<()> {
        check_epsilon(self.epsilon)?;
        check_max_iterations(self.max_iterations)
    }
}

/// HITS options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitsOptions {
    /// Convergence threshold on the hub score difference
    pub epsilon: f64,
    /// Iteration cap
    pub max_iterations: usize,
    /// Scale hubs and authorities to sum to 1
    pub normalize: bool,
}

impl Default for HitsOptions {
    fn default() -> Self {
        Self {
            epsilon: 1.0e-6,
            max_iterations: 500,
            normalize: true,
        }
    }
}

impl HitsOptions {
    /// # Errors
    ///
    /// `InvalidValue` for a negative `epsilon` or a zero iteration cap
    pub fn validate(&self) -> Result<()> {
        check_epsilon(self.epsilon)?;
        check_max_iterations(self.max_iterations)
    }
}

/// Betweenness centrality options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BetweennessOptions {
    /// Divide by the number of ordered vertex pairs
    pub normalized: bool,
    /// Count path endpoints as passed through
    pub include_endpoints: bool,
}

impl Default for BetweennessOptions {
    fn default() -> Self {
        Self {
            normalized: true,
            include_endpoints: false,
        }
    }
}

/// Louvain options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LouvainOptions {
    /// Maximum number of aggregation levels
    pub max_level: usize,
    /// Minimum modularity gain that keeps a level going
    pub threshold: f64,
    /// Resolution parameter (1.0 is standard modularity)
    pub resolution: f64,
}

impl Default for LouvainOptions {
    fn default() -> Self {
        Self {
            max_level: 100,
            threshold: 1.0e-7,
            resolution: 1.0,
        }
    }
}

impl LouvainOptions {
    /// # Errors
    ///
    /// `InvalidValue` for a zero `max_level`, a negative threshold or a
    /// non-positive resolution
    pub fn validate(&self) -> Result<()> {
        if self.max_level == 0 {
            return Err(Error::invalid_value("max_level must be at least 1"));
        }
        check_epsilon(self.threshold)?;
        if !(self.resolution > 0.0 && self.resolution.is_finite()) {
            return Err(Error::invalid_value(format!(
                "resolution must be > 0, got {}",
                self.resolution
            )));
        }
        Ok(())
    }
}

/// Ensemble clustering (ECG) options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcgOptions {
    /// Weight floor for edges never co-clustered
    pub min_weight: f64,
    /// Number of single-level Louvain runs in the ensemble
    pub ensemble_size: usize,
    /// Options of the final Louvain run
    pub louvain: LouvainOptions,
}

impl Default for EcgOptions {
    fn default() -> Self {
        Self {
            min_weight: 0.05,
            ensemble_size: 16,
            louvain: LouvainOptions::default(),
        }
    }
}

impl EcgOptions {
    /// # Errors
    ///
    /// `InvalidValue` when `min_weight` is outside `[0, 1)` or the ensemble
    /// is empty
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.min_weight) {
            return Err(Error::invalid_value(format!(
                "min_weight must be in [0, 1), got {}",
                self.min_weight
            )));
        }
        if self.ensemble_size == 0 {
            return Err(Error::invalid_value("ensemble_size must be at least 1"));
        }
        self.louvain.validate()
    }
}

/// Spectral clustering options (modularity maximization and balanced cut)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralOptions {
    /// Number of clusters
    pub n_clusters: usize,
    /// Number of eigenvectors used as embedding
    pub n_eigenvectors: usize,
    /// Eigen solver tolerance
    pub evs_tolerance: f64,
    /// Eigen solver iteration cap
    pub evs_max_iterations: usize,
    /// k-means tolerance
    pub k_means_tolerance: f64,
    /// k-means iteration cap
    pub k_means_max_iterations: usize,
}

impl Default for SpectralOptions {
    fn default() -> Self {
        Self {
            n_clusters: 2,
            n_eigenvectors: 2,
            evs_tolerance: 1.0e-5,
            evs_max_iterations: 100,
            k_means_tolerance: 1.0e-5,
            k_means_max_iterations: 100,
        }
    }
}

impl SpectralOptions {
    /// # Errors
    ///
    /// `InvalidValue` for zero clusters, more eigenvectors than clusters,
    /// negative tolerances or zero iteration caps
    pub fn validate(&self) -> Result<()> {
        if self.n_clusters == 0 || self.n_eigenvectors == 0 {
            return Err(Error::invalid_value("n_clusters and n_eigenvectors must be at least 1"));
        }
        if self.n_eigenvectors > self.n_clusters {
            return Err(Error::invalid_value(format!(
                "n_eigenvectors ({}) must not exceed n_clusters ({})",
                self.n_eigenvectors, self.n_clusters
            )));
        }
        check_epsilon(self.evs_tolerance)?;
        check_epsilon(self.k_means_tolerance)?;
        check_max_iterations(self.evs_max_iterations)?;
        check_max_iterations(self.k_means_max_iterations)
    }
}

/// Random walk options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomWalkOptions {
    /// Number of steps per walk
    pub max_length: usize,
    /// node2vec return parameter
    pub p: f64,
    /// node2vec in-out parameter
    pub q: f64,
}

impl Default for RandomWalkOptions {
    fn default() -> Self {
        Self {
            max_length: 10,
            p: 1.0,
            q: 1.0,
        }
    }
}

impl RandomWalkOptions {
    /// # Errors
    ///
    /// `InvalidValue` for a zero walk length or non-positive `p` / `q`
    pub fn validate(&self) -> Result<()> {
        if self.max_length == 0 {
            return Err(Error::invalid_value("max_length must be at least 1"));
        }
        if !(self.p > 0.0 && self.q > 0.0) {
            return Err(Error::invalid_value("p and q must be > 0"));
        }
        Ok(())
    }
}

/// Policy for vertices that were already sources in an earlier hop
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PriorSourcesBehavior {
    /// Next frontier is exactly the newly sampled destinations
    #[default]
    Default = 0,
    /// Earlier sources stay in every later frontier
    CarryOver = 1,
    /// Earlier sources never become sources again
    Exclude = 2,
}

/// Output layout of sampled edges
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompressionType {
    /// Parallel major / minor arrays
    #[default]
    Coo = 0,
    /// Offsets over every renumbered source
    Csr = 1,
    /// Offsets over every renumbered destination
    Csc = 2,
    /// Offsets over the distinct sources only
    Dcsr = 3,
    /// Offsets over the distinct destinations only
    Dcsc = 4,
}

impl CompressionType {
    /// `true` for the COO layout
    #[must_use]
    pub const fn is_coo(self) -> bool {
        matches!(self, Self::Coo)
    }

    /// `true` when destinations are the major axis
    #[must_use]
    pub const fn is_column_major(self) -> bool {
        matches!(self, Self::Csc | Self::Dcsc)
    }

    /// `true` for the doubly compressed layouts
    #[must_use]
    pub const fn is_doubly_compressed(self) -> bool {
        matches!(self, Self::Dcsr | Self::Dcsc)
    }
}

/// Neighbor sampling options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SamplingOptions {
    with_replacement: bool,
    return_hops: bool,
    prior_sources_behavior: PriorSourcesBehavior,
    dedupe_sources: bool,
    renumber_results: bool,
    compression_type: CompressionType,
    compress_per_hop: bool,
}

impl SamplingOptions {
    /// Defaults: without replacement, no hops, COO, no renumbering
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample with replacement
    pub fn set_with_replacement(&mut self, value: bool) {
        self.with_replacement = value;
    }

    /// Report the hop of every sampled edge
    pub fn set_return_hops(&mut self, value: bool) {
        self.return_hops = value;
    }

    /// Policy for earlier sources
    pub fn set_prior_sources_behavior(&mut self, value: PriorSourcesBehavior) {
        self.prior_sources_behavior = value;
    }

    /// Deduplicate each frontier
    pub fn set_dedupe_sources(&mut self, value: bool) {
        self.dedupe_sources = value;
    }

    /// Renumber sampled vertices per label
    pub fn set_renumber_results(&mut self, value: bool) {
        self.renumber_results = value;
    }

    /// Output layout
    pub fn set_compression_type(&mut self, value: CompressionType) {
        self.compression_type = value;
    }

    /// Compress every hop separately
    pub fn set_compress_per_hop(&mut self, value: bool) {
        self.compress_per_hop = value;
    }

    /// Sample with replacement
    #[must_use]
    pub const fn with_replacement(&self) -> bool {
        self.with_replacement
    }

    /// Report hops
    #[must_use]
    pub const fn return_hops(&self) -> bool {
        self.return_hops
    }

    /// Policy for earlier sources
    #[must_use]
    pub const fn prior_sources_behavior(&self) -> PriorSourcesBehavior {
        self.prior_sources_behavior
    }

    /// Deduplicate frontiers
    #[must_use]
    pub const fn dedupe_sources(&self) -> bool {
        self.dedupe_sources
    }

    /// Renumber results
    #[must_use]
    pub const fn renumber_results(&self) -> bool {
        self.renumber_results
    }

    /// Output layout
    #[must_use]
    pub const fn compression_type(&self) -> CompressionType {
        self.compression_type
    }

    /// Compress per hop
    #[must_use]
    pub const fn compress_per_hop(&self) -> bool {
        self.compress_per_hop
    }

    /// # Errors
    ///
    /// `InvalidInput` for a compressed layout without renumbering, or per-hop
    /// compression with the COO layout
    pub fn validate(&self) -> Result<()> {
        if !self.compression_type.is_coo() && !self.renumber_results {
            return Err(Error::invalid_input(
                "compressed sample layouts require renumber_results",
            ));
        }
        if self.compress_per_hop && self.compression_type.is_coo() {
            return Err(Error::invalid_input("compress_per_hop requires a compressed layout"));
        }
        Ok(())
    }
}

/// Vertex count distribution across generated edge lists
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GeneratorDistribution {
    /// Skewed towards small values
    #[default]
    PowerLaw = 0,
    /// Uniform over the range
    Uniform = 1,
}

/// R-MAT generator options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RmatOptions {
    /// Generate `2^scale` vertices
    pub scale: u32,
    /// Number of edges to generate
    pub num_edges: usize,
    /// Probability of the top-left quadrant
    pub a: f64,
    /// Probability of the top-right quadrant
    pub b: f64,
    /// Probability of the bottom-left quadrant
    pub c: f64,
    /// Keep edges in the lower triangle only (flipping the others)
    pub clip_and_flip: bool,
    /// Permute vertex ids
    pub scramble_vertex_ids: bool,
}

impl Default for RmatOptions {
    fn default() -> Self {
        Self {
            scale: 10,
            num_edges: 16 << 10,
            a: 0.57,
            b: 0.19,
            c: 0.19,
            clip_and_flip: false,
            scramble_vertex_ids: false,
        }
    }
}

impl RmatOptions {
    /// # Errors
    ///
    /// `InvalidValue` for a scale above 62, negative probabilities or
    /// probabilities summing above 1
    pub fn validate(&self) -> Result<()> {
        if self.scale > 62 {
            return Err(Error::invalid_value(format!("scale {} exceeds 62", self.scale)));
        }
        let (a, b, c) = (self.a, self.b, self.c);
        if a < 0.0 || b < 0.0 || c < 0.0 || a + b + c > 1.0 {
            return Err(Error::invalid_value(format!(
                "quadrant probabilities a={a} b={b} c={c} must be >= 0 and sum to at most 1"
            )));
        }
        Ok(())
    }
}

/// Options for generating several R-MAT edge lists at once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RmatListOptions {
    /// Number of edge lists
    pub n_edgelists: usize,
    /// Smallest scale
    pub min_scale: u32,
    /// Largest scale
    pub max_scale: u32,
    /// Edges per vertex
    pub edge_factor: usize,
    /// How scales are drawn from `min_scale..=max_scale`
    pub size_distribution: GeneratorDistribution,
    /// Skewed quadrants (`PowerLaw`) or all quadrants equally likely
    pub edge_distribution: GeneratorDistribution,
    /// Keep edges in the lower triangle only
    pub clip_and_flip: bool,
    /// Permute vertex ids
    pub scramble_vertex_ids: bool,
}

impl Default for RmatListOptions {
    fn default() -> Self {
        Self {
            n_edgelists: 1,
            min_scale: 4,
            max_scale: 10,
            edge_factor: 16,
            size_distribution: GeneratorDistribution::PowerLaw,
            edge_distribution: GeneratorDistribution::PowerLaw,
            clip_and_flip: false,
            scramble_vertex_ids: false,
        }
    }
}

impl RmatListOptions {
    /// # Errors
    ///
    /// `InvalidValue` for an empty or inverted scale range, or a maximum scale above 62
    pub fn validate(&self) -> Result<()> {
        if self.min_scale > self.max_scale {
            return Err(Error::invalid_value(format!(
                "min_scale {} above max_scale {}",
                self.min_scale, self.max_scale
            )));
        }
        if self.max_scale > 62 {
            return Err(Error::invalid_value(format!("scale {} exceeds 62", self.max_scale)));
        }
        Ok(())
    }

    /// Options of one list at `scale`
    #[must_use]
    pub fn list_options(&self, scale: u32) -> RmatOptions {
        let (a, b, c) = match self.edge_distribution {
            GeneratorDistribution::PowerLaw => (0.57, 0.19, 0.19),
            GeneratorDistribution::Uniform => (0.25, 0.25, 0.25),
        };
        RmatOptions {
            scale,
            num_edges: self.edge_factor << scale,
            a,
            b,
            c,
            clip_and_flip: self.clip_and_flip,
            scramble_vertex_ids: self.scramble_vertex_ids,
        }
    }
}
