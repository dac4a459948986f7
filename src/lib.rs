//! trueno-graph-api: handle-based graph analytics with a flat C ABI
//!
//! # Overview
//!
//! Callers hold a [`ResourceHandle`], move data in type-erased arrays, build a
//! [`Graph`] from edge lists or CSR arrays, run algorithms, and read opaque
//! results back as views. Element types are chosen at runtime through
//! [`DataType`]; the dispatch layer rejects unsupported combinations instead
//! of instantiating every one.
//!
//! Every operation is also exported as an `extern "C"` function with the `tg_`
//! prefix (see [`ffi`]), returning a [`StatusCode`] and an error object
//! instead of a Rust [`Result`].
//!
//! # Quick Start
//!
//! ```no_run
//! use trueno_graph_api::{
//!     algorithms, sg_graph_create, BfsOptions, EdgeListViews, GraphBuildOptions, GraphProperties,
//!     ResourceHandle, TypeErasedDeviceArray,
//! };
//!
//! # fn example() -> trueno_graph_api::Result<()> {
//! let handle = ResourceHandle::new();
//! let src = TypeErasedDeviceArray::from_slice(&handle, &[0i32, 1, 2])?;
//! let dst = TypeErasedDeviceArray::from_slice(&handle, &[1i32, 2, 3])?;
//! let (src_view, dst_view) = (src.view(), dst.view());
//!
//! let graph = sg_graph_create(
//!     &handle,
//!     GraphProperties::directed(),
//!     &EdgeListViews::new(&src_view, &dst_view),
//!     &GraphBuildOptions::default(),
//! )?;
//!
//! let sources = TypeErasedDeviceArray::from_slice(&handle, &[0i32])?;
//! let paths = algorithms::bfs(&handle, &graph, &sources.view(), &BfsOptions::default(), false)?;
//! let distances: Vec<i32> = paths.distances().to_vec()?;
//! assert_eq!(distances, vec![0, 1, 2, 3]);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Arrays**: arena-owned byte buffers behind generation-checked views
//! - **Graphs**: renumbered CSR topology, one partition per rank
//! - **Engine**: host kernels behind capability traits
//! - **Comms**: in-process collectives for multi-partition graphs
//! - **Storage**: Parquet edge list persistence (`storage` feature)
//! - **GPU**: wgpu-resident arrays (`gpu` feature)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithms;
pub mod array;
pub mod comms;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod graph;
pub mod options;
pub mod resource;
pub mod results;
pub mod storage;
pub mod types;

// GPU-resident arrays (optional)
#[cfg(feature = "gpu")]
pub mod gpu;

// Re-export core types
pub use array::{TypeErasedDeviceArray, TypeErasedDeviceArrayView, TypeErasedHostArray};
pub use comms::{create_comm_group, Communicator};
pub use error::{Error, Result, StatusCode};
pub use graph::{
    mg_graph_create, sg_graph_create, sg_graph_create_from_csr, CsrViews, EdgeListViews, Graph,
    GraphBuildOptions, MgEdgeListChunks,
};
pub use options::{
    BetweennessOptions, BfsOptions, CompressionType, EcgOptions, EigenvectorOptions, GeneratorDistribution,
    HitsOptions, KatzOptions, LouvainOptions, PageRankOptions, PriorSourcesBehavior, RandomWalkOptions,
    RmatListOptions, RmatOptions, SamplingOptions, SpectralOptions, SsspOptions,
};
pub use resource::{ResourceHandle, RngState};
pub use results::{
    CentralityResult, ClusteringResult, CooListResult, CooResult, CoreResult, DegreesResult,
    HierarchicalClusteringResult, HitsResult, InducedSubgraphResult, KCoreResult, LabelingResult,
    PathsResult, RandomWalkResult, SampleResult, SimilarityResult, TriangleCountResult, VertexPairsResult,
};
pub use types::{DataType, DegreeType, Element, GraphProperties};

#[cfg(feature = "storage")]
pub use storage::{read_edgelist_parquet, write_edgelist_parquet, EdgeListArrays};

#[cfg(feature = "gpu")]
pub use gpu::GpuDevice;
