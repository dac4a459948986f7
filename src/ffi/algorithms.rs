//! Algorithm entry points
//!
//! Each function mirrors the Rust entry point of the same name with options
//! flattened into scalar arguments. Optional views may be null.

use super::convert::{data_type, degree_type, generator_distribution};
use super::{ffi_create, ffi_entry, optional, required, Bool, ErrorObject};
use crate::algorithms::{self, PageRankViews, VertexValues};
use crate::array::TypeErasedDeviceArrayView;
use crate::error::{Error, Result, StatusCode};
use crate::graph::Graph;
use crate::options::{
    BetweennessOptions, BfsOptions, EcgOptions, EigenvectorOptions, HitsOptions, KatzOptions, LouvainOptions,
    PageRankOptions, RandomWalkOptions, RmatListOptions, RmatOptions, SamplingOptions, SpectralOptions,
    SsspOptions,
};
use crate::resource::{ResourceHandle, RngState};
use crate::results::{
    CentralityResult, ClusteringResult, CooListResult, CooResult, CoreResult, DegreesResult,
    HierarchicalClusteringResult, HitsResult, InducedSubgraphResult, KCoreResult, LabelingResult,
    PathsResult, RandomWalkResult, SampleResult, SimilarityResult, TriangleCountResult, VertexPairsResult,
};
use std::os::raw::c_int;

type View = TypeErasedDeviceArrayView;

/// Borrow the handle and graph every algorithm needs
unsafe fn context<'a>(handle: *const ResourceHandle, graph: *const Graph) -> Result<(&'a ResourceHandle, &'a Graph)> {
    unsafe { Ok((required(handle, "resource handle")?, required(graph, "graph")?)) }
}

/// `(vertices, values)` pair where both or neither are supplied
unsafe fn vertex_values<'a>(vertices: *const View, values: *const View, what: &str) -> Result<Option<VertexValues<'a>>> {
    match unsafe { (optional(vertices), optional(values)) } {
        (None, None) => Ok(None),
        (Some(vertices), Some(values)) => Ok(Some(VertexValues { vertices, values })),
        _ => Err(Error::InvalidPointer(format!("{what}: vertices and values must both be set"))),
    }
}

fn scale(raw: usize) -> Result<u32> {
    u32::try_from(raw).map_err(|_| Error::invalid_value(format!("scale {raw} out of range")))
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

#[no_mangle]
/// Breadth-first search from `sources`
///
/// # Safety
/// Every non-null pointer must reference a live object; `result` and `error`
/// must be valid for writes.
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_bfs(
    handle: *const ResourceHandle,
    graph: *const Graph,
    sources: *const View,
    direction_optimizing: Bool,
    depth_limit: usize,
    compute_predecessors: Bool,
    do_expensive_check: Bool,
    result: *mut *mut PathsResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_bfs", result, error, || {
            let (handle, graph) = context(handle, graph)?;
            let options = BfsOptions {
                depth_limit,
                compute_predecessors: compute_predecessors.into(),
                direction_optimizing: direction_optimizing.into(),
            };
            algorithms::bfs(handle, graph, required(sources, "sources")?, &options, do_expensive_check.into())
        })
    }
}

#[no_mangle]
/// Single-source shortest paths from `source`
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_sssp(
    handle: *const ResourceHandle,
    graph: *const Graph,
    source: i64,
    cutoff: f64,
    compute_predecessors: Bool,
    do_expensive_check: Bool,
    result: *mut *mut PathsResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_sssp", result, error, || {
            let (handle, graph) = context(handle, graph)?;
            let options = SsspOptions {
                cutoff,
                compute_predecessors: compute_predecessors.into(),
            };
            algorithms::sssp(handle, graph, source, &options, do_expensive_check.into())
        })
    }
}

// ---------------------------------------------------------------------------
// Centrality
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum PageRankVariant {
    Default,
    AllowNonconvergence,
}

#[allow(clippy::too_many_arguments)]
unsafe fn run_pagerank(
    name: &'static str,
    variant: PageRankVariant,
    handle: *const ResourceHandle,
    graph: *const Graph,
    out_weight_vertices: *const View,
    out_weight_sums: *const View,
    initial_guess_vertices: *const View,
    initial_guess_values: *const View,
    personalization: Option<(*const View, *const View)>,
    alpha: f64,
    epsilon: f64,
    max_iterations: usize,
    do_expensive_check: Bool,
    result: *mut *mut CentralityResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create(name, result, error, || {
            let (handle, graph) = context(handle, graph)?;
            let views = PageRankViews {
                precomputed_out_weights: vertex_values(out_weight_vertices, out_weight_sums, "out weights")?,
                initial_guess: vertex_values(initial_guess_vertices, initial_guess_values, "initial guess")?,
            };
            let options = PageRankOptions {
                alpha,
                epsilon,
                max_iterations,
            };
            let check = do_expensive_check.into();
            match personalization {
                None => match variant {
                    PageRankVariant::Default => algorithms::pagerank(handle, graph, &views, &options, check),
                    PageRankVariant::AllowNonconvergence => {
                        algorithms::pagerank_allow_nonconvergence(handle, graph, &views, &options, check)
                    }
                },
                Some((vertices, values)) => {
                    let personalization = VertexValues {
                        vertices: required(vertices, "personalization vertices")?,
                        values: required(values, "personalization values")?,
                    };
                    match variant {
                        PageRankVariant::Default => {
                            algorithms::personalized_pagerank(handle, graph, &views, personalization, &options, check)
                        }
                        PageRankVariant::AllowNonconvergence => algorithms::personalized_pagerank_allow_nonconvergence(
                            handle,
                            graph,
                            &views,
                            personalization,
                            &options,
                            check,
                        ),
                    }
                }
            }
        })
    }
}

#[no_mangle]
/// PageRank; not converging within `max_iterations` is `INVALID_INPUT`
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_pagerank(
    handle: *const ResourceHandle,
    graph: *const Graph,
    precomputed_vertex_out_weight_vertices: *const View,
    precomputed_vertex_out_weight_sums: *const View,
    initial_guess_vertices: *const View,
    initial_guess_values: *const View,
    alpha: f64,
    epsilon: f64,
    max_iterations: usize,
    do_expensive_check: Bool,
    result: *mut *mut CentralityResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        run_pagerank(
            "tg_pagerank",
            PageRankVariant::Default,
            handle,
            graph,
            precomputed_vertex_out_weight_vertices,
            precomputed_vertex_out_weight_sums,
            initial_guess_vertices,
            initial_guess_values,
            None,
            alpha,
            epsilon,
            max_iterations,
            do_expensive_check,
            result,
            error,
        )
    }
}

#[no_mangle]
/// PageRank returning the last iterate when it does not converge
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_pagerank_allow_nonconvergence(
    handle: *const ResourceHandle,
    graph: *const Graph,
    precomputed_vertex_out_weight_vertices: *const View,
    precomputed_vertex_out_weight_sums: *const View,
    initial_guess_vertices: *const View,
    initial_guess_values: *const View,
    alpha: f64,
    epsilon: f64,
    max_iterations: usize,
    do_expensive_check: Bool,
    result: *mut *mut CentralityResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        run_pagerank(
            "tg_pagerank_allow_nonconvergence",
            PageRankVariant::AllowNonconvergence,
            handle,
            graph,
            precomputed_vertex_out_weight_vertices,
            precomputed_vertex_out_weight_sums,
            initial_guess_vertices,
            initial_guess_values,
            None,
            alpha,
            epsilon,
            max_iterations,
            do_expensive_check,
            result,
            error,
        )
    }
}

#[no_mangle]
/// Personalized PageRank; not converging is `INVALID_INPUT`
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_personalized_pagerank(
    handle: *const ResourceHandle,
    graph: *const Graph,
    precomputed_vertex_out_weight_vertices: *const View,
    precomputed_vertex_out_weight_sums: *const View,
    initial_guess_vertices: *const View,
    initial_guess_values: *const View,
    personalization_vertices: *const View,
    personalization_values: *const View,
    alpha: f64,
    epsilon: f64,
    max_iterations: usize,
    do_expensive_check: Bool,
    result: *mut *mut CentralityResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        run_pagerank(
            "tg_personalized_pagerank",
            PageRankVariant::Default,
            handle,
            graph,
            precomputed_vertex_out_weight_vertices,
            precomputed_vertex_out_weight_sums,
            initial_guess_vertices,
            initial_guess_values,
            Some((personalization_vertices, personalization_values)),
            alpha,
            epsilon,
            max_iterations,
            do_expensive_check,
            result,
            error,
        )
    }
}

#[no_mangle]
/// Personalized PageRank returning the last iterate when it does not converge
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_personalized_pagerank_allow_nonconvergence(
    handle: *const ResourceHandle,
    graph: *const Graph,
    precomputed_vertex_out_weight_vertices: *const View,
    precomputed_vertex_out_weight_sums: *const View,
    initial_guess_vertices: *const View,
    initial_guess_values: *const View,
    personalization_vertices: *const View,
    personalization_values: *const View,
    alpha: f64,
    epsilon: f64,
    max_iterations: usize,
    do_expensive_check: Bool,
    result: *mut *mut CentralityResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        run_pagerank(
            "tg_personalized_pagerank_allow_nonconvergence",
            PageRankVariant::AllowNonconvergence,
            handle,
            graph,
            precomputed_vertex_out_weight_vertices,
            precomputed_vertex_out_weight_sums,
            initial_guess_vertices,
            initial_guess_values,
            Some((personalization_vertices, personalization_values)),
            alpha,
            epsilon,
            max_iterations,
            do_expensive_check,
            result,
            error,
        )
    }
}

#[no_mangle]
/// Katz centrality; `betas` (one per owned vertex) may be null
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_katz_centrality(
    handle: *const ResourceHandle,
    graph: *const Graph,
    betas: *const View,
    alpha: f64,
    beta: f64,
    epsilon: f64,
    max_iterations: usize,
    normalize: Bool,
    do_expensive_check: Bool,
    result: *mut *mut CentralityResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_katz_centrality", result, error, || {
            let (handle, graph) = context(handle, graph)?;
            let options = KatzOptions {
                alpha,
                beta,
                epsilon,
                max_iterations,
                normalize: normalize.into(),
            };
            algorithms::katz_centrality(handle, graph, optional(betas), &options, do_expensive_check.into())
        })
    }
}

#[no_mangle]
/// Eigenvector centrality
///
/// # Safety
/// Same as [`tg_bfs`].
pub unsafe extern "C" fn tg_eigenvector_centrality(
    handle: *const ResourceHandle,
    graph: *const Graph,
    epsilon: f64,
    max_iterations: usize,
    do_expensive_check: Bool,
    result: *mut *mut CentralityResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_eigenvector_centrality", result, error, || {
            let (handle, graph) = context(handle, graph)?;
            let options = EigenvectorOptions {
                epsilon,
                max_iterations,
            };
            algorithms::eigenvector_centrality(handle, graph, &options, do_expensive_check.into())
        })
    }
}

#[no_mangle]
/// Betweenness centrality; a null `vertex_list` uses every vertex as a source
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_betweenness_centrality(
    handle: *const ResourceHandle,
    graph: *const Graph,
    vertex_list: *const View,
    normalized: Bool,
    include_endpoints: Bool,
    do_expensive_check: Bool,
    result: *mut *mut CentralityResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_betweenness_centrality", result, error, || {
            let (handle, graph) = context(handle, graph)?;
            let options = BetweennessOptions {
                normalized: normalized.into(),
                include_endpoints: include_endpoints.into(),
            };
            algorithms::betweenness_centrality(handle, graph, optional(vertex_list), &options, do_expensive_check.into())
        })
    }
}

#[no_mangle]
/// HITS hub and authority scores
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_hits(
    handle: *const ResourceHandle,
    graph: *const Graph,
    epsilon: f64,
    max_iterations: usize,
    initial_hubs_guess_vertices: *const View,
    initial_hubs_guess_values: *const View,
    normalize: Bool,
    do_expensive_check: Bool,
    result: *mut *mut HitsResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_hits", result, error, || {
            let (handle, graph) = context(handle, graph)?;
            let initial = vertex_values(initial_hubs_guess_vertices, initial_hubs_guess_values, "initial hubs")?;
            let options = HitsOptions {
                epsilon,
                max_iterations,
                normalize: normalize.into(),
            };
            algorithms::hits(handle, graph, initial, &options, do_expensive_check.into())
        })
    }
}

// ---------------------------------------------------------------------------
// Community
// ---------------------------------------------------------------------------

#[no_mangle]
/// Louvain community detection
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_louvain(
    handle: *const ResourceHandle,
    graph: *const Graph,
    max_level: usize,
    threshold: f64,
    resolution: f64,
    do_expensive_check: Bool,
    result: *mut *mut HierarchicalClusteringResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_louvain", result, error, || {
            let (handle, graph) = context(handle, graph)?;
            let options = LouvainOptions {
                max_level,
                threshold,
                resolution,
            };
            algorithms::louvain(handle, graph, &options, do_expensive_check.into())
        })
    }
}

#[no_mangle]
/// Ensemble clustering over randomized Louvain runs
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_ecg(
    handle: *const ResourceHandle,
    rng_state: *const RngState,
    graph: *const Graph,
    min_weight: f64,
    ensemble_size: usize,
    max_level: usize,
    threshold: f64,
    resolution: f64,
    do_expensive_check: Bool,
    result: *mut *mut HierarchicalClusteringResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_ecg", result, error, || {
            let (handle, graph) = context(handle, graph)?;
            let options = EcgOptions {
                min_weight,
                ensemble_size,
                louvain: LouvainOptions {
                    max_level,
                    threshold,
                    resolution,
                },
            };
            algorithms::ecg(handle, required(rng_state, "rng state")?, graph, &options, do_expensive_check.into())
        })
    }
}

#[allow(clippy::too_many_arguments)]
unsafe fn run_spectral(
    name: &'static str,
    balanced_cut: bool,
    handle: *const ResourceHandle,
    graph: *const Graph,
    options: SpectralOptions,
    do_expensive_check: Bool,
    result: *mut *mut ClusteringResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create(name, result, error, || {
            let (handle, graph) = context(handle, graph)?;
            if balanced_cut {
                algorithms::balanced_cut_clustering(handle, graph, &options, do_expensive_check.into())
            } else {
                algorithms::spectral_modularity_maximization(handle, graph, &options, do_expensive_check.into())
            }
        })
    }
}

#[no_mangle]
/// Spectral clustering maximizing modularity
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_spectral_modularity_maximization(
    handle: *const ResourceHandle,
    graph: *const Graph,
    n_clusters: usize,
    n_eigenvectors: usize,
    evs_tolerance: f64,
    evs_max_iterations: usize,
    k_means_tolerance: f64,
    k_means_max_iterations: usize,
    do_expensive_check: Bool,
    result: *mut *mut ClusteringResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    let options = SpectralOptions {
        n_clusters,
        n_eigenvectors,
        evs_tolerance,
        evs_max_iterations,
        k_means_tolerance,
        k_means_max_iterations,
    };
    unsafe {
        run_spectral(
            "tg_spectral_modularity_maximization",
            false,
            handle,
            graph,
            options,
            do_expensive_check,
            result,
            error,
        )
    }
}

#[no_mangle]
/// Spectral clustering minimizing the balanced cut
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_balanced_cut_clustering(
    handle: *const ResourceHandle,
    graph: *const Graph,
    n_clusters: usize,
    n_eigenvectors: usize,
    evs_tolerance: f64,
    evs_max_iterations: usize,
    k_means_tolerance: f64,
    k_means_max_iterations: usize,
    do_expensive_check: Bool,
    result: *mut *mut ClusteringResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    let options = SpectralOptions {
        n_clusters,
        n_eigenvectors,
        evs_tolerance,
        evs_max_iterations,
        k_means_tolerance,
        k_means_max_iterations,
    };
    unsafe {
        run_spectral(
            "tg_balanced_cut_clustering",
            true,
            handle,
            graph,
            options,
            do_expensive_check,
            result,
            error,
        )
    }
}

type ClusteringScore = fn(&ResourceHandle, &Graph, usize, &View, &View) -> Result<f64>;

#[allow(clippy::too_many_arguments)]
unsafe fn run_analysis(
    name: &'static str,
    score: ClusteringScore,
    handle: *const ResourceHandle,
    graph: *const Graph,
    n_clusters: usize,
    vertices: *const View,
    clusters: *const View,
    out: *mut f64,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_entry(name, error, || {
            let (handle, graph) = context(handle, graph)?;
            if out.is_null() {
                return Err(Error::InvalidPointer("score output is null".to_string()));
            }
            *out = score(
                handle,
                graph,
                n_clusters,
                required(vertices, "vertices")?,
                required(clusters, "clusters")?,
            )?;
            Ok(())
        })
    }
}

#[no_mangle]
/// Modularity of a given clustering
///
/// # Safety
/// Same as [`tg_bfs`]; `score` must be valid for writes.
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_analyze_clustering_modularity(
    handle: *const ResourceHandle,
    graph: *const Graph,
    n_clusters: usize,
    vertices: *const View,
    clusters: *const View,
    score: *mut f64,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        run_analysis(
            "tg_analyze_clustering_modularity",
            algorithms::analyze_clustering_modularity,
            handle,
            graph,
            n_clusters,
            vertices,
            clusters,
            score,
            error,
        )
    }
}

#[no_mangle]
/// Edge cut of a given clustering
///
/// # Safety
/// Same as [`tg_analyze_clustering_modularity`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_analyze_clustering_edge_cut(
    handle: *const ResourceHandle,
    graph: *const Graph,
    n_clusters: usize,
    vertices: *const View,
    clusters: *const View,
    score: *mut f64,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        run_analysis(
            "tg_analyze_clustering_edge_cut",
            algorithms::analyze_clustering_edge_cut,
            handle,
            graph,
            n_clusters,
            vertices,
            clusters,
            score,
            error,
        )
    }
}

#[no_mangle]
/// Ratio cut of a given clustering
///
/// # Safety
/// Same as [`tg_analyze_clustering_modularity`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_analyze_clustering_ratio_cut(
    handle: *const ResourceHandle,
    graph: *const Graph,
    n_clusters: usize,
    vertices: *const View,
    clusters: *const View,
    score: *mut f64,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        run_analysis(
            "tg_analyze_clustering_ratio_cut",
            algorithms::analyze_clustering_ratio_cut,
            handle,
            graph,
            n_clusters,
            vertices,
            clusters,
            score,
            error,
        )
    }
}

#[no_mangle]
/// Triangles through `start_vertices`, or every owned vertex when null
///
/// # Safety
/// Same as [`tg_bfs`].
pub unsafe extern "C" fn tg_triangle_count(
    handle: *const ResourceHandle,
    graph: *const Graph,
    start_vertices: *const View,
    do_expensive_check: Bool,
    result: *mut *mut TriangleCountResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_triangle_count", result, error, || {
            let (handle, graph) = context(handle, graph)?;
            algorithms::triangle_count(handle, graph, optional(start_vertices), do_expensive_check.into())
        })
    }
}

// ---------------------------------------------------------------------------
// Cores and components
// ---------------------------------------------------------------------------

#[no_mangle]
/// Core number of every owned vertex; `degree_type` is 0 in, 1 out, 2 both
///
/// # Safety
/// Same as [`tg_bfs`].
pub unsafe extern "C" fn tg_core_number(
    handle: *const ResourceHandle,
    graph: *const Graph,
    degree_type_id: c_int,
    do_expensive_check: Bool,
    result: *mut *mut CoreResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_core_number", result, error, || {
            let (handle, graph) = context(handle, graph)?;
            algorithms::core_number(handle, graph, degree_type(degree_type_id)?, do_expensive_check.into())
        })
    }
}

#[no_mangle]
/// Edges of the `k`-core; `core_result` may be null
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_k_core(
    handle: *const ResourceHandle,
    graph: *const Graph,
    k: usize,
    degree_type_id: c_int,
    core_result: *const CoreResult,
    do_expensive_check: Bool,
    result: *mut *mut KCoreResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_k_core", result, error, || {
            let (handle, graph) = context(handle, graph)?;
            algorithms::k_core(
                handle,
                graph,
                k,
                degree_type(degree_type_id)?,
                optional(core_result),
                do_expensive_check.into(),
            )
        })
    }
}

#[no_mangle]
/// Edges of the `k`-truss
///
/// # Safety
/// Same as [`tg_bfs`].
pub unsafe extern "C" fn tg_k_truss_subgraph(
    handle: *const ResourceHandle,
    graph: *const Graph,
    k: usize,
    do_expensive_check: Bool,
    result: *mut *mut KCoreResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_k_truss_subgraph", result, error, || {
            let (handle, graph) = context(handle, graph)?;
            algorithms::k_truss_subgraph(handle, graph, k, do_expensive_check.into())
        })
    }
}

#[no_mangle]
/// Weakly connected components
///
/// # Safety
/// Same as [`tg_bfs`].
pub unsafe extern "C" fn tg_weakly_connected_components(
    handle: *const ResourceHandle,
    graph: *const Graph,
    do_expensive_check: Bool,
    result: *mut *mut LabelingResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_weakly_connected_components", result, error, || {
            let (handle, graph) = context(handle, graph)?;
            algorithms::weakly_connected_components(handle, graph, do_expensive_check.into())
        })
    }
}

#[no_mangle]
/// Strongly connected components
///
/// # Safety
/// Same as [`tg_bfs`].
pub unsafe extern "C" fn tg_strongly_connected_components(
    handle: *const ResourceHandle,
    graph: *const Graph,
    do_expensive_check: Bool,
    result: *mut *mut LabelingResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_strongly_connected_components", result, error, || {
            let (handle, graph) = context(handle, graph)?;
            algorithms::strongly_connected_components(handle, graph, do_expensive_check.into())
        })
    }
}

// ---------------------------------------------------------------------------
// Pairs and similarity
// ---------------------------------------------------------------------------

#[no_mangle]
/// Vertex pairs from two equally long label lists
///
/// # Safety
/// Same as [`tg_bfs`].
pub unsafe extern "C" fn tg_create_vertex_pairs(
    handle: *const ResourceHandle,
    graph: *const Graph,
    first: *const View,
    second: *const View,
    do_expensive_check: Bool,
    pairs: *mut *mut VertexPairsResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_create_vertex_pairs", pairs, error, || {
            let (handle, graph) = context(handle, graph)?;
            algorithms::create_vertex_pairs(
                handle,
                graph,
                required(first, "first")?,
                required(second, "second")?,
                do_expensive_check.into(),
            )
        })
    }
}

#[no_mangle]
/// Pairs of vertices two hops apart; null `start_vertices` means every owned vertex
///
/// # Safety
/// Same as [`tg_bfs`].
pub unsafe extern "C" fn tg_two_hop_neighbors(
    handle: *const ResourceHandle,
    graph: *const Graph,
    start_vertices: *const View,
    do_expensive_check: Bool,
    pairs: *mut *mut VertexPairsResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_two_hop_neighbors", pairs, error, || {
            let (handle, graph) = context(handle, graph)?;
            algorithms::two_hop_neighbors(handle, graph, optional(start_vertices), do_expensive_check.into())
        })
    }
}

type PairScore = fn(&ResourceHandle, &Graph, &VertexPairsResult, bool, bool) -> Result<SimilarityResult>;

#[allow(clippy::too_many_arguments)]
unsafe fn run_similarity(
    name: &'static str,
    score: PairScore,
    handle: *const ResourceHandle,
    graph: *const Graph,
    vertex_pairs: *const VertexPairsResult,
    use_weight: Bool,
    do_expensive_check: Bool,
    result: *mut *mut SimilarityResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create(name, result, error, || {
            let (handle, graph) = context(handle, graph)?;
            score(
                handle,
                graph,
                required(vertex_pairs, "vertex pairs")?,
                use_weight.into(),
                do_expensive_check.into(),
            )
        })
    }
}

#[no_mangle]
/// Jaccard coefficient of every pair
///
/// # Safety
/// Same as [`tg_bfs`].
pub unsafe extern "C" fn tg_jaccard_coefficients(
    handle: *const ResourceHandle,
    graph: *const Graph,
    vertex_pairs: *const VertexPairsResult,
    use_weight: Bool,
    do_expensive_check: Bool,
    result: *mut *mut SimilarityResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        run_similarity(
            "tg_jaccard_coefficients",
            algorithms::jaccard_coefficients,
            handle,
            graph,
            vertex_pairs,
            use_weight,
            do_expensive_check,
            result,
            error,
        )
    }
}

#[no_mangle]
/// Sørensen coefficient of every pair
///
/// # Safety
/// Same as [`tg_bfs`].
pub unsafe extern "C" fn tg_sorensen_coefficients(
    handle: *const ResourceHandle,
    graph: *const Graph,
    vertex_pairs: *const VertexPairsResult,
    use_weight: Bool,
    do_expensive_check: Bool,
    result: *mut *mut SimilarityResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        run_similarity(
            "tg_sorensen_coefficients",
            algorithms::sorensen_coefficients,
            handle,
            graph,
            vertex_pairs,
            use_weight,
            do_expensive_check,
            result,
            error,
        )
    }
}

#[no_mangle]
/// Overlap coefficient of every pair
///
/// # Safety
/// Same as [`tg_bfs`].
pub unsafe extern "C" fn tg_overlap_coefficients(
    handle: *const ResourceHandle,
    graph: *const Graph,
    vertex_pairs: *const VertexPairsResult,
    use_weight: Bool,
    do_expensive_check: Bool,
    result: *mut *mut SimilarityResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        run_similarity(
            "tg_overlap_coefficients",
            algorithms::overlap_coefficients,
            handle,
            graph,
            vertex_pairs,
            use_weight,
            do_expensive_check,
            result,
            error,
        )
    }
}

type AllPairsScore =
    fn(&ResourceHandle, &Graph, Option<&View>, bool, Option<usize>, bool) -> Result<SimilarityResult>;

#[allow(clippy::too_many_arguments)]
unsafe fn run_all_pairs(
    name: &'static str,
    score: AllPairsScore,
    handle: *const ResourceHandle,
    graph: *const Graph,
    vertices: *const View,
    use_weight: Bool,
    topk: usize,
    do_expensive_check: Bool,
    result: *mut *mut SimilarityResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create(name, result, error, || {
            let (handle, graph) = context(handle, graph)?;
            let topk = (topk != usize::MAX).then_some(topk);
            score(handle, graph, optional(vertices), use_weight.into(), topk, do_expensive_check.into())
        })
    }
}

#[no_mangle]
/// All-pairs Jaccard; `topk = SIZE_MAX` keeps every pair
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_all_pairs_jaccard_coefficients(
    handle: *const ResourceHandle,
    graph: *const Graph,
    vertices: *const View,
    use_weight: Bool,
    topk: usize,
    do_expensive_check: Bool,
    result: *mut *mut SimilarityResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        run_all_pairs(
            "tg_all_pairs_jaccard_coefficients",
            algorithms::all_pairs_jaccard_coefficients,
            handle,
            graph,
            vertices,
            use_weight,
            topk,
            do_expensive_check,
            result,
            error,
        )
    }
}

#[no_mangle]
/// All-pairs Sørensen; `topk = SIZE_MAX` keeps every pair
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_all_pairs_sorensen_coefficients(
    handle: *const ResourceHandle,
    graph: *const Graph,
    vertices: *const View,
    use_weight: Bool,
    topk: usize,
    do_expensive_check: Bool,
    result: *mut *mut SimilarityResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        run_all_pairs(
            "tg_all_pairs_sorensen_coefficients",
            algorithms::all_pairs_sorensen_coefficients,
            handle,
            graph,
            vertices,
            use_weight,
            topk,
            do_expensive_check,
            result,
            error,
        )
    }
}

#[no_mangle]
/// All-pairs overlap; `topk = SIZE_MAX` keeps every pair
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_all_pairs_overlap_coefficients(
    handle: *const ResourceHandle,
    graph: *const Graph,
    vertices: *const View,
    use_weight: Bool,
    topk: usize,
    do_expensive_check: Bool,
    result: *mut *mut SimilarityResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        run_all_pairs(
            "tg_all_pairs_overlap_coefficients",
            algorithms::all_pairs_overlap_coefficients,
            handle,
            graph,
            vertices,
            use_weight,
            topk,
            do_expensive_check,
            result,
            error,
        )
    }
}

// ---------------------------------------------------------------------------
// Subgraphs
// ---------------------------------------------------------------------------

#[no_mangle]
/// Subgraphs induced by vertex sets
///
/// # Safety
/// Same as [`tg_bfs`].
pub unsafe extern "C" fn tg_extract_induced_subgraph(
    handle: *const ResourceHandle,
    graph: *const Graph,
    subgraph_offsets: *const View,
    subgraph_vertices: *const View,
    do_expensive_check: Bool,
    result: *mut *mut InducedSubgraphResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_extract_induced_subgraph", result, error, || {
            let (handle, graph) = context(handle, graph)?;
            algorithms::extract_induced_subgraph(
                handle,
                graph,
                required(subgraph_offsets, "subgraph offsets")?,
                required(subgraph_vertices, "subgraph vertices")?,
                do_expensive_check.into(),
            )
        })
    }
}

#[no_mangle]
/// Ego networks of `source_vertices`
///
/// # Safety
/// Same as [`tg_bfs`].
pub unsafe extern "C" fn tg_extract_ego(
    handle: *const ResourceHandle,
    graph: *const Graph,
    source_vertices: *const View,
    radius: usize,
    do_expensive_check: Bool,
    result: *mut *mut InducedSubgraphResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_extract_ego", result, error, || {
            let (handle, graph) = context(handle, graph)?;
            algorithms::extract_ego(
                handle,
                graph,
                required(source_vertices, "source vertices")?,
                radius,
                do_expensive_check.into(),
            )
        })
    }
}

// ---------------------------------------------------------------------------
// Walks and sampling
// ---------------------------------------------------------------------------

type Walker = fn(&ResourceHandle, &RngState, &Graph, &View, &RandomWalkOptions, bool) -> Result<RandomWalkResult>;

#[allow(clippy::too_many_arguments)]
unsafe fn run_walks(
    name: &'static str,
    walker: Walker,
    handle: *const ResourceHandle,
    rng_state: *const RngState,
    graph: *const Graph,
    start_vertices: *const View,
    options: RandomWalkOptions,
    do_expensive_check: Bool,
    result: *mut *mut RandomWalkResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create(name, result, error, || {
            let (handle, graph) = context(handle, graph)?;
            walker(
                handle,
                required(rng_state, "rng state")?,
                graph,
                required(start_vertices, "start vertices")?,
                &options,
                do_expensive_check.into(),
            )
        })
    }
}

#[no_mangle]
/// Uniform random walks of `max_length` steps
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_uniform_random_walks(
    handle: *const ResourceHandle,
    rng_state: *const RngState,
    graph: *const Graph,
    start_vertices: *const View,
    max_length: usize,
    do_expensive_check: Bool,
    result: *mut *mut RandomWalkResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    let options = RandomWalkOptions {
        max_length,
        ..RandomWalkOptions::default()
    };
    unsafe {
        run_walks(
            "tg_uniform_random_walks",
            algorithms::uniform_random_walks,
            handle,
            rng_state,
            graph,
            start_vertices,
            options,
            do_expensive_check,
            result,
            error,
        )
    }
}

#[no_mangle]
/// Weight-biased random walks (`NOT_IMPLEMENTED`)
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_biased_random_walks(
    handle: *const ResourceHandle,
    rng_state: *const RngState,
    graph: *const Graph,
    start_vertices: *const View,
    max_length: usize,
    do_expensive_check: Bool,
    result: *mut *mut RandomWalkResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    let options = RandomWalkOptions {
        max_length,
        ..RandomWalkOptions::default()
    };
    unsafe {
        run_walks(
            "tg_biased_random_walks",
            algorithms::biased_random_walks,
            handle,
            rng_state,
            graph,
            start_vertices,
            options,
            do_expensive_check,
            result,
            error,
        )
    }
}

#[no_mangle]
/// node2vec random walks (`NOT_IMPLEMENTED`)
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_node2vec_random_walks(
    handle: *const ResourceHandle,
    rng_state: *const RngState,
    graph: *const Graph,
    start_vertices: *const View,
    max_length: usize,
    p: f64,
    q: f64,
    do_expensive_check: Bool,
    result: *mut *mut RandomWalkResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    let options = RandomWalkOptions { max_length, p, q };
    unsafe {
        run_walks(
            "tg_node2vec_random_walks",
            algorithms::node2vec_random_walks,
            handle,
            rng_state,
            graph,
            start_vertices,
            options,
            do_expensive_check,
            result,
            error,
        )
    }
}

#[no_mangle]
/// Multi-hop uniform neighbor sampling
///
/// `fan_out` is an `INT32` view (typically of a host array) with one entry per
/// hop. `start_vertex_labels` may be null.
///
/// # Safety
/// Same as [`tg_bfs`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_uniform_neighbor_sample(
    handle: *const ResourceHandle,
    rng_state: *const RngState,
    graph: *const Graph,
    start_vertices: *const View,
    start_vertex_labels: *const View,
    fan_out: *const View,
    options: *const SamplingOptions,
    do_expensive_check: Bool,
    result: *mut *mut SampleResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_uniform_neighbor_sample", result, error, || {
            let (handle, graph) = context(handle, graph)?;
            algorithms::uniform_neighbor_sample(
                handle,
                required(rng_state, "rng state")?,
                graph,
                required(start_vertices, "start vertices")?,
                optional(start_vertex_labels),
                required(fan_out, "fan out")?,
                required(options, "sampling options")?,
                do_expensive_check.into(),
            )
        })
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

#[no_mangle]
/// R-MAT edge list over `2^scale` vertices
///
/// # Safety
/// `handle` and `rng_state` must be live; `result` and `error` must be valid
/// for writes.
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_generate_rmat_edgelist(
    handle: *const ResourceHandle,
    rng_state: *const RngState,
    scale_raw: usize,
    num_edges: usize,
    a: f64,
    b: f64,
    c: f64,
    clip_and_flip: Bool,
    scramble_vertex_ids: Bool,
    result: *mut *mut CooResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_generate_rmat_edgelist", result, error, || {
            let handle = required(handle, "resource handle")?;
            let options = RmatOptions {
                scale: scale(scale_raw)?,
                num_edges,
                a,
                b,
                c,
                clip_and_flip: clip_and_flip.into(),
                scramble_vertex_ids: scramble_vertex_ids.into(),
            };
            algorithms::generate_rmat_edgelist(handle, required(rng_state, "rng state")?, &options)
        })
    }
}

#[no_mangle]
/// Several R-MAT edge lists; distributions are 0 power law, 1 uniform
///
/// # Safety
/// Same as [`tg_generate_rmat_edgelist`].
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_generate_rmat_edgelists(
    handle: *const ResourceHandle,
    rng_state: *const RngState,
    n_edgelists: usize,
    min_scale: usize,
    max_scale: usize,
    edge_factor: usize,
    size_distribution: c_int,
    edge_distribution: c_int,
    clip_and_flip: Bool,
    scramble_vertex_ids: Bool,
    result: *mut *mut CooListResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_generate_rmat_edgelists", result, error, || {
            let handle = required(handle, "resource handle")?;
            let options = RmatListOptions {
                n_edgelists,
                min_scale: scale(min_scale)?,
                max_scale: scale(max_scale)?,
                edge_factor,
                size_distribution: generator_distribution(size_distribution)?,
                edge_distribution: generator_distribution(edge_distribution)?,
                clip_and_flip: clip_and_flip.into(),
                scramble_vertex_ids: scramble_vertex_ids.into(),
            };
            algorithms::generate_rmat_edgelists(handle, required(rng_state, "rng state")?, &options)
        })
    }
}

#[no_mangle]
/// Attach uniform weights in `[min, max)` of type id `dtype`
///
/// # Safety
/// `handle`, `rng_state` and `coo` must be live; `error` must be null or valid
/// for writes.
pub unsafe extern "C" fn tg_generate_edge_weights(
    handle: *const ResourceHandle,
    rng_state: *const RngState,
    coo: *mut CooResult,
    dtype: c_int,
    min: f64,
    max: f64,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_entry("tg_generate_edge_weights", error, || {
            let handle = required(handle, "resource handle")?;
            let coo = coo.as_mut().ok_or_else(|| Error::InvalidPointer("edge list is null".to_string()))?;
            algorithms::generate_edge_weights(handle, required(rng_state, "rng state")?, coo, data_type(dtype)?, min, max)
        })
    }
}

#[no_mangle]
/// Attach consecutive edge ids
///
/// # Safety
/// Same as [`tg_generate_edge_weights`].
pub unsafe extern "C" fn tg_generate_edge_ids(
    handle: *const ResourceHandle,
    coo: *mut CooResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_entry("tg_generate_edge_ids", error, || {
            let handle = required(handle, "resource handle")?;
            let coo = coo.as_mut().ok_or_else(|| Error::InvalidPointer("edge list is null".to_string()))?;
            algorithms::generate_edge_ids(handle, coo)
        })
    }
}

#[no_mangle]
/// Attach uniform `INT32` edge types in `[min, max]`
///
/// # Safety
/// Same as [`tg_generate_edge_weights`].
pub unsafe extern "C" fn tg_generate_edge_types(
    handle: *const ResourceHandle,
    rng_state: *const RngState,
    coo: *mut CooResult,
    min: i32,
    max: i32,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_entry("tg_generate_edge_types", error, || {
            let handle = required(handle, "resource handle")?;
            let coo = coo.as_mut().ok_or_else(|| Error::InvalidPointer("edge list is null".to_string()))?;
            algorithms::generate_edge_types(handle, required(rng_state, "rng state")?, coo, min, max)
        })
    }
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

type DegreeQuery = fn(&ResourceHandle, &Graph, Option<&View>, bool) -> Result<DegreesResult>;

unsafe fn run_degrees(
    name: &'static str,
    query: DegreeQuery,
    handle: *const ResourceHandle,
    graph: *const Graph,
    source_vertices: *const View,
    do_expensive_check: Bool,
    result: *mut *mut DegreesResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create(name, result, error, || {
            let (handle, graph) = context(handle, graph)?;
            query(handle, graph, optional(source_vertices), do_expensive_check.into())
        })
    }
}

#[no_mangle]
/// In- and out-degrees; null `source_vertices` means every owned vertex
///
/// # Safety
/// Same as [`tg_bfs`].
pub unsafe extern "C" fn tg_degrees(
    handle: *const ResourceHandle,
    graph: *const Graph,
    source_vertices: *const View,
    do_expensive_check: Bool,
    result: *mut *mut DegreesResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        run_degrees(
            "tg_degrees",
            algorithms::degrees,
            handle,
            graph,
            source_vertices,
            do_expensive_check,
            result,
            error,
        )
    }
}

#[no_mangle]
/// In-degrees only
///
/// # Safety
/// Same as [`tg_bfs`].
pub unsafe extern "C" fn tg_in_degrees(
    handle: *const ResourceHandle,
    graph: *const Graph,
    source_vertices: *const View,
    do_expensive_check: Bool,
    result: *mut *mut DegreesResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        run_degrees(
            "tg_in_degrees",
            algorithms::in_degrees,
            handle,
            graph,
            source_vertices,
            do_expensive_check,
            result,
            error,
        )
    }
}

#[no_mangle]
/// Out-degrees only
///
/// # Safety
/// Same as [`tg_bfs`].
pub unsafe extern "C" fn tg_out_degrees(
    handle: *const ResourceHandle,
    graph: *const Graph,
    source_vertices: *const View,
    do_expensive_check: Bool,
    result: *mut *mut DegreesResult,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        run_degrees(
            "tg_out_degrees",
            algorithms::out_degrees,
            handle,
            graph,
            source_vertices,
            do_expensive_check,
            result,
            error,
        )
    }
}
