//! Louvain, ECG, spectral clustering, clustering scores and triangle counts

use super::{agree, internal_vertices, label_array, owned_vertices, reject_duplicates, require_symmetric};
use crate::array::convert::{read_i32, vertex_array};
use crate::array::{TypeErasedDeviceArray, TypeErasedDeviceArrayView};
use crate::engine::{ClusteringOutput, CommunityEngine, DefaultEngine};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::options::{EcgOptions, LouvainOptions, SpectralOptions};
use crate::resource::{ResourceHandle, RngState};
use crate::results::{ClusteringResult, HierarchicalClusteringResult, TriangleCountResult};
use crate::storage::CsrGraph;
use crate::types::DataType;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[allow(clippy::cast_possible_wrap)] // cluster ids are below the vertex count
fn cluster_array(handle: &ResourceHandle, clusters: &[u32]) -> Result<TypeErasedDeviceArray> {
    let ids: Vec<i32> = clusters.iter().map(|&c| c as i32).collect();
    TypeErasedDeviceArray::from_slice(handle, &ids)
}

fn hierarchical_result(
    handle: &ResourceHandle,
    graph: &Graph,
    out: &ClusteringOutput,
) -> Result<HierarchicalClusteringResult> {
    let owned = owned_vertices(handle, graph)?;
    let clusters: Vec<u32> = owned.iter().map(|&v| out.clusters[v as usize]).collect();
    Ok(HierarchicalClusteringResult {
        vertices: label_array(handle, graph, &owned)?,
        clusters: cluster_array(handle, &clusters)?,
        modularity: out.modularity,
    })
}

/// Multi-level Louvain modularity optimization
///
/// Directed graphs are clustered over `A + Aᵀ`.
///
/// # Errors
///
/// `InvalidValue` for out-of-range options
pub fn louvain(
    handle: &ResourceHandle,
    graph: &Graph,
    options: &LouvainOptions,
    do_expensive_check: bool,
) -> Result<HierarchicalClusteringResult> {
    options.validate()?;
    let topology = graph.topology(handle)?;
    if do_expensive_check {
        check_non_negative(&topology)?;
    }
    let out = DefaultEngine::louvain(&topology, options);
    hierarchical_result(handle, graph, &out)
}

/// Ensemble clustering for graphs
///
/// Every rank draws from its own random state; the draw of rank 0 seeds the
/// ensemble so that all ranks agree on the clustering.
///
/// # Errors
///
/// `InvalidValue` for out-of-range options
pub fn ecg(
    handle: &ResourceHandle,
    rng: &RngState,
    graph: &Graph,
    options: &EcgOptions,
    do_expensive_check: bool,
) -> Result<HierarchicalClusteringResult> {
    options.validate()?;
    let draw: u64 = rng.with_rng(|r| r.gen());
    let seeds = handle.all_gather("ecg.seed", draw)?;
    let seed = seeds.first().copied().unwrap_or(draw);
    let topology = graph.topology(handle)?;
    if do_expensive_check {
        check_non_negative(&topology)?;
    }

    let mut ensemble_rng = StdRng::seed_from_u64(seed);
    let out = DefaultEngine::ecg(&topology, options, &mut ensemble_rng);
    hierarchical_result(handle, graph, &out)
}

fn check_non_negative(topology: &CsrGraph) -> Result<()> {
    match topology.edges().weights.iter().flatten().find(|w| w.is_nan() || **w < 0.0) {
        Some(w) => Err(Error::invalid_input(format!("edge weight {w} is negative or NaN"))),
        None => Ok(()),
    }
}

fn spectral(
    handle: &ResourceHandle,
    graph: &Graph,
    options: &SpectralOptions,
    do_expensive_check: bool,
    name: &str,
    cluster: fn(&CsrGraph, &SpectralOptions) -> Vec<u32>,
) -> Result<ClusteringResult> {
    options.validate()?;
    require_symmetric(graph, name)?;
    if options.n_clusters > graph.number_of_vertices() {
        return Err(Error::invalid_value(format!(
            "{} clusters requested for {} vertices",
            options.n_clusters,
            graph.number_of_vertices()
        )));
    }
    let topology = graph.topology(handle)?;
    if do_expensive_check {
        check_non_negative(&topology)?;
    }
    let clusters = cluster(&topology, options);

    let owned = owned_vertices(handle, graph)?;
    let owned_clusters: Vec<u32> = owned.iter().map(|&v| clusters[v as usize]).collect();
    Ok(ClusteringResult {
        vertices: label_array(handle, graph, &owned)?,
        clusters: cluster_array(handle, &owned_clusters)?,
    })
}

/// Spectral clustering on the modularity matrix
///
/// # Errors
///
/// `InvalidInput` for graphs not marked symmetric, `InvalidValue` for more
/// clusters than vertices or inconsistent eigenvector counts
pub fn spectral_modularity_maximization(
    handle: &ResourceHandle,
    graph: &Graph,
    options: &SpectralOptions,
    do_expensive_check: bool,
) -> Result<ClusteringResult> {
    spectral(handle, graph, options, do_expensive_check, "spectral modularity maximization", DefaultEngine::spectral_modularity)
}

/// Spectral clustering on the graph Laplacian
///
/// # Errors
///
/// Same as [`spectral_modularity_maximization`]
pub fn balanced_cut_clustering(
    handle: &ResourceHandle,
    graph: &Graph,
    options: &SpectralOptions,
    do_expensive_check: bool,
) -> Result<ClusteringResult> {
    spectral(handle, graph, options, do_expensive_check, "balanced cut clustering", DefaultEngine::balanced_cut)
}

/// Read `(vertex, cluster)` assignments supplied by this rank
fn read_assignment(
    handle: &ResourceHandle,
    graph: &Graph,
    n_clusters: usize,
    vertices: &TypeErasedDeviceArrayView,
    clusters: &TypeErasedDeviceArrayView,
) -> Result<Vec<(u32, u32)>> {
    clusters.check_handle(handle)?;
    if vertices.size() != clusters.size() {
        return Err(Error::invalid_value(format!(
            "{} vertices with {} cluster ids",
            vertices.size(),
            clusters.size()
        )));
    }
    let ids = internal_vertices(handle, graph, vertices)?;
    let labels = read_i32(clusters)?;
    ids.into_iter()
        .zip(labels)
        .map(|(v, c)| match u32::try_from(c) {
            Ok(c) if (c as usize) < n_clusters => Ok((v, c)),
            _ => Err(Error::invalid_value(format!("cluster id {c} outside 0..{n_clusters}"))),
        })
        .collect()
}

fn analyze(
    handle: &ResourceHandle,
    graph: &Graph,
    n_clusters: usize,
    vertices: &TypeErasedDeviceArrayView,
    clusters: &TypeErasedDeviceArrayView,
    score: fn(&CsrGraph, &[u32]) -> f64,
) -> Result<f64> {
    require_symmetric(graph, "clustering analysis")?;
    let local = read_assignment(handle, graph, n_clusters, vertices, clusters);
    let local = agree(handle, "analyze.assignment", local)?;
    let assignment = handle.all_gather_concat("analyze.values", local)?;
    let topology = graph.topology(handle)?;

    let mut dense: Vec<Option<u32>> = vec![None; graph.number_of_vertices()];
    for (v, c) in assignment {
        dense[v as usize] = Some(c);
    }
    let missing = dense.iter().filter(|c| c.is_none()).count();
    if missing > 0 {
        return Err(Error::invalid_input(format!("{missing} vertices have no cluster")));
    }
    let dense: Vec<u32> = dense.into_iter().flatten().collect();
    Ok(score(&topology, &dense))
}

/// Modularity of a given clustering
///
/// # Errors
///
/// `InvalidInput` for graphs not marked symmetric or vertices left without a
/// cluster, `InvalidValue` for cluster ids outside `0..n_clusters`
pub fn analyze_clustering_modularity(
    handle: &ResourceHandle,
    graph: &Graph,
    n_clusters: usize,
    vertices: &TypeErasedDeviceArrayView,
    clusters: &TypeErasedDeviceArrayView,
) -> Result<f64> {
    analyze(handle, graph, n_clusters, vertices, clusters, DefaultEngine::modularity)
}

/// Weight of the edges crossing clusters
///
/// # Errors
///
/// Same as [`analyze_clustering_modularity`]
pub fn analyze_clustering_edge_cut(
    handle: &ResourceHandle,
    graph: &Graph,
    n_clusters: usize,
    vertices: &TypeErasedDeviceArrayView,
    clusters: &TypeErasedDeviceArrayView,
) -> Result<f64> {
    analyze(handle, graph, n_clusters, vertices, clusters, DefaultEngine::edge_cut)
}

/// Sum over clusters of cut weight over cluster size
///
/// # Errors
///
/// Same as [`analyze_clustering_modularity`]
pub fn analyze_clustering_ratio_cut(
    handle: &ResourceHandle,
    graph: &Graph,
    n_clusters: usize,
    vertices: &TypeErasedDeviceArrayView,
    clusters: &TypeErasedDeviceArrayView,
) -> Result<f64> {
    analyze(handle, graph, n_clusters, vertices, clusters, DefaultEngine::ratio_cut)
}

/// Triangles through each vertex of `start_vertices`, or each owned vertex
///
/// # Errors
///
/// `InvalidInput` for graphs not marked symmetric or unknown labels, and
/// repeated labels with the expensive check
pub fn triangle_count(
    handle: &ResourceHandle,
    graph: &Graph,
    start_vertices: Option<&TypeErasedDeviceArrayView>,
    do_expensive_check: bool,
) -> Result<TriangleCountResult> {
    require_symmetric(graph, "triangle count")?;
    let local = start_vertices
        .map(|view| {
            let ids = internal_vertices(handle, graph, view)?;
            if do_expensive_check {
                reject_duplicates(graph, &ids)?;
            }
            Ok(ids)
        })
        .transpose();
    let local = agree(handle, "triangle_count.vertices", local)?;
    let topology = graph.topology(handle)?;

    let counts = DefaultEngine::triangle_count(&topology);
    let vertices = match local {
        Some(vertices) => vertices,
        None => owned_vertices(handle, graph)?,
    };
    #[allow(clippy::cast_possible_wrap)]
    let selected: Vec<i64> = vertices.iter().map(|&v| counts[v as usize] as i64).collect();
    Ok(TriangleCountResult {
        vertices: label_array(handle, graph, &vertices)?,
        counts: vertex_array(handle, DataType::Int64, &selected)?,
    })
}
