//! Type Dispatch Story Tests
//!
//! Every algorithm family must run on both vertex types (`INT32`, `INT64`)
//! and both weight types (`FLOAT32`, `FLOAT64`), and must report its outputs
//! in the documented element type. A new entry point that only instantiates
//! one combination fails here.

use trueno_graph_api::algorithms::{self, PageRankViews};
use trueno_graph_api::array::convert::{read_offsets, read_vertices, read_weights, vertex_array, weight_array};
use trueno_graph_api::{
    sg_graph_create, BetweennessOptions, BfsOptions, DataType, DegreeType, EdgeListViews, EigenvectorOptions, Graph,
    GraphBuildOptions, GraphProperties, HitsOptions, KatzOptions, LouvainOptions, PageRankOptions,
    RandomWalkOptions, ResourceHandle, RngState, SsspOptions, TypeErasedDeviceArray,
};

const VERTEX_TYPES: [DataType; 2] = [DataType::Int32, DataType::Int64];
const WEIGHT_TYPES: [DataType; 2] = [DataType::Float32, DataType::Float64];

// ============================================================================
// HELPER: Build test graphs
// ============================================================================

/// Two triangles joined by a bridge, stored in both directions
///
/// ```text
///   0 - 1       4 - 5
///    \ /  2.0   \ /
///     2 ------- 3
/// ```
fn story_graph(handle: &ResourceHandle, vertex_type: DataType, weight_type: DataType) -> Graph {
    let undirected = [(0, 1, 1.0), (0, 2, 1.0), (1, 2, 1.0), (2, 3, 2.0), (3, 4, 1.0), (3, 5, 1.0), (4, 5, 1.0)];
    let mut src = Vec::new();
    let mut dst = Vec::new();
    let mut weights = Vec::new();
    for &(u, v, w) in &undirected {
        src.extend([u, v]);
        dst.extend([v, u]);
        weights.extend([w, w]);
    }
    let s = vertex_array(handle, vertex_type, &src).unwrap();
    let d = vertex_array(handle, vertex_type, &dst).unwrap();
    let w = weight_array(handle, weight_type, &weights).unwrap();
    let (sv, dv, wv) = (s.view(), d.view(), w.view());
    sg_graph_create(
        handle,
        GraphProperties::symmetric(),
        &EdgeListViews::new(&sv, &dv).with_weights(&wv),
        &GraphBuildOptions::default(),
    )
    .unwrap()
}

/// Run `story` once per vertex/weight type combination
fn for_each_combination(story: impl Fn(&ResourceHandle, &Graph, DataType, DataType)) {
    for vertex_type in VERTEX_TYPES {
        for weight_type in WEIGHT_TYPES {
            let handle = ResourceHandle::new();
            let graph = story_graph(&handle, vertex_type, weight_type);
            story(&handle, &graph, vertex_type, weight_type);
        }
    }
}

/// Values keyed by external label, sorted by label
fn by_label(vertices: &[i64], values: &[f64]) -> Vec<f64> {
    let mut pairs: Vec<(i64, f64)> = vertices.iter().copied().zip(values.iter().copied()).collect();
    pairs.sort_by_key(|&(v, _)| v);
    pairs.into_iter().map(|(_, value)| value).collect()
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

#[test]
fn test_graph_reports_construction_types() {
    for_each_combination(|_, graph, vertex_type, weight_type| {
        assert_eq!(graph.vertex_type(), vertex_type);
        assert_eq!(graph.weight_type(), weight_type);
        assert!(graph.is_weighted());
        assert_eq!(graph.number_of_vertices(), 6);
        assert_eq!(graph.number_of_edges(), 14);
    });
}

#[test]
fn test_degrees_use_vertex_type() {
    for_each_combination(|handle, graph, vertex_type, _| {
        let result = algorithms::degrees(handle, graph, None, false).unwrap();
        let outs = result.out_degrees().unwrap();
        assert_eq!(outs.dtype(), vertex_type);
        let degrees = by_label(
            &read_vertices(&result.vertices()).unwrap(),
            &read_vertices(&outs).unwrap().iter().map(|&d| d as f64).collect::<Vec<_>>(),
        );
        assert_eq!(degrees, vec![2.0, 2.0, 3.0, 3.0, 2.0, 2.0]);
    });
}

// ============================================================================
// TRAVERSAL
// ============================================================================

#[test]
fn test_bfs_on_every_type_combination() {
    for_each_combination(|handle, graph, vertex_type, _| {
        let seeds = vertex_array(handle, vertex_type, &[0]).unwrap();
        let options = BfsOptions {
            compute_predecessors: true,
            ..BfsOptions::default()
        };
        let result = algorithms::bfs(handle, graph, &seeds.view(), &options, true).unwrap();
        assert_eq!(result.distances().dtype(), vertex_type);
        assert_eq!(result.predecessors().dtype(), vertex_type);

        let vertices = read_vertices(&result.vertices()).unwrap();
        let hops: Vec<f64> = read_vertices(&result.distances()).unwrap().iter().map(|&d| d as f64).collect();
        assert_eq!(by_label(&vertices, &hops), vec![0.0, 1.0, 1.0, 2.0, 3.0, 3.0]);
    });
}

#[test]
fn test_sssp_on_every_type_combination() {
    for_each_combination(|handle, graph, _, weight_type| {
        let result = algorithms::sssp(handle, graph, 0, &SsspOptions::default(), false).unwrap();
        assert_eq!(result.distances().dtype(), weight_type);
        let vertices = read_vertices(&result.vertices()).unwrap();
        let distances = by_label(&vertices, &read_weights(&result.distances()).unwrap());
        assert_eq!(distances, vec![0.0, 1.0, 1.0, 3.0, 4.0, 4.0]);
    });
}

// ============================================================================
// CENTRALITY
// ============================================================================

#[test]
fn test_pagerank_on_every_type_combination() {
    for_each_combination(|handle, graph, _, weight_type| {
        let result =
            algorithms::pagerank(handle, graph, &PageRankViews::default(), &PageRankOptions::default(), false).unwrap();
        assert_eq!(result.values().dtype(), weight_type);
        assert!(result.converged());
        let total: f64 = read_weights(&result.values()).unwrap().iter().sum();
        assert!((total - 1.0).abs() < 1e-4, "sum {total}");
    });
}

#[test]
fn test_iterative_centralities_on_every_type_combination() {
    for_each_combination(|handle, graph, _, weight_type| {
        let katz = algorithms::katz_centrality(handle, graph, None, &KatzOptions::default(), false).unwrap();
        let eigen = algorithms::eigenvector_centrality(handle, graph, &EigenvectorOptions::default(), false).unwrap();
        for result in [&katz, &eigen] {
            assert_eq!(result.values().dtype(), weight_type);
            let values = by_label(
                &read_vertices(&result.vertices()).unwrap(),
                &read_weights(&result.values()).unwrap(),
            );
            // Mirror symmetry of the story graph
            assert!((values[0] - values[5]).abs() < 1e-3);
            assert!((values[2] - values[3]).abs() < 1e-3);
            assert!(values[2] > values[0]);
        }

        let hits = algorithms::hits(handle, graph, None, &HitsOptions::default(), false).unwrap();
        assert_eq!(hits.hubs().dtype(), weight_type);
        assert_eq!(hits.authorities().dtype(), weight_type);
    });
}

#[test]
fn test_betweenness_peaks_on_the_bridge() {
    for_each_combination(|handle, graph, _, weight_type| {
        let result =
            algorithms::betweenness_centrality(handle, graph, None, &BetweennessOptions::default(), false).unwrap();
        assert_eq!(result.values().dtype(), weight_type);
        let values = by_label(
            &read_vertices(&result.vertices()).unwrap(),
            &read_weights(&result.values()).unwrap(),
        );
        let max = values.iter().copied().fold(f64::MIN, f64::max);
        assert!((values[2] - max).abs() < 1e-6);
        assert!((values[3] - max).abs() < 1e-6);
        assert!(values[0].abs() < 1e-9);
    });
}

// ============================================================================
// COMMUNITY, CORES, COMPONENTS
// ============================================================================

#[test]
fn test_louvain_on_every_type_combination() {
    for_each_combination(|handle, graph, vertex_type, _| {
        let result = algorithms::louvain(handle, graph, &LouvainOptions::default(), false).unwrap();
        assert_eq!(result.vertices().dtype(), vertex_type);
        assert_eq!(result.clusters().dtype(), DataType::Int32);
        // Weighted split of the two triangles scores 0.25
        assert!(result.modularity() > 0.2);

        let clusters: Vec<f64> = result.clusters().to_vec::<i32>().unwrap().iter().map(|&c| f64::from(c)).collect();
        let clusters = by_label(&read_vertices(&result.vertices()).unwrap(), &clusters);
        assert_eq!(clusters[0], clusters[1]);
        assert_eq!(clusters[1], clusters[2]);
        assert_eq!(clusters[3], clusters[5]);
        assert_ne!(clusters[0], clusters[3]);
    });
}

#[test]
fn test_triangles_and_cores_on_every_type_combination() {
    for_each_combination(|handle, graph, vertex_type, _| {
        let triangles = algorithms::triangle_count(handle, graph, None, false).unwrap();
        assert_eq!(triangles.vertices().dtype(), vertex_type);
        let total: i64 = read_vertices(&triangles.counts()).unwrap().iter().sum();
        assert_eq!(total, 6);

        let cores = algorithms::core_number(handle, graph, DegreeType::Out, false).unwrap();
        assert_eq!(cores.core_numbers().dtype(), vertex_type);
        assert!(read_vertices(&cores.core_numbers()).unwrap().iter().all(|&k| k == 2));

        let truss = algorithms::k_truss_subgraph(handle, graph, 3, false).unwrap();
        assert_eq!(truss.sources().dtype(), vertex_type);
        assert_eq!(truss.sources().size(), 12);
    });
}

#[test]
fn test_components_on_every_type_combination() {
    for_each_combination(|handle, graph, vertex_type, _| {
        let weak = algorithms::weakly_connected_components(handle, graph, false).unwrap();
        let strong = algorithms::strongly_connected_components(handle, graph, false).unwrap();
        for result in [weak, strong] {
            assert_eq!(result.labels().dtype(), vertex_type);
            let labels = read_vertices(&result.labels()).unwrap();
            assert!(labels.iter().all(|&l| l == labels[0]));
        }
    });
}

// ============================================================================
// SIMILARITY, SUBGRAPHS, SAMPLING
// ============================================================================

#[test]
fn test_similarity_on_every_type_combination() {
    for_each_combination(|handle, graph, vertex_type, weight_type| {
        let first = vertex_array(handle, vertex_type, &[0, 2]).unwrap();
        let second = vertex_array(handle, vertex_type, &[1, 3]).unwrap();
        let pairs = algorithms::create_vertex_pairs(handle, graph, &first.view(), &second.view(), false).unwrap();
        let result = algorithms::jaccard_coefficients(handle, graph, &pairs, false, false).unwrap();
        assert_eq!(result.coefficients().dtype(), weight_type);

        let values = read_weights(&result.coefficients()).unwrap();
        assert!((values[0] - 1.0 / 3.0).abs() < 1e-6);
        assert!(values[1].abs() < 1e-9);
    });
}

#[test]
fn test_ego_on_every_type_combination() {
    for_each_combination(|handle, graph, vertex_type, weight_type| {
        let sources = vertex_array(handle, vertex_type, &[0]).unwrap();
        let ego = algorithms::extract_ego(handle, graph, &sources.view(), 1, false).unwrap();
        assert_eq!(ego.sources().dtype(), vertex_type);
        assert_eq!(ego.weights().unwrap().dtype(), weight_type);
        // Triangle 0-1-2 in both directions
        assert_eq!(ego.sources().size(), 6);
        assert_eq!(read_offsets(&ego.subgraph_offsets()).unwrap(), vec![0, 6]);
    });
}

#[test]
fn test_random_walks_on_every_type_combination() {
    for_each_combination(|handle, graph, vertex_type, weight_type| {
        let rng = RngState::new(handle, 42);
        let starts = vertex_array(handle, vertex_type, &[0, 5]).unwrap();
        let options = RandomWalkOptions {
            max_length: 3,
            ..RandomWalkOptions::default()
        };
        let walks = algorithms::uniform_random_walks(handle, &rng, graph, &starts.view(), &options, false).unwrap();
        assert_eq!(walks.paths().dtype(), vertex_type);
        assert_eq!(walks.weights().dtype(), weight_type);
        assert_eq!(walks.max_path_length(), 3);

        let paths = read_vertices(&walks.paths()).unwrap();
        assert_eq!(paths.len(), 8);
        assert_eq!(paths[0], 0);
        assert_eq!(paths[4], 5);
    });
}

// ============================================================================
// GENERATORS
// ============================================================================

#[test]
fn test_generated_weights_take_requested_type() {
    for weight_type in WEIGHT_TYPES {
        let handle = ResourceHandle::new();
        let rng = RngState::new(&handle, 7);
        let options = trueno_graph_api::RmatOptions {
            scale: 4,
            num_edges: 32,
            ..trueno_graph_api::RmatOptions::default()
        };
        let mut coo = algorithms::generate_rmat_edgelist(&handle, &rng, &options).unwrap();
        assert_eq!(coo.sources().dtype(), DataType::Int32);

        algorithms::generate_edge_weights(&handle, &rng, &mut coo, weight_type, 1.0, 3.0).unwrap();
        let weights = coo.weights().unwrap();
        assert_eq!(weights.dtype(), weight_type);
        assert!(read_weights(&weights).unwrap().iter().all(|w| (1.0..=3.0).contains(w)));
    }
}

#[test]
fn test_mixed_input_type_is_rejected() {
    let handle = ResourceHandle::new();
    let graph = story_graph(&handle, DataType::Int64, DataType::Float32);
    let seeds = TypeErasedDeviceArray::from_slice(&handle, &[0_i32]).unwrap();
    let err = algorithms::bfs(&handle, &graph, &seeds.view(), &BfsOptions::default(), false).unwrap_err();
    assert_eq!(err.code(), trueno_graph_api::StatusCode::TypeMismatch);
}
