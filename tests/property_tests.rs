//! Property-based tests for trueno-graph-api
//!
//! Verifies array, construction and algorithm invariants hold for arbitrary
//! edge lists

use proptest::prelude::*;
use trueno_graph_api::algorithms::{self, PageRankViews};
use trueno_graph_api::{
    sg_graph_create, BfsOptions, DataType, EdgeListViews, Element, Graph, GraphBuildOptions, GraphProperties,
    PageRankOptions, ResourceHandle, TypeErasedDeviceArray,
};

fn build(handle: &ResourceHandle, edges: &[(i32, i32)], properties: GraphProperties, options: &GraphBuildOptions) -> Graph {
    let src: Vec<i32> = edges.iter().map(|e| e.0).collect();
    let dst: Vec<i32> = edges.iter().map(|e| e.1).collect();
    let s = TypeErasedDeviceArray::from_slice(handle, &src).unwrap();
    let d = TypeErasedDeviceArray::from_slice(handle, &dst).unwrap();
    let (sv, dv) = (s.view(), d.view());
    sg_graph_create(handle, properties, &EdgeListViews::new(&sv, &dv), options).unwrap()
}

fn symmetrized(handle: &ResourceHandle, edges: &[(i32, i32)]) -> Graph {
    let options = GraphBuildOptions {
        symmetrize: true,
        drop_self_loops: true,
        drop_multi_edges: true,
        ..GraphBuildOptions::default()
    };
    build(handle, edges, GraphProperties::directed(), &options)
}

/// Copy through a fresh array and back out
fn round_trip<T: Element + PartialEq>(values: &[T]) -> Result<(), TestCaseError> {
    let handle = ResourceHandle::new();
    let source = TypeErasedDeviceArray::from_slice(&handle, values).unwrap();
    prop_assert_eq!(source.dtype(), T::DTYPE);

    let target = TypeErasedDeviceArray::create(&handle, values.len(), T::DTYPE).unwrap();
    target.view().copy_from(&handle, &source.view()).unwrap();
    let out: Vec<T> = target.to_vec().unwrap();
    prop_assert_eq!(out.as_slice(), values);
    Ok(())
}

// Property: every element type survives a device copy unchanged
proptest! {
    #[test]
    fn prop_array_copy_preserves_values(
        ints in prop::collection::vec(any::<i32>(), 0..64),
        longs in prop::collection::vec(any::<i64>(), 0..64),
        floats in prop::collection::vec(-1.0e6f32..1.0e6, 0..64),
        doubles in prop::collection::vec(-1.0e12f64..1.0e12, 0..64),
        sizes in prop::collection::vec(any::<usize>(), 0..64),
    ) {
        round_trip(&ints)?;
        round_trip(&longs)?;
        round_trip(&floats)?;
        round_trip(&doubles)?;
        round_trip(&sizes)?;
    }
}

// Property: without drops every input edge is kept and degrees add up
proptest! {
    #[test]
    fn prop_degrees_sum_to_edge_count(edges in prop_edge_list(1usize..120usize, 1i32..40i32)) {
        let handle = ResourceHandle::new();
        let graph = build(&handle, &edges, GraphProperties::directed(), &GraphBuildOptions::default());
        prop_assert_eq!(graph.number_of_edges(), edges.len());

        let degrees = algorithms::degrees(&handle, &graph, None, false).unwrap();
        let ins: Vec<i32> = degrees.in_degrees().unwrap().to_vec().unwrap();
        let outs: Vec<i32> = degrees.out_degrees().unwrap().to_vec().unwrap();
        prop_assert_eq!(ins.iter().sum::<i32>() as usize, edges.len());
        prop_assert_eq!(outs.iter().sum::<i32>() as usize, edges.len());
    }
}

// Property: symmetrized graphs pass the symmetry check and balance degrees
proptest! {
    #[test]
    fn prop_symmetrize_balances_degrees(edges in prop_edge_list(1usize..80usize, 1i32..30i32)) {
        let handle = ResourceHandle::new();
        let graph = symmetrized(&handle, &edges);
        prop_assert!(graph.properties().is_symmetric);

        let degrees = algorithms::degrees(&handle, &graph, None, false).unwrap();
        let ins: Vec<i32> = degrees.in_degrees().unwrap().to_vec().unwrap();
        let outs: Vec<i32> = degrees.out_degrees().unwrap().to_vec().unwrap();
        prop_assert_eq!(ins, outs);
    }
}

// Property: BFS hop counts never jump by more than one along an edge
proptest! {
    #[test]
    fn prop_bfs_distances_are_consistent(edges in prop_edge_list(1usize..100usize, 1i32..30i32)) {
        let handle = ResourceHandle::new();
        let graph = build(&handle, &edges, GraphProperties::directed(), &GraphBuildOptions::default());
        let seed = TypeErasedDeviceArray::from_slice(&handle, &[edges[0].0]).unwrap();
        let result = algorithms::bfs(&handle, &graph, &seed.view(), &BfsOptions::default(), false).unwrap();

        let vertices: Vec<i32> = result.vertices().to_vec().unwrap();
        let distances: Vec<i32> = result.distances().to_vec().unwrap();
        let distance = |label: i32| {
            let i = vertices.iter().position(|&v| v == label).unwrap();
            distances[i]
        };
        prop_assert_eq!(distance(edges[0].0), 0);
        for &(u, v) in &edges {
            let (du, dv) = (distance(u), distance(v));
            if du != i32::MAX {
                prop_assert!(dv <= du + 1, "edge ({}, {}) with hops {} -> {}", u, v, du, dv);
            }
        }
    }
}

// Property: PageRank scores form a probability distribution
proptest! {
    #[test]
    fn prop_pagerank_sums_to_one(edges in prop_edge_list(1usize..80usize, 1i32..25i32)) {
        let handle = ResourceHandle::new();
        let graph = build(&handle, &edges, GraphProperties::directed(), &GraphBuildOptions::default());
        let result = algorithms::pagerank_allow_nonconvergence(
            &handle,
            &graph,
            &PageRankViews::default(),
            &PageRankOptions::default(),
            false,
        )
        .unwrap();
        let values: Vec<f32> = result.values().to_vec().unwrap();
        let total: f32 = values.iter().sum();
        prop_assert!((total - 1.0).abs() < 1e-3, "sum {}", total);
        prop_assert!(values.iter().all(|&v| v > 0.0));
    }
}

// Property: similarity coefficients are symmetric and within [0, 1]
proptest! {
    #[test]
    fn prop_similarity_is_symmetric(edges in prop_edge_list(1usize..60usize, 2i32..20i32)) {
        let handle = ResourceHandle::new();
        let graph = symmetrized(&handle, &edges);
        let degrees = algorithms::degrees(&handle, &graph, None, false).unwrap();
        let labels: Vec<i32> = degrees.vertices().to_vec().unwrap();

        let first: Vec<i32> = labels.iter().flat_map(|&u| labels.iter().map(move |_| u)).collect();
        let second: Vec<i32> = labels.iter().flat_map(|_| labels.iter().copied()).collect();
        let n = labels.len();
        let forward = TypeErasedDeviceArray::from_slice(&handle, &first).unwrap();
        let backward = TypeErasedDeviceArray::from_slice(&handle, &second).unwrap();
        let pairs =
            algorithms::create_vertex_pairs(&handle, &graph, &forward.view(), &backward.view(), false).unwrap();

        for score in [
            algorithms::jaccard_coefficients,
            algorithms::sorensen_coefficients,
            algorithms::overlap_coefficients,
        ] {
            let result = score(&handle, &graph, &pairs, false, false).unwrap();
            let values: Vec<f32> = result.coefficients().to_vec().unwrap();
            for i in 0..n {
                for j in 0..n {
                    let (a, b) = (values[i * n + j], values[j * n + i]);
                    prop_assert!((a - b).abs() < 1e-6);
                    prop_assert!((0.0..=1.0).contains(&a));
                }
            }
        }
    }
}

// Property: Parquet round trip preserves every column
#[cfg(feature = "storage")]
proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]
    #[test]
    fn prop_parquet_roundtrip(edges in prop_edge_list(1usize..100usize, 1i32..20i32)) {
        use trueno_graph_api::{read_edgelist_parquet, write_edgelist_parquet, EdgeListArrays};

        let runtime = tokio::runtime::Runtime::new().unwrap();

        runtime.block_on(async {
            let handle = ResourceHandle::new();
            let src: Vec<i32> = edges.iter().map(|e| e.0).collect();
            let dst: Vec<i32> = edges.iter().map(|e| e.1).collect();
            let weights: Vec<f64> = edges.iter().map(|e| f64::from(e.0) * 0.5).collect();
            let arrays = EdgeListArrays {
                src: TypeErasedDeviceArray::from_slice(&handle, &src).unwrap(),
                dst: TypeErasedDeviceArray::from_slice(&handle, &dst).unwrap(),
                weights: Some(TypeErasedDeviceArray::from_slice(&handle, &weights).unwrap()),
                edge_ids: None,
                edge_types: None,
            };

            // Write to temp file
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("prop_test_edges.parquet");
            write_edgelist_parquet(&path, &arrays).await.unwrap();

            // Read back
            let loaded = read_edgelist_parquet(&handle, &path).await.unwrap();
            prop_assert_eq!(loaded.src.dtype(), DataType::Int32);
            prop_assert_eq!(loaded.src.to_vec::<i32>().unwrap(), src);
            prop_assert_eq!(loaded.dst.to_vec::<i32>().unwrap(), dst);
            prop_assert_eq!(loaded.weights.as_ref().unwrap().to_vec::<f64>().unwrap(), weights);
            prop_assert!(loaded.edge_types.is_none());

            Ok::<(), TestCaseError>(())
        })?;
    }
}

// Helper: Generate arbitrary edge list
fn prop_edge_list(
    num_edges: impl Strategy<Value = usize>,
    max_node: impl Strategy<Value = i32>,
) -> impl Strategy<Value = Vec<(i32, i32)>> {
    (num_edges, max_node).prop_flat_map(|(n, max_node)| {
        // Ensure max_node is at least 1 to avoid empty range
        let max_node = max_node.max(1);
        prop::collection::vec((0..max_node, 0..max_node), 1..=n)
    })
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use trueno_graph_api::StatusCode;

    #[test]
    fn test_single_edge_invariants() {
        let handle = ResourceHandle::new();
        let graph = build(&handle, &[(0, 1)], GraphProperties::directed(), &GraphBuildOptions::default());

        // Should have 2 vertices and 1 edge
        assert_eq!(graph.number_of_vertices(), 2);
        assert_eq!(graph.number_of_edges(), 1);
        assert_eq!(graph.vertex_type(), DataType::Int32);
        assert!(!graph.is_weighted());
    }

    #[test]
    fn test_view_as_type_requires_equal_width() {
        let handle = ResourceHandle::new();
        let array = TypeErasedDeviceArray::from_slice(&handle, &[1_i32, 2]).unwrap();
        assert!(array.view_as_type(DataType::Float32).is_ok());
        let err = array.view_as_type(DataType::Int64).unwrap_err();
        assert_eq!(err.code(), StatusCode::UnsupportedTypeCombination);
    }
}
