//! Multi-partition tests
//!
//! Every rank runs on its own thread with a handle bound to a shared
//! in-process communicator group. Results gathered from all ranks must match
//! the single-partition answer.

use std::thread;
use trueno_graph_api::algorithms::{self, PageRankViews};
use trueno_graph_api::{
    create_comm_group, mg_graph_create, sg_graph_create, BfsOptions, EdgeListViews, Graph, GraphBuildOptions,
    GraphProperties, MgEdgeListChunks, PageRankOptions, ResourceHandle, Result, SsspOptions, TypeErasedDeviceArray,
};

const SRC: [i32; 10] = [0, 1, 1, 2, 2, 2, 3, 4, 5, 6];
const DST: [i32; 10] = [1, 3, 4, 0, 1, 3, 5, 5, 6, 4];

/// Run `body` on `size` ranks and collect the per-rank outputs in rank order
fn run_ranks<T: Send + 'static>(size: usize, body: fn(ResourceHandle) -> T) -> Vec<T> {
    create_comm_group(size)
        .unwrap()
        .into_iter()
        .map(|comm| thread::spawn(move || body(ResourceHandle::with_communicator(comm))))
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect()
}

/// Every rank contributes the edges whose position is congruent to its rank
fn mg_graph(handle: &ResourceHandle, store_transposed: bool) -> Result<Graph> {
    let (rank, size) = (handle.rank(), handle.comm_size());
    let src: Vec<i32> = SRC.iter().skip(rank).step_by(size).copied().collect();
    let dst: Vec<i32> = DST.iter().skip(rank).step_by(size).copied().collect();
    let s = TypeErasedDeviceArray::from_slice(handle, &src)?;
    let d = TypeErasedDeviceArray::from_slice(handle, &dst)?;
    let (sv, dv) = (s.view(), d.view());
    let options = GraphBuildOptions {
        store_transposed,
        ..GraphBuildOptions::default()
    };
    mg_graph_create(handle, GraphProperties::directed(), &MgEdgeListChunks::new(&[&sv], &[&dv]), &options)
}

fn sg_graph(handle: &ResourceHandle, store_transposed: bool) -> Graph {
    let s = TypeErasedDeviceArray::from_slice(handle, &SRC).unwrap();
    let d = TypeErasedDeviceArray::from_slice(handle, &DST).unwrap();
    let (sv, dv) = (s.view(), d.view());
    let options = GraphBuildOptions {
        store_transposed,
        ..GraphBuildOptions::default()
    };
    sg_graph_create(handle, GraphProperties::directed(), &EdgeListViews::new(&sv, &dv), &options).unwrap()
}

fn rank0_seeds(handle: &ResourceHandle) -> TypeErasedDeviceArray {
    let seeds: &[i32] = if handle.rank() == 0 { &[0] } else { &[] };
    TypeErasedDeviceArray::from_slice(handle, seeds).unwrap()
}

fn mg_bfs(handle: ResourceHandle) -> Vec<(i32, i32)> {
    let graph = mg_graph(&handle, false).unwrap();
    assert!(graph.is_multi_partition());
    let seeds = rank0_seeds(&handle);
    let result = algorithms::bfs(&handle, &graph, &seeds.view(), &BfsOptions::default(), true).unwrap();
    let vertices: Vec<i32> = result.vertices().to_vec().unwrap();
    let distances: Vec<i32> = result.distances().to_vec().unwrap();
    vertices.into_iter().zip(distances).collect()
}

fn sg_bfs() -> Vec<(i32, i32)> {
    let handle = ResourceHandle::new();
    let graph = sg_graph(&handle, false);
    let seeds = TypeErasedDeviceArray::from_slice(&handle, &[0_i32]).unwrap();
    let result = algorithms::bfs(&handle, &graph, &seeds.view(), &BfsOptions::default(), true).unwrap();
    let vertices: Vec<i32> = result.vertices().to_vec().unwrap();
    let distances: Vec<i32> = result.distances().to_vec().unwrap();
    vertices.into_iter().zip(distances).collect()
}

fn merged<T: Clone>(per_rank: Vec<Vec<(i32, T)>>) -> Vec<(i32, T)> {
    let mut all: Vec<(i32, T)> = per_rank.into_iter().flatten().collect();
    all.sort_by_key(|(v, _)| *v);
    all
}

#[test]
fn test_bfs_on_two_ranks_matches_single_partition() {
    let per_rank = run_ranks(2, mg_bfs);
    assert!(per_rank.iter().all(|owned| !owned.is_empty()));
    assert_eq!(merged(per_rank), sg_bfs());
}

#[test]
fn test_bfs_on_three_ranks_matches_single_partition() {
    assert_eq!(merged(run_ranks(3, mg_bfs)), sg_bfs());
}

#[test]
fn test_every_vertex_owned_once() {
    let per_rank = run_ranks(3, |handle| {
        let graph = mg_graph(&handle, false).unwrap();
        (graph.number_of_vertices(), graph.number_of_edges(), graph.number_of_local_edges())
    });
    assert!(per_rank.iter().all(|&(v, e, _)| v == 7 && e == SRC.len()));
    assert_eq!(per_rank.iter().map(|&(_, _, local)| local).sum::<usize>(), SRC.len());
}

#[test]
fn test_pagerank_on_three_ranks_matches_single_partition() {
    let per_rank = run_ranks(3, |handle| {
        let graph = mg_graph(&handle, true).unwrap();
        let result =
            algorithms::pagerank(&handle, &graph, &PageRankViews::default(), &PageRankOptions::default(), false)
                .unwrap();
        let vertices: Vec<i32> = result.vertices().to_vec().unwrap();
        let values: Vec<f32> = result.values().to_vec().unwrap();
        vertices.into_iter().zip(values).collect::<Vec<_>>()
    });

    let handle = ResourceHandle::new();
    let graph = sg_graph(&handle, true);
    let reference =
        algorithms::pagerank(&handle, &graph, &PageRankViews::default(), &PageRankOptions::default(), false).unwrap();
    let expected: Vec<f32> = reference.values().to_vec().unwrap();

    let actual = merged(per_rank);
    assert_eq!(actual.len(), expected.len());
    for ((_, a), e) in actual.iter().zip(&expected) {
        assert!((a - e).abs() < 1e-5, "{actual:?} != {expected:?}");
    }
}

#[test]
fn test_components_on_two_ranks_match_single_partition() {
    let per_rank = run_ranks(2, |handle| {
        let graph = mg_graph(&handle, false).unwrap();
        let result = algorithms::weakly_connected_components(&handle, &graph, false).unwrap();
        let vertices: Vec<i32> = result.vertices().to_vec().unwrap();
        let labels: Vec<i32> = result.labels().to_vec().unwrap();
        vertices.into_iter().zip(labels).collect::<Vec<_>>()
    });

    let handle = ResourceHandle::new();
    let graph = sg_graph(&handle, false);
    let reference = algorithms::weakly_connected_components(&handle, &graph, false).unwrap();
    let labels: Vec<i32> = reference.labels().to_vec().unwrap();

    let actual: Vec<i32> = merged(per_rank).into_iter().map(|(_, label)| label).collect();
    assert_eq!(actual, labels);
}

const WEIGHTED_SRC: [i32; 8] = [0, 1, 1, 2, 2, 2, 3, 4];
const WEIGHTED_DST: [i32; 8] = [1, 3, 4, 0, 1, 3, 5, 5];
const WEIGHTS: [f32; 8] = [1.0, 2.0, 3.0, 5.0, 3.0, 4.0, 1.0, 2.0];

fn sssp_pairs(handle: &ResourceHandle, graph: &Graph) -> Vec<(i32, f32)> {
    let result = algorithms::sssp(handle, graph, 0, &SsspOptions::default(), true).unwrap();
    let vertices: Vec<i32> = result.vertices().to_vec().unwrap();
    let distances: Vec<f32> = result.distances().to_vec().unwrap();
    vertices.into_iter().zip(distances).collect()
}

#[test]
fn test_uneven_weighted_chunks_match_single_partition() {
    let per_rank = run_ranks(2, |handle| {
        // Rank 0 splits its edges into two chunks, rank 1 passes none
        let mut arrays = Vec::new();
        if handle.rank() == 0 {
            for range in [0..3, 3..WEIGHTED_SRC.len()] {
                arrays.push((
                    TypeErasedDeviceArray::from_slice(&handle, &WEIGHTED_SRC[range.clone()]).unwrap(),
                    TypeErasedDeviceArray::from_slice(&handle, &WEIGHTED_DST[range.clone()]).unwrap(),
                    TypeErasedDeviceArray::from_slice(&handle, &WEIGHTS[range]).unwrap(),
                ));
            }
        }
        let views: Vec<_> = arrays.iter().map(|(s, d, w)| (s.view(), d.view(), w.view())).collect();
        let src: Vec<_> = views.iter().map(|v| &v.0).collect();
        let dst: Vec<_> = views.iter().map(|v| &v.1).collect();
        let weights: Vec<_> = views.iter().map(|v| &v.2).collect();
        let chunks = MgEdgeListChunks::new(&src, &dst).with_weights(&weights);
        assert_eq!(chunks.num_arrays(), if handle.rank() == 0 { 2 } else { 0 });

        let graph =
            mg_graph_create(&handle, GraphProperties::directed(), &chunks, &GraphBuildOptions::default()).unwrap();
        assert!(graph.is_weighted());
        assert_eq!(graph.number_of_edges(), WEIGHTED_SRC.len());
        sssp_pairs(&handle, &graph)
    });

    let handle = ResourceHandle::new();
    let s = TypeErasedDeviceArray::from_slice(&handle, &WEIGHTED_SRC).unwrap();
    let d = TypeErasedDeviceArray::from_slice(&handle, &WEIGHTED_DST).unwrap();
    let w = TypeErasedDeviceArray::from_slice(&handle, &WEIGHTS).unwrap();
    let (sv, dv, wv) = (s.view(), d.view(), w.view());
    let input = EdgeListViews::new(&sv, &dv).with_weights(&wv);
    let graph = sg_graph_create(&handle, GraphProperties::directed(), &input, &GraphBuildOptions::default()).unwrap();
    let expected = sssp_pairs(&handle, &graph);

    let actual = merged(per_rank);
    assert_eq!(actual, expected);
    assert_eq!(
        actual,
        vec![(0, 0.0), (1, 1.0), (2, f32::MAX), (3, 3.0), (4, 4.0), (5, 4.0)]
    );
}

#[test]
fn test_bad_seed_on_one_rank_fails_every_rank() {
    let outcomes = run_ranks(2, |handle| {
        let graph = mg_graph(&handle, false).unwrap();
        let seeds: &[i32] = if handle.rank() == 1 { &[99] } else { &[0] };
        let seeds = TypeErasedDeviceArray::from_slice(&handle, seeds).unwrap();
        algorithms::bfs(&handle, &graph, &seeds.view(), &BfsOptions::default(), false).map(drop)
    });
    assert!(outcomes.iter().all(std::result::Result::is_err));
}

#[test]
fn test_mismatched_collective_order_fails() {
    let outcomes = run_ranks(2, |handle| {
        let graph = mg_graph(&handle, false).unwrap();
        if handle.rank() == 0 {
            let seeds = rank0_seeds(&handle);
            algorithms::bfs(&handle, &graph, &seeds.view(), &BfsOptions::default(), false).map(drop)
        } else {
            algorithms::out_degrees(&handle, &graph, None, false).map(drop)
        }
    });
    assert!(outcomes.iter().all(std::result::Result::is_err));
}
