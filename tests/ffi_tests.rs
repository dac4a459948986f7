//! C ABI tests
//!
//! Drive the `tg_` entry points the way a C caller would: raw pointers in,
//! status codes and error objects out, every object released explicitly.

use std::ffi::{c_void, CStr};
use std::ptr;
use std::thread;
use trueno_graph_api::ffi::*;
use trueno_graph_api::{GraphProperties, ResourceHandle, StatusCode, TypeErasedDeviceArrayView};

type View = TypeErasedDeviceArrayView;

const INT32: i32 = 0;
const INT64: i32 = 1;
const FLOAT32: i32 = 2;

/// View over caller memory; `data` must outlive the view
unsafe fn view_of<T>(data: &mut [T], dtype: i32) -> *mut View {
    let mut view = ptr::null_mut();
    let mut error = ptr::null_mut();
    let status = unsafe {
        tg_type_erased_device_array_view_create(
            data.as_mut_ptr().cast::<c_void>(),
            data.len(),
            dtype,
            &mut view,
            &mut error,
        )
    };
    assert_eq!(status, StatusCode::Success);
    view
}

/// Copy a result view out and release it
unsafe fn take<T: Default + Clone>(handle: *const ResourceHandle, view: *mut View) -> Vec<T> {
    assert!(!view.is_null());
    let mut out = vec![T::default(); unsafe { tg_type_erased_device_array_view_size(view) }];
    let mut error = ptr::null_mut();
    let status =
        unsafe { tg_type_erased_device_array_view_copy_to_host(handle, out.as_mut_ptr().cast::<u8>(), view, &mut error) };
    assert_eq!(status, StatusCode::Success);
    unsafe { tg_type_erased_device_array_view_free(view) };
    out
}

/// Graph over caller-owned `INT32` edge arrays
unsafe fn graph_of(
    handle: *const ResourceHandle,
    src: &mut [i32],
    dst: &mut [i32],
    properties: GraphProperties,
    store_transposed: bool,
) -> *mut trueno_graph_api::Graph {
    unsafe {
        let (s, d) = (view_of(src, INT32), view_of(dst, INT32));
        let mut graph = ptr::null_mut();
        let mut error = ptr::null_mut();
        let status = tg_graph_create_sg(
            handle,
            &properties,
            ptr::null(),
            s,
            d,
            ptr::null(),
            ptr::null(),
            ptr::null(),
            store_transposed.into(),
            Bool::True,
            Bool::False,
            Bool::False,
            Bool::False,
            Bool::True,
            &mut graph,
            &mut error,
        );
        assert_eq!(status, StatusCode::Success);
        assert!(error.is_null());
        tg_type_erased_device_array_view_free(s);
        tg_type_erased_device_array_view_free(d);
        graph
    }
}

#[test]
fn test_bfs_through_c_abi() {
    unsafe {
        let handle = tg_create_resource_handle(ptr::null_mut());
        assert_eq!(tg_resource_handle_get_rank(handle), 0);
        assert_eq!(tg_resource_handle_get_comm_size(handle), 1);

        let (mut src, mut dst) = (vec![0, 1, 1, 2, 2, 2, 3, 4], vec![1, 3, 4, 0, 1, 3, 5, 5]);
        let graph = graph_of(handle, &mut src, &mut dst, GraphProperties::directed(), false);
        assert_eq!(tg_graph_number_of_vertices(graph), 6);
        assert_eq!(tg_graph_number_of_edges(graph), 8);
        assert_eq!(tg_graph_vertex_type(graph), INT32);

        let mut seeds = vec![0_i32];
        let seed_view = view_of(&mut seeds, INT32);
        let mut result = ptr::null_mut();
        let mut error = ptr::null_mut();
        let status = tg_bfs(
            handle,
            graph,
            seed_view,
            Bool::False,
            usize::MAX,
            Bool::True,
            Bool::True,
            &mut result,
            &mut error,
        );
        assert_eq!(status, StatusCode::Success);

        let distances: Vec<i32> = take(handle, tg_paths_result_get_distances(result));
        let predecessors: Vec<i32> = take(handle, tg_paths_result_get_predecessors(result));
        assert_eq!(distances, vec![0, 1, i32::MAX, 2, 2, 3]);
        assert_eq!(predecessors, vec![-1, 0, -1, 1, 1, 3]);

        tg_paths_result_free(result);
        tg_type_erased_device_array_view_free(seed_view);
        tg_sg_graph_free(graph);
        tg_free_resource_handle(handle);
    }
}

#[test]
fn test_pagerank_through_c_abi() {
    unsafe {
        let handle = tg_create_resource_handle(ptr::null_mut());
        let (mut src, mut dst) = (vec![0, 1, 2], vec![1, 2, 3]);
        let graph = graph_of(handle, &mut src, &mut dst, GraphProperties::directed(), true);

        let mut result = ptr::null_mut();
        let mut error = ptr::null_mut();
        let status = tg_pagerank(
            handle,
            graph,
            ptr::null(),
            ptr::null(),
            ptr::null(),
            ptr::null(),
            0.85,
            1.0e-6,
            100,
            Bool::False,
            &mut result,
            &mut error,
        );
        assert_eq!(status, StatusCode::Success);
        assert_eq!(tg_centrality_result_converged(result), Bool::True);

        let values: Vec<f32> = take(handle, tg_centrality_result_get_values(result));
        for (actual, expected) in values.iter().zip([0.116_156_f32, 0.214_888, 0.298_811, 0.370_145]) {
            assert!((actual - expected).abs() < 1e-3);
        }

        // Two iterations cannot converge
        tg_centrality_result_free(result);
        let status = tg_pagerank(
            handle,
            graph,
            ptr::null(),
            ptr::null(),
            ptr::null(),
            ptr::null(),
            0.85,
            1.0e-6,
            2,
            Bool::False,
            &mut result,
            &mut error,
        );
        assert_eq!(status, StatusCode::InvalidInput);
        assert!(result.is_null());
        tg_error_free(error);

        let status = tg_pagerank_allow_nonconvergence(
            handle,
            graph,
            ptr::null(),
            ptr::null(),
            ptr::null(),
            ptr::null(),
            0.85,
            1.0e-6,
            2,
            Bool::False,
            &mut result,
            &mut error,
        );
        assert_eq!(status, StatusCode::Success);
        assert_eq!(tg_centrality_result_converged(result), Bool::False);
        assert_eq!(tg_centrality_result_get_num_iterations(result), 2);

        tg_centrality_result_free(result);
        tg_graph_free(graph);
        tg_free_resource_handle(handle);
    }
}

#[test]
fn test_errors_carry_code_and_message() {
    unsafe {
        let handle = tg_create_resource_handle(ptr::null_mut());
        let mut seeds = vec![0_i32];
        let seed_view = view_of(&mut seeds, INT32);

        let mut result = ptr::null_mut();
        let mut error = ptr::null_mut();
        let status = tg_bfs(
            handle,
            ptr::null(),
            seed_view,
            Bool::False,
            usize::MAX,
            Bool::False,
            Bool::False,
            &mut result,
            &mut error,
        );
        assert_eq!(status, StatusCode::InvalidPointer);
        assert!(result.is_null());
        assert_eq!(tg_error_code(error), StatusCode::InvalidPointer);
        let message = CStr::from_ptr(tg_error_message(error)).to_str().unwrap();
        assert!(message.contains("graph"), "{message}");
        tg_error_free(error);

        let mut array = ptr::null_mut();
        let status = tg_type_erased_device_array_create(handle, 4, 17, &mut array, &mut error);
        assert_eq!(status, StatusCode::InvalidValue);
        assert!(array.is_null());
        tg_error_free(error);

        // Optional pairs must be complete
        let (mut src, mut dst) = (vec![0, 1], vec![1, 0]);
        let graph = graph_of(handle, &mut src, &mut dst, GraphProperties::directed(), true);
        let mut pr_result = ptr::null_mut();
        let status = tg_pagerank(
            handle,
            graph,
            seed_view,
            ptr::null(),
            ptr::null(),
            ptr::null(),
            0.85,
            1.0e-6,
            100,
            Bool::False,
            &mut pr_result,
            &mut error,
        );
        assert_eq!(status, StatusCode::InvalidPointer);
        assert!(pr_result.is_null());
        tg_error_free(error);

        tg_graph_free(graph);
        tg_type_erased_device_array_view_free(seed_view);
        tg_free_resource_handle(handle);
    }
}

#[test]
fn test_similarity_pairs_are_borrowed() {
    unsafe {
        let handle = tg_create_resource_handle(ptr::null_mut());
        let (mut src, mut dst) = (vec![0, 1, 0, 2, 1, 2, 2, 3], vec![1, 0, 2, 0, 2, 1, 3, 2]);
        let graph = graph_of(handle, &mut src, &mut dst, GraphProperties::symmetric(), false);

        let (mut first, mut second) = (vec![0_i32, 0], vec![1_i32, 3]);
        let (fv, sv) = (view_of(&mut first, INT32), view_of(&mut second, INT32));
        let mut pairs = ptr::null_mut();
        let mut error = ptr::null_mut();
        assert_eq!(
            tg_create_vertex_pairs(handle, graph, fv, sv, Bool::True, &mut pairs, &mut error),
            StatusCode::Success
        );

        let mut result = ptr::null_mut();
        assert_eq!(
            tg_jaccard_coefficients(handle, graph, pairs, Bool::False, Bool::False, &mut result, &mut error),
            StatusCode::Success
        );
        let coefficients: Vec<f32> = take(handle, tg_similarity_result_get_similarity(result));
        assert!((coefficients[0] - 1.0 / 3.0).abs() < 1e-6);
        assert!((coefficients[1] - 0.5).abs() < 1e-6);

        let borrowed = tg_similarity_result_get_vertex_pairs(result);
        let seconds: Vec<i32> = take(handle, tg_vertex_pairs_get_second(borrowed));
        assert_eq!(seconds, vec![1, 3]);

        tg_similarity_result_free(result);
        tg_vertex_pairs_free(pairs);
        tg_type_erased_device_array_view_free(fv);
        tg_type_erased_device_array_view_free(sv);
        tg_graph_free(graph);
        tg_free_resource_handle(handle);
    }
}

#[test]
fn test_clustering_score_written_through_pointer() {
    unsafe {
        let handle = tg_create_resource_handle(ptr::null_mut());
        let (mut src, mut dst) = (vec![0, 1, 2, 3], vec![1, 0, 3, 2]);
        let graph = graph_of(handle, &mut src, &mut dst, GraphProperties::symmetric(), false);

        let (mut vertices, mut clusters) = (vec![0_i32, 1, 2, 3], vec![0_i32, 0, 1, 1]);
        let (vv, cv) = (view_of(&mut vertices, INT32), view_of(&mut clusters, INT32));
        let mut score = f64::NAN;
        let mut error = ptr::null_mut();
        let status = tg_analyze_clustering_edge_cut(handle, graph, 2, vv, cv, &mut score, &mut error);
        assert_eq!(status, StatusCode::Success);
        assert!(score.abs() < 1e-12);

        let status = tg_analyze_clustering_modularity(handle, graph, 2, vv, cv, ptr::null_mut(), &mut error);
        assert_eq!(status, StatusCode::InvalidPointer);
        tg_error_free(error);

        tg_type_erased_device_array_view_free(vv);
        tg_type_erased_device_array_view_free(cv);
        tg_graph_free(graph);
        tg_free_resource_handle(handle);
    }
}

#[test]
fn test_sampling_with_options_object() {
    unsafe {
        let handle = tg_create_resource_handle(ptr::null_mut());
        let mut rng = ptr::null_mut();
        let mut error = ptr::null_mut();
        assert_eq!(tg_rng_state_create(handle, 5, &mut rng, &mut error), StatusCode::Success);

        let (mut src, mut dst) = (vec![0, 0, 0, 1], vec![1, 2, 3, 2]);
        let graph = graph_of(handle, &mut src, &mut dst, GraphProperties::directed(), false);

        let mut options = ptr::null_mut();
        assert_eq!(tg_sampling_options_create(&mut options, &mut error), StatusCode::Success);
        tg_sampling_set_return_hops(options, Bool::True);

        let mut fan_out_array = ptr::null_mut();
        assert_eq!(
            tg_type_erased_host_array_create(handle, 1, INT32, &mut fan_out_array, &mut error),
            StatusCode::Success
        );
        let fan_out = tg_type_erased_host_array_view(fan_out_array);
        let mut two = 2_i32.to_ne_bytes();
        assert_eq!(
            tg_type_erased_device_array_view_copy_from_host(handle, fan_out, two.as_mut_ptr(), &mut error),
            StatusCode::Success
        );

        let mut starts = vec![0_i32];
        let start_view = view_of(&mut starts, INT32);
        let mut sample = ptr::null_mut();
        let status = tg_uniform_neighbor_sample(
            handle,
            rng,
            graph,
            start_view,
            ptr::null(),
            fan_out,
            options,
            Bool::False,
            &mut sample,
            &mut error,
        );
        assert_eq!(status, StatusCode::Success);

        let minors: Vec<i32> = take(handle, tg_sample_result_get_minors(sample));
        assert_eq!(minors.len(), 2);
        assert!(minors.iter().all(|v| [1, 2, 3].contains(v)));
        let hops: Vec<i32> = take(handle, tg_sample_result_get_hop(sample));
        assert_eq!(hops, vec![0, 0]);
        assert!(tg_sample_result_get_label(sample).is_null());

        tg_sample_result_free(sample);
        tg_type_erased_device_array_view_free(start_view);
        tg_type_erased_device_array_view_free(fan_out);
        tg_type_erased_host_array_free(fan_out_array);
        tg_sampling_options_free(options);
        tg_graph_free(graph);
        tg_rng_state_free(rng);
        tg_free_resource_handle(handle);
    }
}

#[test]
fn test_rmat_edge_list_with_ids() {
    unsafe {
        let handle = tg_create_resource_handle(ptr::null_mut());
        let mut rng = ptr::null_mut();
        let mut error = ptr::null_mut();
        assert_eq!(tg_rng_state_create(handle, 1, &mut rng, &mut error), StatusCode::Success);

        let mut coo = ptr::null_mut();
        let status = tg_generate_rmat_edgelist(
            handle,
            rng,
            5,
            40,
            0.57,
            0.19,
            0.19,
            Bool::False,
            Bool::True,
            &mut coo,
            &mut error,
        );
        assert_eq!(status, StatusCode::Success);
        assert_eq!(tg_generate_edge_ids(handle, coo, &mut error), StatusCode::Success);
        assert!(tg_coo_get_edge_weights(coo).is_null());

        let ids: Vec<i32> = take(handle, tg_coo_get_edge_id(coo));
        assert_eq!(ids, (0..40).collect::<Vec<_>>());
        let sources: Vec<i32> = take(handle, tg_coo_get_sources(coo));
        assert!(sources.iter().all(|&v| (0..32).contains(&v)));

        let status = tg_generate_edge_weights(handle, rng, coo, INT64, 0.0, 1.0, &mut error);
        assert_eq!(status, StatusCode::TypeMismatch);
        tg_error_free(error);
        assert_eq!(tg_generate_edge_weights(handle, rng, coo, FLOAT32, 0.0, 1.0, &mut error), StatusCode::Success);
        let weights: Vec<f32> = take(handle, tg_coo_get_edge_weights(coo));
        assert_eq!(weights.len(), 40);

        tg_coo_free(coo);
        tg_rng_state_free(rng);
        tg_free_resource_handle(handle);
    }
}

#[test]
fn test_unimplemented_walks_report_status() {
    unsafe {
        let handle = tg_create_resource_handle(ptr::null_mut());
        let mut rng = ptr::null_mut();
        let mut error = ptr::null_mut();
        assert_eq!(tg_rng_state_create(handle, 1, &mut rng, &mut error), StatusCode::Success);
        let (mut src, mut dst) = (vec![0, 1], vec![1, 0]);
        let graph = graph_of(handle, &mut src, &mut dst, GraphProperties::directed(), false);
        let mut starts = vec![0_i32];
        let start_view = view_of(&mut starts, INT32);

        let mut walks = ptr::null_mut();
        let status =
            tg_node2vec_random_walks(handle, rng, graph, start_view, 3, 1.0, 2.0, Bool::False, &mut walks, &mut error);
        assert_eq!(status, StatusCode::NotImplemented);
        tg_error_free(error);

        let status = tg_uniform_random_walks(handle, rng, graph, start_view, 3, Bool::False, &mut walks, &mut error);
        assert_eq!(status, StatusCode::Success);
        let paths: Vec<i32> = take(handle, tg_random_walk_result_get_paths(walks));
        assert_eq!(paths, vec![0, 1, 0, 1]);
        assert_eq!(tg_random_walk_result_get_max_path_length(walks), 3);

        tg_random_walk_result_free(walks);
        tg_type_erased_device_array_view_free(start_view);
        tg_graph_free(graph);
        tg_rng_state_free(rng);
        tg_free_resource_handle(handle);
    }
}

/// Raw pointer moved onto a rank thread
struct Shipped(*mut trueno_graph_api::Communicator);

// SAFETY: every communicator is used by exactly one thread
unsafe impl Send for Shipped {}

#[test]
fn test_multi_partition_graph_through_c_abi() {
    let mut comms = vec![ptr::null_mut(); 2];
    let mut error = ptr::null_mut();
    assert_eq!(
        unsafe { tg_create_comm_group(2, comms.as_mut_ptr(), &mut error) },
        StatusCode::Success
    );

    let counts: Vec<(usize, usize)> = comms
        .into_iter()
        .map(|comm| {
            let comm = Shipped(comm);
            thread::spawn(move || unsafe {
                let comm = comm;
                let handle = tg_create_resource_handle(comm.0);
                let rank = tg_resource_handle_get_rank(handle);
                let (mut src, mut dst) = if rank == 0 {
                    (vec![0_i64, 1], vec![1_i64, 2])
                } else {
                    (vec![2_i64, 3], vec![3_i64, 0])
                };
                let (s, d) = (view_of(&mut src, INT64), view_of(&mut dst, INT64));
                let (src_list, dst_list) = ([s.cast_const()], [d.cast_const()]);

                let mut graph = ptr::null_mut();
                let mut error = ptr::null_mut();
                let status = tg_graph_create_mg(
                    handle,
                    &GraphProperties::directed(),
                    ptr::null(),
                    src_list.as_ptr(),
                    dst_list.as_ptr(),
                    ptr::null(),
                    ptr::null(),
                    ptr::null(),
                    Bool::False,
                    1,
                    Bool::False,
                    Bool::False,
                    Bool::False,
                    Bool::True,
                    &mut graph,
                    &mut error,
                );
                assert_eq!(status, StatusCode::Success);
                assert_eq!(tg_graph_is_multi_partition(graph), Bool::True);
                let counts = (tg_graph_number_of_vertices(graph), tg_graph_number_of_edges(graph));

                tg_mg_graph_free(graph);
                tg_type_erased_device_array_view_free(s);
                tg_type_erased_device_array_view_free(d);
                tg_free_resource_handle(handle);
                counts
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    assert_eq!(counts, vec![(4, 4), (4, 4)]);
}

#[test]
fn test_null_objects_are_tolerated() {
    unsafe {
        tg_free_resource_handle(ptr::null_mut());
        tg_graph_free(ptr::null_mut());
        tg_paths_result_free(ptr::null_mut());
        tg_error_free(ptr::null_mut());
        assert_eq!(tg_graph_number_of_vertices(ptr::null()), 0);
        assert!(tg_paths_result_get_vertices(ptr::null()).is_null());
        assert_eq!(tg_resource_handle_get_rank(ptr::null()), -1);
    }
    // Handles created through the Rust API interoperate with the C entry points
    let handle = ResourceHandle::new();
    assert_eq!(unsafe { tg_resource_handle_get_comm_size(&handle) }, 1);
}
