//! Result accessors and release
//!
//! View accessors hand out a new view object per call; the caller frees it
//! with `tg_type_erased_device_array_view_free`. Views stay readable until
//! the result is freed. Optional outputs that were not produced come back as
//! null.

use super::{release, Bool};
use crate::array::TypeErasedDeviceArrayView;
use crate::results::{
    CentralityResult, ClusteringResult, CooListResult, CooResult, CoreResult, DegreesResult,
    HierarchicalClusteringResult, HitsResult, InducedSubgraphResult, KCoreResult, LabelingResult,
    PathsResult, RandomWalkResult, SampleResult, SimilarityResult, TriangleCountResult, VertexPairsResult,
};
use std::ptr;

fn boxed(view: TypeErasedDeviceArrayView) -> *mut TypeErasedDeviceArrayView {
    Box::into_raw(Box::new(view))
}

macro_rules! result_accessors {
    (
        $ty:ty, $free:ident;
        required { $($name:ident => $method:ident),* $(,)? }
        optional { $($oname:ident => $omethod:ident),* $(,)? }
    ) => {
        $(
            #[no_mangle]
            #[doc = concat!("`", stringify!($method), "` of a [`", stringify!($ty), "`] (null for a null result)")]
            ///
            /// # Safety
            /// `result` must be null or live.
            pub unsafe extern "C" fn $name(result: *const $ty) -> *mut TypeErasedDeviceArrayView {
                unsafe { result.as_ref() }.map_or(ptr::null_mut(), |r| boxed(r.$method()))
            }
        )*
        $(
            #[no_mangle]
            #[doc = concat!("`", stringify!($omethod), "` of a [`", stringify!($ty), "`], null when absent")]
            ///
            /// # Safety
            /// `result` must be null or live.
            pub unsafe extern "C" fn $oname(result: *const $ty) -> *mut TypeErasedDeviceArrayView {
                unsafe { result.as_ref() }
                    .and_then(|r| r.$omethod())
                    .map_or(ptr::null_mut(), boxed)
            }
        )*

        #[no_mangle]
        #[doc = concat!("Release a [`", stringify!($ty), "`]")]
        ///
        /// # Safety
        /// `result` must be null or live, freed at most once.
        pub unsafe extern "C" fn $free(result: *mut $ty) {
            unsafe { release(result) }
        }
    };
}

result_accessors! {
    PathsResult, tg_paths_result_free;
    required {
        tg_paths_result_get_vertices => vertices,
        tg_paths_result_get_distances => distances,
        tg_paths_result_get_predecessors => predecessors,
    }
    optional {}
}

result_accessors! {
    CentralityResult, tg_centrality_result_free;
    required {
        tg_centrality_result_get_vertices => vertices,
        tg_centrality_result_get_values => values,
    }
    optional {}
}

#[no_mangle]
/// Iterations the solver ran (0 for null)
///
/// # Safety
/// `result` must be null or live.
pub unsafe extern "C" fn tg_centrality_result_get_num_iterations(result: *const CentralityResult) -> usize {
    unsafe { result.as_ref() }.map_or(0, CentralityResult::num_iterations)
}

#[no_mangle]
/// `True` when the solver met its tolerance
///
/// # Safety
/// `result` must be null or live.
pub unsafe extern "C" fn tg_centrality_result_converged(result: *const CentralityResult) -> Bool {
    unsafe { result.as_ref() }.is_some_and(CentralityResult::converged).into()
}

result_accessors! {
    HitsResult, tg_hits_result_free;
    required {
        tg_hits_result_get_vertices => vertices,
        tg_hits_result_get_hubs => hubs,
        tg_hits_result_get_authorities => authorities,
    }
    optional {}
}

#[no_mangle]
/// Hub score change of the last iteration (NaN for null)
///
/// # Safety
/// `result` must be null or live.
pub unsafe extern "C" fn tg_hits_result_get_hub_score_differences(result: *const HitsResult) -> f64 {
    unsafe { result.as_ref() }.map_or(f64::NAN, HitsResult::hub_score_difference)
}

#[no_mangle]
/// Iterations HITS ran (0 for null)
///
/// # Safety
/// `result` must be null or live.
pub unsafe extern "C" fn tg_hits_result_get_number_of_iterations(result: *const HitsResult) -> usize {
    unsafe { result.as_ref() }.map_or(0, HitsResult::number_of_iterations)
}

result_accessors! {
    HierarchicalClusteringResult, tg_hierarchical_clustering_result_free;
    required {
        tg_hierarchical_clustering_result_get_vertices => vertices,
        tg_hierarchical_clustering_result_get_clusters => clusters,
    }
    optional {}
}

#[no_mangle]
/// Modularity of the final partition (NaN for null)
///
/// # Safety
/// `result` must be null or live.
pub unsafe extern "C" fn tg_hierarchical_clustering_result_get_modularity(
    result: *const HierarchicalClusteringResult,
) -> f64 {
    unsafe { result.as_ref() }.map_or(f64::NAN, HierarchicalClusteringResult::modularity)
}

result_accessors! {
    ClusteringResult, tg_clustering_result_free;
    required {
        tg_clustering_result_get_vertices => vertices,
        tg_clustering_result_get_clusters => clusters,
    }
    optional {}
}

result_accessors! {
    TriangleCountResult, tg_triangle_count_result_free;
    required {
        tg_triangle_count_result_get_vertices => vertices,
        tg_triangle_count_result_get_counts => counts,
    }
    optional {}
}

result_accessors! {
    CoreResult, tg_core_result_free;
    required {
        tg_core_result_get_vertices => vertices,
        tg_core_result_get_core_numbers => core_numbers,
    }
    optional {}
}

result_accessors! {
    KCoreResult, tg_k_core_result_free;
    required {
        tg_k_core_result_get_src_vertices => sources,
        tg_k_core_result_get_dst_vertices => destinations,
    }
    optional {
        tg_k_core_result_get_weights => weights,
    }
}

result_accessors! {
    LabelingResult, tg_labeling_result_free;
    required {
        tg_labeling_result_get_vertices => vertices,
        tg_labeling_result_get_labels => labels,
    }
    optional {}
}

result_accessors! {
    VertexPairsResult, tg_vertex_pairs_free;
    required {
        tg_vertex_pairs_get_first => first,
        tg_vertex_pairs_get_second => second,
    }
    optional {}
}

result_accessors! {
    SimilarityResult, tg_similarity_result_free;
    required {
        tg_similarity_result_get_similarity => coefficients,
    }
    optional {}
}

#[no_mangle]
/// Vertex pairs of a similarity result
///
/// The pairs are borrowed from the result: do not free them.
///
/// # Safety
/// `result` must be null or live.
pub unsafe extern "C" fn tg_similarity_result_get_vertex_pairs(
    result: *const SimilarityResult,
) -> *const VertexPairsResult {
    unsafe { result.as_ref() }.map_or(ptr::null(), |r| r.vertex_pairs() as *const VertexPairsResult)
}

result_accessors! {
    InducedSubgraphResult, tg_induced_subgraph_result_free;
    required {
        tg_induced_subgraph_get_sources => sources,
        tg_induced_subgraph_get_destinations => destinations,
        tg_induced_subgraph_get_subgraph_offsets => subgraph_offsets,
    }
    optional {
        tg_induced_subgraph_get_edge_weights => weights,
        tg_induced_subgraph_get_edge_ids => edge_ids,
        tg_induced_subgraph_get_edge_type_ids => edge_types,
    }
}

result_accessors! {
    RandomWalkResult, tg_random_walk_result_free;
    required {
        tg_random_walk_result_get_paths => paths,
        tg_random_walk_result_get_weights => weights,
    }
    optional {}
}

#[no_mangle]
/// Steps per walk (0 for null)
///
/// # Safety
/// `result` must be null or live.
pub unsafe extern "C" fn tg_random_walk_result_get_max_path_length(result: *const RandomWalkResult) -> usize {
    unsafe { result.as_ref() }.map_or(0, RandomWalkResult::max_path_length)
}

result_accessors! {
    SampleResult, tg_sample_result_free;
    required {
        tg_sample_result_get_minors => minors,
    }
    optional {
        tg_sample_result_get_majors => majors,
        tg_sample_result_get_major_offsets => major_offsets,
        tg_sample_result_get_edge_weight => weights,
        tg_sample_result_get_edge_id => edge_ids,
        tg_sample_result_get_edge_type => edge_types,
        tg_sample_result_get_hop => hops,
        tg_sample_result_get_label => labels,
        tg_sample_result_get_label_hop_offsets => label_hop_offsets,
        tg_sample_result_get_renumber_map => renumber_map,
        tg_sample_result_get_renumber_map_offsets => renumber_map_offsets,
    }
}

result_accessors! {
    CooResult, tg_coo_free;
    required {
        tg_coo_get_sources => sources,
        tg_coo_get_destinations => destinations,
    }
    optional {
        tg_coo_get_edge_weights => weights,
        tg_coo_get_edge_id => edge_ids,
        tg_coo_get_edge_type => edge_types,
    }
}

#[no_mangle]
/// Number of edge lists (0 for null)
///
/// # Safety
/// `list` must be null or live.
pub unsafe extern "C" fn tg_coo_list_size(list: *const CooListResult) -> usize {
    unsafe { list.as_ref() }.map_or(0, CooListResult::size)
}

#[no_mangle]
/// Edge list `index`, borrowed from the list (null when out of range)
///
/// # Safety
/// `list` must be null or live. Do not free the returned edge list.
pub unsafe extern "C" fn tg_coo_list_element(list: *const CooListResult, index: usize) -> *const CooResult {
    unsafe { list.as_ref() }
        .and_then(|l| l.get(index))
        .map_or(ptr::null(), |coo| coo as *const CooResult)
}

#[no_mangle]
/// Release a list of edge lists
///
/// # Safety
/// `list` must be null or live, freed at most once.
pub unsafe extern "C" fn tg_coo_list_free(list: *mut CooListResult) {
    unsafe { release(list) }
}

result_accessors! {
    DegreesResult, tg_degrees_result_free;
    required {
        tg_degrees_result_get_vertices => vertices,
    }
    optional {
        tg_degrees_result_get_in_degrees => in_degrees,
        tg_degrees_result_get_out_degrees => out_degrees,
    }
}
