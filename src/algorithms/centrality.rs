//! `PageRank` family, Katz, eigenvector, betweenness and HITS

use super::{
    agree, densify, internal_vertex_values, internal_vertices, label_array, note_orientation, owned_vertices,
    reject_duplicates, VertexValues,
};
use crate::array::convert::{read_weights, weight_array};
use crate::array::TypeErasedDeviceArrayView;
use crate::engine::{CentralityEngine, DefaultEngine, IterativeOutput, PageRankInputs};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::options::{BetweennessOptions, EigenvectorOptions, HitsOptions, KatzOptions, PageRankOptions};
use crate::resource::ResourceHandle;
use crate::results::{CentralityResult, HitsResult};

/// Optional vertex-keyed `PageRank` inputs
///
/// Each is a set of `(vertex, value)` pairs; on multi-partition graphs the
/// union over ranks is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageRankViews<'a> {
    /// Out-weight sums to use instead of the graph's own
    pub precomputed_out_weights: Option<VertexValues<'a>>,
    /// Starting vector (normalized to sum 1)
    pub initial_guess: Option<VertexValues<'a>>,
}

#[derive(Debug, Clone, Default)]
struct SparseInputs {
    out_weights: Option<Vec<(u32, f64)>>,
    initial_guess: Option<Vec<(u32, f64)>>,
    personalization: Option<Vec<(u32, f64)>>,
}

impl SparseInputs {
    fn merge(parts: Vec<Self>) -> Self {
        let mut merged = Self::default();
        for part in parts {
            extend(&mut merged.out_weights, part.out_weights);
            extend(&mut merged.initial_guess, part.initial_guess);
            extend(&mut merged.personalization, part.personalization);
        }
        merged
    }
}

fn extend(dst: &mut Option<Vec<(u32, f64)>>, src: Option<Vec<(u32, f64)>>) {
    if let Some(src) = src {
        dst.get_or_insert_with(Vec::new).extend(src);
    }
}

fn read_optional(
    handle: &ResourceHandle,
    graph: &Graph,
    input: Option<VertexValues<'_>>,
) -> Result<Option<Vec<(u32, f64)>>> {
    input.map(|input| internal_vertex_values(handle, graph, input)).transpose()
}

fn check_distribution(name: &str, pairs: &[(u32, f64)]) -> Result<()> {
    if let Some((_, bad)) = pairs.iter().find(|(_, value)| !(value.is_finite() && *value >= 0.0)) {
        return Err(Error::invalid_input(format!("{name} value {bad} is negative or not finite")));
    }
    if pairs.iter().map(|(_, value)| value).sum::<f64>() <= 0.0 {
        return Err(Error::invalid_input(format!("{name} values sum to zero")));
    }
    Ok(())
}

fn read_pagerank_inputs(
    handle: &ResourceHandle,
    graph: &Graph,
    views: &PageRankViews<'_>,
    personalization: Option<VertexValues<'_>>,
    do_expensive_check: bool,
) -> Result<SparseInputs> {
    let sparse = SparseInputs {
        out_weights: read_optional(handle, graph, views.precomputed_out_weights)?,
        initial_guess: read_optional(handle, graph, views.initial_guess)?,
        personalization: read_optional(handle, graph, personalization)?,
    };
    if do_expensive_check {
        if let Some(p) = &sparse.personalization {
            check_distribution("personalization", p)?;
        }
        if let Some(g) = &sparse.initial_guess {
            check_distribution("initial guess", g)?;
        }
    }
    Ok(sparse)
}

fn run_pagerank(
    handle: &ResourceHandle,
    graph: &Graph,
    views: &PageRankViews<'_>,
    personalization: Option<VertexValues<'_>>,
    options: &PageRankOptions,
    do_expensive_check: bool,
    allow_nonconvergence: bool,
) -> Result<CentralityResult> {
    options.validate()?;
    note_orientation(graph, "pagerank");

    let local = read_pagerank_inputs(handle, graph, views, personalization, do_expensive_check);
    let local = agree(handle, "pagerank.inputs", local)?;
    let sparse = SparseInputs::merge(handle.all_gather("pagerank.values", local)?);
    let topology = graph.topology(handle)?;

    let n = graph.number_of_vertices();
    let inputs = PageRankInputs {
        personalization: sparse.personalization.map(|p| densify(n, &p)),
        initial_guess: sparse.initial_guess.map(|g| densify(n, &g)),
        out_weight_sums: sparse.out_weights.map(|w| densify(n, &w)),
    };
    let out = DefaultEngine::pagerank(&topology, options, &inputs);
    if !out.converged && !allow_nonconvergence {
        return Err(Error::invalid_input(format!(
            "pagerank did not converge within {} iterations",
            options.max_iterations
        )));
    }
    centrality_result(handle, graph, out)
}

fn centrality_result(handle: &ResourceHandle, graph: &Graph, out: IterativeOutput) -> Result<CentralityResult> {
    let owned = owned_vertices(handle, graph)?;
    let values: Vec<f64> = owned.iter().map(|&v| out.values[v as usize]).collect();
    Ok(CentralityResult {
        vertices: label_array(handle, graph, &owned)?,
        values: weight_array(handle, graph.weight_type(), &values)?,
        num_iterations: out.iterations,
        converged: out.converged,
    })
}

/// `PageRank` by power iteration
///
/// # Arguments
///
/// * `views` - Optional precomputed out-weight sums and initial guess
/// * `options` - Damping factor, L1 threshold and iteration cap
/// * `do_expensive_check` - Reject negative or all-zero initial guesses
///
/// # Errors
///
/// `InvalidValue` for out-of-range options, `InvalidInput` when the
/// iteration does not converge within `max_iterations`
pub fn pagerank(
    handle: &ResourceHandle,
    graph: &Graph,
    views: &PageRankViews<'_>,
    options: &PageRankOptions,
    do_expensive_check: bool,
) -> Result<CentralityResult> {
    run_pagerank(handle, graph, views, None, options, do_expensive_check, false)
}

/// `PageRank` returning the last iterate when the cap is reached
///
/// # Errors
///
/// Same as [`pagerank`] except for non-convergence
pub fn pagerank_allow_nonconvergence(
    handle: &ResourceHandle,
    graph: &Graph,
    views: &PageRankViews<'_>,
    options: &PageRankOptions,
    do_expensive_check: bool,
) -> Result<CentralityResult> {
    run_pagerank(handle, graph, views, None, options, do_expensive_check, true)
}

/// `PageRank` teleporting to `personalization` instead of every vertex
///
/// # Errors
///
/// Same as [`pagerank`]; with the expensive check also `InvalidInput` for
/// negative or all-zero personalization values
pub fn personalized_pagerank(
    handle: &ResourceHandle,
    graph: &Graph,
    views: &PageRankViews<'_>,
    personalization: VertexValues<'_>,
    options: &PageRankOptions,
    do_expensive_check: bool,
) -> Result<CentralityResult> {
    run_pagerank(handle, graph, views, Some(personalization), options, do_expensive_check, false)
}

/// Personalized `PageRank` returning the last iterate when the cap is reached
///
/// # Errors
///
/// Same as [`personalized_pagerank`] except for non-convergence
pub fn personalized_pagerank_allow_nonconvergence(
    handle: &ResourceHandle,
    graph: &Graph,
    views: &PageRankViews<'_>,
    personalization: VertexValues<'_>,
    options: &PageRankOptions,
    do_expensive_check: bool,
) -> Result<CentralityResult> {
    run_pagerank(handle, graph, views, Some(personalization), options, do_expensive_check, true)
}

/// Katz centrality
///
/// `betas` holds one value per vertex this rank owns (every vertex on
/// single-partition graphs); `options.beta` applies to all when absent.
///
/// # Errors
///
/// `InvalidValue` for a `betas` length other than the owned vertex count,
/// `InvalidInput` on non-convergence
pub fn katz_centrality(
    handle: &ResourceHandle,
    graph: &Graph,
    betas: Option<&TypeErasedDeviceArrayView>,
    options: &KatzOptions,
    do_expensive_check: bool,
) -> Result<CentralityResult> {
    options.validate()?;
    note_orientation(graph, "katz");
    let owned = graph.owned_range(handle)?.len();
    let local = betas
        .map(|view| {
            view.check_handle(handle)?;
            if view.size() != owned {
                return Err(Error::invalid_value(format!(
                    "{} betas for {owned} owned vertices",
                    view.size()
                )));
            }
            let values = read_weights(view)?;
            if do_expensive_check {
                if let Some(bad) = values.iter().find(|b| !b.is_finite()) {
                    return Err(Error::invalid_input(format!("beta {bad} is not finite")));
                }
            }
            Ok(values)
        })
        .transpose();
    let local = agree(handle, "katz.betas", local)?;
    let gathered = handle.all_gather("katz.values", local)?;
    let topology = graph.topology(handle)?;

    let betas: Vec<f64> = if gathered.iter().all(Option::is_some) {
        gathered.into_iter().flatten().flatten().collect()
    } else {
        vec![options.beta; graph.number_of_vertices()]
    };
    let out = DefaultEngine::katz(&topology, options, &betas);
    if !out.converged {
        return Err(Error::invalid_input(format!(
            "katz centrality did not converge within {} iterations",
            options.max_iterations
        )));
    }
    centrality_result(handle, graph, out)
}

/// Eigenvector centrality over incoming edges
///
/// # Errors
///
/// `InvalidInput` on non-convergence
pub fn eigenvector_centrality(
    handle: &ResourceHandle,
    graph: &Graph,
    options: &EigenvectorOptions,
    do_expensive_check: bool,
) -> Result<CentralityResult> {
    options.validate()?;
    note_orientation(graph, "eigenvector");
    let topology = graph.topology(handle)?;
    if do_expensive_check {
        if let Some(w) = topology.edges().weights.iter().flatten().find(|w| **w < 0.0) {
            return Err(Error::invalid_input(format!("negative edge weight {w}")));
        }
    }
    let out = DefaultEngine::eigenvector(&topology, options);
    if !out.converged {
        return Err(Error::invalid_input(format!(
            "eigenvector centrality did not converge within {} iterations",
            options.max_iterations
        )));
    }
    centrality_result(handle, graph, out)
}

/// Betweenness centrality from every vertex, or from `vertex_list`
///
/// # Errors
///
/// `InvalidInput` for unknown labels in `vertex_list`, or repeated ones
/// with the expensive check
pub fn betweenness_centrality(
    handle: &ResourceHandle,
    graph: &Graph,
    vertex_list: Option<&TypeErasedDeviceArrayView>,
    options: &BetweennessOptions,
    do_expensive_check: bool,
) -> Result<CentralityResult> {
    let local = vertex_list
        .map(|view| {
            let ids = internal_vertices(handle, graph, view)?;
            if do_expensive_check {
                reject_duplicates(graph, &ids)?;
            }
            Ok(ids)
        })
        .transpose();
    let local = agree(handle, "betweenness.sources", local)?;
    let gathered = handle.all_gather("betweenness.values", local)?;
    let topology = graph.topology(handle)?;

    let sources: Option<Vec<u32>> = gathered
        .iter()
        .any(Option::is_some)
        .then(|| gathered.into_iter().flatten().flatten().collect());
    let scores = DefaultEngine::betweenness(
        &topology,
        options,
        sources.as_deref(),
        graph.properties().is_symmetric,
    );
    centrality_result(
        handle,
        graph,
        IterativeOutput {
            values: scores,
            iterations: 0,
            converged: true,
        },
    )
}

/// Hubs and authorities
///
/// # Errors
///
/// `InvalidInput` on non-convergence
pub fn hits(
    handle: &ResourceHandle,
    graph: &Graph,
    initial_hubs: Option<VertexValues<'_>>,
    options: &HitsOptions,
    do_expensive_check: bool,
) -> Result<HitsResult> {
    options.validate()?;
    note_orientation(graph, "hits");
    let local = read_optional(handle, graph, initial_hubs).and_then(|guess| {
        if do_expensive_check {
            if let Some(g) = &guess {
                check_distribution("initial hubs", g)?;
            }
        }
        Ok(guess)
    });
    let local = agree(handle, "hits.inputs", local)?;
    let gathered = handle.all_gather("hits.values", local)?;
    let topology = graph.topology(handle)?;

    let n = graph.number_of_vertices();
    let guess = gathered
        .iter()
        .any(Option::is_some)
        .then(|| densify(n, &gathered.into_iter().flatten().flatten().collect::<Vec<_>>()));
    let out = DefaultEngine::hits(&topology, options, guess.as_deref());
    if !out.converged {
        return Err(Error::invalid_input(format!(
            "hits did not converge within {} iterations",
            options.max_iterations
        )));
    }

    let owned = owned_vertices(handle, graph)?;
    let hubs: Vec<f64> = owned.iter().map(|&v| out.hubs[v as usize]).collect();
    let authorities: Vec<f64> = owned.iter().map(|&v| out.authorities[v as usize]).collect();
    Ok(HitsResult {
        vertices: label_array(handle, graph, &owned)?,
        hubs: weight_array(handle, graph.weight_type(), &hubs)?,
        authorities: weight_array(handle, graph.weight_type(), &authorities)?,
        hub_score_difference: out.hub_score_difference,
        number_of_iterations: out.iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::fixtures;
    use crate::array::TypeErasedDeviceArray;
    use crate::types::GraphProperties;
    use crate::StatusCode;

    fn chain(handle: &ResourceHandle) -> Graph {
        fixtures::graph(handle, &[0, 1, 2], &[1, 2, 3], None, GraphProperties::directed(), true)
    }

    fn assert_close(actual: &[f32], expected: &[f32], tolerance: f32) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < tolerance, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_pagerank_chain_reference() {
        let handle = ResourceHandle::new();
        let graph = chain(&handle);
        let result = pagerank(&handle, &graph, &PageRankViews::default(), &PageRankOptions::default(), true).unwrap();
        assert_close(
            &result.values().to_vec::<f32>().unwrap(),
            &[0.116_156, 0.214_888, 0.298_811, 0.370_145],
            1e-3,
        );
        assert!(result.converged());
        assert!(result.num_iterations() > 1);
    }

    #[test]
    fn test_pagerank_iteration_cap() {
        let handle = ResourceHandle::new();
        let graph = chain(&handle);
        let options = PageRankOptions {
            max_iterations: 1,
            ..PageRankOptions::default()
        };
        let views = PageRankViews::default();

        let err = pagerank(&handle, &graph, &views, &options, false).unwrap_err();
        assert_eq!(err.code(), StatusCode::InvalidInput);

        let result = pagerank_allow_nonconvergence(&handle, &graph, &views, &options, false).unwrap();
        assert!(!result.converged());
        assert_eq!(result.num_iterations(), 1);
        assert_close(
            &result.values().to_vec::<f32>().unwrap(),
            &[0.090_625, 0.303_125, 0.303_125, 0.303_125],
            1e-6,
        );
    }

    #[test]
    fn test_personalized_pagerank_favors_target() {
        let handle = ResourceHandle::new();
        let graph = chain(&handle);
        let vertices = TypeErasedDeviceArray::from_slice(&handle, &[0_i32]).unwrap();
        let values = TypeErasedDeviceArray::from_slice(&handle, &[1.0_f32]).unwrap();
        let (vv, wv) = (vertices.view(), values.view());
        let personalization = VertexValues {
            vertices: &vv,
            values: &wv,
        };
        let result = personalized_pagerank(
            &handle,
            &graph,
            &PageRankViews::default(),
            personalization,
            &PageRankOptions::default(),
            true,
        )
        .unwrap();
        let scores = result.values().to_vec::<f32>().unwrap();
        assert!(scores[0] > scores[3]);
        assert!((scores.iter().sum::<f32>() - 1.0).abs() < 1e-4);

        let negative = TypeErasedDeviceArray::from_slice(&handle, &[-1.0_f32]).unwrap();
        let nv = negative.view();
        let bad = VertexValues {
            vertices: &vv,
            values: &nv,
        };
        let err = personalized_pagerank(
            &handle,
            &graph,
            &PageRankViews::default(),
            bad,
            &PageRankOptions::default(),
            true,
        )
        .unwrap_err();
        assert_eq!(err.code(), StatusCode::InvalidInput);
    }

    #[test]
    fn test_katz_with_betas() {
        let handle = ResourceHandle::new();
        let graph = fixtures::graph(&handle, &[0], &[1], None, GraphProperties::directed(), false);
        let result = katz_centrality(&handle, &graph, None, &KatzOptions::default(), false).unwrap();
        assert_close(&result.values().to_vec::<f32>().unwrap(), &[1.0, 1.1], 1e-5);

        let betas = TypeErasedDeviceArray::from_slice(&handle, &[2.0_f32, 0.0]).unwrap();
        let result = katz_centrality(&handle, &graph, Some(&betas.view()), &KatzOptions::default(), false).unwrap();
        assert_close(&result.values().to_vec::<f32>().unwrap(), &[2.0, 0.2], 1e-5);

        let short = TypeErasedDeviceArray::from_slice(&handle, &[1.0_f32]).unwrap();
        let err = katz_centrality(&handle, &graph, Some(&short.view()), &KatzOptions::default(), false).unwrap_err();
        assert_eq!(err.code(), StatusCode::InvalidValue);
    }

    #[test]
    fn test_eigenvector_triangle_is_uniform() {
        let handle = ResourceHandle::new();
        let graph = fixtures::graph(
            &handle,
            &[0, 1, 1, 2, 2, 0],
            &[1, 0, 2, 1, 0, 2],
            None,
            GraphProperties::symmetric(),
            true,
        );
        let result = eigenvector_centrality(&handle, &graph, &EigenvectorOptions::default(), true).unwrap();
        let expected = 1.0 / 3.0_f32.sqrt();
        assert_close(&result.values().to_vec::<f32>().unwrap(), &[expected; 3], 1e-4);
    }

    #[test]
    fn test_betweenness_path_center() {
        let handle = ResourceHandle::new();
        let graph = fixtures::graph(&handle, &[0, 1, 1, 2], &[1, 0, 2, 1], None, GraphProperties::symmetric(), false);
        let result = betweenness_centrality(&handle, &graph, None, &BetweennessOptions::default(), false).unwrap();
        assert_close(&result.values().to_vec::<f32>().unwrap(), &[0.0, 1.0, 0.0], 1e-6);
        assert_eq!(result.num_iterations(), 0);
    }

    #[test]
    fn test_hits_star() {
        let handle = ResourceHandle::new();
        let graph = fixtures::graph(&handle, &[0, 0], &[1, 2], None, GraphProperties::directed(), true);
        let result = hits(&handle, &graph, None, &HitsOptions::default(), false).unwrap();
        assert_close(&result.hubs().to_vec::<f32>().unwrap(), &[1.0, 0.0, 0.0], 1e-6);
        assert_close(&result.authorities().to_vec::<f32>().unwrap(), &[0.0, 0.5, 0.5], 1e-6);
        assert!(result.number_of_iterations() >= 1);
    }
}
