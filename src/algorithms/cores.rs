//! Core decomposition, k-core and k-truss subgraphs

use super::{agree, edge_arrays, internal_vertices, label_array, owned_vertices, require_symmetric};
use crate::array::convert::{read_vertices, vertex_array};
use crate::engine::{CoreEngine, DefaultEngine};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::resource::ResourceHandle;
use crate::results::{CoreResult, KCoreResult};
use crate::storage::CsrGraph;
use crate::types::DegreeType;

/// Core number of every owned vertex
///
/// # Errors
///
/// `InvalidInput` for graphs not marked symmetric
pub fn core_number(
    handle: &ResourceHandle,
    graph: &Graph,
    degree_type: DegreeType,
    do_expensive_check: bool,
) -> Result<CoreResult> {
    require_symmetric(graph, "core number")?;
    let topology = graph.topology(handle)?;
    if do_expensive_check {
        check_no_self_loops(&topology)?;
    }
    let cores = DefaultEngine::core_number(&topology, degree_type);

    let owned = owned_vertices(handle, graph)?;
    let values: Vec<i64> = owned.iter().map(|&v| i64::from(cores[v as usize])).collect();
    Ok(CoreResult {
        vertices: label_array(handle, graph, &owned)?,
        core_numbers: vertex_array(handle, graph.vertex_type(), &values)?,
    })
}

fn check_no_self_loops(topology: &CsrGraph) -> Result<()> {
    let edges = topology.edges();
    if edges.src.iter().zip(&edges.dst).any(|(s, d)| s == d) {
        return Err(Error::invalid_input("core decomposition rejects self loops"));
    }
    Ok(())
}

/// Core numbers supplied by the caller, as `(internal id, core)` pairs
fn read_core_numbers(handle: &ResourceHandle, graph: &Graph, cores: &CoreResult) -> Result<Vec<(u32, i64)>> {
    let ids = internal_vertices(handle, graph, &cores.vertices())?;
    let values = read_vertices(&cores.core_numbers())?;
    Ok(ids.into_iter().zip(values).collect())
}

/// Edges of the `k`-core: both endpoints have core number at least `k`
///
/// # Arguments
///
/// * `k` - Minimum core number
/// * `degree_type` - Degree definition when core numbers are computed here
/// * `core_result` - Precomputed core numbers (each rank passes its own
///   [`core_number`] result); computed when `None`
///
/// # Returns
///
/// The edges this rank owns, with weights for weighted graphs
///
/// # Errors
///
/// `InvalidInput` for graphs not marked symmetric, or a core result that does
/// not cover every vertex
pub fn k_core(
    handle: &ResourceHandle,
    graph: &Graph,
    k: usize,
    degree_type: DegreeType,
    core_result: Option<&CoreResult>,
    do_expensive_check: bool,
) -> Result<KCoreResult> {
    require_symmetric(graph, "k-core")?;
    let local = core_result.map(|cores| read_core_numbers(handle, graph, cores)).transpose();
    let local = agree(handle, "k_core.cores", local)?;
    let supplied = match local {
        Some(pairs) => Some(handle.all_gather_concat("k_core.values", pairs)?),
        None => None,
    };
    let topology = graph.topology(handle)?;
    if do_expensive_check {
        check_no_self_loops(&topology)?;
    }

    let cores: Vec<i64> = match supplied {
        Some(pairs) => {
            let mut dense = vec![None; graph.number_of_vertices()];
            for (v, core) in pairs {
                dense[v as usize] = Some(core);
            }
            let missing = dense.iter().filter(|c| c.is_none()).count();
            if missing > 0 {
                return Err(Error::invalid_input(format!("core result misses {missing} vertices")));
            }
            dense.into_iter().flatten().collect()
        }
        None => DefaultEngine::core_number(&topology, degree_type)
            .into_iter()
            .map(i64::from)
            .collect(),
    };

    #[allow(clippy::cast_possible_wrap)]
    let k = k as i64;
    let edges = topology.edges();
    let selected: Vec<usize> = (0..edges.len())
        .filter(|&e| {
            let (s, d) = (edges.src[e], edges.dst[e]);
            cores[s as usize] >= k && cores[d as usize] >= k && graph.owns_edge(handle, s, d)
        })
        .collect();
    tracing::debug!(k, edges = selected.len(), "k-core");

    let arrays = edge_arrays(handle, graph, &topology, &selected)?;
    Ok(KCoreResult {
        sources: arrays.sources,
        destinations: arrays.destinations,
        weights: arrays.weights,
    })
}

/// Edges of the `k`-truss: every edge closes at least `k - 2` triangles
///
/// # Errors
///
/// `InvalidInput` for graphs not marked symmetric, `InvalidValue` for `k < 2`
pub fn k_truss_subgraph(
    handle: &ResourceHandle,
    graph: &Graph,
    k: usize,
    do_expensive_check: bool,
) -> Result<KCoreResult> {
    require_symmetric(graph, "k-truss")?;
    if k < 2 {
        return Err(Error::invalid_value(format!("k-truss needs k >= 2, got {k}")));
    }
    let topology = graph.topology(handle)?;
    if do_expensive_check {
        check_no_self_loops(&topology)?;
    }

    let edges = topology.edges();
    let selected: Vec<usize> = DefaultEngine::k_truss(&topology, k)
        .into_iter()
        .filter(|&e| graph.owns_edge(handle, edges.src[e], edges.dst[e]))
        .collect();

    let arrays = edge_arrays(handle, graph, &topology, &selected)?;
    Ok(KCoreResult {
        sources: arrays.sources,
        destinations: arrays.destinations,
        weights: arrays.weights,
    })
}
