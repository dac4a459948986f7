//! Connected component labelings

use super::{label_array, owned_vertices};
use crate::engine::{ComponentsEngine, DefaultEngine};
use crate::error::Result;
use crate::graph::Graph;
use crate::resource::ResourceHandle;
use crate::results::LabelingResult;
use crate::storage::CsrGraph;

fn labeling(
    handle: &ResourceHandle,
    graph: &Graph,
    name: &'static str,
    label: fn(&CsrGraph) -> Vec<u32>,
) -> Result<LabelingResult> {
    let topology = graph.topology(handle)?;
    let components = label(&topology);
    let owned = owned_vertices(handle, graph)?;
    let roots: Vec<u32> = owned.iter().map(|&v| components[v as usize]).collect();

    let mut distinct = components.clone();
    distinct.sort_unstable();
    distinct.dedup();
    tracing::debug!(algorithm = name, components = distinct.len(), "labeling");

    Ok(LabelingResult {
        vertices: label_array(handle, graph, &owned)?,
        labels: label_array(handle, graph, &roots)?,
    })
}

/// Weakly connected components
///
/// Edge direction is ignored. Each component is labeled by its smallest
/// vertex label.
///
/// # Errors
///
/// Collective failures on multi-partition graphs
pub fn weakly_connected_components(
    handle: &ResourceHandle,
    graph: &Graph,
    do_expensive_check: bool,
) -> Result<LabelingResult> {
    if do_expensive_check && !graph.properties().is_symmetric {
        tracing::debug!("weakly connected components on a directed graph, following edges both ways");
    }
    labeling(handle, graph, "weakly connected components", DefaultEngine::weakly_connected)
}

/// Strongly connected components, labeled by their smallest vertex label
///
/// # Errors
///
/// Collective failures on multi-partition graphs
pub fn strongly_connected_components(
    handle: &ResourceHandle,
    graph: &Graph,
    do_expensive_check: bool,
) -> Result<LabelingResult> {
    if do_expensive_check && graph.properties().is_symmetric {
        tracing::debug!("strongly connected components of a symmetric graph equal the weak ones");
    }
    labeling(handle, graph, "strongly connected components", DefaultEngine::strongly_connected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::fixtures;
    use crate::types::GraphProperties;

    #[test]
    fn test_weak_and_strong_labelings() {
        let handle = ResourceHandle::new();
        // Cycle 10 → 20 → 30 → 10, then 30 → 40; separate edge 50 → 60
        let graph = fixtures::graph(
            &handle,
            &[10, 20, 30, 30, 50],
            &[20, 30, 10, 40, 60],
            None,
            GraphProperties::directed(),
            false,
        );

        let weak = weakly_connected_components(&handle, &graph, true).unwrap();
        assert_eq!(weak.vertices().to_vec::<i32>().unwrap(), vec![10, 20, 30, 40, 50, 60]);
        assert_eq!(weak.labels().to_vec::<i32>().unwrap(), vec![10, 10, 10, 10, 50, 50]);

        let strong = strongly_connected_components(&handle, &graph, true).unwrap();
        assert_eq!(strong.labels().to_vec::<i32>().unwrap(), vec![10, 10, 10, 40, 50, 60]);
    }
}
