//! Random walks and uniform neighbor sampling
//!
//! Sampled edges are grouped by seed label, then by hop. With
//! `renumber_results` every label gets its own dense id space: vertices are
//! numbered in order of the hop at which they first appear (a destination
//! sampled at hop `h` appears at `h + 1`), ties broken by vertex id.

use super::{agree, edge_arrays, internal_vertices, label_array, optional_label_array};
use crate::array::convert::{read_i32, size_array, vertex_array, weight_array};
use crate::array::{TypeErasedDeviceArray, TypeErasedDeviceArrayView};
use crate::engine::{DefaultEngine, SampledEdge, SamplingEngine};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::options::{RandomWalkOptions, SamplingOptions};
use crate::resource::{ResourceHandle, RngState};
use crate::results::{RandomWalkResult, SampleResult};
use crate::storage::CsrGraph;
use std::collections::{BTreeMap, HashMap};

/// Starts must be graph vertices and edge weights finite and non-negative
fn check_walkable(graph: &Graph, topology: &CsrGraph, starts: &[u32]) -> Result<()> {
    let num_vertices = graph.number_of_vertices();
    if let Some(v) = starts.iter().find(|&&v| v as usize >= num_vertices) {
        return Err(Error::invalid_input(format!("start vertex id {v} is outside the vertex set")));
    }
    match topology.edges().weights.iter().flatten().find(|w| !(w.is_finite() && **w >= 0.0)) {
        Some(w) => Err(Error::invalid_input(format!("edge weight {w} is negative or not finite"))),
        None => Ok(()),
    }
}

/// Uniform random walks from every start vertex
///
/// # Arguments
///
/// * `rng` - Random state of this rank
/// * `start_vertices` - Walk starts; each rank walks from the starts it passes
/// * `options` - `max_length` steps per walk
///
/// # Returns
///
/// `max_length + 1` labels per start (`-1` once a walk reaches a vertex
/// without out edges) and `max_length` edge weights per start
///
/// # Errors
///
/// `InvalidValue` for a zero walk length, `TypeMismatch` or `InvalidInput`
/// for bad start labels, `InvalidInput` for a negative or non-finite edge
/// weight (with the expensive check)
pub fn uniform_random_walks(
    handle: &ResourceHandle,
    rng: &RngState,
    graph: &Graph,
    start_vertices: &TypeErasedDeviceArrayView,
    options: &RandomWalkOptions,
    do_expensive_check: bool,
) -> Result<RandomWalkResult> {
    options.validate()?;
    let local = internal_vertices(handle, graph, start_vertices);
    let starts = agree(handle, "random_walks.starts", local)?;
    let topology = graph.topology(handle)?;
    if do_expensive_check {
        check_walkable(graph, &topology, &starts)?;
    }
    tracing::debug!(starts = starts.len(), max_length = options.max_length, "uniform random walks");

    let out = rng.with_rng(|r| DefaultEngine::uniform_random_walks(&topology, &starts, options.max_length, r));
    Ok(RandomWalkResult {
        paths: optional_label_array(handle, graph, &out.paths)?,
        weights: weight_array(handle, graph.weight_type(), &out.weights)?,
        max_path_length: options.max_length,
    })
}

/// Weight-biased random walks (not available in this binding)
///
/// # Errors
///
/// Always `NotImplemented`
pub fn biased_random_walks(
    handle: &ResourceHandle,
    rng: &RngState,
    graph: &Graph,
    start_vertices: &TypeErasedDeviceArrayView,
    options: &RandomWalkOptions,
    do_expensive_check: bool,
) -> Result<RandomWalkResult> {
    let _ = (handle, rng, graph, start_vertices, options, do_expensive_check);
    Err(Error::not_implemented("biased random walks are not supported"))
}

/// node2vec second-order random walks (not available in this binding)
///
/// # Errors
///
/// Always `NotImplemented`
pub fn node2vec_random_walks(
    handle: &ResourceHandle,
    rng: &RngState,
    graph: &Graph,
    start_vertices: &TypeErasedDeviceArrayView,
    options: &RandomWalkOptions,
    do_expensive_check: bool,
) -> Result<RandomWalkResult> {
    let _ = (handle, rng, graph, start_vertices, options, do_expensive_check);
    Err(Error::not_implemented("node2vec random walks are not supported"))
}

/// Seeds with their labels, and the fan-out per hop
fn read_sampling_inputs(
    handle: &ResourceHandle,
    graph: &Graph,
    start_vertices: &TypeErasedDeviceArrayView,
    start_vertex_labels: Option<&TypeErasedDeviceArrayView>,
    fan_out: &TypeErasedDeviceArrayView,
) -> Result<(Vec<(u32, i32)>, Vec<i32>)> {
    fan_out.check_handle(handle)?;
    let fan_out = read_i32(fan_out)?;
    if fan_out.is_empty() {
        return Err(Error::invalid_value("fan_out needs at least one hop"));
    }
    let starts = internal_vertices(handle, graph, start_vertices)?;
    let labels = match start_vertex_labels {
        Some(view) => {
            view.check_handle(handle)?;
            let labels = read_i32(view)?;
            if labels.len() != starts.len() {
                return Err(Error::invalid_value(format!(
                    "{} start vertices with {} labels",
                    starts.len(),
                    labels.len()
                )));
            }
            labels
        }
        None => vec![0; starts.len()],
    };
    Ok((starts.into_iter().zip(labels).collect(), fan_out))
}

/// Uniform neighbor sampling, hop by hop
///
/// # Arguments
///
/// * `rng` - Random state of this rank
/// * `start_vertices` - Seeds; each rank samples from the seeds it passes
/// * `start_vertex_labels` - Optional `INT32` label per seed
/// * `fan_out` - `INT32` neighbors per vertex and hop; negative takes all
/// * `options` - Replacement, frontier policy, renumbering and layout
///
/// # Returns
///
/// The sampled edges in the layout chosen by `options` (see
/// [`SampleResult`])
///
/// # Errors
///
/// `InvalidInput` for inconsistent options, a seed outside the graph or (with
/// the expensive check) a negative or non-finite edge weight; `InvalidValue`
/// for an empty fan-out or a label count different from the seed count
#[allow(clippy::too_many_arguments)]
pub fn uniform_neighbor_sample(
    handle: &ResourceHandle,
    rng: &RngState,
    graph: &Graph,
    start_vertices: &TypeErasedDeviceArrayView,
    start_vertex_labels: Option<&TypeErasedDeviceArrayView>,
    fan_out: &TypeErasedDeviceArrayView,
    options: &SamplingOptions,
    do_expensive_check: bool,
) -> Result<SampleResult> {
    options.validate()?;
    let local = read_sampling_inputs(handle, graph, start_vertices, start_vertex_labels, fan_out);
    let (seeds, fan_out) = agree(handle, "neighbor_sample.inputs", local)?;
    let topology = graph.topology(handle)?;
    if do_expensive_check {
        let starts: Vec<u32> = seeds.iter().map(|&(v, _)| v).collect();
        check_walkable(graph, &topology, &starts)?;
    }
    tracing::debug!(seeds = seeds.len(), hops = fan_out.len(), "uniform neighbor sample");

    let sampled = rng.with_rng(|r| DefaultEngine::uniform_neighbor_sample(&topology, &seeds, &fan_out, options, r));

    let mut label_set: Vec<i32> = seeds.iter().map(|&(_, label)| label).collect();
    label_set.sort_unstable();
    label_set.dedup();
    if label_set.is_empty() {
        label_set.push(0);
    }
    let layout = SampleLayout {
        labeled: start_vertex_labels.is_some(),
        label_set,
        num_hops: fan_out.len(),
    };
    layout.package(handle, graph, &topology, sampled, options)
}

/// Per-label dense renumbering of sampled vertices
struct Renumbering {
    local: HashMap<(usize, u32), i64>,
    map: Vec<u32>,
    offsets: Vec<usize>,
}

impl Renumbering {
    #[allow(clippy::cast_possible_wrap)]
    fn new(sampled: &[SampledEdge], num_labels: usize, label_index: impl Fn(i32) -> usize) -> Self {
        let mut first_hop: BTreeMap<(usize, u32), usize> = BTreeMap::new();
        for e in sampled {
            let li = label_index(e.label);
            let src = first_hop.entry((li, e.src)).or_insert(e.hop);
            *src = (*src).min(e.hop);
            let dst = first_hop.entry((li, e.dst)).or_insert(e.hop + 1);
            *dst = (*dst).min(e.hop + 1);
        }

        let mut per_label: Vec<Vec<(usize, u32)>> = vec![Vec::new(); num_labels];
        for ((li, v), hop) in first_hop {
            per_label[li].push((hop, v));
        }

        let mut local = HashMap::new();
        let mut map = Vec::new();
        let mut offsets = vec![0];
        for (li, mut vertices) in per_label.into_iter().enumerate() {
            vertices.sort_unstable();
            for (i, (_, v)) in vertices.into_iter().enumerate() {
                local.insert((li, v), i as i64);
                map.push(v);
            }
            offsets.push(map.len());
        }
        Self { local, map, offsets }
    }

    fn rows(&self, li: usize) -> usize {
        self.offsets[li + 1] - self.offsets[li]
    }
}

struct SampleLayout {
    labeled: bool,
    label_set: Vec<i32>,
    num_hops: usize,
}

impl SampleLayout {
    fn label_index(&self, label: i32) -> usize {
        self.label_set.binary_search(&label).unwrap_or(0)
    }

    fn package(
        &self,
        handle: &ResourceHandle,
        graph: &Graph,
        topology: &CsrGraph,
        mut sampled: Vec<SampledEdge>,
        options: &SamplingOptions,
    ) -> Result<SampleResult> {
        sampled.sort_by_key(|e| (self.label_index(e.label), e.hop));
        let num_labels = self.label_set.len();
        let renumbering = options
            .renumber_results()
            .then(|| Renumbering::new(&sampled, num_labels, |label| self.label_index(label)));

        let map = graph.renumber_map();
        let endpoint = |li: usize, v: u32| -> i64 {
            match &renumbering {
                Some(r) => r.local.get(&(li, v)).copied().unwrap_or_default(),
                None => map.to_external(v),
            }
        };

        let mut result = if options.compression_type().is_coo() {
            self.coo(handle, graph, topology, &sampled, options, endpoint)?
        } else {
            let renumbering = renumbering
                .as_ref()
                .ok_or_else(|| Error::invalid_input("compressed sample layouts require renumber_results"))?;
            self.compressed(handle, graph, topology, &sampled, options, renumbering, endpoint)?
        };

        if let Some(r) = &renumbering {
            result.renumber_map = Some(label_array(handle, graph, &r.map)?);
            result.renumber_map_offsets = Some(size_array(handle, &r.offsets)?);
        }
        Ok(result)
    }

    fn coo(
        &self,
        handle: &ResourceHandle,
        graph: &Graph,
        topology: &CsrGraph,
        sampled: &[SampledEdge],
        options: &SamplingOptions,
        endpoint: impl Fn(usize, u32) -> i64,
    ) -> Result<SampleResult> {
        let dtype = graph.vertex_type();
        let majors: Vec<i64> = sampled.iter().map(|e| endpoint(self.label_index(e.label), e.src)).collect();
        let minors: Vec<i64> = sampled.iter().map(|e| endpoint(self.label_index(e.label), e.dst)).collect();

        let hops = if options.return_hops() {
            let hops = sampled
                .iter()
                .map(|e| i32::try_from(e.hop).map_err(|_| Error::invalid_value("hop does not fit in int32")))
                .collect::<Result<Vec<i32>>>()?;
            Some(TypeErasedDeviceArray::from_slice(handle, &hops)?)
        } else {
            None
        };
        let labels = if self.labeled {
            let labels: Vec<i32> = sampled.iter().map(|e| e.label).collect();
            Some(TypeErasedDeviceArray::from_slice(handle, &labels)?)
        } else {
            None
        };
        let label_hop_offsets = if self.labeled || options.return_hops() {
            let mut offsets = vec![0_usize; self.label_set.len() * self.num_hops + 1];
            for e in sampled {
                offsets[self.label_index(e.label) * self.num_hops + e.hop + 1] += 1;
            }
            let mut running = 0;
            for offset in &mut offsets {
                running += *offset;
                *offset = running;
            }
            Some(size_array(handle, &offsets)?)
        } else {
            None
        };

        let edges: Vec<usize> = sampled.iter().map(|e| e.edge).collect();
        let attributes = edge_arrays(handle, graph, topology, &edges)?;
        Ok(SampleResult {
            majors: Some(vertex_array(handle, dtype, &majors)?),
            minors: vertex_array(handle, dtype, &minors)?,
            major_offsets: None,
            weights: attributes.weights,
            edge_ids: attributes.edge_ids,
            edge_types: attributes.edge_types,
            hops,
            labels,
            label_hop_offsets,
            renumber_map: None,
            renumber_map_offsets: None,
        })
    }

    #[allow(clippy::too_many_arguments, clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn compressed(
        &self,
        handle: &ResourceHandle,
        graph: &Graph,
        topology: &CsrGraph,
        sampled: &[SampledEdge],
        options: &SamplingOptions,
        renumbering: &Renumbering,
        endpoint: impl Fn(usize, u32) -> i64,
    ) -> Result<SampleResult> {
        let compression = options.compression_type();
        let per_hop = options.compress_per_hop();
        let num_groups = if per_hop {
            self.label_set.len() * self.num_hops
        } else {
            self.label_set.len()
        };

        // (group, major, minor, position in `sampled`)
        let mut keyed: Vec<(usize, i64, i64, usize)> = sampled
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let li = self.label_index(e.label);
                let (src, dst) = (endpoint(li, e.src), endpoint(li, e.dst));
                let (major, minor) = if compression.is_column_major() { (dst, src) } else { (src, dst) };
                let group = if per_hop { li * self.num_hops + e.hop } else { li };
                (group, major, minor, i)
            })
            .collect();
        keyed.sort_unstable();

        let mut major_offsets = vec![0_usize];
        let mut group_rows = vec![0_usize];
        let mut majors = Vec::new();
        let mut cursor = 0;
        for g in 0..num_groups {
            let end = cursor + keyed[cursor..].iter().take_while(|k| k.0 == g).count();
            let group = &keyed[cursor..end];
            let base = major_offsets[major_offsets.len() - 1];
            if compression.is_doubly_compressed() {
                let mut i = 0;
                while i < group.len() {
                    let major = group[i].1;
                    let run = group[i..].iter().take_while(|k| k.1 == major).count();
                    i += run;
                    majors.push(major);
                    major_offsets.push(base + i);
                }
            } else {
                let li = if per_hop { g / self.num_hops } else { g };
                let mut counts = vec![0_usize; renumbering.rows(li)];
                for k in group {
                    counts[k.1 as usize] += 1;
                }
                let mut running = base;
                for count in counts {
                    running += count;
                    major_offsets.push(running);
                }
            }
            group_rows.push(major_offsets.len() - 1);
            cursor = end;
        }

        let dtype = graph.vertex_type();
        let minors: Vec<i64> = keyed.iter().map(|k| k.2).collect();
        let edges: Vec<usize> = keyed.iter().map(|k| sampled[k.3].edge).collect();
        let attributes = edge_arrays(handle, graph, topology, &edges)?;
        let majors = if compression.is_doubly_compressed() {
            Some(vertex_array(handle, dtype, &majors)?)
        } else {
            None
        };

        Ok(SampleResult {
            majors,
            minors: vertex_array(handle, dtype, &minors)?,
            major_offsets: Some(size_array(handle, &major_offsets)?),
            weights: attributes.weights,
            edge_ids: attributes.edge_ids,
            edge_types: attributes.edge_types,
            hops: None,
            labels: None,
            label_hop_offsets: Some(size_array(handle, &group_rows)?),
            renumber_map: None,
            renumber_map_offsets: None,
        })
    }
}
