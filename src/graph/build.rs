//! Single-partition construction pipeline
//!
//! Steps, in order:
//! 1. length (`InvalidValue`) and element type (`TypeMismatch`) checks
//! 2. checks needed to build at all (negative labels without renumbering)
//! 3. symmetrize (both directions of a pair settle on the smaller weight)
//! 4. drop self loops / multi edges (first occurrence of an ordered pair kept)
//! 5. expensive checks when requested
//! 6. renumber to a dense range, or identity labels without renumbering
//! 7. forward and reverse CSR

use super::renumber::RenumberMap;
use super::{EdgeTypeSignature, Graph};
use crate::array::convert::{read_i32, read_offsets, read_vertices, read_weights};
use crate::array::TypeErasedDeviceArrayView;
use crate::error::{Error, Result};
use crate::resource::ResourceHandle;
use crate::storage::{CsrGraph, EdgeList};
use crate::types::{DataType, GraphProperties};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Structural options applied while building a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphBuildOptions {
    /// Prefer destination-major storage
    pub store_transposed: bool,
    /// Relabel vertices to a dense range
    pub renumber: bool,
    /// Add the reverse of every edge that lacks one and equalize the
    /// weights of reciprocal pairs
    pub symmetrize: bool,
    /// Remove `(v, v)` edges
    pub drop_self_loops: bool,
    /// Keep only the first occurrence of each ordered pair
    pub drop_multi_edges: bool,
    /// Validate declared properties against the data
    pub do_expensive_check: bool,
}

impl Default for GraphBuildOptions {
    fn default() -> Self {
        Self {
            store_transposed: false,
            renumber: true,
            symmetrize: false,
            drop_self_loops: false,
            drop_multi_edges: false,
            do_expensive_check: false,
        }
    }
}

/// Edge list inputs of a single-partition graph
#[derive(Debug, Clone, Copy)]
pub struct EdgeListViews<'a> {
    /// Optional vertex list (adds isolated vertices)
    pub vertices: Option<&'a TypeErasedDeviceArrayView>,
    /// Edge sources
    pub src: &'a TypeErasedDeviceArrayView,
    /// Edge destinations
    pub dst: &'a TypeErasedDeviceArrayView,
    /// Optional edge weights
    pub weights: Option<&'a TypeErasedDeviceArrayView>,
    /// Optional edge ids
    pub edge_ids: Option<&'a TypeErasedDeviceArrayView>,
    /// Optional edge types
    pub edge_types: Option<&'a TypeErasedDeviceArrayView>,
}

impl<'a> EdgeListViews<'a> {
    /// Unweighted edge list
    #[must_use]
    pub const fn new(src: &'a TypeErasedDeviceArrayView, dst: &'a TypeErasedDeviceArrayView) -> Self {
        Self {
            vertices: None,
            src,
            dst,
            weights: None,
            edge_ids: None,
            edge_types: None,
        }
    }

    /// Attach edge weights
    #[must_use]
    pub const fn with_weights(mut self, weights: &'a TypeErasedDeviceArrayView) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Attach a vertex list
    #[must_use]
    pub const fn with_vertices(mut self, vertices: &'a TypeErasedDeviceArrayView) -> Self {
        self.vertices = Some(vertices);
        self
    }

    /// Attach edge ids
    #[must_use]
    pub const fn with_edge_ids(mut self, edge_ids: &'a TypeErasedDeviceArrayView) -> Self {
        self.edge_ids = Some(edge_ids);
        self
    }

    /// Attach edge types
    #[must_use]
    pub const fn with_edge_types(mut self, edge_types: &'a TypeErasedDeviceArrayView) -> Self {
        self.edge_types = Some(edge_types);
        self
    }
}

/// CSR inputs of a single-partition graph
#[derive(Debug, Clone, Copy)]
pub struct CsrViews<'a> {
    /// Row offsets (`num_vertices + 1` entries)
    pub offsets: &'a TypeErasedDeviceArrayView,
    /// Column indices (`offsets[num_vertices]` entries)
    pub indices: &'a TypeErasedDeviceArrayView,
    /// Optional weights keyed to edge position
    pub weights: Option<&'a TypeErasedDeviceArrayView>,
    /// Optional edge ids keyed to edge position
    pub edge_ids: Option<&'a TypeErasedDeviceArrayView>,
    /// Optional edge types keyed to edge position
    pub edge_types: Option<&'a TypeErasedDeviceArrayView>,
}

/// Edge data in external labels, widened for processing
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RawEdges {
    pub(crate) vertices: Option<Vec<i64>>,
    pub(crate) src: Vec<i64>,
    pub(crate) dst: Vec<i64>,
    pub(crate) weights: Option<Vec<f64>>,
    pub(crate) edge_ids: Option<Vec<i64>>,
    pub(crate) edge_types: Option<Vec<i32>>,
}

impl RawEdges {
    pub(crate) fn len(&self) -> usize {
        self.src.len()
    }

    fn select(&self, keep: &[usize]) -> Self {
        Self {
            vertices: self.vertices.clone(),
            src: keep.iter().map(|&e| self.src[e]).collect(),
            dst: keep.iter().map(|&e| self.dst[e]).collect(),
            weights: self.weights.as_ref().map(|w| keep.iter().map(|&e| w[e]).collect()),
            edge_ids: self.edge_ids.as_ref().map(|w| keep.iter().map(|&e| w[e]).collect()),
            edge_types: self.edge_types.as_ref().map(|w| keep.iter().map(|&e| w[e]).collect()),
        }
    }

    /// Append every chunk's data in order
    pub(crate) fn extend(&mut self, other: Self) {
        extend_opt(&mut self.vertices, other.vertices);
        self.src.extend(other.src);
        self.dst.extend(other.dst);
        extend_opt(&mut self.weights, other.weights);
        extend_opt(&mut self.edge_ids, other.edge_ids);
        extend_opt(&mut self.edge_types, other.edge_types);
    }

    fn weight(&self, e: usize) -> f64 {
        self.weights.as_ref().map_or(1.0, |w| w[e])
    }
}

fn extend_opt<T>(dst: &mut Option<Vec<T>>, src: Option<Vec<T>>) {
    if let Some(src) = src {
        dst.get_or_insert_with(Vec::new).extend(src);
    }
}

/// Output of the normalization steps
#[derive(Debug)]
pub(crate) struct Normalized {
    pub(crate) renumber: RenumberMap,
    pub(crate) edges: EdgeList,
    pub(crate) properties: GraphProperties,
}

/// Build a single-partition graph from an edge list
///
/// # Errors
///
/// `InvalidValue` for inconsistent lengths, `TypeMismatch` for unsupported or
/// mixed element types, `InvalidInput` for data that violates the declared
/// properties (only detected with `do_expensive_check`)
pub fn sg_graph_create(
    handle: &ResourceHandle,
    properties: GraphProperties,
    input: &EdgeListViews<'_>,
    options: &GraphBuildOptions,
) -> Result<Graph> {
    let (raw, signature) = read_edge_views(handle, input)?;
    tracing::debug!(edges = raw.len(), ?signature, "building single-partition graph");
    let normalized = normalize(raw, properties, options)?;
    let num_vertices = normalized.renumber.len();
    let csr = CsrGraph::from_edge_list(num_vertices, normalized.edges)?;
    Ok(Graph::single(
        normalized.properties,
        options.store_transposed,
        signature,
        normalized.renumber,
        Arc::new(csr),
    ))
}

/// Build a single-partition graph from CSR arrays
///
/// # Errors
///
/// `InvalidInput` for malformed offsets or out-of-range indices,
/// `InvalidValue` for inconsistent lengths
pub fn sg_graph_create_from_csr(
    handle: &ResourceHandle,
    properties: GraphProperties,
    input: &CsrViews<'_>,
    options: &GraphBuildOptions,
) -> Result<Graph> {
    for view in [Some(input.offsets), Some(input.indices), input.weights, input.edge_ids, input.edge_types]
        .into_iter()
        .flatten()
    {
        view.check_handle(handle)?;
    }

    let offsets = read_offsets(input.offsets)?;
    let indices = read_vertices(input.indices)?;
    let vertex = input.indices.dtype();

    let Some((&first, rest)) = offsets.split_first() else {
        return Err(Error::invalid_input("CSR offsets must hold at least one entry"));
    };
    if first != 0 {
        return Err(Error::invalid_input(format!("CSR offsets start at {first}, expected 0")));
    }
    if rest.iter().zip(&offsets).any(|(next, prev)| next < prev) {
        return Err(Error::invalid_input("CSR offsets must be non-decreasing"));
    }
    let num_vertices = offsets.len() - 1;
    let num_edges = offsets[num_vertices];
    if indices.len() != num_edges {
        return Err(Error::invalid_value(format!(
            "CSR indices hold {} entries, offsets describe {num_edges}",
            indices.len()
        )));
    }
    if let Some(bad) = indices
        .iter()
        .find(|&&v| v < 0 || usize::try_from(v).map_or(true, |v| v >= num_vertices))
    {
        return Err(Error::invalid_input(format!(
            "CSR index {bad} outside 0..{num_vertices}"
        )));
    }

    let mut src = Vec::with_capacity(num_edges);
    for (v, window) in offsets.windows(2).enumerate() {
        src.extend(std::iter::repeat(v as i64).take(window[1] - window[0]));
    }

    let (weights, edge_ids, edge_types, signature) =
        read_attributes(vertex, num_edges, input.weights, input.edge_ids, input.edge_types)?;
    let raw = RawEdges {
        vertices: Some((0..num_vertices as i64).collect()),
        src,
        dst: indices,
        weights,
        edge_ids,
        edge_types,
    };

    tracing::debug!(num_vertices, num_edges, "building single-partition graph from CSR");
    let normalized = normalize(raw, properties, options)?;
    let csr = CsrGraph::from_edge_list(normalized.renumber.len(), normalized.edges)?;
    Ok(Graph::single(
        normalized.properties,
        options.store_transposed,
        signature,
        normalized.renumber,
        Arc::new(csr),
    ))
}

/// Step 1 for an edge list: read and validate the views
pub(crate) fn read_edge_views(
    handle: &ResourceHandle,
    input: &EdgeListViews<'_>,
) -> Result<(RawEdges, EdgeTypeSignature)> {
    for view in [
        input.vertices,
        Some(input.src),
        Some(input.dst),
        input.weights,
        input.edge_ids,
        input.edge_types,
    ]
    .into_iter()
    .flatten()
    {
        view.check_handle(handle)?;
    }

    let num_edges = input.src.size();
    if input.dst.size() != num_edges {
        return Err(Error::invalid_value(format!(
            "src holds {num_edges} edges, dst holds {}",
            input.dst.size()
        )));
    }

    let vertex = input.src.dtype();
    if !vertex.is_vertex_type() {
        return Err(Error::type_mismatch(format!("vertex type must be int32 or int64, got {vertex}")));
    }
    if input.dst.dtype() != vertex {
        return Err(Error::type_mismatch(format!(
            "src is {vertex}, dst is {}",
            input.dst.dtype()
        )));
    }
    if let Some(vertices) = input.vertices {
        if vertices.dtype() != vertex {
            return Err(Error::type_mismatch(format!(
                "vertex list is {}, edges are {vertex}",
                vertices.dtype()
            )));
        }
    }

    let (weights, edge_ids, edge_types, signature) =
        read_attributes(vertex, num_edges, input.weights, input.edge_ids, input.edge_types)?;

    let raw = RawEdges {
        vertices: input.vertices.map(read_vertices).transpose()?,
        src: read_vertices(input.src)?,
        dst: read_vertices(input.dst)?,
        weights,
        edge_ids,
        edge_types,
    };
    Ok((raw, signature))
}

type Attributes = (Option<Vec<f64>>, Option<Vec<i64>>, Option<Vec<i32>>, EdgeTypeSignature);

fn read_attributes(
    vertex: DataType,
    num_edges: usize,
    weights: Option<&TypeErasedDeviceArrayView>,
    edge_ids: Option<&TypeErasedDeviceArrayView>,
    edge_types: Option<&TypeErasedDeviceArrayView>,
) -> Result<Attributes> {
    for (name, view) in [("weights", weights), ("edge ids", edge_ids), ("edge types", edge_types)] {
        if let Some(view) = view {
            if view.size() != num_edges {
                return Err(Error::invalid_value(format!(
                    "{name} hold {} entries for {num_edges} edges",
                    view.size()
                )));
            }
        }
    }
    if let Some(ids) = edge_ids {
        if !ids.dtype().is_vertex_type() {
            return Err(Error::type_mismatch(format!("edge ids must be int32 or int64, got {}", ids.dtype())));
        }
    }

    let signature = EdgeTypeSignature {
        vertex,
        weight: weights.map(TypeErasedDeviceArrayView::dtype),
        edge_id: edge_ids.map(TypeErasedDeviceArrayView::dtype),
        edge_type: edge_types.map(TypeErasedDeviceArrayView::dtype),
    };
    Ok((
        weights.map(read_weights).transpose()?,
        edge_ids.map(read_vertices).transpose()?,
        edge_types.map(read_i32).transpose()?,
        signature,
    ))
}

/// Steps 2-6: shared by single- and multi-partition construction
pub(crate) fn normalize(
    mut raw: RawEdges,
    mut properties: GraphProperties,
    options: &GraphBuildOptions,
) -> Result<Normalized> {
    if !options.renumber {
        let labels = raw.src.iter().chain(&raw.dst).chain(raw.vertices.iter().flatten());
        if let Some(bad) = labels.copied().find(|&v| u32::try_from(v).is_err()) {
            return Err(Error::invalid_input(format!(
                "vertex {bad} cannot be used without renumbering"
            )));
        }
    }

    if options.symmetrize {
        raw = symmetrize(raw);
        properties.is_symmetric = true;
    }

    if options.drop_self_loops || options.drop_multi_edges {
        let before = raw.len();
        raw = drop_edges(&raw, options.drop_self_loops, options.drop_multi_edges);
        tracing::debug!(dropped = before - raw.len(), "edges dropped");
    }

    if options.do_expensive_check {
        expensive_check(&raw, properties)?;
    }

    let renumber = if options.renumber {
        let mut labels = Vec::with_capacity(raw.src.len() * 2);
        labels.extend(raw.vertices.iter().flatten().copied());
        labels.extend(&raw.src);
        labels.extend(&raw.dst);
        RenumberMap::from_labels(labels)?
    } else {
        let max = raw
            .src
            .iter()
            .chain(&raw.dst)
            .chain(raw.vertices.iter().flatten())
            .copied()
            .max();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // checked above
        RenumberMap::identity(max.map_or(0, |m| m as usize + 1))
    };

    let edges = EdgeList {
        src: renumber.internalize(&raw.src)?,
        dst: renumber.internalize(&raw.dst)?,
        weights: raw.weights,
        edge_ids: raw.edge_ids,
        edge_types: raw.edge_types,
    };
    Ok(Normalized {
        renumber,
        edges,
        properties,
    })
}

fn symmetrize(raw: RawEdges) -> RawEdges {
    let present: HashSet<(i64, i64)> = raw.src.iter().copied().zip(raw.dst.iter().copied()).collect();
    let mut added: HashSet<(i64, i64)> = HashSet::new();
    let mut reverse = Vec::new();
    for e in 0..raw.len() {
        let (u, v) = (raw.src[e], raw.dst[e]);
        if u != v && !present.contains(&(v, u)) && added.insert((v, u)) {
            reverse.push(e);
        }
    }

    let mut out = raw.clone();
    let mirrored = raw.select(&reverse);
    out.src.extend(mirrored.dst);
    out.dst.extend(mirrored.src);
    extend_opt(&mut out.weights, mirrored.weights);
    extend_opt(&mut out.edge_ids, mirrored.edge_ids);
    extend_opt(&mut out.edge_types, mirrored.edge_types);
    settle_pair_weights(&mut out);
    out
}

/// Give both directions of every vertex pair the smaller of their weights
fn settle_pair_weights(raw: &mut RawEdges) {
    let Some(weights) = raw.weights.as_mut() else {
        return;
    };
    let key = |u: i64, v: i64| (u.min(v), u.max(v));
    let mut lightest: HashMap<(i64, i64), f64> = HashMap::new();
    for (e, &w) in weights.iter().enumerate() {
        lightest
            .entry(key(raw.src[e], raw.dst[e]))
            .and_modify(|m| *m = m.min(w))
            .or_insert(w);
    }
    for (e, w) in weights.iter_mut().enumerate() {
        if let Some(&m) = lightest.get(&key(raw.src[e], raw.dst[e])) {
            *w = m;
        }
    }
}

fn drop_edges(raw: &RawEdges, self_loops: bool, multi_edges: bool) -> RawEdges {
    let mut seen = HashSet::new();
    let keep: Vec<usize> = (0..raw.len())
        .filter(|&e| {
            let (u, v) = (raw.src[e], raw.dst[e]);
            !(self_loops && u == v) && (!multi_edges || seen.insert((u, v)))
        })
        .collect();
    raw.select(&keep)
}

fn expensive_check(raw: &RawEdges, properties: GraphProperties) -> Result<()> {
    let mut pairs: HashMap<(i64, i64), Vec<f64>> = HashMap::new();
    for e in 0..raw.len() {
        pairs.entry((raw.src[e], raw.dst[e])).or_default().push(raw.weight(e));
    }

    if !properties.is_multigraph {
        if let Some(((u, v), _)) = pairs.iter().find(|(_, ws)| ws.len() > 1) {
            return Err(Error::invalid_input(format!(
                "parallel edge ({u}, {v}) in a graph declared without multi edges"
            )));
        }
    }

    if properties.is_symmetric {
        for e in 0..raw.len() {
            let (u, v, w) = (raw.src[e], raw.dst[e], raw.weight(e));
            #[allow(clippy::float_cmp)] // mirrored edges carry identical weights
            let mirrored = pairs
                .get(&(v, u))
                .is_some_and(|ws| ws.iter().any(|&x| x == w));
            if !mirrored {
                return Err(Error::invalid_input(format!(
                    "graph declared symmetric but edge ({u}, {v}) has no mirror with equal weight"
                )));
            }
        }
    }

    if let Some(vertices) = &raw.vertices {
        let mut listed = HashSet::with_capacity(vertices.len());
        if let Some(dup) = vertices.iter().find(|&&v| !listed.insert(v)) {
            return Err(Error::invalid_input(format!("vertex {dup} listed twice")));
        }
        if let Some(bad) = raw.src.iter().chain(&raw.dst).find(|v| !listed.contains(*v)) {
            return Err(Error::invalid_input(format!(
                "edge endpoint {bad} is missing from the vertex list"
            )));
        }
    }
    Ok(())
}
