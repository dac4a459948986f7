//! Collective multi-partition construction
//!
//! Every rank passes its local edge data as `num_arrays` chunks per role.
//! Assembly runs in three collectives:
//! 1. handshake: local validation outcome, element types, options, properties
//! 2. edge gather: every rank receives the concatenated global edge list
//! 3. (none) every rank runs the same normalization and keeps its partition

use super::build::{normalize, read_edge_views, EdgeListViews, GraphBuildOptions, RawEdges};
use super::{EdgeTypeSignature, Graph, VertexPartition};
use crate::array::convert::read_vertices;
use crate::array::TypeErasedDeviceArrayView;
use crate::error::{Error, Result};
use crate::resource::ResourceHandle;
use crate::types::GraphProperties;

/// Chunked local edge data of one rank
///
/// Chunks of a role are concatenated in order. `src`, `dst` and every supplied
/// attribute role must have the same number of chunks; a rank without data
/// passes empty slices or zero-length views.
#[derive(Debug, Clone, Copy)]
pub struct MgEdgeListChunks<'a> {
    /// Optional vertex list chunks
    pub vertices: Option<&'a [&'a TypeErasedDeviceArrayView]>,
    /// Source chunks
    pub src: &'a [&'a TypeErasedDeviceArrayView],
    /// Destination chunks
    pub dst: &'a [&'a TypeErasedDeviceArrayView],
    /// Optional weight chunks
    pub weights: Option<&'a [&'a TypeErasedDeviceArrayView]>,
    /// Optional edge id chunks
    pub edge_ids: Option<&'a [&'a TypeErasedDeviceArrayView]>,
    /// Optional edge type chunks
    pub edge_types: Option<&'a [&'a TypeErasedDeviceArrayView]>,
}

impl<'a> MgEdgeListChunks<'a> {
    /// Unweighted chunked edge list
    #[must_use]
    pub const fn new(
        src: &'a [&'a TypeErasedDeviceArrayView],
        dst: &'a [&'a TypeErasedDeviceArrayView],
    ) -> Self {
        Self {
            vertices: None,
            src,
            dst,
            weights: None,
            edge_ids: None,
            edge_types: None,
        }
    }

    /// Attach weight chunks
    #[must_use]
    pub const fn with_weights(mut self, weights: &'a [&'a TypeErasedDeviceArrayView]) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Attach vertex list chunks
    #[must_use]
    pub const fn with_vertices(mut self, vertices: &'a [&'a TypeErasedDeviceArrayView]) -> Self {
        self.vertices = Some(vertices);
        self
    }

    /// Number of chunks per role
    #[must_use]
    pub const fn num_arrays(&self) -> usize {
        self.src.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Handshake {
    failure: Option<String>,
    signature: Option<EdgeTypeSignature>,
    options: GraphBuildOptions,
    properties: GraphProperties,
}

/// Build a graph partitioned over every rank of `handle`'s group
///
/// Collective: every rank must call it, even without local data.
///
/// # Errors
///
/// Local validation errors on the failing rank (`InvalidValue`,
/// `TypeMismatch`), `InvalidInput` on the other ranks; `TypeMismatch` when
/// ranks disagree on element types or attribute sets; `InvalidInput` when ranks
/// disagree on options or properties, or when no rank supplied edge data
pub fn mg_graph_create(
    handle: &ResourceHandle,
    properties: GraphProperties,
    chunks: &MgEdgeListChunks<'_>,
    options: &GraphBuildOptions,
) -> Result<Graph> {
    let local = read_chunks(handle, chunks);

    let handshake = Handshake {
        failure: local.as_ref().err().map(ToString::to_string),
        signature: local.as_ref().ok().and_then(|(_, sig)| *sig),
        options: *options,
        properties,
    };
    let peers = handle.all_gather("graph.mg.handshake", handshake)?;

    let (raw, _) = local?;
    if let Some((rank, failure)) = peers
        .iter()
        .enumerate()
        .find_map(|(rank, p)| p.failure.as_ref().map(|f| (rank, f)))
    {
        return Err(Error::invalid_input(format!(
            "graph construction failed on rank {rank}: {failure}"
        )));
    }
    if peers.iter().any(|p| p.options != *options || p.properties != properties) {
        return Err(Error::invalid_input("ranks disagree on graph options or properties"));
    }
    let mut signatures = peers.iter().filter_map(|p| p.signature);
    let Some(signature) = signatures.next() else {
        return Err(Error::invalid_input("no rank supplied typed edge data"));
    };
    if signatures.any(|s| s != signature) {
        return Err(Error::type_mismatch(
            "ranks disagree on vertex, weight, edge id or edge type types",
        ));
    }

    let mut global = RawEdges::default();
    for part in handle.all_gather("graph.mg.edges", raw)? {
        global.extend(part);
    }

    let normalized = normalize(global, properties, options)?;
    let num_vertices = normalized.renumber.len();
    let num_edges = normalized.edges.len();
    let partition = VertexPartition::new(num_vertices, handle.comm_size());
    let rank = handle.rank();
    let major = if options.store_transposed {
        &normalized.edges.dst
    } else {
        &normalized.edges.src
    };
    let local_edges = normalized
        .edges
        .retain_indices(|e| partition.owner(major[e]) == rank);

    tracing::info!(
        rank,
        num_vertices,
        num_edges,
        local_edges = local_edges.len(),
        "multi-partition graph assembled"
    );

    Ok(Graph::distributed(
        normalized.properties,
        options.store_transposed,
        signature,
        normalized.renumber,
        partition,
        local_edges,
        num_edges,
    ))
}

/// Read and concatenate this rank's chunks
///
/// The signature is `None` when the rank supplied no chunks at all.
fn read_chunks(
    handle: &ResourceHandle,
    chunks: &MgEdgeListChunks<'_>,
) -> Result<(RawEdges, Option<EdgeTypeSignature>)> {
    let num_arrays = chunks.num_arrays();
    let roles = [
        ("dst", Some(chunks.dst)),
        ("weights", chunks.weights),
        ("edge ids", chunks.edge_ids),
        ("edge types", chunks.edge_types),
    ];
    for (name, role) in roles {
        if let Some(role) = role {
            if role.len() != num_arrays {
                return Err(Error::invalid_value(format!(
                    "{} {name} chunks for {num_arrays} source chunks",
                    role.len()
                )));
            }
        }
    }

    let mut raw = RawEdges::default();
    let mut signature: Option<EdgeTypeSignature> = None;
    for i in 0..num_arrays {
        let input = EdgeListViews {
            vertices: None,
            src: chunks.src[i],
            dst: chunks.dst[i],
            weights: chunks.weights.map(|w| w[i]),
            edge_ids: chunks.edge_ids.map(|w| w[i]),
            edge_types: chunks.edge_types.map(|w| w[i]),
        };
        let (part, sig) = read_edge_views(handle, &input)?;
        match signature {
            Some(existing) if existing != sig => {
                return Err(Error::type_mismatch(format!("chunk {i} changes element types")));
            }
            _ => signature = Some(sig),
        }
        raw.extend(part);
    }

    if let Some(vertex_chunks) = chunks.vertices {
        let mut vertices = Vec::new();
        for chunk in vertex_chunks {
            chunk.check_handle(handle)?;
            if let Some(sig) = signature {
                if chunk.dtype() != sig.vertex {
                    return Err(Error::type_mismatch(format!(
                        "vertex list is {}, edges are {}",
                        chunk.dtype(),
                        sig.vertex
                    )));
                }
            }
            vertices.extend(read_vertices(chunk)?);
        }
        raw.vertices = Some(vertices);
    }

    Ok((raw, signature))
}
