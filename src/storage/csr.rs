//! CSR (Compressed Sparse Row) topology over dense internal vertex ids
//!
//! # CSR Format
//!
//! ```text
//! Edges (in input order): e0 = 0 → 2, e1 = 0 → 1, e2 = 1 → 2
//!
//! Forward CSR:
//!   row_offsets: [0, 2, 3, 3]   // vertex 0: [0..2), vertex 1: [2..3), vertex 2: [3..3)
//!   col_indices: [1, 2, 2]      // neighbors sorted within each row
//!   edge_index:  [1, 0, 2]      // position -> input edge, for weights/ids/types
//! ```
//!
//! The reverse CSR has the same shape over incoming edges. Edge attributes stay
//! in input order in [`EdgeList`] and are reached through `edge_index`.

use crate::error::{Error, Result};

/// Edge list over internal vertex ids with optional per-edge attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeList {
    /// Source of each edge
    pub src: Vec<u32>,
    /// Destination of each edge
    pub dst: Vec<u32>,
    /// Per-edge weight
    pub weights: Option<Vec<f64>>,
    /// Per-edge id
    pub edge_ids: Option<Vec<i64>>,
    /// Per-edge type
    pub edge_types: Option<Vec<i32>>,
}

impl EdgeList {
    /// Number of edges
    #[must_use]
    pub fn len(&self) -> usize {
        self.src.len()
    }

    /// `true` if there are no edges
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    /// Weight of edge `e` (1.0 for unweighted lists)
    #[must_use]
    pub fn weight(&self, e: usize) -> f64 {
        self.weights.as_ref().map_or(1.0, |w| w[e])
    }

    /// Keep only the edges whose index satisfies `keep`, preserving order
    #[must_use]
    pub fn retain_indices(&self, keep: impl Fn(usize) -> bool) -> Self {
        let picked: Vec<usize> = (0..self.len()).filter(|&e| keep(e)).collect();
        self.select(&picked)
    }

    /// Edges at `indices`, in that order
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            src: indices.iter().map(|&e| self.src[e]).collect(),
            dst: indices.iter().map(|&e| self.dst[e]).collect(),
            weights: self.weights.as_ref().map(|w| indices.iter().map(|&e| w[e]).collect()),
            edge_ids: self.edge_ids.as_ref().map(|w| indices.iter().map(|&e| w[e]).collect()),
            edge_types: self.edge_types.as_ref().map(|w| indices.iter().map(|&e| w[e]).collect()),
        }
    }

    fn check_lengths(&self) -> Result<()> {
        let n = self.len();
        let mismatch = self.dst.len() != n
            || self.weights.as_ref().is_some_and(|w| w.len() != n)
            || self.edge_ids.as_ref().is_some_and(|w| w.len() != n)
            || self.edge_types.as_ref().is_some_and(|w| w.len() != n);
        if mismatch {
            return Err(Error::invalid_value("edge attribute lengths differ from the edge count"));
        }
        Ok(())
    }
}

/// Forward and reverse CSR over `num_vertices` dense ids
#[derive(Debug, Clone)]
pub struct CsrGraph {
    num_vertices: usize,

    /// Forward CSR: vertex v's outgoing edges are `row_offsets[v]..row_offsets[v + 1]`
    row_offsets: Vec<usize>,
    col_indices: Vec<u32>,
    edge_index: Vec<usize>,

    /// Reverse CSR: vertex v's incoming edges
    rev_row_offsets: Vec<usize>,
    rev_col_indices: Vec<u32>,
    rev_edge_index: Vec<usize>,

    edges: EdgeList,
}

impl CsrGraph {
    /// Build from an edge list over ids `0..num_vertices`
    ///
    /// # Errors
    ///
    /// `InvalidValue` for inconsistent attribute lengths, `InvalidInput` for an
    /// endpoint outside `0..num_vertices`
    pub fn from_edge_list(num_vertices: usize, edges: EdgeList) -> Result<Self> {
        edges.check_lengths()?;
        if let Some(bad) = edges
            .src
            .iter()
            .chain(&edges.dst)
            .find(|&&v| v as usize >= num_vertices)
        {
            return Err(Error::invalid_input(format!(
                "edge endpoint {bad} outside 0..{num_vertices}"
            )));
        }

        let (row_offsets, col_indices, edge_index) = build_csr(num_vertices, &edges.src, &edges.dst);
        let (rev_row_offsets, rev_col_indices, rev_edge_index) =
            build_csr(num_vertices, &edges.dst, &edges.src);

        Ok(Self {
            num_vertices,
            row_offsets,
            col_indices,
            edge_index,
            rev_row_offsets,
            rev_col_indices,
            rev_edge_index,
            edges,
        })
    }

    /// Number of vertices
    #[must_use]
    pub const fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// Number of edges
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.col_indices.len()
    }

    /// Edge list in input order
    #[must_use]
    pub const fn edges(&self) -> &EdgeList {
        &self.edges
    }

    /// `true` if the graph carries edge weights
    #[must_use]
    pub fn is_weighted(&self) -> bool {
        self.edges.weights.is_some()
    }

    /// Weight of input edge `e` (1.0 when unweighted)
    #[must_use]
    pub fn weight(&self, e: usize) -> f64 {
        self.edges.weight(e)
    }

    /// Sorted outgoing neighbors of `v`
    #[must_use]
    pub fn out_neighbors(&self, v: u32) -> &[u32] {
        let v = v as usize;
        &self.col_indices[self.row_offsets[v]..self.row_offsets[v + 1]]
    }

    /// Sorted incoming neighbors of `v`
    #[must_use]
    pub fn in_neighbors(&self, v: u32) -> &[u32] {
        let v = v as usize;
        &self.rev_col_indices[self.rev_row_offsets[v]..self.rev_row_offsets[v + 1]]
    }

    /// Outgoing `(neighbor, input edge index)` pairs of `v`
    pub fn out_edges(&self, v: u32) -> impl Iterator<Item = (u32, usize)> + '_ {
        let v = v as usize;
        let range = self.row_offsets[v]..self.row_offsets[v + 1];
        self.col_indices[range.clone()]
            .iter()
            .copied()
            .zip(self.edge_index[range].iter().copied())
    }

    /// Incoming `(neighbor, input edge index)` pairs of `v`
    pub fn in_edges(&self, v: u32) -> impl Iterator<Item = (u32, usize)> + '_ {
        let v = v as usize;
        let range = self.rev_row_offsets[v]..self.rev_row_offsets[v + 1];
        self.rev_col_indices[range.clone()]
            .iter()
            .copied()
            .zip(self.rev_edge_index[range].iter().copied())
    }

    /// Number of outgoing edges of `v`
    #[must_use]
    pub fn out_degree(&self, v: u32) -> usize {
        self.row_offsets[v as usize + 1] - self.row_offsets[v as usize]
    }

    /// Number of incoming edges of `v`
    #[must_use]
    pub fn in_degree(&self, v: u32) -> usize {
        self.rev_row_offsets[v as usize + 1] - self.rev_row_offsets[v as usize]
    }

    /// Sum of outgoing edge weights of every vertex
    #[must_use]
    pub fn out_weight_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.num_vertices];
        for (e, &s) in self.edges.src.iter().enumerate() {
            sums[s as usize] += self.edges.weight(e);
        }
        sums
    }

    /// Sorted, deduplicated neighbors in either direction, without self loops
    #[must_use]
    pub fn undirected_adjacency(&self) -> Vec<Vec<u32>> {
        (0..self.num_vertices)
            .map(|v| {
                #[allow(clippy::cast_possible_truncation)]
                let v = v as u32;
                let mut nbrs: Vec<u32> = self
                    .out_neighbors(v)
                    .iter()
                    .chain(self.in_neighbors(v))
                    .copied()
                    .filter(|&u| u != v)
                    .collect();
                nbrs.sort_unstable();
                nbrs.dedup();
                nbrs
            })
            .collect()
    }

    /// Undirected weighted adjacency (parallel edges and both directions
    /// summed into one entry per neighbor pair), self loops kept
    #[must_use]
    pub fn undirected_weighted_adjacency(&self) -> Vec<Vec<(u32, f64)>> {
        let mut adj: Vec<std::collections::BTreeMap<u32, f64>> =
            vec![std::collections::BTreeMap::new(); self.num_vertices];
        for (e, (&s, &d)) in self.edges.src.iter().zip(&self.edges.dst).enumerate() {
            let w = self.edges.weight(e);
            *adj[s as usize].entry(d).or_insert(0.0) += w;
            if s != d {
                *adj[d as usize].entry(s).or_insert(0.0) += w;
            }
        }
        adj.into_iter().map(|m| m.into_iter().collect()).collect()
    }

    /// Forward CSR components `(row_offsets, col_indices)`
    #[must_use]
    pub fn csr_components(&self) -> (&[usize], &[u32]) {
        (&self.row_offsets, &self.col_indices)
    }
}

/// Counting sort of edges by `major`, rows sorted by `(minor, input index)`
fn build_csr(num_vertices: usize, major: &[u32], minor: &[u32]) -> (Vec<usize>, Vec<u32>, Vec<usize>) {
    let mut row_offsets = vec![0_usize; num_vertices + 1];
    for &m in major {
        row_offsets[m as usize + 1] += 1;
    }
    for v in 0..num_vertices {
        row_offsets[v + 1] += row_offsets[v];
    }

    let mut cursor = row_offsets.clone();
    let mut edge_index = vec![0_usize; major.len()];
    for (e, &m) in major.iter().enumerate() {
        edge_index[cursor[m as usize]] = e;
        cursor[m as usize] += 1;
    }
    for v in 0..num_vertices {
        // Stable: ties keep input order
        edge_index[row_offsets[v]..row_offsets[v + 1]].sort_by_key(|&e| minor[e]);
    }

    let col_indices = edge_index.iter().map(|&e| minor[e]).collect();
    (row_offsets, col_indices, edge_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(src: &[u32], dst: &[u32]) -> EdgeList {
        EdgeList {
            src: src.to_vec(),
            dst: dst.to_vec(),
            ..EdgeList::default()
        }
    }

    #[test]
    fn test_empty_graph() {
        let graph = CsrGraph::from_edge_list(0, EdgeList::default()).unwrap();
        assert_eq!(graph.num_vertices(), 0);
        assert_eq!(graph.num_edges(), 0);
    }

    #[test]
    fn test_forward_csr_structure() {
        let graph = CsrGraph::from_edge_list(3, list(&[0, 0, 1], &[2, 1, 2])).unwrap();

        let (row_offsets, col_indices) = graph.csr_components();
        assert_eq!(row_offsets, &[0, 2, 3, 3]);
        assert_eq!(col_indices, &[1, 2, 2]);

        let edges: Vec<_> = graph.out_edges(0).collect();
        assert_eq!(edges, vec![(1, 1), (2, 0)]);
    }

    #[test]
    fn test_reverse_csr_structure() {
        let graph = CsrGraph::from_edge_list(3, list(&[0, 0, 1], &[1, 2, 2])).unwrap();

        let empty: &[u32] = &[];
        assert_eq!(graph.in_neighbors(0), empty);
        assert_eq!(graph.in_neighbors(1), &[0]);
        assert_eq!(graph.in_neighbors(2), &[0, 1]);
        assert_eq!(graph.in_degree(2), 2);
        assert_eq!(graph.out_degree(0), 2);
    }

    #[test]
    fn test_reverse_csr_multi_edges() {
        let mut edges = list(&[0, 0, 2], &[1, 1, 1]);
        edges.weights = Some(vec![1.0, 2.0, 3.0]);
        let graph = CsrGraph::from_edge_list(3, edges).unwrap();

        let incoming: Vec<_> = graph.in_edges(1).collect();
        assert_eq!(incoming, vec![(0, 0), (0, 1), (2, 2)]);
        assert!((graph.weight(1) - 2.0).abs() < f64::EPSILON);
        assert_eq!(graph.out_weight_sums(), vec![3.0, 0.0, 3.0]);
    }

    #[test]
    fn test_endpoint_out_of_range() {
        let err = CsrGraph::from_edge_list(2, list(&[0], &[2])).unwrap_err();
        assert_eq!(err.code(), crate::StatusCode::InvalidInput);
    }

    #[test]
    fn test_attribute_length_mismatch() {
        let mut edges = list(&[0, 1], &[1, 0]);
        edges.weights = Some(vec![1.0]);
        let err = CsrGraph::from_edge_list(2, edges).unwrap_err();
        assert_eq!(err.code(), crate::StatusCode::InvalidValue);
    }

    #[test]
    fn test_undirected_adjacency() {
        let graph = CsrGraph::from_edge_list(3, list(&[0, 1, 1, 2], &[1, 0, 1, 1])).unwrap();
        let adj = graph.undirected_adjacency();
        assert_eq!(adj[0], vec![1]);
        assert_eq!(adj[1], vec![0, 2]);
        assert_eq!(adj[2], vec![1]);

        let weighted = graph.undirected_weighted_adjacency();
        assert_eq!(weighted[0], vec![(1, 2.0)]);
        assert_eq!(weighted[1], vec![(0, 2.0), (1, 1.0), (2, 1.0)]);
    }

    #[test]
    fn test_select_edges() {
        let mut edges = list(&[0, 1, 2], &[1, 2, 0]);
        edges.edge_types = Some(vec![7, 8, 9]);
        let picked = edges.retain_indices(|e| e != 1);
        assert_eq!(picked.src, vec![0, 2]);
        assert_eq!(picked.edge_types, Some(vec![7, 9]));
    }
}
