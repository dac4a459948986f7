//! Community detection and clustering quality
//!
//! Louvain follows Blondel et al. (2008), "Fast unfolding of communities in
//! large networks". Edges are read as the symmetric matrix `M = A + Aᵀ`; for
//! graphs that are already symmetric this scales every weight by two, which
//! leaves modularity unchanged.

use super::{ClusteringOutput, CommunityEngine, HostEngine};
use crate::options::{EcgOptions, LouvainOptions, SpectralOptions};
use crate::storage::CsrGraph;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

impl CommunityEngine for HostEngine {
    fn louvain(graph: &CsrGraph, options: &LouvainOptions) -> ClusteringOutput {
        let base = LevelGraph::from_graph(graph, |e| graph.weight(e));
        let clusters = multi_level(base, options);
        let modularity = Self::modularity(graph, &clusters);
        tracing::debug!(modularity, "louvain finished");
        ClusteringOutput {
            clusters,
            modularity,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn ecg<R: Rng + ?Sized>(graph: &CsrGraph, options: &EcgOptions, rng: &mut R) -> ClusteringOutput {
        let n = graph.num_vertices();
        let edges = graph.edges();
        let base = LevelGraph::from_graph(graph, |e| graph.weight(e));

        let mut co_clustered = vec![0_usize; edges.len()];
        let mut order: Vec<usize> = (0..n).collect();
        for _ in 0..options.ensemble_size {
            order.shuffle(rng);
            let (assignment, _) = one_level(&base, &options.louvain, &order);
            for (e, count) in co_clustered.iter_mut().enumerate() {
                if assignment[edges.src[e] as usize] == assignment[edges.dst[e] as usize] {
                    *count += 1;
                }
            }
        }

        let ensemble = options.ensemble_size as f64;
        let reweighted = LevelGraph::from_graph(graph, |e| {
            options.min_weight + (1.0 - options.min_weight) * co_clustered[e] as f64 / ensemble
        });
        let clusters = multi_level(reweighted, &options.louvain);
        let modularity = Self::modularity(graph, &clusters);
        ClusteringOutput {
            clusters,
            modularity,
        }
    }

    fn spectral_modularity(graph: &CsrGraph, options: &SpectralOptions) -> Vec<u32> {
        let m = LevelGraph::from_graph(graph, |e| graph.weight(e));
        let two_m = m.total_weight();
        let shift = 2.0 * m.degrees.iter().copied().fold(0.0, f64::max);
        // (B + sI) x with B = M - k kᵀ / 2m
        let embedding = top_eigenvectors(m.len(), options, |x, y| {
            let kx: f64 = m.degrees.iter().zip(x).map(|(k, v)| k * v).sum();
            for i in 0..m.len() {
                let mut acc = m.diag[i] * x[i] + shift * x[i];
                for &(j, w) in &m.adj[i] {
                    acc += w * x[j];
                }
                if two_m > 0.0 {
                    acc -= m.degrees[i] * kx / two_m;
                }
                y[i] = acc;
            }
        });
        k_means(&embedding, options)
    }

    fn balanced_cut(graph: &CsrGraph, options: &SpectralOptions) -> Vec<u32> {
        let m = LevelGraph::from_graph(graph, |e| graph.weight(e));
        let shift = 2.0 * m.degrees.iter().copied().fold(0.0, f64::max);
        // (sI - L) x with L = D - M; its top eigenvectors are L's smallest
        let embedding = top_eigenvectors(m.len(), options, |x, y| {
            for i in 0..m.len() {
                let mut acc = (shift - m.degrees[i] + m.diag[i]) * x[i];
                for &(j, w) in &m.adj[i] {
                    acc += w * x[j];
                }
                y[i] = acc;
            }
        });
        k_means(&embedding, options)
    }

    fn modularity(graph: &CsrGraph, clusters: &[u32]) -> f64 {
        let m = LevelGraph::from_graph(graph, |e| graph.weight(e));
        let assignment: Vec<usize> = clusters.iter().map(|&c| c as usize).collect();
        m.modularity(&assignment, 1.0)
    }

    fn edge_cut(graph: &CsrGraph, clusters: &[u32]) -> f64 {
        let edges = graph.edges();
        let crossing: f64 = (0..edges.len())
            .filter(|&e| clusters[edges.src[e] as usize] != clusters[edges.dst[e] as usize])
            .map(|e| edges.weight(e))
            .sum();
        crossing / 2.0
    }

    #[allow(clippy::cast_precision_loss)]
    fn ratio_cut(graph: &CsrGraph, clusters: &[u32]) -> f64 {
        let edges = graph.edges();
        let mut cut: HashMap<u32, f64> = HashMap::new();
        let mut size: HashMap<u32, usize> = HashMap::new();
        for &c in clusters {
            *size.entry(c).or_insert(0) += 1;
        }
        for e in 0..edges.len() {
            let (cs, cd) = (clusters[edges.src[e] as usize], clusters[edges.dst[e] as usize]);
            if cs != cd {
                *cut.entry(cs).or_insert(0.0) += edges.weight(e);
            }
        }
        cut.iter()
            .map(|(c, w)| w / size.get(c).copied().unwrap_or(1) as f64)
            .sum()
    }

    fn triangle_count(graph: &CsrGraph) -> Vec<u64> {
        let adj = graph.undirected_adjacency();
        let mut counts = vec![0_u64; adj.len()];
        for (u, nbrs) in adj.iter().enumerate() {
            for &v in nbrs.iter().filter(|&&v| v as usize > u) {
                let vi = v as usize;
                for w in sorted_intersection(nbrs, &adj[vi]) {
                    if w > v {
                        counts[u] += 1;
                        counts[vi] += 1;
                        counts[w as usize] += 1;
                    }
                }
            }
        }
        counts
    }
}

/// Weighted symmetric matrix of one aggregation level
#[derive(Debug, Clone)]
struct LevelGraph {
    /// Off-diagonal entries, each pair listed from both ends
    adj: Vec<Vec<(usize, f64)>>,
    /// Diagonal entries
    diag: Vec<f64>,
    /// Row sums
    degrees: Vec<f64>,
}

impl LevelGraph {
    fn from_graph(graph: &CsrGraph, weight: impl Fn(usize) -> f64) -> Self {
        let n = graph.num_vertices();
        let edges = graph.edges();
        let mut rows: Vec<HashMap<usize, f64>> = vec![HashMap::new(); n];
        let mut diag = vec![0.0; n];
        for e in 0..edges.len() {
            let (s, d) = (edges.src[e] as usize, edges.dst[e] as usize);
            let w = weight(e);
            if s == d {
                diag[s] += 2.0 * w;
            } else {
                *rows[s].entry(d).or_insert(0.0) += w;
                *rows[d].entry(s).or_insert(0.0) += w;
            }
        }
        Self::from_rows(rows, diag)
    }

    fn from_rows(rows: Vec<HashMap<usize, f64>>, diag: Vec<f64>) -> Self {
        let adj: Vec<Vec<(usize, f64)>> = rows
            .into_iter()
            .map(|row| {
                let mut row: Vec<(usize, f64)> = row.into_iter().collect();
                row.sort_unstable_by_key(|&(j, _)| j);
                row
            })
            .collect();
        let degrees = adj
            .iter()
            .zip(&diag)
            .map(|(row, d)| d + row.iter().map(|(_, w)| w).sum::<f64>())
            .collect();
        Self { adj, diag, degrees }
    }

    fn len(&self) -> usize {
        self.diag.len()
    }

    fn total_weight(&self) -> f64 {
        self.degrees.iter().sum()
    }

    fn modularity(&self, assignment: &[usize], resolution: f64) -> f64 {
        let two_m = self.total_weight();
        if two_m <= 0.0 {
            return 0.0;
        }
        let num = assignment.iter().copied().max().map_or(0, |m| m + 1);
        let mut internal = vec![0.0; num];
        let mut total = vec![0.0; num];
        for i in 0..self.len() {
            let c = assignment[i];
            internal[c] += self.diag[i];
            total[c] += self.degrees[i];
            for &(j, w) in &self.adj[i] {
                if assignment[j] == c {
                    internal[c] += w;
                }
            }
        }
        internal
            .iter()
            .zip(&total)
            .map(|(inside, tot)| inside / two_m - resolution * (tot / two_m).powi(2))
            .sum()
    }

    /// Collapse every community into one vertex
    fn aggregate(&self, assignment: &[usize], num: usize) -> Self {
        let mut rows: Vec<HashMap<usize, f64>> = vec![HashMap::new(); num];
        let mut diag = vec![0.0; num];
        for i in 0..self.len() {
            let c = assignment[i];
            diag[c] += self.diag[i];
            for &(j, w) in &self.adj[i] {
                let d = assignment[j];
                if c == d {
                    diag[c] += w;
                } else {
                    *rows[c].entry(d).or_insert(0.0) += w;
                }
            }
        }
        Self::from_rows(rows, diag)
    }
}

/// Local moving phase over `order`; returns dense communities and their count
fn one_level(graph: &LevelGraph, options: &LouvainOptions, order: &[usize]) -> (Vec<usize>, usize) {
    let n = graph.len();
    let two_m = graph.total_weight();
    let mut community: Vec<usize> = (0..n).collect();
    if two_m <= 0.0 {
        return (community, n);
    }

    let mut totals = graph.degrees.clone();
    let mut weight_to: Vec<f64> = vec![0.0; n];
    let mut touched: Vec<usize> = Vec::new();
    let mut quality = graph.modularity(&community, options.resolution);

    loop {
        for &i in order {
            let own = community[i];
            let k_i = graph.degrees[i];
            totals[own] -= k_i;

            touched.clear();
            touched.push(own);
            for &(j, w) in &graph.adj[i] {
                let c = community[j];
                if weight_to[c] == 0.0 && !touched.contains(&c) {
                    touched.push(c);
                }
                weight_to[c] += w;
            }

            let score = |c: usize| weight_to[c] - options.resolution * totals[c] * k_i / two_m;
            let mut best = own;
            let mut best_score = score(own);
            for &c in &touched {
                let s = score(c);
                if s > best_score || (s == best_score && c < best && best != own) {
                    best = c;
                    best_score = s;
                }
            }

            for &c in &touched {
                weight_to[c] = 0.0;
            }
            totals[best] += k_i;
            community[i] = best;
        }

        let next = graph.modularity(&community, options.resolution);
        if next - quality <= options.threshold {
            break;
        }
        quality = next;
    }

    let num = densify(&mut community);
    (community, num)
}

/// Renumber community ids to `0..num` in order of first appearance
fn densify(community: &mut [usize]) -> usize {
    let mut ids: HashMap<usize, usize> = HashMap::new();
    for c in community.iter_mut() {
        let next = ids.len();
        *c = *ids.entry(*c).or_insert(next);
    }
    ids.len()
}

#[allow(clippy::cast_possible_truncation)]
fn multi_level(base: LevelGraph, options: &LouvainOptions) -> Vec<u32> {
    let n = base.len();
    let mut assignment: Vec<usize> = (0..n).collect();
    let mut level_graph = base;

    for level in 0..options.max_level {
        let order: Vec<usize> = (0..level_graph.len()).collect();
        let (communities, num) = one_level(&level_graph, options, &order);
        if num == level_graph.len() {
            tracing::debug!(level, "louvain reached a fixed point");
            break;
        }
        for c in &mut assignment {
            *c = communities[*c];
        }
        level_graph = level_graph.aggregate(&communities, num);
    }

    assignment.into_iter().map(|c| c as u32).collect()
}

/// Leading eigenvectors of a symmetric positive semi-definite operator by
/// power iteration with deflation; row `i` of the result embeds vertex `i`
#[allow(clippy::cast_precision_loss)]
fn top_eigenvectors(n: usize, options: &SpectralOptions, apply: impl Fn(&[f64], &mut [f64])) -> Vec<Vec<f64>> {
    let k = options.n_eigenvectors.min(n);
    let mut basis: Vec<Vec<f64>> = Vec::with_capacity(k);
    let mut y = vec![0.0; n];

    for j in 0..k {
        let mut x: Vec<f64> = (0..n)
            .map(|i| ((i as f64 + 1.0) * (j as f64 + 1.5)).sin())
            .collect();
        orthonormalize(&mut x, &basis);
        for _ in 0..options.evs_max_iterations {
            apply(&x, &mut y);
            orthonormalize(&mut y, &basis);
            let diff: f64 = y.iter().zip(&x).map(|(a, b)| (a - b).powi(2)).sum::<f64>().sqrt();
            std::mem::swap(&mut x, &mut y);
            if diff < options.evs_tolerance {
                break;
            }
        }
        basis.push(x);
    }

    (0..n).map(|i| basis.iter().map(|v| v[i]).collect()).collect()
}

fn orthonormalize(x: &mut [f64], basis: &[Vec<f64>]) {
    for b in basis {
        let dot: f64 = x.iter().zip(b).map(|(a, c)| a * c).sum();
        x.iter_mut().zip(b).for_each(|(a, c)| *a -= dot * c);
    }
    let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        x.iter_mut().for_each(|v| *v /= norm);
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Lloyd's k-means with farthest-first seeding from row 0
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn k_means(points: &[Vec<f64>], options: &SpectralOptions) -> Vec<u32> {
    let n = points.len();
    let k = options.n_clusters.min(n);
    if k == 0 {
        return Vec::new();
    }

    let mut centers: Vec<Vec<f64>> = vec![points[0].clone()];
    let mut nearest: Vec<f64> = points.iter().map(|p| squared_distance(p, &points[0])).collect();
    while centers.len() < k {
        let mut far = 0;
        for i in 1..n {
            if nearest[i] > nearest[far] {
                far = i;
            }
        }
        centers.push(points[far].clone());
        for (d, p) in nearest.iter_mut().zip(points) {
            *d = d.min(squared_distance(p, &points[far]));
        }
    }

    let mut assignment = vec![0_usize; n];
    for _ in 0..options.k_means_max_iterations {
        for (a, p) in assignment.iter_mut().zip(points) {
            *a = (0..k)
                .min_by(|&x, &y| squared_distance(p, &centers[x]).total_cmp(&squared_distance(p, &centers[y])))
                .unwrap_or(0);
        }

        let dim = points[0].len();
        let mut sums = vec![vec![0.0; dim]; k];
        let mut counts = vec![0_usize; k];
        for (p, &a) in points.iter().zip(&assignment) {
            counts[a] += 1;
            sums[a].iter_mut().zip(p).for_each(|(s, x)| *s += x);
        }
        let mut shift = 0.0;
        for c in 0..k {
            if counts[c] == 0 {
                continue;
            }
            let center: Vec<f64> = sums[c].iter().map(|s| s / counts[c] as f64).collect();
            shift += squared_distance(&center, &centers[c]);
            centers[c] = center;
        }
        if shift.sqrt() < options.k_means_tolerance {
            break;
        }
    }

    let mut dense = assignment;
    densify(&mut dense);
    dense.into_iter().map(|c| c as u32).collect()
}

/// Common elements of two sorted slices
pub(super) fn sorted_intersection<'a>(a: &'a [u32], b: &'a [u32]) -> impl Iterator<Item = u32> + 'a {
    let (mut i, mut j) = (0, 0);
    std::iter::from_fn(move || {
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    let v = a[i];
                    i += 1;
                    j += 1;
                    return Some(v);
                }
            }
        }
        None
    })
}
