//! Contiguous block ownership of internal vertex ids across ranks

use std::ops::Range;

/// Rank `r` owns ids `[r * n / size, (r + 1) * n / size)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexPartition {
    num_vertices: usize,
    size: usize,
}

impl VertexPartition {
    /// Partition `num_vertices` ids over `size` ranks
    #[must_use]
    pub fn new(num_vertices: usize, size: usize) -> Self {
        Self {
            num_vertices,
            size: size.max(1),
        }
    }

    /// Number of ranks
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Ids owned by `rank`
    #[must_use]
    pub const fn range(&self, rank: usize) -> Range<usize> {
        let n = self.num_vertices;
        (rank * n / self.size)..((rank + 1) * n / self.size)
    }

    /// Rank owning internal id `v`
    #[must_use]
    pub fn owner(&self, v: u32) -> usize {
        let v = v as usize;
        // Largest r with r * n / size <= v
        let mut rank = (v * self.size) / self.num_vertices.max(1);
        while rank + 1 < self.size && self.range(rank + 1).start <= v {
            rank += 1;
        }
        while rank > 0 && self.range(rank).start > v {
            rank -= 1;
        }
        rank.min(self.size - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_vertex_owned_once() {
        for size in 1..5 {
            for n in 0..12 {
                let part = VertexPartition::new(n, size);
                let mut seen = vec![0; n];
                for rank in 0..size {
                    for v in part.range(rank) {
                        seen[v] += 1;
                        #[allow(clippy::cast_possible_truncation)]
                        let id = v as u32;
                        assert_eq!(part.owner(id), rank);
                    }
                }
                assert!(seen.iter().all(|&c| c == 1));
            }
        }
    }
}
