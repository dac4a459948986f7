//! Mapping between external vertex labels and dense internal ids

use crate::error::{Error, Result};
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Mapping {
    /// Labels are already `0..n`
    Identity,
    /// `labels[id]` is the external label of internal id `id`
    Dense {
        labels: Vec<i64>,
        lookup: HashMap<i64, u32>,
    },
}

/// Internal id <-> external label translation retained by a graph
#[derive(Debug, Clone)]
pub struct RenumberMap {
    len: usize,
    mapping: Mapping,
}

impl RenumberMap {
    /// Labels `0..len` map to themselves
    #[must_use]
    pub const fn identity(len: usize) -> Self {
        Self {
            len,
            mapping: Mapping::Identity,
        }
    }

    /// Dense relabeling of `labels` in ascending order
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the label set does not fit in 32-bit internal ids
    pub fn from_labels(mut labels: Vec<i64>) -> Result<Self> {
        labels.sort_unstable();
        labels.dedup();
        if u32::try_from(labels.len()).is_err() {
            return Err(Error::invalid_input("more than 2^32 distinct vertices"));
        }

        #[allow(clippy::cast_possible_truncation)]
        let lookup = labels
            .iter()
            .enumerate()
            .map(|(id, &label)| (label, id as u32))
            .collect();
        Ok(Self {
            len: labels.len(),
            mapping: Mapping::Dense { labels, lookup },
        })
    }

    /// Number of vertices
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// `true` if the graph has no vertices
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` when no relabeling took place
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        matches!(self.mapping, Mapping::Identity)
    }

    /// External label of internal id `id`
    #[must_use]
    pub fn to_external(&self, id: u32) -> i64 {
        match &self.mapping {
            Mapping::Identity => i64::from(id),
            Mapping::Dense { labels, .. } => labels[id as usize],
        }
    }

    /// Internal id of `label`, if the label is a vertex of the graph
    #[must_use]
    pub fn to_internal(&self, label: i64) -> Option<u32> {
        match &self.mapping {
            Mapping::Identity => u32::try_from(label)
                .ok()
                .filter(|&id| (id as usize) < self.len),
            Mapping::Dense { lookup, .. } => lookup.get(&label).copied(),
        }
    }

    /// Translate caller labels to internal ids
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a label that is not a vertex of the graph
    pub fn internalize(&self, labels: &[i64]) -> Result<Vec<u32>> {
        labels
            .iter()
            .map(|&label| {
                self.to_internal(label)
                    .ok_or_else(|| Error::invalid_input(format!("vertex {label} is not in the graph")))
            })
            .collect()
    }

    /// Translate internal ids to caller labels
    #[must_use]
    pub fn externalize(&self, ids: &[u32]) -> Vec<i64> {
        ids.iter().map(|&id| self.to_external(id)).collect()
    }
}
