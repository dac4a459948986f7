//! Resource handle and seeded random state

use crate::array::ArrayArena;
use crate::comms::Communicator;
use crate::error::Result;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

#[cfg(feature = "gpu")]
use crate::gpu::GpuDevice;

/// Execution context for every call
///
/// Owns the array arena used by arrays created through it and, for
/// multi-participant runs, the communicator of this rank. Immutable after
/// creation.
#[derive(Debug)]
pub struct ResourceHandle {
    rank: usize,
    comm_size: usize,
    comms: Option<Communicator>,
    arena: Arc<ArrayArena>,
    #[cfg(feature = "gpu")]
    device: Option<Arc<GpuDevice>>,
}

impl ResourceHandle {
    /// Single-participant handle with host storage
    #[must_use]
    pub fn new() -> Self {
        Self {
            rank: 0,
            comm_size: 1,
            comms: None,
            arena: Arc::new(ArrayArena::new()),
            #[cfg(feature = "gpu")]
            device: None,
        }
    }

    /// Handle for one rank of a communicator group
    #[must_use]
    pub fn with_communicator(comms: Communicator) -> Self {
        tracing::debug!(rank = comms.rank(), size = comms.size(), "resource handle joined group");
        Self {
            rank: comms.rank(),
            comm_size: comms.size(),
            comms: Some(comms),
            arena: Arc::new(ArrayArena::new()),
            #[cfg(feature = "gpu")]
            device: None,
        }
    }

    /// Single-participant handle whose arrays live on `device`
    #[cfg(feature = "gpu")]
    #[must_use]
    pub fn with_device(device: Arc<GpuDevice>) -> Self {
        Self {
            rank: 0,
            comm_size: 1,
            comms: None,
            arena: Arc::new(ArrayArena::with_device(Arc::clone(&device))),
            device: Some(device),
        }
    }

    /// Rank of this participant (0 for single-participant handles)
    #[must_use]
    pub const fn rank(&self) -> usize {
        self.rank
    }

    /// Number of participants
    #[must_use]
    pub const fn comm_size(&self) -> usize {
        self.comm_size
    }

    /// Communicator, if the handle belongs to a group
    #[must_use]
    pub const fn communicator(&self) -> Option<&Communicator> {
        self.comms.as_ref()
    }

    /// GPU device backing the arrays, if any
    #[cfg(feature = "gpu")]
    #[must_use]
    pub fn device(&self) -> Option<&Arc<GpuDevice>> {
        self.device.as_ref()
    }

    /// Arrays created through this handle that are still alive
    #[must_use]
    pub fn live_arrays(&self) -> usize {
        self.arena.live_arrays()
    }

    pub(crate) const fn arena(&self) -> &Arc<ArrayArena> {
        &self.arena
    }

    /// Gather one value per rank; a handle without a communicator is a group of one
    pub(crate) fn all_gather<T>(&self, tag: &'static str, value: T) -> Result<Vec<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        match &self.comms {
            Some(comms) => comms.all_gather(tag, value),
            None => Ok(vec![value]),
        }
    }

    /// Gather a vector per rank, concatenated in rank order
    pub(crate) fn all_gather_concat<T>(&self, tag: &'static str, values: Vec<T>) -> Result<Vec<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        Ok(self.all_gather(tag, values)?.into_iter().flatten().collect())
    }
}

impl Default for ResourceHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        let live = self.arena.live_arrays();
        if live > 0 {
            tracing::warn!(rank = self.rank, live, "resource handle freed while arrays are still alive");
        }
    }
}

/// Seeded random state for randomized algorithms
///
/// Ranks of a group derive their stream from `seed + rank`, so runs are
/// reproducible for a fixed seed and group size.
#[derive(Debug)]
pub struct RngState {
    seed: u64,
    rng: Mutex<StdRng>,
}

impl RngState {
    /// Create the random state for `handle`'s rank
    #[must_use]
    pub fn new(handle: &ResourceHandle, seed: u64) -> Self {
        let effective = seed.wrapping_add(handle.rank() as u64);
        Self {
            seed: effective,
            rng: Mutex::new(StdRng::seed_from_u64(effective)),
        }
    }

    /// Seed actually used by this rank
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    pub(crate) fn with_rng<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        f(&mut self.rng.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comms::create_comm_group;
    use rand::Rng;

    #[test]
    fn test_single_participant() {
        let handle = ResourceHandle::new();
        assert_eq!(handle.rank(), 0);
        assert_eq!(handle.comm_size(), 1);
        assert!(handle.communicator().is_none());
        assert_eq!(handle.all_gather("solo", 3).unwrap(), vec![3]);
    }

    #[test]
    fn test_group_handles() {
        let handles: Vec<_> = create_comm_group(3)
            .unwrap()
            .into_iter()
            .map(ResourceHandle::with_communicator)
            .collect();
        for (rank, handle) in handles.iter().enumerate() {
            assert_eq!(handle.rank(), rank);
            assert_eq!(handle.comm_size(), 3);
        }
    }

    #[test]
    fn test_rng_is_reproducible() {
        let handle = ResourceHandle::new();
        let a = RngState::new(&handle, 42);
        let b = RngState::new(&handle, 42);
        let xs: Vec<u32> = (0..8).map(|_| a.with_rng(|r| r.gen())).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.with_rng(|r| r.gen())).collect();
        assert_eq!(xs, ys);
        assert_eq!(a.seed(), 42);
    }
}
