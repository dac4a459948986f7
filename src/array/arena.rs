//! Slot arena backing the owned arrays of one resource handle
//!
//! Every slot carries a generation counter that is bumped when the slot is
//! freed. An [`ArrayKey`] remembers the generation it was issued with, so a key
//! that outlives its array resolves to `InvalidHandle` instead of reading a
//! recycled slot.

use crate::error::{Error, Result};
use crate::types::DataType;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "gpu")]
use crate::gpu::{DeviceBuffer, GpuDevice};
#[cfg(feature = "gpu")]
use std::sync::Arc;

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

/// Where the bytes of an array live
#[derive(Debug)]
pub(crate) enum Storage {
    Host(Vec<u8>),
    #[cfg(feature = "gpu")]
    Device(DeviceBuffer),
}

/// Requested placement for a new allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// Device memory when the arena has a device, host memory otherwise
    Default,
    /// Always host memory
    Host,
}

/// Contents of one occupied slot
#[derive(Debug)]
pub(crate) struct Buffer {
    pub(crate) dtype: DataType,
    pub(crate) len: usize,
    storage: Storage,
}

impl Buffer {
    pub(crate) fn byte_len(&self) -> usize {
        self.len * self.dtype.size_in_bytes()
    }

    pub(crate) fn read_bytes(&self) -> Result<Vec<u8>> {
        match &self.storage {
            Storage::Host(bytes) => Ok(bytes.clone()),
            #[cfg(feature = "gpu")]
            Storage::Device(buffer) => buffer.download(),
        }
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() != self.byte_len() {
            return Err(Error::invalid_size(format!(
                "{} bytes written into a {}-byte array",
                bytes.len(),
                self.byte_len()
            )));
        }
        match &mut self.storage {
            Storage::Host(dst) => {
                dst.copy_from_slice(bytes);
                Ok(())
            }
            #[cfg(feature = "gpu")]
            Storage::Device(buffer) => buffer.upload(bytes),
        }
    }

    /// Raw pointer to host-resident bytes, `None` for device storage
    pub(crate) fn host_ptr(&mut self) -> Option<*mut u8> {
        match &mut self.storage {
            Storage::Host(bytes) => Some(bytes.as_mut_ptr()),
            #[cfg(feature = "gpu")]
            Storage::Device(_) => None,
        }
    }
}

/// Generation-checked reference to a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayKey {
    pub(crate) arena: u64,
    pub(crate) index: u32,
    pub(crate) generation: u64,
}

#[derive(Debug)]
struct Slot {
    generation: u64,
    buffer: Option<Buffer>,
}

#[derive(Debug, Default)]
struct Slab {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

/// Array storage owned by a resource handle
#[derive(Debug)]
pub struct ArrayArena {
    id: u64,
    slab: RwLock<Slab>,
    #[cfg(feature = "gpu")]
    device: Option<Arc<GpuDevice>>,
}

impl ArrayArena {
    pub(crate) fn new() -> Self {
        Self {
            id: NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed),
            slab: RwLock::new(Slab::default()),
            #[cfg(feature = "gpu")]
            device: None,
        }
    }

    #[cfg(feature = "gpu")]
    pub(crate) fn with_device(device: Arc<GpuDevice>) -> Self {
        Self {
            device: Some(device),
            ..Self::new()
        }
    }

    /// Process-unique arena id
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Number of arrays currently allocated in this arena
    #[must_use]
    pub fn live_arrays(&self) -> usize {
        self.slab.read().live
    }

    /// Allocate a zero-filled array
    pub(crate) fn allocate(&self, dtype: DataType, len: usize, placement: Placement) -> Result<ArrayKey> {
        let byte_len = byte_len(dtype, len)?;
        let storage = self.zeroed_storage(byte_len, placement)?;
        Ok(self.insert(Buffer {
            dtype,
            len,
            storage,
        }))
    }

    /// Allocate an array initialized from `bytes`
    pub(crate) fn allocate_from_bytes(
        &self,
        dtype: DataType,
        len: usize,
        bytes: &[u8],
        placement: Placement,
    ) -> Result<ArrayKey> {
        let expected = byte_len(dtype, len)?;
        if bytes.len() != expected {
            return Err(Error::invalid_size(format!(
                "{} bytes supplied for {len} {dtype} elements",
                bytes.len()
            )));
        }
        let mut buffer = Buffer {
            dtype,
            len,
            storage: self.zeroed_storage(expected, placement)?,
        };
        buffer.write_bytes(bytes)?;
        Ok(self.insert(buffer))
    }

    fn zeroed_storage(&self, byte_len: usize, placement: Placement) -> Result<Storage> {
        #[cfg(feature = "gpu")]
        if let (Some(device), Placement::Default) = (&self.device, placement) {
            return Ok(Storage::Device(DeviceBuffer::zeroed(Arc::clone(device), byte_len)));
        }
        #[cfg(not(feature = "gpu"))]
        let _ = placement;

        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(byte_len)
            .map_err(|e| Error::memory(format!("cannot allocate {byte_len} bytes: {e}")))?;
        bytes.resize(byte_len, 0);
        Ok(Storage::Host(bytes))
    }

    fn insert(&self, buffer: Buffer) -> ArrayKey {
        let mut slab = self.slab.write();
        slab.live += 1;
        if let Some(index) = slab.free.pop() {
            let slot = &mut slab.slots[index as usize];
            slot.buffer = Some(buffer);
            return ArrayKey {
                arena: self.id,
                index,
                generation: slot.generation,
            };
        }

        #[allow(clippy::cast_possible_truncation)] // More than 4B live arrays is not supported
        let index = slab.slots.len() as u32;
        slab.slots.push(Slot {
            generation: 0,
            buffer: Some(buffer),
        });
        ArrayKey {
            arena: self.id,
            index,
            generation: 0,
        }
    }

    /// Free the slot behind `key`, invalidating every copy of the key
    pub(crate) fn release(&self, key: ArrayKey) -> Result<()> {
        let mut slab = self.slab.write();
        let slot = resolve_slot(self.id, &mut slab.slots, key)?;
        slot.buffer = None;
        slot.generation += 1;
        slab.free.push(key.index);
        slab.live -= 1;
        Ok(())
    }

    /// Run `f` against the live buffer behind `key`
    pub(crate) fn with<R>(&self, key: ArrayKey, f: impl FnOnce(&Buffer) -> R) -> Result<R> {
        let slab = self.slab.read();
        let slot = slab
            .slots
            .get(key.index as usize)
            .filter(|slot| key.arena == self.id && slot.generation == key.generation);
        match slot.and_then(|slot| slot.buffer.as_ref()) {
            Some(buffer) => Ok(f(buffer)),
            None => Err(stale(key)),
        }
    }

    /// Run `f` against the live buffer behind `key` with write access
    pub(crate) fn with_mut<R>(&self, key: ArrayKey, f: impl FnOnce(&mut Buffer) -> R) -> Result<R> {
        let mut slab = self.slab.write();
        let slot = resolve_slot(self.id, &mut slab.slots, key)?;
        match slot.buffer.as_mut() {
            Some(buffer) => Ok(f(buffer)),
            None => Err(stale(key)),
        }
    }
}

fn resolve_slot(arena: u64, slots: &mut [Slot], key: ArrayKey) -> Result<&mut Slot> {
    match slots.get_mut(key.index as usize) {
        Some(slot)
            if key.arena == arena && slot.generation == key.generation && slot.buffer.is_some() =>
        {
            Ok(slot)
        }
        _ => Err(stale(key)),
    }
}

fn stale(key: ArrayKey) -> Error {
    Error::invalid_handle(format!(
        "array slot {} (generation {}) is no longer allocated",
        key.index, key.generation
    ))
}

fn byte_len(dtype: DataType, len: usize) -> Result<usize> {
    len.checked_mul(dtype.size_in_bytes())
        .ok_or_else(|| Error::memory(format!("{len} {dtype} elements overflow the address space")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_release() {
        let arena = ArrayArena::new();
        let key = arena.allocate(DataType::Int32, 4, Placement::Default).unwrap();
        assert_eq!(arena.live_arrays(), 1);
        assert_eq!(arena.with(key, Buffer::byte_len).unwrap(), 16);

        arena.release(key).unwrap();
        assert_eq!(arena.live_arrays(), 0);
        assert_eq!(
            arena.with(key, Buffer::byte_len).unwrap_err().code(),
            crate::StatusCode::InvalidHandle
        );
    }

    #[test]
    fn test_recycled_slot_rejects_old_key() {
        let arena = ArrayArena::new();
        let old = arena.allocate(DataType::Float64, 2, Placement::Host).unwrap();
        arena.release(old).unwrap();

        let new = arena.allocate(DataType::Float64, 2, Placement::Host).unwrap();
        assert_eq!(old.index, new.index);
        assert_ne!(old.generation, new.generation);
        assert!(arena.with(old, |_| ()).is_err());
        assert!(arena.with(new, |_| ()).is_ok());
        assert!(arena.release(old).is_err());
    }

    #[test]
    fn test_foreign_key_rejected() {
        let a = ArrayArena::new();
        let b = ArrayArena::new();
        let key = a.allocate(DataType::Int64, 1, Placement::Default).unwrap();
        assert!(b.with(key, |_| ()).is_err());
    }

    #[test]
    fn test_allocate_from_bytes_checks_size() {
        let arena = ArrayArena::new();
        let err = arena
            .allocate_from_bytes(DataType::Int32, 2, &[0_u8; 4], Placement::Default)
            .unwrap_err();
        assert_eq!(err.code(), crate::StatusCode::InvalidSize);

        let key = arena
            .allocate_from_bytes(DataType::Int32, 1, &7_i32.to_ne_bytes(), Placement::Default)
            .unwrap();
        let bytes = arena.with(key, Buffer::read_bytes).unwrap().unwrap();
        assert_eq!(bytes, 7_i32.to_ne_bytes());
    }

    #[test]
    fn test_overflowing_allocation() {
        let arena = ArrayArena::new();
        let err = arena
            .allocate(DataType::Float64, usize::MAX, Placement::Host)
            .unwrap_err();
        assert_eq!(err.code(), crate::StatusCode::MemoryError);
    }
}
