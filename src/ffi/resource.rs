//! Resource handles, communicator groups and random state

use super::{ffi_create, ffi_entry, release, required, ErrorObject};
use crate::comms::{create_comm_group, Communicator};
use crate::error::{Error, StatusCode};
use crate::resource::{ResourceHandle, RngState};
use std::os::raw::c_int;

#[no_mangle]
/// Create `size` connected communicators, one per rank
///
/// # Safety
/// `comms` must be valid for `size` pointer writes. `error` must be null or
/// valid for writes.
pub unsafe extern "C" fn tg_create_comm_group(
    size: usize,
    comms: *mut *mut Communicator,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_entry("tg_create_comm_group", error, || {
            if comms.is_null() {
                return Err(Error::InvalidPointer("communicator output array is null".to_string()));
            }
            for (rank, comm) in create_comm_group(size)?.into_iter().enumerate() {
                *comms.add(rank) = Box::into_raw(Box::new(comm));
            }
            Ok(())
        })
    }
}

#[no_mangle]
/// Release a communicator that was never passed to a resource handle
///
/// # Safety
/// `comm` must be null or a live communicator, freed at most once.
pub unsafe extern "C" fn tg_communicator_free(comm: *mut Communicator) {
    unsafe { release(comm) }
}

#[no_mangle]
/// Create a resource handle
///
/// A null `comm` creates a single-participant handle. A non-null `comm` is
/// consumed: the handle takes ownership of it.
///
/// # Safety
/// `comm` must be null or a live communicator from [`tg_create_comm_group`].
pub unsafe extern "C" fn tg_create_resource_handle(comm: *mut Communicator) -> *mut ResourceHandle {
    let handle = if comm.is_null() {
        ResourceHandle::new()
    } else {
        ResourceHandle::with_communicator(*unsafe { Box::from_raw(comm) })
    };
    Box::into_raw(Box::new(handle))
}

#[no_mangle]
/// Release a resource handle; must be the last call made with it
///
/// # Safety
/// `handle` must be null or a live handle, freed at most once.
pub unsafe extern "C" fn tg_free_resource_handle(handle: *mut ResourceHandle) {
    unsafe { release(handle) }
}

#[no_mangle]
/// Rank of the handle (-1 for null)
///
/// # Safety
/// `handle` must be null or a live handle.
pub unsafe extern "C" fn tg_resource_handle_get_rank(handle: *const ResourceHandle) -> c_int {
    unsafe { handle.as_ref() }.map_or(-1, |h| c_int::try_from(h.rank()).unwrap_or(c_int::MAX))
}

#[no_mangle]
/// Number of participants of the handle (-1 for null)
///
/// # Safety
/// `handle` must be null or a live handle.
pub unsafe extern "C" fn tg_resource_handle_get_comm_size(handle: *const ResourceHandle) -> c_int {
    unsafe { handle.as_ref() }.map_or(-1, |h| c_int::try_from(h.comm_size()).unwrap_or(c_int::MAX))
}

#[no_mangle]
/// Create seeded random state for the handle's rank
///
/// # Safety
/// `handle` must be a live handle; `state` and `error` must be valid for writes.
pub unsafe extern "C" fn tg_rng_state_create(
    handle: *const ResourceHandle,
    seed: u64,
    state: *mut *mut RngState,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_rng_state_create", state, error, || {
            let handle = required(handle, "resource handle")?;
            Ok(RngState::new(handle, seed))
        })
    }
}

#[no_mangle]
/// Release random state
///
/// # Safety
/// `state` must be null or live, freed at most once.
pub unsafe extern "C" fn tg_rng_state_free(state: *mut RngState) {
    unsafe { release(state) }
}
