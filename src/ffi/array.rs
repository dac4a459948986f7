//! Arrays, host arrays and views

use super::convert::{data_type, data_type_id};
use super::{ffi_create, ffi_entry, release, required, ErrorObject};
use crate::array::{TypeErasedDeviceArray, TypeErasedDeviceArrayView, TypeErasedHostArray};
use crate::error::{Error, StatusCode};
use crate::resource::ResourceHandle;
use std::os::raw::{c_int, c_void};
use std::ptr;

#[no_mangle]
/// Allocate `n_elems` zeroed elements of type id `dtype`
///
/// # Safety
/// `handle` must be a live handle; `array` and `error` must be valid for writes.
pub unsafe extern "C" fn tg_type_erased_device_array_create(
    handle: *const ResourceHandle,
    n_elems: usize,
    dtype: c_int,
    array: *mut *mut TypeErasedDeviceArray,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_type_erased_device_array_create", array, error, || {
            let handle = required(handle, "resource handle")?;
            TypeErasedDeviceArray::create(handle, n_elems, data_type(dtype)?)
        })
    }
}

#[no_mangle]
/// Allocate a new array holding a copy of `view`
///
/// # Safety
/// `handle` and `view` must be live; `array` and `error` must be valid for writes.
pub unsafe extern "C" fn tg_type_erased_device_array_create_from_view(
    handle: *const ResourceHandle,
    view: *const TypeErasedDeviceArrayView,
    array: *mut *mut TypeErasedDeviceArray,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_type_erased_device_array_create_from_view", array, error, || {
            let handle = required(handle, "resource handle")?;
            TypeErasedDeviceArray::create_from_view(handle, required(view, "view")?)
        })
    }
}

#[no_mangle]
/// Release an array; views of it become stale
///
/// # Safety
/// `array` must be null or live, freed at most once.
pub unsafe extern "C" fn tg_type_erased_device_array_free(array: *mut TypeErasedDeviceArray) {
    unsafe { release(array) }
}

#[no_mangle]
/// View of the whole array (null for a null array)
///
/// # Safety
/// `array` must be null or live.
pub unsafe extern "C" fn tg_type_erased_device_array_view(
    array: *const TypeErasedDeviceArray,
) -> *mut TypeErasedDeviceArrayView {
    match unsafe { array.as_ref() } {
        Some(array) => Box::into_raw(Box::new(array.view())),
        None => ptr::null_mut(),
    }
}

#[no_mangle]
/// View of the array's bytes tagged with another type of equal width
///
/// # Safety
/// `array` must be live; `view` and `error` must be valid for writes.
pub unsafe extern "C" fn tg_type_erased_device_array_view_as_type(
    array: *const TypeErasedDeviceArray,
    dtype: c_int,
    view: *mut *mut TypeErasedDeviceArrayView,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_type_erased_device_array_view_as_type", view, error, || {
            required(array, "array")?.view_as_type(data_type(dtype)?)
        })
    }
}

#[no_mangle]
/// Number of elements of an array (0 for null)
///
/// # Safety
/// `array` must be null or live.
pub unsafe extern "C" fn tg_type_erased_device_array_size(array: *const TypeErasedDeviceArray) -> usize {
    unsafe { array.as_ref() }.map_or(0, TypeErasedDeviceArray::size)
}

#[no_mangle]
/// Element type id of an array (`NTYPES` for null)
///
/// # Safety
/// `array` must be null or live.
pub unsafe extern "C" fn tg_type_erased_device_array_type(array: *const TypeErasedDeviceArray) -> c_int {
    unsafe { array.as_ref() }.map_or(super::convert::NTYPES, |a| data_type_id(a.dtype()))
}

#[no_mangle]
/// View `n_elems` elements of type id `dtype` in caller memory
///
/// # Safety
/// `pointer` must stay valid for reads and writes of the viewed bytes for as
/// long as the view is used; `view` and `error` must be valid for writes.
pub unsafe extern "C" fn tg_type_erased_device_array_view_create(
    pointer: *mut c_void,
    n_elems: usize,
    dtype: c_int,
    view: *mut *mut TypeErasedDeviceArrayView,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_type_erased_device_array_view_create", view, error, || {
            TypeErasedDeviceArrayView::from_raw_parts(pointer.cast(), n_elems, data_type(dtype)?)
        })
    }
}

#[no_mangle]
/// Release a view; the viewed array is untouched
///
/// # Safety
/// `view` must be null or live, freed at most once.
pub unsafe extern "C" fn tg_type_erased_device_array_view_free(view: *mut TypeErasedDeviceArrayView) {
    unsafe { release(view) }
}

#[no_mangle]
/// Number of viewed elements (0 for null)
///
/// # Safety
/// `view` must be null or live.
pub unsafe extern "C" fn tg_type_erased_device_array_view_size(view: *const TypeErasedDeviceArrayView) -> usize {
    unsafe { view.as_ref() }.map_or(0, TypeErasedDeviceArrayView::size)
}

#[no_mangle]
/// Element type id of a view (`NTYPES` for null)
///
/// # Safety
/// `view` must be null or live.
pub unsafe extern "C" fn tg_type_erased_device_array_view_type(view: *const TypeErasedDeviceArrayView) -> c_int {
    unsafe { view.as_ref() }.map_or(super::convert::NTYPES, |v| data_type_id(v.dtype()))
}

#[no_mangle]
/// Host address of the viewed bytes
///
/// Null for a null view, a stale view or device-resident data.
///
/// # Safety
/// `view` must be null or live.
pub unsafe extern "C" fn tg_type_erased_device_array_view_pointer(
    view: *const TypeErasedDeviceArrayView,
) -> *const c_void {
    unsafe { view.as_ref() }
        .and_then(|v| v.host_ptr().ok())
        .map_or(ptr::null(), |p| p.cast_const().cast())
}

#[no_mangle]
/// Copy `size * width` bytes from `host` into `dst`
///
/// # Safety
/// `host` must be valid for reads of the view's byte length.
pub unsafe extern "C" fn tg_type_erased_device_array_view_copy_from_host(
    handle: *const ResourceHandle,
    dst: *const TypeErasedDeviceArrayView,
    host: *const u8,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_entry("tg_type_erased_device_array_view_copy_from_host", error, || {
            let handle = required(handle, "resource handle")?;
            let dst = required(dst, "destination view")?;
            let bytes = host_bytes(host, dst.byte_len())?;
            dst.copy_from_host(handle, bytes)
        })
    }
}

#[no_mangle]
/// Copy the bytes of `src` into `host`
///
/// # Safety
/// `host` must be valid for writes of the view's byte length.
pub unsafe extern "C" fn tg_type_erased_device_array_view_copy_to_host(
    handle: *const ResourceHandle,
    host: *mut u8,
    src: *const TypeErasedDeviceArrayView,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_entry("tg_type_erased_device_array_view_copy_to_host", error, || {
            let handle = required(handle, "resource handle")?;
            let src = required(src, "source view")?;
            let len = src.byte_len();
            if len == 0 {
                return src.copy_to_host(handle, &mut []);
            }
            if host.is_null() {
                return Err(Error::InvalidPointer("host buffer is null".to_string()));
            }
            src.copy_to_host(handle, std::slice::from_raw_parts_mut(host, len))
        })
    }
}

#[no_mangle]
/// Copy every element of `src` into `dst`
///
/// # Safety
/// `handle`, `dst` and `src` must be live; `error` must be valid for writes.
pub unsafe extern "C" fn tg_type_erased_device_array_view_copy(
    handle: *const ResourceHandle,
    dst: *const TypeErasedDeviceArrayView,
    src: *const TypeErasedDeviceArrayView,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_entry("tg_type_erased_device_array_view_copy", error, || {
            let handle = required(handle, "resource handle")?;
            required(dst, "destination view")?.copy_from(handle, required(src, "source view")?)
        })
    }
}

#[no_mangle]
/// Allocate `n_elems` zeroed host-resident elements of type id `dtype`
///
/// # Safety
/// `handle` must be a live handle; `array` and `error` must be valid for writes.
pub unsafe extern "C" fn tg_type_erased_host_array_create(
    handle: *const ResourceHandle,
    n_elems: usize,
    dtype: c_int,
    array: *mut *mut TypeErasedHostArray,
    error: *mut *mut ErrorObject,
) -> StatusCode {
    unsafe {
        ffi_create("tg_type_erased_host_array_create", array, error, || {
            let handle = required(handle, "resource handle")?;
            TypeErasedHostArray::create_host(handle, n_elems, data_type(dtype)?)
        })
    }
}

#[no_mangle]
/// Release a host array
///
/// # Safety
/// `array` must be null or live, freed at most once.
pub unsafe extern "C" fn tg_type_erased_host_array_free(array: *mut TypeErasedHostArray) {
    unsafe { release(array) }
}

#[no_mangle]
/// View of a host array (null for a null array)
///
/// # Safety
/// `array` must be null or live.
pub unsafe extern "C" fn tg_type_erased_host_array_view(
    array: *const TypeErasedHostArray,
) -> *mut TypeErasedDeviceArrayView {
    unsafe { tg_type_erased_device_array_view(array) }
}

#[no_mangle]
/// Address of a host array's elements (null for a null array)
///
/// # Safety
/// `array` must be null or live. The address is valid until the array is freed.
pub unsafe extern "C" fn tg_type_erased_host_array_pointer(array: *const TypeErasedHostArray) -> *mut c_void {
    unsafe { array.as_ref() }
        .and_then(|a| a.host_ptr().ok())
        .map_or(ptr::null_mut(), |p| p.cast())
}

#[no_mangle]
/// Number of elements of a host array (0 for null)
///
/// # Safety
/// `array` must be null or live.
pub unsafe extern "C" fn tg_type_erased_host_array_size(array: *const TypeErasedHostArray) -> usize {
    unsafe { tg_type_erased_device_array_size(array) }
}

/// Borrow `len` bytes of caller memory
///
/// # Safety
/// `host` must be null or valid for reads of `len` bytes.
unsafe fn host_bytes<'a>(host: *const u8, len: usize) -> crate::Result<&'a [u8]> {
    if len == 0 {
        return Ok(&[]);
    }
    if host.is_null() {
        return Err(Error::InvalidPointer("host buffer is null".to_string()));
    }
    Ok(unsafe { std::slice::from_raw_parts(host, len) })
}
