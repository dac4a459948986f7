//! Non-owning views over type-erased arrays

use super::arena::{ArrayArena, ArrayKey};
use crate::error::{Error, Result};
use crate::resource::ResourceHandle;
use crate::types::{DataType, Element};
use std::ptr::NonNull;
use std::sync::Arc;

/// Caller-owned memory region
#[derive(Debug, Clone, Copy)]
struct RawRegion {
    ptr: NonNull<u8>,
    byte_len: usize,
}

// SAFETY: the creator of a raw view promises the region stays valid and is
// not mutated concurrently for the lifetime of the view.
unsafe impl Send for RawRegion {}
// SAFETY: see above.
unsafe impl Sync for RawRegion {}

#[derive(Debug, Clone)]
enum ViewSource {
    Array { arena: Arc<ArrayArena>, key: ArrayKey },
    Raw(RawRegion),
}

/// Non-owning `(pointer, length, type)` reference
///
/// Views over owned arrays are generation-checked: once the array is freed
/// every read or write through the view fails with `InvalidHandle`. Views over
/// raw caller memory are created with [`from_raw_parts`](Self::from_raw_parts)
/// and follow the usual raw pointer contract.
#[derive(Debug, Clone)]
pub struct TypeErasedDeviceArrayView {
    source: ViewSource,
    dtype: DataType,
    len: usize,
}

impl TypeErasedDeviceArrayView {
    pub(crate) fn of_array(arena: Arc<ArrayArena>, key: ArrayKey, dtype: DataType, len: usize) -> Self {
        Self {
            source: ViewSource::Array { arena, key },
            dtype,
            len,
        }
    }

    /// View `len` elements of `dtype` starting at `ptr`
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads and writes of `len * dtype.size_in_bytes()`
    /// bytes for as long as the view (or any clone of it) is used.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPointer` for a null pointer with a non-zero length
    pub unsafe fn from_raw_parts(ptr: *mut u8, len: usize, dtype: DataType) -> Result<Self> {
        let byte_len = len
            .checked_mul(dtype.size_in_bytes())
            .ok_or_else(|| Error::invalid_value(format!("view of {len} {dtype} elements overflows")))?;
        let ptr = match NonNull::new(ptr) {
            Some(ptr) => ptr,
            None if byte_len == 0 => NonNull::dangling(),
            None => return Err(Error::InvalidPointer("null view pointer".to_string())),
        };
        Ok(Self {
            source: ViewSource::Raw(RawRegion { ptr, byte_len }),
            dtype,
            len,
        })
    }

    /// Number of elements
    #[must_use]
    pub const fn size(&self) -> usize {
        self.len
    }

    /// Element type
    #[must_use]
    pub const fn dtype(&self) -> DataType {
        self.dtype
    }

    /// Size of the viewed region in bytes
    #[must_use]
    pub const fn byte_len(&self) -> usize {
        self.len * self.dtype.size_in_bytes()
    }

    /// `false` once the underlying array has been freed
    #[must_use]
    pub fn is_alive(&self) -> bool {
        match &self.source {
            ViewSource::Array { arena, key } => arena.with(*key, |_| ()).is_ok(),
            ViewSource::Raw(_) => true,
        }
    }

    pub(crate) fn check_handle(&self, handle: &ResourceHandle) -> Result<()> {
        match &self.source {
            ViewSource::Array { arena, .. } if arena.id() != handle.arena().id() => Err(
                Error::invalid_handle("view belongs to an array created by another resource handle"),
            ),
            _ => Ok(()),
        }
    }

    pub(crate) fn read_bytes(&self) -> Result<Vec<u8>> {
        match &self.source {
            ViewSource::Array { arena, key } => arena.with(*key, |buffer| buffer.read_bytes())?,
            // SAFETY: `from_raw_parts` requires the region to be readable.
            ViewSource::Raw(raw) => Ok(unsafe {
                std::slice::from_raw_parts(raw.ptr.as_ptr(), raw.byte_len).to_vec()
            }),
        }
    }

    pub(crate) fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        if bytes.len() != self.byte_len() {
            return Err(Error::invalid_size(format!(
                "host buffer holds {} bytes, view expects {}",
                bytes.len(),
                self.byte_len()
            )));
        }
        match &self.source {
            ViewSource::Array { arena, key } => {
                arena.with_mut(*key, |buffer| buffer.write_bytes(bytes))?
            }
            ViewSource::Raw(raw) => {
                // SAFETY: `from_raw_parts` requires the region to be writable
                // and the length was checked above.
                unsafe {
                    std::ptr::copy_nonoverlapping(bytes.as_ptr(), raw.ptr.as_ptr(), raw.byte_len);
                }
                Ok(())
            }
        }
    }

    /// Host pointer to the viewed bytes (null for device-resident arrays)
    pub(crate) fn host_ptr(&self) -> Result<*mut u8> {
        match &self.source {
            ViewSource::Array { arena, key } => Ok(arena
                .with_mut(*key, |buffer| buffer.host_ptr())?
                .unwrap_or(std::ptr::null_mut())),
            ViewSource::Raw(raw) => Ok(raw.ptr.as_ptr()),
        }
    }

    /// Copy the viewed elements into a typed vector
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if `T` does not match the view type, `InvalidHandle` if
    /// the array was freed
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        if T::DTYPE != self.dtype {
            return Err(Error::type_mismatch(format!(
                "view holds {}, requested {}",
                self.dtype,
                T::DTYPE
            )));
        }
        Ok(self
            .read_bytes()?
            .chunks_exact(self.dtype.size_in_bytes())
            .map(bytemuck::pod_read_unaligned)
            .collect())
    }

    /// Copy `host` (exactly `size() * width` bytes) into the viewed memory
    ///
    /// # Errors
    ///
    /// `InvalidSize` on a length mismatch, `InvalidHandle` for a freed array or
    /// an array of another handle
    pub fn copy_from_host(&self, handle: &ResourceHandle, host: &[u8]) -> Result<()> {
        self.check_handle(handle)?;
        self.write_bytes(host)
    }

    /// Copy the viewed bytes into `host` (exactly `size() * width` bytes)
    ///
    /// # Errors
    ///
    /// Same as [`copy_from_host`](Self::copy_from_host)
    pub fn copy_to_host(&self, handle: &ResourceHandle, host: &mut [u8]) -> Result<()> {
        self.check_handle(handle)?;
        if host.len() != self.byte_len() {
            return Err(Error::invalid_size(format!(
                "host buffer holds {} bytes, view expects {}",
                host.len(),
                self.byte_len()
            )));
        }
        host.copy_from_slice(&self.read_bytes()?);
        Ok(())
    }

    /// Typed [`copy_from_host`](Self::copy_from_host)
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if `T` does not match the view type
    pub fn copy_from_slice<T: Element>(&self, handle: &ResourceHandle, host: &[T]) -> Result<()> {
        self.expect_type::<T>()?;
        self.copy_from_host(handle, bytemuck::cast_slice(host))
    }

    /// Typed [`copy_to_host`](Self::copy_to_host)
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if `T` does not match the view type
    pub fn copy_to_slice<T: Element>(&self, handle: &ResourceHandle, host: &mut [T]) -> Result<()> {
        self.expect_type::<T>()?;
        self.copy_to_host(handle, bytemuck::cast_slice_mut(host))
    }

    /// Copy every element of `src` into this view
    ///
    /// # Errors
    ///
    /// `InvalidValue` if the element counts differ, `TypeMismatch` if the
    /// element widths differ
    pub fn copy_from(&self, handle: &ResourceHandle, src: &Self) -> Result<()> {
        self.check_handle(handle)?;
        src.check_handle(handle)?;
        if self.len != src.len {
            return Err(Error::invalid_value(format!(
                "copy between views of {} and {} elements",
                src.len, self.len
            )));
        }
        if self.dtype.size_in_bytes() != src.dtype.size_in_bytes() {
            return Err(Error::type_mismatch(format!(
                "copy from {} into {}",
                src.dtype, self.dtype
            )));
        }
        self.write_bytes(&src.read_bytes()?)
    }

    fn expect_type<T: Element>(&self) -> Result<()> {
        if T::DTYPE == self.dtype {
            Ok(())
        } else {
            Err(Error::type_mismatch(format!(
                "view holds {}, host slice holds {}",
                self.dtype,
                T::DTYPE
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::TypeErasedDeviceArray;
    use crate::StatusCode;

    #[test]
    fn test_copy_round_trip() {
        let handle = ResourceHandle::new();
        let array = TypeErasedDeviceArray::create(&handle, 3, DataType::Int64).unwrap();
        let view = array.view();

        view.copy_from_slice(&handle, &[4_i64, -2, 9]).unwrap();
        let mut out = [0_i64; 3];
        view.copy_to_slice(&handle, &mut out).unwrap();
        assert_eq!(out, [4, -2, 9]);
    }

    #[test]
    fn test_host_size_mismatch() {
        let handle = ResourceHandle::new();
        let array = TypeErasedDeviceArray::create(&handle, 2, DataType::Float32).unwrap();
        let err = array.view().copy_from_host(&handle, &[0_u8; 7]).unwrap_err();
        assert_eq!(err.code(), StatusCode::InvalidSize);
    }

    #[test]
    fn test_typed_copy_mismatch() {
        let handle = ResourceHandle::new();
        let array = TypeErasedDeviceArray::create(&handle, 2, DataType::Float32).unwrap();
        let err = array.view().copy_from_slice(&handle, &[1_i32, 2]).unwrap_err();
        assert_eq!(err.code(), StatusCode::TypeMismatch);
    }

    #[test]
    fn test_use_after_free() {
        let handle = ResourceHandle::new();
        let array = TypeErasedDeviceArray::from_slice(&handle, &[1_i32, 2, 3]).unwrap();
        let view = array.view();
        assert!(view.is_alive());
        drop(array);

        assert!(!view.is_alive());
        assert_eq!(
            view.to_vec::<i32>().unwrap_err().code(),
            StatusCode::InvalidHandle
        );
    }

    #[test]
    fn test_view_from_other_handle() {
        let owner = ResourceHandle::new();
        let other = ResourceHandle::new();
        let array = TypeErasedDeviceArray::create(&owner, 1, DataType::Int32).unwrap();
        let err = array.view().copy_from_slice(&other, &[1_i32]).unwrap_err();
        assert_eq!(err.code(), StatusCode::InvalidHandle);
    }

    #[test]
    fn test_view_copy_checks() {
        let handle = ResourceHandle::new();
        let a = TypeErasedDeviceArray::from_slice(&handle, &[1_i32, 2]).unwrap();
        let b = TypeErasedDeviceArray::create(&handle, 3, DataType::Int32).unwrap();
        let c = TypeErasedDeviceArray::create(&handle, 2, DataType::Int64).unwrap();
        let d = TypeErasedDeviceArray::create(&handle, 2, DataType::Float32).unwrap();

        assert_eq!(
            b.view().copy_from(&handle, &a.view()).unwrap_err().code(),
            StatusCode::InvalidValue
        );
        assert_eq!(
            c.view().copy_from(&handle, &a.view()).unwrap_err().code(),
            StatusCode::TypeMismatch
        );
        d.view().copy_from(&handle, &a.view()).unwrap();
        assert_eq!(
            d.view_as_type(DataType::Int32).unwrap().to_vec::<i32>().unwrap(),
            vec![1, 2]
        );
    }

    #[test]
    fn test_raw_view() {
        let handle = ResourceHandle::new();
        let mut host = [1.5_f64, 2.5];
        // SAFETY: `host` outlives the view.
        let view = unsafe {
            TypeErasedDeviceArrayView::from_raw_parts(host.as_mut_ptr().cast(), 2, DataType::Float64)
        }
        .unwrap();
        assert_eq!(view.to_vec::<f64>().unwrap(), vec![1.5, 2.5]);

        view.copy_from_slice(&handle, &[3.0_f64, 4.0]).unwrap();
        assert_eq!(host, [3.0, 4.0]);
    }

    #[test]
    fn test_null_raw_view() {
        // SAFETY: zero-length views never dereference the pointer.
        let empty = unsafe {
            TypeErasedDeviceArrayView::from_raw_parts(std::ptr::null_mut(), 0, DataType::Int32)
        };
        assert_eq!(empty.unwrap().size(), 0);

        // SAFETY: rejected before any dereference.
        let err = unsafe {
            TypeErasedDeviceArrayView::from_raw_parts(std::ptr::null_mut(), 4, DataType::Int32)
        }
        .unwrap_err();
        assert_eq!(err.code(), StatusCode::InvalidPointer);
    }
}
