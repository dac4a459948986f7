//! Owned type-erased arrays

use super::arena::{ArrayArena, ArrayKey, Placement};
use super::view::TypeErasedDeviceArrayView;
use crate::error::{Error, Result};
use crate::resource::ResourceHandle;
use crate::types::{DataType, Element};
use std::sync::Arc;

/// Owned buffer of `size()` elements of one [`DataType`]
///
/// The storage lives in the arena of the handle that created the array and is
/// released when the array is dropped. Views taken from it become stale at
/// that point.
#[derive(Debug)]
pub struct TypeErasedDeviceArray {
    arena: Arc<ArrayArena>,
    key: ArrayKey,
    dtype: DataType,
    len: usize,
}

/// Host-resident array; same abstraction with host placement forced
pub type TypeErasedHostArray = TypeErasedDeviceArray;

impl TypeErasedDeviceArray {
    /// Allocate `n_elems` zeroed elements of `dtype`
    ///
    /// # Errors
    ///
    /// Returns `MemoryError` if the allocation fails
    pub fn create(handle: &ResourceHandle, n_elems: usize, dtype: DataType) -> Result<Self> {
        Self::allocate(handle, n_elems, dtype, Placement::Default)
    }

    /// Allocate `n_elems` zeroed elements of `dtype` in host memory
    ///
    /// # Errors
    ///
    /// Returns `MemoryError` if the allocation fails
    pub fn create_host(handle: &ResourceHandle, n_elems: usize, dtype: DataType) -> Result<Self> {
        Self::allocate(handle, n_elems, dtype, Placement::Host)
    }

    fn allocate(handle: &ResourceHandle, len: usize, dtype: DataType, placement: Placement) -> Result<Self> {
        let arena = Arc::clone(handle.arena());
        let key = arena.allocate(dtype, len, placement)?;
        Ok(Self {
            arena,
            key,
            dtype,
            len,
        })
    }

    /// New array holding a copy of the viewed elements
    ///
    /// # Errors
    ///
    /// `InvalidHandle` if the view is stale or belongs to another handle
    pub fn create_from_view(handle: &ResourceHandle, view: &TypeErasedDeviceArrayView) -> Result<Self> {
        view.check_handle(handle)?;
        let bytes = view.read_bytes()?;
        Self::from_bytes(handle, view.dtype(), view.size(), &bytes)
    }

    /// New array initialized from a typed host slice
    ///
    /// # Errors
    ///
    /// Returns `MemoryError` if the allocation fails
    pub fn from_slice<T: Element>(handle: &ResourceHandle, data: &[T]) -> Result<Self> {
        Self::from_bytes(handle, T::DTYPE, data.len(), bytemuck::cast_slice(data))
    }

    pub(crate) fn from_bytes(handle: &ResourceHandle, dtype: DataType, len: usize, bytes: &[u8]) -> Result<Self> {
        let arena = Arc::clone(handle.arena());
        let key = arena.allocate_from_bytes(dtype, len, bytes, Placement::Default)?;
        Ok(Self {
            arena,
            key,
            dtype,
            len,
        })
    }

    /// Non-owning view of the whole array
    #[must_use]
    pub fn view(&self) -> TypeErasedDeviceArrayView {
        TypeErasedDeviceArrayView::of_array(Arc::clone(&self.arena), self.key, self.dtype, self.len)
    }

    /// View of the same bytes tagged with another element type of equal width
    ///
    /// # Errors
    ///
    /// `UnsupportedTypeCombination` if the widths differ
    pub fn view_as_type(&self, dtype: DataType) -> Result<TypeErasedDeviceArrayView> {
        if dtype.size_in_bytes() != self.dtype.size_in_bytes() {
            return Err(Error::UnsupportedTypeCombination(format!(
                "cannot view {} as {}",
                self.dtype, dtype
            )));
        }
        Ok(TypeErasedDeviceArrayView::of_array(
            Arc::clone(&self.arena),
            self.key,
            dtype,
            self.len,
        ))
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

    /// Copy the elements into a typed vector
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if `T` does not match the array type
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        self.view().to_vec()
    }

    /// Host pointer to the data, null when the array lives on a device
    pub(crate) fn host_ptr(&self) -> Result<*mut u8> {
        self.view().host_ptr()
    }
}

impl Drop for TypeErasedDeviceArray {
    fn drop(&mut self) {
        if let Err(e) = self.arena.release(self.key) {
            tracing::debug!(error = %e, "array slot already released");
        }
    }
}
