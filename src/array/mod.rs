//! Type-erased arrays and views
//!
//! - `arena`: generation-checked slot storage owned by a resource handle
//! - `device_array`: owned arrays
//! - `view`: non-owning views and host copies
//! - `convert`: widening reads and narrowing writes used by the kernels

mod arena;
pub mod convert;
mod device_array;
mod view;

pub use arena::{ArrayArena, ArrayKey};
pub use device_array::{TypeErasedDeviceArray, TypeErasedHostArray};
pub use view::TypeErasedDeviceArrayView;
