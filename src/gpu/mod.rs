//! Device-resident array storage on a wgpu device
//!
//! A [`ResourceHandle`](crate::ResourceHandle) created with a [`GpuDevice`]
//! allocates its arrays in wgpu storage buffers. Host copies upload through
//! the queue and download through a mapped staging buffer.
//!
//! # Feature Flag
//!
//! This module is only available with the `gpu` feature flag:
//! ```bash
//! cargo build --features gpu
//! ```

mod buffer;
mod device;

pub use buffer::DeviceBuffer;
pub use device::{GpuDevice, GpuDeviceError};
