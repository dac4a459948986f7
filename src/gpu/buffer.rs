//! Storage buffers backing device-resident arrays
//!
//! Uploads go through `Queue::write_buffer`. Downloads copy into a
//! `MAP_READ` staging buffer and wait for the map callback.

use super::{GpuDevice, GpuDeviceError};
use anyhow::{anyhow, Context};
use std::future::Future;
use std::sync::Arc;

/// Copies between buffers must be multiples of this many bytes
const COPY_ALIGNMENT: usize = wgpu::COPY_BUFFER_ALIGNMENT as usize;

/// Padded allocation size for `byte_len` bytes of payload
const fn padded_len(byte_len: usize) -> usize {
    let rounded = byte_len.div_ceil(COPY_ALIGNMENT) * COPY_ALIGNMENT;
    if rounded == 0 {
        COPY_ALIGNMENT
    } else {
        rounded
    }
}

/// Device storage for one array
#[derive(Debug)]
pub struct DeviceBuffer {
    device: Arc<GpuDevice>,
    buffer: wgpu::Buffer,
    byte_len: usize,
}

impl DeviceBuffer {
    /// Allocate a zero-filled buffer holding `byte_len` bytes
    #[must_use]
    pub fn zeroed(device: Arc<GpuDevice>, byte_len: usize) -> Self {
        let buffer = device.create_buffer(
            "type-erased array",
            padded_len(byte_len) as u64,
            wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
        );
        Self {
            device,
            buffer,
            byte_len,
        }
    }

    /// Payload size in bytes (without alignment padding)
    #[must_use]
    pub const fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Overwrite the payload with `bytes`
    ///
    /// # Errors
    ///
    /// Returns `InvalidSize` if `bytes` does not match the payload size
    pub fn upload(&self, bytes: &[u8]) -> crate::Result<()> {
        if bytes.len() != self.byte_len {
            return Err(crate::Error::invalid_size(format!(
                "device upload of {} bytes into a {}-byte buffer",
                bytes.len(),
                self.byte_len
            )));
        }
        if bytes.is_empty() {
            return Ok(());
        }

        let mut padded = bytes.to_vec();
        padded.resize(padded_len(bytes.len()), 0);
        self.device.queue().write_buffer(&self.buffer, 0, &padded);
        self.device.queue().submit(std::iter::empty());
        Ok(())
    }

    /// Read the payload back to the host
    ///
    /// # Errors
    ///
    /// Returns an error if the staging buffer cannot be mapped
    pub fn download(&self) -> crate::Result<Vec<u8>> {
        if self.byte_len == 0 {
            return Ok(Vec::new());
        }
        let bytes = block_on(self.read_back()).map_err(|e| GpuDeviceError::Readback(format!("{e:#}")))?;
        Ok(bytes)
    }

    async fn read_back(&self) -> anyhow::Result<Vec<u8>> {
        let size = padded_len(self.byte_len) as u64;
        let staging = self.device.create_buffer(
            "array staging",
            size,
            wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        );

        let mut encoder = self
            .device
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("array readback"),
            });
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging, 0, size);
        self.device.queue().submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        self.device.device().poll(wgpu::Maintain::Wait);
        rx.receive()
            .await
            .context("Failed to receive map result")?
            .context("Failed to map staging buffer")?;

        let data = slice.get_mapped_range();
        let bytes = data[..self.byte_len].to_vec();
        drop(data);
        staging.unmap();

        Ok(bytes)
    }
}

/// Drive a readback future to completion from synchronous code
///
/// Runs on a scoped thread so it also works when the caller is already inside
/// a tokio runtime.
fn block_on<F>(fut: F) -> anyhow::Result<F::Output>
where
    F: Future + Send,
    F::Output: Send,
{
    std::thread::scope(|scope| {
        scope
            .spawn(|| {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .build()
                    .context("Failed to build readback runtime")?;
                Ok(runtime.block_on(fut))
            })
            .join()
            .map_err(|_| anyhow!("readback thread panicked"))?
    })
}
