//! GPU device initialization and management
//!
//! Handles wgpu device creation and adapter selection for device-resident arrays.

use thiserror::Error;

/// GPU device initialization errors
#[derive(Debug, Error)]
pub enum GpuDeviceError {
    /// No compatible GPU adapter found
    #[error("No compatible GPU adapter found")]
    NoAdapter,

    /// Failed to request GPU device
    #[error("Failed to request GPU device: {0}")]
    DeviceRequest(String),

    /// Buffer readback failed
    #[error("GPU readback failed: {0}")]
    Readback(String),
}

impl From<GpuDeviceError> for crate::Error {
    fn from(err: GpuDeviceError) -> Self {
        match err {
            GpuDeviceError::NoAdapter => Self::ArchMismatch(err.to_string()),
            GpuDeviceError::DeviceRequest(_) | GpuDeviceError::Readback(_) => {
                Self::External(anyhow::Error::new(err))
            }
        }
    }
}

/// GPU device wrapper owning the wgpu device and queue
///
/// # Example
///
/// ```ignore
/// # use trueno_graph_api::gpu::GpuDevice;
/// let device = GpuDevice::new().await?;
/// let handle = ResourceHandle::with_device(std::sync::Arc::new(device));
/// ```
#[derive(Debug)]
pub struct GpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter: wgpu::Adapter,
}

impl GpuDevice {
    /// Check if GPU is available without keeping a device
    ///
    /// Tests use this to skip gracefully on machines without an adapter.
    pub async fn is_gpu_available() -> bool {
        Self::new().await.is_ok()
    }

    /// Initialize GPU device with default settings
    ///
    /// # Errors
    ///
    /// Returns `GpuDeviceError` if no adapter is found or the device request fails
    pub async fn new() -> Result<Self, GpuDeviceError> {
        Self::new_with_backend(wgpu::Backends::all()).await
    }

    /// Initialize GPU device with specific backend
    ///
    /// # Errors
    ///
    /// Returns `GpuDeviceError` if device initialization fails
    pub async fn new_with_backend(backends: wgpu::Backends) -> Result<Self, GpuDeviceError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuDeviceError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("trueno-graph-api array device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(|e| GpuDeviceError::DeviceRequest(e.to_string()))?;

        tracing::info!(adapter = %adapter.get_info().name, "GPU device initialized");

        Ok(Self {
            device,
            queue,
            adapter,
        })
    }

    /// Get adapter info (GPU name, backend, etc.)
    #[must_use]
    pub fn info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Create empty GPU buffer
    #[must_use]
    pub fn create_buffer(&self, label: &str, size: u64, usage: wgpu::BufferUsages) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation: false,
        })
    }

    /// Get device reference
    #[must_use]
    pub const fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Get queue reference
    #[must_use]
    pub const fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[serial_test::serial]
    async fn test_gpu_adapter_info() {
        if !GpuDevice::is_gpu_available().await {
            eprintln!("Skipping test_gpu_adapter_info: GPU not available");
            return;
        }

        let device = GpuDevice::new().await.unwrap();
        assert!(!device.info().name.is_empty());
    }

    #[tokio::test]
    async fn test_gpu_device_with_invalid_backend() {
        let device = GpuDevice::new_with_backend(wgpu::Backends::empty()).await;
        assert!(device.is_err());
    }

    #[test]
    fn test_gpu_device_error_mapping() {
        let err: crate::Error = GpuDeviceError::NoAdapter.into();
        assert_eq!(err.code(), crate::StatusCode::ArchMismatch);

        let err: crate::Error = GpuDeviceError::Readback("lost".to_string()).into();
        assert_eq!(err.code(), crate::StatusCode::UnknownError);
        assert_eq!(err.to_string(), "GPU readback failed: lost");
    }
}
