//! wgpu device bootstrap.
//!
//! Callers embedding arraytex in an existing renderer already have a
//! device and queue and never touch this module. [`GpuContext`] exists
//! for the standalone case where the adapter is the only GPU user in
//! the process.

use std::sync::Arc;

use wgpu::{Adapter, Device, Instance, Queue};

use crate::error::Result;

/// GPU instance/adapter/device/queue bundle.
pub struct GpuContext {
    instance: Instance,
    adapter: Adapter,
    device: Arc<Device>,
    queue: Arc<Queue>,
}

impl GpuContext {
    /// Initialize a device on the preferred adapter.
    pub async fn new() -> Result<Self> {
        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using GPU adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("arraytex device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    /// Blocking wrapper around [`GpuContext::new`].
    pub fn new_blocking() -> Result<Self> {
        pollster::block_on(Self::new())
    }

    /// The wgpu instance, for creating surfaces.
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// The selected adapter.
    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    /// The wgpu device.
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    /// The wgpu queue.
    pub fn queue(&self) -> &Arc<Queue> {
        &self.queue
    }
}
