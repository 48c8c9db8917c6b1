use anyhow::{Context, Result};
use log::{debug, info};

use super::{DeviceLimits, GpuInit, RenderDevice, TexelRegion};
use crate::error::ResourceError;

/// Owns the wgpu core objects of a headless context.
///
/// This type is the low-level device context:
/// - creates and stores Instance/Adapter/Device/Queue
/// - implements [`RenderDevice`] on top of them
/// - flushes queued uploads
pub struct Gpu {
    /// wgpu instance used to create the adapter.
    instance: wgpu::Instance,

    /// Selected adapter.
    adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Limits of the created device, cached for pre-validation.
    limits: DeviceLimits,
}

impl Gpu {
    /// Creates a GPU context without a surface.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: GpuInit) -> Result<Self> {
        let GpuInit {
            backends,
            power_preference,
            force_fallback_adapter,
            required_features,
            required_limits,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let adapter_info = adapter.get_info();
        info!(
            "using adapter '{}' ({:?}, {:?})",
            adapter_info.name, adapter_info.backend, adapter_info.device_type
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("lumen-engine device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let limits = DeviceLimits::from(&device.limits());
        info!(
            "device ready: uniform offset alignment {} B, max 2D texture {}",
            limits.min_uniform_buffer_offset_alignment, limits.max_texture_dimension_2d
        );

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            limits,
        })
    }

    /// Blocking variant of [`Gpu::new`] for synchronous callers.
    pub fn new_blocking(init: GpuInit) -> Result<Self> {
        pollster::block_on(Self::new(init))
    }

    /// Returns a reference to the wgpu instance.
    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    /// Returns a reference to the selected adapter.
    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Submits an empty batch so that all queued writes reach the device.
    pub fn flush(&self) {
        self.queue.submit(std::iter::empty::<wgpu::CommandBuffer>());
    }
}

impl RenderDevice for Gpu {
    type Texture = wgpu::Texture;
    type TextureView = wgpu::TextureView;
    type Buffer = wgpu::Buffer;

    fn limits(&self) -> DeviceLimits {
        self.limits
    }

    fn create_texture(
        &self,
        desc: &wgpu::TextureDescriptor<'_>,
    ) -> Result<Self::Texture, ResourceError> {
        validate_texture(&self.limits, desc)?;
        debug!(
            "create texture '{}' {}x{}x{} mips={} {:?}",
            desc.label.unwrap_or("<unlabeled>"),
            desc.size.width,
            desc.size.height,
            desc.size.depth_or_array_layers,
            desc.mip_level_count,
            desc.format
        );
        Ok(self.device.create_texture(desc))
    }

    fn create_texture_view(
        &self,
        texture: &Self::Texture,
        desc: &wgpu::TextureViewDescriptor<'_>,
    ) -> Self::TextureView {
        texture.create_view(desc)
    }

    fn write_texture(&self, texture: &Self::Texture, region: TexelRegion, data: &[u8]) {
        debug_assert_eq!(data.len(), region.byte_len(), "texel data does not match region");
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: region.mip_level,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: region.layer,
                },
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(region.bytes_per_row()),
                rows_per_image: Some(region.height),
            },
            wgpu::Extent3d {
                width: region.width,
                height: region.height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn destroy_texture(&self, texture: &Self::Texture) {
        texture.destroy();
    }

    fn create_buffer(
        &self,
        desc: &wgpu::BufferDescriptor<'_>,
    ) -> Result<Self::Buffer, ResourceError> {
        if desc.size == 0 || desc.size > self.limits.max_buffer_size {
            return Err(ResourceError::allocation(
                desc.label,
                format!(
                    "buffer size {} outside 1..={}",
                    desc.size, self.limits.max_buffer_size
                ),
            ));
        }
        debug!(
            "create buffer '{}' {} B",
            desc.label.unwrap_or("<unlabeled>"),
            desc.size
        );
        Ok(self.device.create_buffer(desc))
    }

    fn write_buffer(&self, buffer: &Self::Buffer, offset: u64, data: &[u8]) {
        // Queue writes must be a multiple of COPY_BUFFER_ALIGNMENT.
        let rem = data.len() as u64 % wgpu::COPY_BUFFER_ALIGNMENT;
        if rem == 0 {
            self.queue.write_buffer(buffer, offset, data);
        } else {
            let mut padded = data.to_vec();
            padded.resize(data.len() + (wgpu::COPY_BUFFER_ALIGNMENT - rem) as usize, 0);
            self.queue.write_buffer(buffer, offset, &padded);
        }
    }

    fn destroy_buffer(&self, buffer: &Self::Buffer) {
        buffer.destroy();
    }
}

/// Rejects descriptors the device would refuse, so the failure surfaces as a
/// typed error instead of a validation panic.
fn validate_texture(
    limits: &DeviceLimits,
    desc: &wgpu::TextureDescriptor<'_>,
) -> Result<(), ResourceError> {
    let size = desc.size;
    if size.width == 0 || size.height == 0 || size.depth_or_array_layers == 0 {
        return Err(ResourceError::allocation(desc.label, "zero-sized texture"));
    }

    let max_dim = match desc.dimension {
        wgpu::TextureDimension::D1 => limits.max_texture_dimension_1d,
        _ => limits.max_texture_dimension_2d,
    };
    if size.width > max_dim || size.height > max_dim {
        return Err(ResourceError::allocation(
            desc.label,
            format!(
                "{}x{} exceeds max texture dimension {max_dim}",
                size.width, size.height
            ),
        ));
    }

    if size.depth_or_array_layers > limits.max_texture_array_layers {
        return Err(ResourceError::allocation(
            desc.label,
            format!(
                "{} layers exceeds max array layers {}",
                size.depth_or_array_layers, limits.max_texture_array_layers
            ),
        ));
    }

    Ok(())
}
