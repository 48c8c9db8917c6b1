//! In-memory [`RenderDevice`] used by unit tests.
//!
//! Records every call so tests can assert allocation, upload, and destruction
//! order without a GPU.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::{DeviceLimits, RenderDevice, TexelRegion};
use crate::error::ResourceError;
use crate::texture::mips::{full_mip_count, mip_extent};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct MockTexture(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct MockView {
    pub texture: u64,
    pub id: u64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct MockBuffer(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    CreateTexture {
        id: u64,
        width: u32,
        height: u32,
        layers: u32,
        mip_level_count: u32,
        format: wgpu::TextureFormat,
        dimension: wgpu::TextureDimension,
    },
    CreateView {
        texture: u64,
        view: u64,
    },
    WriteTexture {
        id: u64,
        region: TexelRegion,
        data: Vec<u8>,
    },
    DestroyTexture {
        id: u64,
    },
    CreateBuffer {
        id: u64,
        size: u64,
    },
    WriteBuffer {
        id: u64,
        offset: u64,
        data: Vec<u8>,
    },
    DestroyBuffer {
        id: u64,
    },
}

/// Shape of a live mock texture, checked against every view and write.
#[derive(Debug, Copy, Clone)]
struct TextureShape {
    size: wgpu::Extent3d,
    mip_level_count: u32,
}

/// Recording device. Descriptors, views and writes are held to the same
/// shape rules wgpu validates, so an invalid request panics here as it would
/// on a real device.
pub(crate) struct MockDevice {
    limits: DeviceLimits,
    next_id: Cell<u64>,
    fail_allocations: Cell<bool>,
    calls: RefCell<Vec<Call>>,
    textures: RefCell<HashMap<u64, TextureShape>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::with_limits(DeviceLimits::default())
    }

    pub fn with_alignment(alignment: u32) -> Self {
        Self::with_limits(DeviceLimits {
            min_uniform_buffer_offset_alignment: alignment,
            ..DeviceLimits::default()
        })
    }

    pub fn with_limits(limits: DeviceLimits) -> Self {
        Self {
            limits,
            next_id: Cell::new(1),
            fail_allocations: Cell::new(false),
            calls: RefCell::new(Vec::new()),
            textures: RefCell::new(HashMap::new()),
        }
    }

    /// Makes every following `create_*` call fail with `DeviceAllocation`.
    pub fn fail_allocations(&self, fail: bool) {
        self.fail_allocations.set(fail);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn texture_writes(&self) -> Vec<(u64, TexelRegion, Vec<u8>)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::WriteTexture { id, region, data } => Some((*id, *region, data.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn buffer_writes(&self) -> Vec<(u64, u64, Vec<u8>)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::WriteBuffer { id, offset, data } => Some((*id, *offset, data.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn created_buffers(&self) -> Vec<(u64, u64)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::CreateBuffer { id, size } => Some((*id, *size)),
                _ => None,
            })
            .collect()
    }

    pub fn destroyed_buffers(&self) -> Vec<u64> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::DestroyBuffer { id } => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn destroyed_textures(&self) -> Vec<u64> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::DestroyTexture { id } => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn shape(&self, texture: &MockTexture) -> TextureShape {
        match self.textures.borrow().get(&texture.0) {
            Some(shape) => *shape,
            None => panic!("texture {} is not alive", texture.0),
        }
    }
}

impl RenderDevice for MockDevice {
    type Texture = MockTexture;
    type TextureView = MockView;
    type Buffer = MockBuffer;

    fn limits(&self) -> DeviceLimits {
        self.limits
    }

    fn create_texture(
        &self,
        desc: &wgpu::TextureDescriptor<'_>,
    ) -> Result<Self::Texture, ResourceError> {
        if self.fail_allocations.get() {
            return Err(ResourceError::allocation(desc.label, "mock allocation failure"));
        }
        let size = desc.size;
        assert!(
            size.width > 0 && size.height > 0 && size.depth_or_array_layers > 0,
            "zero-sized texture {size:?}"
        );
        if desc.dimension == wgpu::TextureDimension::D1 {
            assert!(
                size.height == 1 && size.depth_or_array_layers == 1,
                "1D texture must be one row and one layer, got {size:?}"
            );
        }
        assert!(
            (1..=full_mip_count(size.width, size.height)).contains(&desc.mip_level_count),
            "{} mip levels for {}x{}",
            desc.mip_level_count,
            size.width,
            size.height
        );

        let id = self.next_id();
        self.textures.borrow_mut().insert(
            id,
            TextureShape {
                size,
                mip_level_count: desc.mip_level_count,
            },
        );
        self.record(Call::CreateTexture {
            id,
            width: desc.size.width,
            height: desc.size.height,
            layers: desc.size.depth_or_array_layers,
            mip_level_count: desc.mip_level_count,
            format: desc.format,
            dimension: desc.dimension,
        });
        Ok(MockTexture(id))
    }

    fn create_texture_view(
        &self,
        texture: &Self::Texture,
        desc: &wgpu::TextureViewDescriptor<'_>,
    ) -> Self::TextureView {
        let size = self.shape(texture).size;
        match desc.dimension {
            Some(wgpu::TextureViewDimension::Cube) => assert!(
                size.depth_or_array_layers == 6 && size.width == size.height,
                "cube view needs six square layers, got {size:?}"
            ),
            Some(wgpu::TextureViewDimension::D2 | wgpu::TextureViewDimension::D1) => assert!(
                size.depth_or_array_layers == 1 || desc.array_layer_count == Some(1),
                "single-layer view of a {}-layer texture",
                size.depth_or_array_layers
            ),
            _ => {}
        }

        let view = MockView {
            texture: texture.0,
            id: self.next_id(),
        };
        self.record(Call::CreateView {
            texture: texture.0,
            view: view.id,
        });
        view
    }

    fn write_texture(&self, texture: &Self::Texture, region: TexelRegion, data: &[u8]) {
        assert_eq!(data.len(), region.byte_len(), "texel data does not match region");
        let shape = self.shape(texture);
        assert!(
            region.mip_level < shape.mip_level_count,
            "mip level {} of a {}-level texture",
            region.mip_level,
            shape.mip_level_count
        );
        assert!(
            region.layer < shape.size.depth_or_array_layers,
            "layer {} of a {}-layer texture",
            region.layer,
            shape.size.depth_or_array_layers
        );
        let (width, height) = mip_extent(shape.size.width, shape.size.height, region.mip_level);
        assert!(
            region.width <= width && region.height <= height,
            "{}x{} write into a {width}x{height} level",
            region.width,
            region.height
        );
        self.record(Call::WriteTexture {
            id: texture.0,
            region,
            data: data.to_vec(),
        });
    }

    fn destroy_texture(&self, texture: &Self::Texture) {
        self.textures.borrow_mut().remove(&texture.0);
        self.record(Call::DestroyTexture { id: texture.0 });
    }

    fn create_buffer(
        &self,
        desc: &wgpu::BufferDescriptor<'_>,
    ) -> Result<Self::Buffer, ResourceError> {
        if self.fail_allocations.get() || desc.size > self.limits.max_buffer_size {
            return Err(ResourceError::allocation(desc.label, "mock allocation failure"));
        }
        let id = self.next_id();
        self.record(Call::CreateBuffer { id, size: desc.size });
        Ok(MockBuffer(id))
    }

    fn write_buffer(&self, buffer: &Self::Buffer, offset: u64, data: &[u8]) {
        self.record(Call::WriteBuffer {
            id: buffer.0,
            offset,
            data: data.to_vec(),
        });
    }

    fn destroy_buffer(&self, buffer: &Self::Buffer) {
        self.record(Call::DestroyBuffer { id: buffer.0 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture(
        device: &MockDevice,
        width: u32,
        height: u32,
        layers: u32,
        mips: u32,
    ) -> MockTexture {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("test"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: layers,
                },
                mip_level_count: mips,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            })
            .unwrap()
    }

    fn region(mip_level: u32, layer: u32, width: u32, height: u32) -> TexelRegion {
        TexelRegion {
            mip_level,
            layer,
            width,
            height,
            bytes_per_pixel: 4,
        }
    }

    #[test]
    fn write_inside_level_is_recorded() {
        let device = MockDevice::new();
        let tex = texture(&device, 8, 8, 1, 4);
        device.write_texture(&tex, region(2, 0, 2, 2), &[0; 16]);
        assert_eq!(device.texture_writes().len(), 1);
    }

    #[test]
    #[should_panic(expected = "write into a 4x4 level")]
    fn write_past_level_extent_panics() {
        let device = MockDevice::new();
        let tex = texture(&device, 8, 8, 1, 4);
        device.write_texture(&tex, region(1, 0, 4, 8), &[0; 128]);
    }

    #[test]
    #[should_panic(expected = "mip level 4 of a 4-level texture")]
    fn write_past_mip_count_panics() {
        let device = MockDevice::new();
        let tex = texture(&device, 8, 8, 1, 4);
        device.write_texture(&tex, region(4, 0, 1, 1), &[0; 4]);
    }

    #[test]
    #[should_panic(expected = "layer 1 of a 1-layer texture")]
    fn write_past_layer_count_panics() {
        let device = MockDevice::new();
        let tex = texture(&device, 8, 8, 1, 1);
        device.write_texture(&tex, region(0, 1, 8, 8), &[0; 256]);
    }

    #[test]
    #[should_panic(expected = "cube view needs six square layers")]
    fn cube_view_of_non_square_texture_panics() {
        let device = MockDevice::new();
        let tex = texture(&device, 8, 4, 6, 1);
        device.create_texture_view(
            &tex,
            &wgpu::TextureViewDescriptor {
                dimension: Some(wgpu::TextureViewDimension::Cube),
                ..Default::default()
            },
        );
    }

    #[test]
    #[should_panic(expected = "is not alive")]
    fn write_to_destroyed_texture_panics() {
        let device = MockDevice::new();
        let tex = texture(&device, 2, 2, 1, 1);
        device.destroy_texture(&tex);
        device.write_texture(&tex, region(0, 0, 2, 2), &[0; 16]);
    }
}
