use crate::error::ResourceError;

/// Device limits the resource layer depends on.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DeviceLimits {
    /// Required alignment for dynamic uniform buffer offsets, in bytes.
    pub min_uniform_buffer_offset_alignment: u32,
    pub max_texture_dimension_1d: u32,
    pub max_texture_dimension_2d: u32,
    pub max_texture_array_layers: u32,
    pub max_buffer_size: u64,
}

impl From<&wgpu::Limits> for DeviceLimits {
    fn from(limits: &wgpu::Limits) -> Self {
        Self {
            min_uniform_buffer_offset_alignment: limits.min_uniform_buffer_offset_alignment,
            max_texture_dimension_1d: limits.max_texture_dimension_1d,
            max_texture_dimension_2d: limits.max_texture_dimension_2d,
            max_texture_array_layers: limits.max_texture_array_layers,
            max_buffer_size: limits.max_buffer_size,
        }
    }
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self::from(&wgpu::Limits::default())
    }
}

/// Destination of a single texel upload: one mip level of one array layer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TexelRegion {
    pub mip_level: u32,
    pub layer: u32,
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: u32,
}

impl TexelRegion {
    #[inline]
    pub fn bytes_per_row(&self) -> u32 {
        self.width * self.bytes_per_pixel
    }

    #[inline]
    pub fn byte_len(&self) -> usize {
        self.bytes_per_row() as usize * self.height as usize
    }
}

/// Device-facing operations used by textures, uniform arenas and the pool.
///
/// Descriptors are wgpu's plain-data structs; only the resource handles are
/// backend specific. Uploads are queued, not awaited: the queue preserves
/// submission order, so a write is visible to draws submitted after it.
///
/// `destroy_*` frees device memory eagerly. The handle itself is released when
/// dropped.
pub trait RenderDevice {
    type Texture;
    type TextureView;
    type Buffer;

    fn limits(&self) -> DeviceLimits;

    fn create_texture(
        &self,
        desc: &wgpu::TextureDescriptor<'_>,
    ) -> Result<Self::Texture, ResourceError>;

    fn create_texture_view(
        &self,
        texture: &Self::Texture,
        desc: &wgpu::TextureViewDescriptor<'_>,
    ) -> Self::TextureView;

    /// Queues `data` (tightly packed rows) for upload into `region`.
    fn write_texture(&self, texture: &Self::Texture, region: TexelRegion, data: &[u8]);

    fn destroy_texture(&self, texture: &Self::Texture);

    fn create_buffer(&self, desc: &wgpu::BufferDescriptor<'_>)
    -> Result<Self::Buffer, ResourceError>;

    /// Queues `data` for upload at byte `offset` of `buffer`.
    fn write_buffer(&self, buffer: &Self::Buffer, offset: u64, data: &[u8]);

    fn destroy_buffer(&self, buffer: &Self::Buffer);
}
