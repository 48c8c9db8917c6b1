use super::RenderDevice;

/// A device texture plus its default view, destroyed when dropped.
///
/// Replacing an `OwnedTexture` (assignment, `Option::replace`, `take`) always
/// releases the old resource before the holder can observe the new one.
pub struct OwnedTexture<'d, D: RenderDevice> {
    device: &'d D,
    texture: D::Texture,
    view: D::TextureView,
}

impl<'d, D: RenderDevice> OwnedTexture<'d, D> {
    pub fn new(device: &'d D, texture: D::Texture, view: D::TextureView) -> Self {
        Self { device, texture, view }
    }

    #[inline]
    pub fn texture(&self) -> &D::Texture {
        &self.texture
    }

    #[inline]
    pub fn view(&self) -> &D::TextureView {
        &self.view
    }
}

impl<D: RenderDevice> Drop for OwnedTexture<'_, D> {
    fn drop(&mut self) {
        self.device.destroy_texture(&self.texture);
    }
}

/// A device buffer of known size, destroyed when dropped.
pub struct OwnedBuffer<'d, D: RenderDevice> {
    device: &'d D,
    buffer: D::Buffer,
    size: u64,
}

impl<'d, D: RenderDevice> OwnedBuffer<'d, D> {
    pub fn new(device: &'d D, buffer: D::Buffer, size: u64) -> Self {
        Self { device, buffer, size }
    }

    /// Allocates a buffer and wraps it.
    pub fn create(
        device: &'d D,
        desc: &wgpu::BufferDescriptor<'_>,
    ) -> Result<Self, crate::ResourceError> {
        let buffer = device.create_buffer(desc)?;
        Ok(Self::new(device, buffer, desc.size))
    }

    #[inline]
    pub fn raw(&self) -> &D::Buffer {
        &self.buffer
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Queues a write at `offset`.
    #[inline]
    pub fn write(&self, offset: u64, data: &[u8]) {
        debug_assert!(offset + data.len() as u64 <= self.size, "write past end of buffer");
        self.device.write_buffer(&self.buffer, offset, data);
    }
}

impl<D: RenderDevice> Drop for OwnedBuffer<'_, D> {
    fn drop(&mut self) {
        self.device.destroy_buffer(&self.buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::{Call, MockDevice};

    fn buffer_desc(size: u64) -> wgpu::BufferDescriptor<'static> {
        wgpu::BufferDescriptor {
            label: Some("test buffer"),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }
    }

    #[test]
    fn buffer_destroyed_on_drop() {
        let device = MockDevice::new();
        let buffer = OwnedBuffer::create(&device, &buffer_desc(64)).unwrap();
        let id = buffer.raw().0;
        assert_eq!(device.count(|c| matches!(c, Call::DestroyBuffer { .. })), 0);

        drop(buffer);
        assert_eq!(device.destroyed_buffers(), vec![id]);
    }

    #[test]
    fn replacing_buffer_releases_old_first() {
        let device = MockDevice::new();
        let mut slot = Some(OwnedBuffer::create(&device, &buffer_desc(64)).unwrap());
        let old = slot.as_ref().unwrap().raw().0;

        slot = None;
        slot.replace(OwnedBuffer::create(&device, &buffer_desc(128)).unwrap());

        let calls = device.calls();
        let destroy_at = calls
            .iter()
            .position(|c| *c == Call::DestroyBuffer { id: old })
            .unwrap();
        let second_create = calls
            .iter()
            .rposition(|c| matches!(c, Call::CreateBuffer { .. }))
            .unwrap();
        assert!(destroy_at < second_create);
        assert_eq!(slot.unwrap().size(), 128);
    }

    #[test]
    fn buffer_write_is_forwarded() {
        let device = MockDevice::new();
        let buffer = OwnedBuffer::create(&device, &buffer_desc(16)).unwrap();
        buffer.write(4, &[1, 2, 3, 4]);
        assert_eq!(device.buffer_writes(), vec![(buffer.raw().0, 4, vec![1, 2, 3, 4])]);
    }
}
