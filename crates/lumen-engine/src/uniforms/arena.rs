use bytemuck::Pod;
use log::{debug, trace};

use crate::device::{OwnedBuffer, RenderDevice};
use crate::error::ResourceError;

/// Smallest multiple of `alignment` that holds `size` bytes (at least one).
///
/// An alignment of 0 is treated as 1.
#[inline]
pub fn uniform_stride(size: u64, alignment: u32) -> u64 {
    let alignment = u64::from(alignment.max(1));
    size.max(1).div_ceil(alignment) * alignment
}

/// A device buffer of `T` records addressed by dynamic offset.
///
/// Records sit `stride` bytes apart so each one can be bound with a dynamic
/// uniform offset. A per-slot shadow copy skips uploads of unchanged values.
pub struct Uniforms<'d, D: RenderDevice, T: Pod> {
    device: &'d D,
    label: &'static str,
    stride: u64,
    /// Last value uploaded to each slot; `None` until first written.
    shadows: Vec<Option<T>>,
    buffer: Option<OwnedBuffer<'d, D>>,
    uploads: u64,
}

impl<'d, D: RenderDevice, T: Pod> Uniforms<'d, D, T> {
    /// Creates an empty arena. No buffer exists until [`set_size`](Self::set_size).
    pub fn new(device: &'d D, label: &'static str) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment;
        Self {
            device,
            label,
            stride: uniform_stride(std::mem::size_of::<T>() as u64, alignment),
            shadows: Vec::new(),
            buffer: None,
            uploads: 0,
        }
    }

    /// Resizes to `len` records.
    ///
    /// Returns `Ok(false)` when the size is unchanged. Otherwise the buffer is
    /// replaced (one record minimum, so bindings stay valid) and every slot is
    /// marked unwritten.
    pub fn set_size(&mut self, len: usize) -> Result<bool, ResourceError> {
        if self.buffer.is_some() && self.shadows.len() == len {
            return Ok(false);
        }

        self.buffer = None;
        self.shadows.clear();

        let size = len.max(1) as u64 * self.stride;
        let buffer = OwnedBuffer::create(
            self.device,
            &wgpu::BufferDescriptor {
                label: Some(self.label),
                size,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            },
        )?;

        self.buffer = Some(buffer);
        self.shadows.resize(len, None);
        debug!(
            "uniforms '{}': {len} records, stride {} B, {size} B buffer",
            self.label, self.stride
        );
        Ok(true)
    }

    /// Uploads `value` into slot `index` if it differs bitwise from the last
    /// upload (or the slot was never written). Returns whether it uploaded.
    pub fn write_changes(&mut self, index: usize, value: &T) -> Result<bool, ResourceError> {
        let len = self.shadows.len();
        let label = self.label;
        let shadow = self
            .shadows
            .get_mut(index)
            .ok_or(ResourceError::IndexOutOfRange { label, index, len })?;

        let bytes = bytemuck::bytes_of(value);
        if shadow.as_ref().is_some_and(|prev| bytemuck::bytes_of(prev) == bytes) {
            trace!("uniforms '{label}': slot {index} unchanged");
            return Ok(false);
        }

        let buffer = self
            .buffer
            .as_ref()
            .ok_or(ResourceError::UninitializedResource { label })?;
        buffer.write(index as u64 * self.stride, bytes);
        *shadow = Some(*value);
        self.uploads += 1;
        Ok(true)
    }

    #[inline]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Distance in bytes between consecutive records.
    #[inline]
    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Dynamic offset of record `index`.
    ///
    /// Fails with `IndexOutOfRange` when the offset does not fit the `u32`
    /// a bind group takes.
    pub fn dynamic_offset(&self, index: usize) -> Result<u32, ResourceError> {
        (index as u64)
            .checked_mul(self.stride)
            .and_then(|offset| u32::try_from(offset).ok())
            .ok_or(ResourceError::IndexOutOfRange {
                label: self.label,
                index,
                len: self.len(),
            })
    }

    /// Size of one record without padding.
    #[inline]
    pub fn record_size(&self) -> u64 {
        std::mem::size_of::<T>() as u64
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shadows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shadows.is_empty()
    }

    /// Backing buffer, `None` before the first `set_size`.
    #[inline]
    pub fn buffer(&self) -> Option<&D::Buffer> {
        self.buffer.as_ref().map(OwnedBuffer::raw)
    }

    /// Number of uploads issued over the arena's lifetime.
    #[inline]
    pub fn upload_count(&self) -> u64 {
        self.uploads
    }
}
