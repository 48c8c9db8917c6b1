use crate::assets::Mesh;
use crate::device::{OwnedBuffer, RenderDevice};
use crate::error::ResourceError;

/// Device vertex and index buffers of one mesh.
pub struct MeshBuffers<'d, D: RenderDevice> {
    vertex: OwnedBuffer<'d, D>,
    index: OwnedBuffer<'d, D>,
    mesh: Mesh,
}

impl<'d, D: RenderDevice> MeshBuffers<'d, D> {
    /// Allocates both buffers and uploads the mesh in full.
    pub fn upload(device: &'d D, mesh: &Mesh) -> Result<Self, ResourceError> {
        let vertex = Self::create_filled(
            device,
            "mesh vertices",
            wgpu::BufferUsages::VERTEX,
            mesh.vertex_bytes(),
        )?;
        let index = Self::create_filled(
            device,
            "mesh indices",
            wgpu::BufferUsages::INDEX,
            mesh.index_bytes(),
        )?;

        Ok(Self {
            vertex,
            index,
            mesh: mesh.clone(),
        })
    }

    fn create_filled(
        device: &'d D,
        label: &'static str,
        usage: wgpu::BufferUsages,
        bytes: &[u8],
    ) -> Result<OwnedBuffer<'d, D>, ResourceError> {
        // Buffer sizes must be a multiple of 4; an empty mesh still gets one word.
        let size = (bytes.len() as u64).div_ceil(4).max(1) * 4;
        let buffer = OwnedBuffer::create(
            device,
            &wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage: usage | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            },
        )?;
        if !bytes.is_empty() {
            buffer.write(0, bytes);
        }
        Ok(buffer)
    }

    #[inline]
    pub fn vertex(&self) -> &D::Buffer {
        self.vertex.raw()
    }

    #[inline]
    pub fn index(&self) -> &D::Buffer {
        self.index.raw()
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.mesh.index_count()
    }

    /// Index format of [`index`](Self::index).
    #[inline]
    pub fn index_format(&self) -> wgpu::IndexFormat {
        wgpu::IndexFormat::Uint32
    }

    #[inline]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }
}
