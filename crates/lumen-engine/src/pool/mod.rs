//! Identity-keyed cache of GPU resources created from CPU assets.
//!
//! Textures, cubemaps and mesh buffers are created on first request and live
//! as long as the pool. Entries are never updated: a mutated asset carries a
//! new [`AssetId`] and becomes a new entry.

mod mesh_buffers;

pub use mesh_buffers::MeshBuffers;

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use log::{debug, warn};

use crate::assets::{AssetId, Cubemap, Image, Mesh};
use crate::device::RenderDevice;
use crate::error::ResourceError;
use crate::scene::Renderable;
use crate::texture::{ColorSpace, DeviceTexture, TextureParams};

/// Pool-wide settings applied to every texture it creates.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_mip_levels: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { max_mip_levels: 10 }
    }
}

/// Cache occupancy and lookup counters.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub textures: usize,
    pub cubemaps: usize,
    pub meshes: usize,
    pub hits: u64,
    pub misses: u64,
}

struct CachedTexture<'d, D: RenderDevice> {
    texture: DeviceTexture<'d, D>,
    color_space: ColorSpace,
}

/// Lazily populated GPU resource cache.
///
/// The pool borrows the device, so it cannot outlive it.
pub struct ResourcePool<'d, D: RenderDevice> {
    device: &'d D,
    config: PoolConfig,
    textures: HashMap<AssetId, CachedTexture<'d, D>>,
    cubemaps: HashMap<AssetId, DeviceTexture<'d, D>>,
    meshes: HashMap<AssetId, MeshBuffers<'d, D>>,
    hits: u64,
    misses: u64,
}

impl<'d, D: RenderDevice> ResourcePool<'d, D> {
    pub fn new(device: &'d D, config: PoolConfig) -> Self {
        Self {
            device,
            config,
            textures: HashMap::new(),
            cubemaps: HashMap::new(),
            meshes: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Texture for `image`, uploading it on first request.
    ///
    /// A failed upload is not cached. A later request with a different colour
    /// space still returns the texture created first.
    pub fn texture(
        &mut self,
        image: &Image,
        color_space: ColorSpace,
    ) -> Result<&DeviceTexture<'d, D>, ResourceError> {
        match self.textures.entry(image.id()) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                let cached = entry.into_mut();
                if cached.color_space != color_space {
                    warn!(
                        "image {} requested as {color_space:?} but cached as {:?}; using cached texture",
                        image.id(),
                        cached.color_space
                    );
                }
                Ok(&cached.texture)
            }
            Entry::Vacant(entry) => {
                self.misses += 1;
                let params = TextureParams::sampled(
                    "pool texture",
                    color_space,
                    self.config.max_mip_levels,
                );
                let mut texture = DeviceTexture::new(self.device, params);
                texture.set_image(image)?;
                debug!("pool: cached texture for image {}", image.id());

                let cached = entry.insert(CachedTexture {
                    texture,
                    color_space,
                });
                Ok(&cached.texture)
            }
        }
    }

    /// Cube texture for `cubemap`, uploading all faces on first request.
    pub fn cubemap(&mut self, cubemap: &Cubemap) -> Result<&DeviceTexture<'d, D>, ResourceError> {
        match self.cubemaps.entry(cubemap.id()) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                Ok(&*entry.into_mut())
            }
            Entry::Vacant(entry) => {
                self.misses += 1;
                let params = TextureParams::cube(
                    "pool cubemap",
                    ColorSpace::Linear,
                    self.config.max_mip_levels,
                );
                let mut texture = DeviceTexture::new(self.device, params);
                texture.set_cubemap(cubemap)?;
                debug!("pool: cached cubemap {}", cubemap.id());
                Ok(&*entry.insert(texture))
            }
        }
    }

    /// Vertex and index buffers for the renderable's mesh.
    pub fn mesh(&mut self, renderable: &Renderable) -> Result<&MeshBuffers<'d, D>, ResourceError> {
        self.mesh_buffers(&renderable.mesh)
    }

    /// Vertex and index buffers for `mesh`, keyed by its vertex storage.
    pub fn mesh_buffers(&mut self, mesh: &Mesh) -> Result<&MeshBuffers<'d, D>, ResourceError> {
        match self.meshes.entry(mesh.id()) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                Ok(&*entry.into_mut())
            }
            Entry::Vacant(entry) => {
                self.misses += 1;
                let buffers = MeshBuffers::upload(self.device, mesh)?;
                debug!(
                    "pool: cached mesh {} ({} vertices, {} indices)",
                    mesh.id(),
                    mesh.vertices().len(),
                    mesh.index_count()
                );
                Ok(&*entry.insert(buffers))
            }
        }
    }

    /// Cached mesh buffers, without creating them.
    pub fn mesh_by_id(&self, id: AssetId) -> Option<&MeshBuffers<'d, D>> {
        self.meshes.get(&id)
    }

    /// Cached texture, without creating it.
    pub fn texture_by_id(&self, id: AssetId) -> Option<&DeviceTexture<'d, D>> {
        self.textures.get(&id).map(|cached| &cached.texture)
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            textures: self.textures.len(),
            cubemaps: self.cubemaps.len(),
            meshes: self.meshes.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}
