use bytemuck::Pod;
use glam::Mat4;
use log::warn;

use crate::assets::AssetId;
use crate::device::RenderDevice;
use crate::error::ResourceError;
use crate::pool::ResourcePool;
use crate::scene::{Material, Renderable, SceneGraph};
use crate::texture::ColorSpace;
use crate::uniforms::{FrameData, FrameDataShadow, ModelData, ModelDataShadow, Uniforms};

/// Everything needed to encode one draw, resolved before encoding starts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PreparedDraw {
    /// Pool key of the mesh buffers ([`ResourcePool::mesh_by_id`]).
    pub mesh: AssetId,
    /// Offset into the model arena for this draw's bind group.
    pub dynamic_offset: u32,
    pub index_count: u32,
}

/// Uniform state owned by one render pass: a single frame record and one
/// model record per renderable.
pub struct PassUniforms<'d, D: RenderDevice, F: Pod, M: Pod> {
    label: &'static str,
    frame: Uniforms<'d, D, F>,
    models: Uniforms<'d, D, M>,
}

pub type ColorPassUniforms<'d, D> = PassUniforms<'d, D, FrameData, ModelData>;
pub type ShadowPassUniforms<'d, D> = PassUniforms<'d, D, FrameDataShadow, ModelDataShadow>;

impl<'d, D: RenderDevice, F: Pod, M: Pod> PassUniforms<'d, D, F, M> {
    pub fn new(device: &'d D, label: &'static str) -> Self {
        Self {
            label,
            frame: Uniforms::new(device, label),
            models: Uniforms::new(device, label),
        }
    }

    /// Writes this frame's uniforms and resolves mesh buffers.
    ///
    /// `renderables[i]` is written to model slot `i`. A renderable whose
    /// buffers cannot be allocated is skipped with a warning; any other error
    /// aborts preparation.
    pub fn prepare(
        &mut self,
        frame: &F,
        renderables: &[Renderable],
        scene: &SceneGraph,
        pool: &mut ResourcePool<'_, D>,
        model_of: impl Fn(&Renderable, Mat4) -> M,
    ) -> Result<Vec<PreparedDraw>, ResourceError> {
        self.frame.set_size(1)?;
        self.frame.write_changes(0, frame)?;
        self.models.set_size(renderables.len())?;

        let mut draws = Vec::with_capacity(renderables.len());
        for (index, renderable) in renderables.iter().enumerate() {
            let world = scene.world(renderable.node);
            self.models.write_changes(index, &model_of(renderable, world))?;

            let buffers = match pool.mesh(renderable) {
                Ok(buffers) => buffers,
                Err(err) if err.is_allocation_failure() => {
                    warn!("{}: skipping draw {index}: {err}", self.label);
                    continue;
                }
                Err(err) => return Err(err),
            };

            draws.push(PreparedDraw {
                mesh: renderable.mesh.id(),
                dynamic_offset: self.models.dynamic_offset(index)?,
                index_count: buffers.index_count(),
            });
        }

        Ok(draws)
    }

    #[inline]
    pub fn frame(&self) -> &Uniforms<'d, D, F> {
        &self.frame
    }

    #[inline]
    pub fn models(&self) -> &Uniforms<'d, D, M> {
        &self.models
    }

    /// Total uploads issued by both arenas.
    pub fn upload_count(&self) -> u64 {
        self.frame.upload_count() + self.models.upload_count()
    }
}

/// Makes sure every texture a material samples is resident in `pool`.
///
/// Base colour and emissive maps are sRGB; the remaining maps hold data and
/// are linear. Returns how many textures (including the reflection cubemap)
/// the material references.
pub fn prepare_material<D: RenderDevice>(
    pool: &mut ResourcePool<'_, D>,
    material: &Material,
) -> Result<usize, ResourceError> {
    let mut count = 0;
    for image in material.color_textures() {
        pool.texture(image, ColorSpace::Srgb)?;
        count += 1;
    }
    for image in material.data_textures() {
        pool.texture(image, ColorSpace::Linear)?;
        count += 1;
    }
    if let Some(cubemap) = &material.reflection_map {
        pool.cubemap(cubemap)?;
        count += 1;
    }
    Ok(count)
}
