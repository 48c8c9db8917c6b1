//! Uniform record layouts shared with the shaders.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

// ── color pass ────────────────────────────────────────────────────────────

/// Per-frame data of the colour pass.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, Pod, Zeroable)]
pub struct FrameData {
    pub view: Mat4,
    pub projection: Mat4,
    pub shadow_view_projection: Mat4,
    pub view_position: Vec4,
    pub light_position: Vec4,
    pub poisson_samples: u32,
    pub has_environment_map: u32,
    pub mip_level_count: u32,
    pub _pad: u32,
}

/// Per-draw data of the colour pass.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ModelData {
    pub model: Mat4,
    pub model_inverse_transpose: Mat4,
    pub base_color_factor: Vec4,
    pub has_base_color_texture: u32,
    pub has_occlusion_texture: u32,
    pub has_normal_texture: u32,
    pub has_emissive_texture: u32,
    pub has_metallic_roughness_texture: u32,
    pub _pad: [u32; 3],
}

impl Default for ModelData {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Vec4::ONE)
    }
}

impl ModelData {
    /// Record with no textures bound.
    pub fn new(model: Mat4, base_color_factor: Vec4) -> Self {
        Self {
            model,
            model_inverse_transpose: model.inverse().transpose(),
            base_color_factor,
            has_base_color_texture: 0,
            has_occlusion_texture: 0,
            has_normal_texture: 0,
            has_emissive_texture: 0,
            has_metallic_roughness_texture: 0,
            _pad: [0; 3],
        }
    }
}

// ── shadow pass ───────────────────────────────────────────────────────────

/// Per-frame data of the shadow pass (light camera).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, Pod, Zeroable)]
pub struct FrameDataShadow {
    pub view: Mat4,
    pub projection: Mat4,
}

impl FrameDataShadow {
    /// Orthographic light camera looking at `target` from `light_position`.
    pub fn directional(light_position: Vec3, target: Vec3, half_extent: f32, depth: f32) -> Self {
        Self {
            view: Mat4::look_at_rh(light_position, target, Vec3::Y),
            projection: Mat4::orthographic_rh(
                -half_extent,
                half_extent,
                -half_extent,
                half_extent,
                0.1,
                depth,
            ),
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Per-draw data of the shadow pass.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, Pod, Zeroable)]
pub struct ModelDataShadow {
    pub model: Mat4,
}
