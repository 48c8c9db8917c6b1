use glam::{Mat4, Vec4};

use super::NodeId;
use crate::assets::{Cubemap, Image, Mesh};
use crate::uniforms::{ModelData, ModelDataShadow};

/// Surface description of a renderable.
#[derive(Debug, Clone)]
pub struct Material {
    pub base_color: Vec4,
    pub roughness: f32,
    pub metallic: f32,
    pub casts_shadow: bool,

    pub base_color_texture: Option<Image>,
    pub metallic_roughness: Option<Image>,
    pub emissive: Option<Image>,
    pub normal_map: Option<Image>,
    pub occlusion: Option<Image>,

    pub reflection_map: Option<Cubemap>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: Vec4::new(0.0, 0.5, 0.6, 1.0),
            roughness: 0.6,
            metallic: 1.0,
            casts_shadow: true,
            base_color_texture: None,
            metallic_roughness: None,
            emissive: None,
            normal_map: None,
            occlusion: None,
            reflection_map: None,
        }
    }
}

impl Material {
    /// Colour-pass record for an instance at `world`.
    pub fn model_data(&self, world: Mat4) -> ModelData {
        let flag = |t: &Option<Image>| u32::from(t.is_some());
        ModelData {
            has_base_color_texture: flag(&self.base_color_texture),
            has_occlusion_texture: flag(&self.occlusion),
            has_normal_texture: flag(&self.normal_map),
            has_emissive_texture: flag(&self.emissive),
            has_metallic_roughness_texture: flag(&self.metallic_roughness),
            ..ModelData::new(world, self.base_color)
        }
    }

    /// Colour textures (sampled as sRGB).
    pub fn color_textures(&self) -> impl Iterator<Item = &Image> {
        [&self.base_color_texture, &self.emissive]
            .into_iter()
            .flatten()
    }

    /// Data textures (sampled as linear).
    pub fn data_textures(&self) -> impl Iterator<Item = &Image> {
        [&self.metallic_roughness, &self.normal_map, &self.occlusion]
            .into_iter()
            .flatten()
    }
}

/// A mesh instance placed at a scene node.
#[derive(Debug, Clone)]
pub struct Renderable {
    pub node: NodeId,
    pub mesh: Mesh,
    pub material: Material,
}

impl Renderable {
    pub fn new(node: NodeId, mesh: Mesh) -> Self {
        Self {
            node,
            mesh,
            material: Material::default(),
        }
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Colour-pass record; see [`Material::model_data`].
    pub fn model_data(&self, world: Mat4) -> ModelData {
        self.material.model_data(world)
    }

    /// Shadow-pass record.
    pub fn shadow_data(&self, world: Mat4) -> ModelDataShadow {
        ModelDataShadow { model: world }
    }
}
