//! Device-resident textures.
//!
//! This module is responsible for:
//! - classifying texture formats, usages and dimensions
//! - allocating (and reallocating on resize) the device resource and its view
//! - uploading images and cubemaps together with a CPU-built mip chain

pub mod mips;
mod params;
#[allow(clippy::module_inception)]
mod texture;

pub use params::{ColorSpace, TextureFormat, TextureKind, TextureParams, TextureUsage};
pub use texture::DeviceTexture;
