//! Lumen engine crate.
//!
//! This crate owns the GPU resource layer used by render passes: device
//! textures, dynamic uniform arenas, and the asset-keyed resource pool.

pub mod assets;
pub mod device;
pub mod error;
pub mod logging;
pub mod pool;
pub mod render;
pub mod scene;
pub mod texture;
pub mod uniforms;

pub use error::ResourceError;
