//! CPU-side assets consumed by the resource pool.
//!
//! Images, cubemaps and meshes hold their data in shared storage and carry an
//! [`AssetId`] naming that storage. The id is the GPU cache key.

mod cubemap;
mod id;
mod image;
mod mesh;

pub use cubemap::{CubeFace, Cubemap};
pub use id::AssetId;
pub use image::{Image, PixelFormat};
pub use mesh::{Aabb, Mesh, Vertex};
