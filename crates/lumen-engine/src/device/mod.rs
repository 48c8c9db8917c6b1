//! GPU device management.
//!
//! This module is responsible for:
//! - the [`RenderDevice`] seam used by textures, arenas and the pool
//! - creating the headless wgpu Instance/Adapter/Device/Queue
//! - RAII wrappers that release device resources on drop

mod api;
mod context;
mod init;
mod owned;

#[cfg(test)]
pub(crate) mod mock;

pub use api::{DeviceLimits, RenderDevice, TexelRegion};
pub use context::Gpu;
pub use init::GpuInit;
pub use owned::{OwnedBuffer, OwnedTexture};
