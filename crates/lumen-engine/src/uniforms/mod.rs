//! Dynamic uniform arenas and the record types written into them.

mod arena;
mod data;

pub use arena::{Uniforms, uniform_stride};
pub use data::{FrameData, FrameDataShadow, ModelData, ModelDataShadow};
