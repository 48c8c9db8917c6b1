//! Scene description: transform hierarchy and renderables.

mod graph;
mod renderable;

pub use graph::{NodeId, SceneGraph};
pub use renderable::{Material, Renderable};
