//! Per-pass uniform preparation.
//!
//! A pass owns its uniform arenas and turns a list of renderables into
//! prepared draws. Pipelines and bind groups are built by the caller.

mod pass;

pub use pass::{
    ColorPassUniforms, PassUniforms, PreparedDraw, ShadowPassUniforms, prepare_material,
};
