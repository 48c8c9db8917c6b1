/// Initialization parameters for the headless GPU context.
///
/// No surface is created; the adapter is chosen for compute and offscreen
/// work only.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Backends wgpu may pick from.
    pub backends: wgpu::Backends,

    pub power_preference: wgpu::PowerPreference,

    /// Use a software adapter (useful on CI machines without a GPU).
    pub force_fallback_adapter: bool,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}
