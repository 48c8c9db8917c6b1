/// Texel formats a [`DeviceTexture`](super::DeviceTexture) can hold.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Rg8Unorm,
    R8Unorm,
    Depth24Plus,
    Depth32Float,
}

impl TextureFormat {
    pub fn to_wgpu(self) -> wgpu::TextureFormat {
        match self {
            Self::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
            Self::Rgba8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            Self::Rg8Unorm => wgpu::TextureFormat::Rg8Unorm,
            Self::R8Unorm => wgpu::TextureFormat::R8Unorm,
            Self::Depth24Plus => wgpu::TextureFormat::Depth24Plus,
            Self::Depth32Float => wgpu::TextureFormat::Depth32Float,
        }
    }

    #[inline]
    pub fn is_depth(self) -> bool {
        matches!(self, Self::Depth24Plus | Self::Depth32Float)
    }

    /// Bytes per texel for CPU uploads, `None` for depth formats.
    pub fn bytes_per_pixel(self) -> Option<u32> {
        match self {
            Self::Rgba8Unorm | Self::Rgba8UnormSrgb => Some(4),
            Self::Rg8Unorm => Some(2),
            Self::R8Unorm => Some(1),
            Self::Depth24Plus | Self::Depth32Float => None,
        }
    }

    /// Single- and dual-channel formats hold lookup data, not colour, and get
    /// no mip chain.
    #[inline]
    pub fn is_data(self) -> bool {
        matches!(self, Self::Rg8Unorm | Self::R8Unorm)
    }
}

/// How a colour image is interpreted when sampled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum ColorSpace {
    #[default]
    Linear,
    Srgb,
}

impl ColorSpace {
    pub fn rgba_format(self) -> TextureFormat {
        match self {
            Self::Linear => TextureFormat::Rgba8Unorm,
            Self::Srgb => TextureFormat::Rgba8UnormSrgb,
        }
    }
}

/// Usage classes; each maps to a fixed set of wgpu usage flags.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureUsage {
    /// Render target only (depth buffers, MSAA targets).
    RenderAttachment,
    /// Bound for sampling; contents come from elsewhere.
    Sampled,
    /// Filled from the CPU, then sampled.
    CopyDstSampled,
    /// Rendered into, then sampled (shadow maps).
    RenderSampled,
}

impl TextureUsage {
    pub fn to_wgpu(self) -> wgpu::TextureUsages {
        match self {
            Self::RenderAttachment => wgpu::TextureUsages::RENDER_ATTACHMENT,
            Self::Sampled => wgpu::TextureUsages::TEXTURE_BINDING,
            Self::CopyDstSampled => {
                wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::TEXTURE_BINDING
            }
            Self::RenderSampled => {
                wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING
            }
        }
    }

    #[inline]
    pub fn is_render_attachment(self) -> bool {
        matches!(self, Self::RenderAttachment | Self::RenderSampled)
    }

    #[inline]
    pub fn allows_copy_dst(self) -> bool {
        matches!(self, Self::CopyDstSampled)
    }
}

/// Dimensionality of the texture resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureKind {
    D1,
    D2,
    /// Six-layer 2D array viewed as a cube.
    Cube,
}

impl TextureKind {
    pub fn dimension(self) -> wgpu::TextureDimension {
        match self {
            Self::D1 => wgpu::TextureDimension::D1,
            Self::D2 | Self::Cube => wgpu::TextureDimension::D2,
        }
    }

    pub fn view_dimension(self, layers: u32) -> wgpu::TextureViewDimension {
        match self {
            Self::D1 => wgpu::TextureViewDimension::D1,
            Self::D2 if layers > 1 => wgpu::TextureViewDimension::D2Array,
            Self::D2 => wgpu::TextureViewDimension::D2,
            Self::Cube => wgpu::TextureViewDimension::Cube,
        }
    }
}

/// Construction parameters of a [`DeviceTexture`](super::DeviceTexture).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureParams {
    pub label: &'static str,
    pub format: TextureFormat,
    pub usage: TextureUsage,
    pub kind: TextureKind,
    pub sample_count: u32,
    /// Upper bound on the mip chain length; values below 1 act as 1.
    pub max_mip_levels: u32,
}

impl TextureParams {
    /// Colour attachment, optionally multisampled.
    pub fn render_target(label: &'static str, format: TextureFormat, sample_count: u32) -> Self {
        Self {
            label,
            format,
            usage: TextureUsage::RenderAttachment,
            kind: TextureKind::D2,
            sample_count,
            max_mip_levels: 1,
        }
    }

    /// Depth buffer. `sampled` makes it readable afterwards (shadow maps).
    pub fn depth(label: &'static str, format: TextureFormat, sampled: bool) -> Self {
        Self {
            label,
            format,
            usage: if sampled {
                TextureUsage::RenderSampled
            } else {
                TextureUsage::RenderAttachment
            },
            kind: TextureKind::D2,
            sample_count: 1,
            max_mip_levels: 1,
        }
    }

    /// CPU-filled, sampled 2D texture.
    pub fn sampled(label: &'static str, color_space: ColorSpace, max_mip_levels: u32) -> Self {
        Self {
            label,
            format: color_space.rgba_format(),
            usage: TextureUsage::CopyDstSampled,
            kind: TextureKind::D2,
            sample_count: 1,
            max_mip_levels,
        }
    }

    /// CPU-filled cube texture.
    pub fn cube(label: &'static str, color_space: ColorSpace, max_mip_levels: u32) -> Self {
        Self {
            kind: TextureKind::Cube,
            ..Self::sampled(label, color_space, max_mip_levels)
        }
    }
}
