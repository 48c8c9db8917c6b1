use std::borrow::Cow;

use log::debug;

use super::mips::{build_mip_chain, full_mip_count};
use super::{TextureFormat, TextureKind, TextureParams};
use crate::assets::{Cubemap, Image, PixelFormat};
use crate::device::{OwnedTexture, RenderDevice, TexelRegion};
use crate::error::ResourceError;

/// A single device-resident image: 1D, 2D (optionally layered) or cube.
///
/// Created empty with a 1x1x1 extent and no device memory. The resource is
/// allocated by [`set_size`](Self::set_size) or by an upload, and reallocated
/// whenever the extent or effective format changes. Reallocation destroys the
/// previous resource first, so views fetched before it are stale.
pub struct DeviceTexture<'d, D: RenderDevice> {
    device: &'d D,
    params: TextureParams,
    /// Format of the current resource. Differs from `params.format` after a
    /// single- or dual-channel data upload.
    format: TextureFormat,
    extent: wgpu::Extent3d,
    mip_level_count: u32,
    resource: Option<OwnedTexture<'d, D>>,
}

impl<'d, D: RenderDevice> DeviceTexture<'d, D> {
    pub fn new(device: &'d D, params: TextureParams) -> Self {
        Self {
            device,
            format: params.format,
            params,
            extent: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            resource: None,
        }
    }

    #[inline]
    pub fn params(&self) -> &TextureParams {
        &self.params
    }

    #[inline]
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    #[inline]
    pub fn extent(&self) -> wgpu::Extent3d {
        self.extent
    }

    #[inline]
    pub fn mip_level_count(&self) -> u32 {
        self.mip_level_count
    }

    /// Device texture, `None` until a size has been set.
    #[inline]
    pub fn raw(&self) -> Option<&D::Texture> {
        self.resource.as_ref().map(OwnedTexture::texture)
    }

    /// View for binding.
    pub fn view(&self) -> Result<&D::TextureView, ResourceError> {
        self.resource
            .as_ref()
            .map(OwnedTexture::view)
            .ok_or(ResourceError::UninitializedResource {
                label: self.params.label,
            })
    }

    /// Resizes to `width`x`height`. Cube textures keep six layers, all other
    /// kinds get one.
    pub fn set_size(&mut self, width: u32, height: u32) -> Result<bool, ResourceError> {
        let layers = match self.params.kind {
            TextureKind::Cube => 6,
            TextureKind::D1 | TextureKind::D2 => 1,
        };
        self.set_size_layers(width, height, layers)
    }

    /// Resizes to `width`x`height` with `layers` array layers.
    ///
    /// Returns `Ok(false)` if nothing changed. Otherwise the old resource is
    /// destroyed, a new one is allocated, and `Ok(true)` is returned. Cube
    /// textures must be square with exactly six layers.
    pub fn set_size_layers(
        &mut self,
        width: u32,
        height: u32,
        layers: u32,
    ) -> Result<bool, ResourceError> {
        if self.params.kind == TextureKind::Cube
            && (layers != 6 || width.max(1) != height.max(1))
        {
            return Err(ResourceError::InvalidUsage {
                label: self.params.label,
                reason: format!(
                    "cube texture needs six square layers, got {width}x{height}x{layers}"
                ),
            });
        }
        self.reallocate(width, height, layers, self.format)
    }

    /// Uploads `image` with its mip chain.
    ///
    /// `Rgba8` and `Rgb8` images use the texture's colour format and a full
    /// chain. `Rg8` and `R8` images are lookup data and upload as
    /// `Rg8Unorm`/`R8Unorm` with one level. Cube textures take
    /// [`set_cubemap`](Self::set_cubemap) instead, and 1D textures only accept
    /// single-row images.
    pub fn set_image(&mut self, image: &Image) -> Result<(), ResourceError> {
        self.check_uploadable()?;
        if image.is_empty() {
            return Err(ResourceError::unsupported(format!(
                "texture '{}': cannot upload an empty image",
                self.params.label
            )));
        }
        match self.params.kind {
            TextureKind::Cube => {
                return Err(ResourceError::InvalidUsage {
                    label: self.params.label,
                    reason: "cube texture takes a cubemap, not a single image".to_owned(),
                });
            }
            TextureKind::D1 if image.height() != 1 => {
                return Err(ResourceError::InvalidUsage {
                    label: self.params.label,
                    reason: format!(
                        "1D texture needs a single-row image, got {}x{}",
                        image.width(),
                        image.height()
                    ),
                });
            }
            TextureKind::D1 | TextureKind::D2 => {}
        }

        let (format, source) = match image.format() {
            PixelFormat::Rgba8 => (self.color_format(), Cow::Borrowed(image)),
            PixelFormat::Rgb8 => (self.color_format(), Cow::Owned(image.to_rgba())),
            PixelFormat::Rg8 => (TextureFormat::Rg8Unorm, Cow::Borrowed(image)),
            PixelFormat::R8 => (TextureFormat::R8Unorm, Cow::Borrowed(image)),
        };

        self.reallocate(source.width(), source.height(), 1, format)?;
        self.upload_layer(0, &source)?;
        debug!(
            "texture '{}': uploaded {}x{} {:?} image {} ({} levels)",
            self.params.label,
            source.width(),
            source.height(),
            image.format(),
            image.id(),
            self.mip_level_count
        );
        Ok(())
    }

    /// Uploads six faces as the layers of a cube, each with its own mip chain.
    pub fn set_cubemap(&mut self, cubemap: &Cubemap) -> Result<(), ResourceError> {
        if self.params.kind != TextureKind::Cube {
            return Err(ResourceError::InvalidUsage {
                label: self.params.label,
                reason: format!("{:?} texture cannot hold a cubemap", self.params.kind),
            });
        }
        self.check_uploadable()?;
        cubemap.validate()?;

        let (width, height) = cubemap.face_size();
        self.reallocate(width, height, 6, self.color_format())?;
        for (layer, face) in cubemap.faces().iter().enumerate() {
            self.upload_layer(layer as u32, &face.to_rgba())?;
        }
        debug!(
            "texture '{}': uploaded cubemap {} ({width}x{height}, {} levels)",
            self.params.label,
            cubemap.id(),
            self.mip_level_count
        );
        Ok(())
    }

    fn color_format(&self) -> TextureFormat {
        match self.params.format {
            f @ (TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb) => f,
            _ => TextureFormat::Rgba8Unorm,
        }
    }

    fn check_uploadable(&self) -> Result<(), ResourceError> {
        if self.params.format.is_depth() {
            return Err(ResourceError::unsupported(format!(
                "texture '{}': {:?} cannot be filled from the CPU",
                self.params.label, self.params.format
            )));
        }
        if !self.params.usage.allows_copy_dst() {
            return Err(ResourceError::InvalidUsage {
                label: self.params.label,
                reason: format!("{:?} usage has no copy destination", self.params.usage),
            });
        }
        Ok(())
    }

    fn mip_count_for(&self, width: u32, height: u32, format: TextureFormat) -> u32 {
        let single = self.params.usage.is_render_attachment()
            || self.params.sample_count > 1
            || self.params.kind == TextureKind::D1
            || format.is_data();
        if single {
            1
        } else {
            full_mip_count(width, height).min(self.params.max_mip_levels.max(1))
        }
    }

    fn reallocate(
        &mut self,
        width: u32,
        height: u32,
        layers: u32,
        format: TextureFormat,
    ) -> Result<bool, ResourceError> {
        let (width, height, layers) = match self.params.kind {
            TextureKind::D1 => (width.max(1), 1, 1),
            TextureKind::D2 | TextureKind::Cube => (width.max(1), height.max(1), layers.max(1)),
        };
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: layers,
        };
        let mip_level_count = self.mip_count_for(width, height, format);

        if self.resource.is_some()
            && self.extent == extent
            && self.format == format
            && self.mip_level_count == mip_level_count
        {
            return Ok(false);
        }

        // Destroy before allocating; a failed allocation leaves no resource.
        self.resource = None;

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(self.params.label),
            size: extent,
            mip_level_count,
            sample_count: self.params.sample_count.max(1),
            dimension: self.params.kind.dimension(),
            format: format.to_wgpu(),
            usage: self.params.usage.to_wgpu(),
            view_formats: &[],
        })?;
        let view = self.device.create_texture_view(
            &texture,
            &wgpu::TextureViewDescriptor {
                label: Some(self.params.label),
                dimension: Some(self.params.kind.view_dimension(layers)),
                ..Default::default()
            },
        );

        self.resource = Some(OwnedTexture::new(self.device, texture, view));
        self.extent = extent;
        self.format = format;
        self.mip_level_count = mip_level_count;

        debug!(
            "texture '{}': allocated {width}x{height}x{layers} {format:?}, {mip_level_count} levels",
            self.params.label
        );
        Ok(true)
    }

    fn upload_layer(&self, layer: u32, image: &Image) -> Result<(), ResourceError> {
        let bpp = self
            .format
            .bytes_per_pixel()
            .ok_or_else(|| ResourceError::unsupported(format!("{:?} upload", self.format)))?;
        debug_assert_eq!(bpp, image.bytes_per_pixel());

        let texture = self
            .raw()
            .ok_or(ResourceError::UninitializedResource {
                label: self.params.label,
            })?;

        let chain = build_mip_chain(
            image.pixels(),
            image.width(),
            image.height(),
            bpp,
            self.mip_level_count,
        );
        for (mip_level, level) in chain.iter().enumerate() {
            let region = TexelRegion {
                mip_level: mip_level as u32,
                layer,
                width: level.width,
                height: level.height,
                bytes_per_pixel: bpp,
            };
            self.device.write_texture(texture, region, &level.data);
        }
        Ok(())
    }
}
