use std::sync::Arc;

use glam::Vec2;
use rand::Rng;

use super::AssetId;
use crate::error::ResourceError;

/// Channel layout of an [`Image`], 8 bits per channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    R8,
    Rg8,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    #[inline]
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::R8 => 1,
            Self::Rg8 => 2,
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// CPU-side image with shared pixel storage.
///
/// Cloning shares both the buffer and the [`AssetId`]. Mutation goes through
/// copy-on-write: a shared buffer is copied first and the copy gets a new id,
/// so other holders (and any GPU cache keyed by the old id) are unaffected.
#[derive(Debug, Clone)]
pub struct Image {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Arc<Vec<u8>>,
    id: AssetId,
}

impl Image {
    /// Wraps tightly packed rows of `format` pixels.
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: Vec<u8>,
    ) -> Result<Self, ResourceError> {
        let expected = width as usize * height as usize * format.bytes_per_pixel() as usize;
        if pixels.len() != expected {
            return Err(ResourceError::unsupported(format!(
                "{width}x{height} {format:?} image needs {expected} bytes, got {}",
                pixels.len()
            )));
        }

        Ok(Self {
            width,
            height,
            format,
            pixels: Arc::new(pixels),
            id: AssetId::next(),
        })
    }

    /// All-zero image.
    pub fn zeroed(width: u32, height: u32, format: PixelFormat) -> Self {
        let len = width as usize * height as usize * format.bytes_per_pixel() as usize;
        Self {
            width,
            height,
            format,
            pixels: Arc::new(vec![0; len]),
            id: AssetId::next(),
        }
    }

    /// Single-colour RGBA image.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            format: PixelFormat::Rgba8,
            pixels: Arc::new(pixels),
            id: AssetId::next(),
        }
    }

    /// RGBA checkerboard of `size`x`size` pixels with square cells of `cell` pixels.
    pub fn checker(size: u32, cell: u32, a: [u8; 4], b: [u8; 4]) -> Self {
        let cell = cell.max(1);
        let mut pixels = Vec::with_capacity(size as usize * size as usize * 4);
        for y in 0..size {
            for x in 0..size {
                let even = ((x / cell) + (y / cell)) % 2 == 0;
                pixels.extend_from_slice(if even { &a } else { &b });
            }
        }
        Self {
            width: size,
            height: size,
            format: PixelFormat::Rgba8,
            pixels: Arc::new(pixels),
            id: AssetId::next(),
        }
    }

    /// Blue-noise sample table.
    ///
    /// Runs Bridson's Poisson-disc sampler over a `width`x`height` domain with
    /// at least `min_distance` between samples. The result is an `Rg8` image,
    /// one pixel per sample and one row high. Each pixel holds the sample
    /// coordinate scaled to `0..=255` per axis.
    ///
    /// A distance larger than the domain diagonal yields a single sample. A
    /// distance so small that the acceleration grid would exceed 2^22 cells is
    /// rejected.
    pub fn poisson_disc<R: Rng + ?Sized>(
        width: u32,
        height: u32,
        min_distance: f32,
        rng: &mut R,
    ) -> Result<Self, ResourceError> {
        if width == 0 || height == 0 || !min_distance.is_finite() || min_distance <= 0.0 {
            return Err(ResourceError::unsupported(format!(
                "poisson disc needs a non-empty domain and positive distance \
                 ({width}x{height}, distance {min_distance})"
            )));
        }

        let size = Vec2::new(width as f32, height as f32);
        let min_distance = min_distance.min(size.length());
        let (grid_w, grid_h) = poisson_grid(size, min_distance);
        if (grid_w as u64).saturating_mul(grid_h as u64) > POISSON_MAX_CELLS {
            return Err(ResourceError::unsupported(format!(
                "poisson disc distance {min_distance} is too small for {width}x{height} \
                 ({grid_w}x{grid_h} grid cells)"
            )));
        }
        let points = poisson_points(size, min_distance, POISSON_ATTEMPTS, rng);

        let mut pixels = Vec::with_capacity(points.len() * 2);
        for p in &points {
            let n = *p / size;
            pixels.push((n.x * 255.0) as u8);
            pixels.push((n.y * 255.0) as u8);
        }

        Self::new(points.len() as u32, 1, PixelFormat::Rg8, pixels)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn bytes_per_pixel(&self) -> u32 {
        self.format.bytes_per_pixel()
    }

    #[inline]
    pub fn id(&self) -> AssetId {
        self.id
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if both images share the same pixel storage.
    pub fn shares_storage(&self, other: &Image) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }

    /// Mutable pixel access, copying the buffer first if it is shared.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        let before = Arc::as_ptr(&self.pixels);
        let pixels = Arc::make_mut(&mut self.pixels);
        if !std::ptr::eq(before, &*pixels) {
            self.id = AssetId::next();
        }
        pixels
    }

    /// Writes one pixel. `value` must hold exactly one pixel of this image's format.
    ///
    /// # Panics
    /// Panics if `(x, y)` is outside the image.
    pub fn set_pixel(&mut self, x: u32, y: u32, value: &[u8]) -> Result<(), ResourceError> {
        let bpp = self.bytes_per_pixel() as usize;
        if value.len() != bpp {
            return Err(ResourceError::unsupported(format!(
                "{:?} pixel takes {bpp} bytes, got {}",
                self.format,
                value.len()
            )));
        }
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");

        let start = (y as usize * self.width as usize + x as usize) * bpp;
        self.pixels_mut()[start..start + bpp].copy_from_slice(value);
        Ok(())
    }

    /// Expands to four channels.
    ///
    /// `R` becomes `(r, r, r, 255)`, `RG` becomes `(r, g, 0, 255)`, and `RGB`
    /// becomes `(r, g, b, 255)`. An `Rgba8` image is returned as a clone
    /// (same storage, same id).
    pub fn to_rgba(&self) -> Image {
        let expand: fn(&[u8]) -> [u8; 4] = match self.format {
            PixelFormat::Rgba8 => return self.clone(),
            PixelFormat::R8 => |p: &[u8]| [p[0], p[0], p[0], 255],
            PixelFormat::Rg8 => |p: &[u8]| [p[0], p[1], 0, 255],
            PixelFormat::Rgb8 => |p: &[u8]| [p[0], p[1], p[2], 255],
        };

        let bpp = self.bytes_per_pixel() as usize;
        let mut pixels = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for px in self.pixels.chunks_exact(bpp) {
            pixels.extend_from_slice(&expand(px));
        }

        Self {
            width: self.width,
            height: self.height,
            format: PixelFormat::Rgba8,
            pixels: Arc::new(pixels),
            id: AssetId::next(),
        }
    }
}

const POISSON_ATTEMPTS: usize = 30;
const POISSON_MAX_CELLS: u64 = 1 << 22;

/// Acceleration grid dimensions. Cells have a diagonal of `min_distance`.
fn poisson_grid(size: Vec2, min_distance: f32) -> (usize, usize) {
    let cell = min_distance / std::f32::consts::SQRT_2;
    let cells = |extent: f32| ((extent / cell).ceil() as usize).max(1);
    (cells(size.x), cells(size.y))
}

fn poisson_points<R: Rng + ?Sized>(
    size: Vec2,
    min_distance: f32,
    attempts: usize,
    rng: &mut R,
) -> Vec<Vec2> {
    let cell = min_distance / std::f32::consts::SQRT_2;
    let (grid_w, grid_h) = poisson_grid(size, min_distance);
    let cell_of = |p: Vec2| {
        (
            ((p.x / cell) as usize).min(grid_w - 1),
            ((p.y / cell) as usize).min(grid_h - 1),
        )
    };

    let mut grid: Vec<Option<usize>> = vec![None; grid_w * grid_h];
    let mut points = Vec::new();
    let mut active = Vec::new();

    let first = Vec2::new(rng.random_range(0.0..size.x), rng.random_range(0.0..size.y));
    let (gx, gy) = cell_of(first);
    grid[gy * grid_w + gx] = Some(0);
    points.push(first);
    active.push(0);

    while !active.is_empty() {
        let slot = rng.random_range(0..active.len());
        let center = points[active[slot]];
        let mut accepted = false;

        for _ in 0..attempts {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let radius = rng.random_range(min_distance..2.0 * min_distance);
            let candidate = center + Vec2::from_angle(angle) * radius;

            if candidate.x < 0.0 || candidate.y < 0.0 || candidate.x >= size.x || candidate.y >= size.y {
                continue;
            }

            let (cx, cy) = cell_of(candidate);
            // A cell diagonal is `min_distance`, so conflicts lie within two cells.
            let too_close = (cy.saturating_sub(2)..(cy + 3).min(grid_h)).any(|y| {
                (cx.saturating_sub(2)..(cx + 3).min(grid_w)).any(|x| {
                    grid[y * grid_w + x]
                        .is_some_and(|i| points[i].distance(candidate) < min_distance)
                })
            });
            if too_close {
                continue;
            }

            grid[cy * grid_w + cx] = Some(points.len());
            active.push(points.len());
            points.push(candidate);
            accepted = true;
            break;
        }

        if !accepted {
            active.swap_remove(slot);
        }
    }

    points
}
