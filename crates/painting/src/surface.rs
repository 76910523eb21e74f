//! CPU canvas buffer for painting - RGBA8 storage

use image::RgbaImage;
use tracing::debug;

use crate::constants::OPAQUE_ALPHA;
use crate::types::{PixelRect, Rgba};
use crate::validation::CanvasError;

/// Opaque version of a paint color (dab cores and connectors)
#[inline]
pub fn opaque(color: Rgba) -> Rgba {
    [color[0], color[1], color[2], OPAQUE_ALPHA]
}

/// Blend `color` onto `dst` with the given coverage (0-1)
///
/// Color channels are interpolated towards `color`; alpha is accumulated
/// (`dst.a + coverage`, saturating) so it never decreases.
#[inline]
pub fn blend_additive(dst: Rgba, color: Rgba, coverage: f32) -> Rgba {
    let t = coverage.clamp(0.0, 1.0);
    let lerp = |from: u8, to: u8| (from as f32 + (to as f32 - from as f32) * t).round() as u8;
    let alpha = (dst[3] as f32 / 255.0 + t).min(1.0);
    [
        lerp(dst[0], color[0]),
        lerp(dst[1], color[1]),
        lerp(dst[2], color[2]),
        (alpha * 255.0).round() as u8,
    ]
}

/// An RGBA8 CPU canvas
///
/// `pixels.len() == width * height` always holds; the buffer is recreated
/// rather than resized when the surface changes.
pub struct CanvasBuffer {
    pub width: u32,
    pub height: u32,
    /// Pixel data in row-major order
    pixels: Vec<Rgba>,
    clear_color: Rgba,
    /// Region touched since the last `take_dirty_region`
    dirty: Option<PixelRect>,
}

impl CanvasBuffer {
    /// Create a new buffer filled with `clear_color`
    pub fn new(width: u32, height: u32, clear_color: Rgba) -> Result<Self, CanvasError> {
        if width == 0 || height == 0 {
            return Err(CanvasError::ZeroSize { width, height });
        }
        let pixel_count = (width as usize) * (height as usize);
        Ok(Self {
            width,
            height,
            pixels: vec![clear_color; pixel_count],
            clear_color,
            dirty: None,
        })
    }

    #[inline]
    pub fn clear_color(&self) -> Rgba {
        self.clear_color
    }

    /// Reset every pixel to the clear color
    pub fn clear(&mut self) {
        self.pixels.fill(self.clear_color);
        self.mark_all_dirty();
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Get a pixel at the given coordinates
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.index(x, y)])
    }

    /// Set a pixel at the given coordinates
    /// Does nothing if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Blend a color onto an existing pixel with additive alpha
    #[inline]
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba, coverage: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = self.index(x, y);
        self.pixels[index] = blend_additive(self.pixels[index], color, coverage);
    }

    /// Opaque-fill the inclusive span `x_start..=x_end` on row `y`
    /// The span is clamped to the buffer
    pub fn fill_span(&mut self, y: u32, x_start: u32, x_end: u32, color: Rgba) {
        if y >= self.height || x_start >= self.width || x_start > x_end {
            return;
        }
        let x_end = x_end.min(self.width - 1);
        let start = self.index(x_start, y);
        let end = self.index(x_end, y);
        self.pixels[start..=end].fill(color);
    }

    /// Copy every non-transparent pixel of `overlay` onto the buffer
    ///
    /// The overlay is resampled (nearest neighbour) when its size differs
    /// from the buffer.
    pub fn apply_template(&mut self, overlay: &RgbaImage) {
        let (ow, oh) = overlay.dimensions();
        if ow == 0 || oh == 0 {
            debug!("apply_template: empty overlay, ignoring");
            return;
        }

        let mut copied = 0usize;
        for y in 0..self.height {
            let sy = ((y as u64 * oh as u64) / self.height as u64) as u32;
            for x in 0..self.width {
                let sx = ((x as u64 * ow as u64) / self.width as u64) as u32;
                let texel = overlay.get_pixel(sx, sy).0;
                if texel[3] > 0 {
                    let index = self.index(x, y);
                    self.pixels[index] = texel;
                    copied += 1;
                }
            }
        }

        if copied > 0 {
            self.mark_all_dirty();
        }
        debug!("apply_template: copied {} pixels from {}x{} overlay", copied, ow, oh);
    }

    /// Record a modified region
    pub fn mark_dirty(&mut self, region: PixelRect) {
        self.dirty = PixelRect::merge(self.dirty, Some(region));
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty = Some(self.bounds());
    }

    /// Take the region modified since the last call
    pub fn take_dirty_region(&mut self) -> Option<PixelRect> {
        self.dirty.take()
    }

    #[inline]
    pub fn has_dirty_region(&self) -> bool {
        self.dirty.is_some()
    }

    /// Whole-buffer rectangle
    #[inline]
    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width, self.height)
    }

    /// Length of the buffer diagonal in pixels
    #[inline]
    pub fn diagonal(&self) -> f32 {
        (self.width as f32).hypot(self.height as f32)
    }

    /// Get raw pixel data for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Read-only copy for classification
    pub fn snapshot(&self) -> CanvasSnapshot {
        CanvasSnapshot {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }
}

/// Immutable copy of a canvas, safe to classify while painting continues
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasSnapshot {
    pub width: u32,
    pub height: u32,
    pixels: Vec<Rgba>,
}

impl CanvasSnapshot {
    /// Build a snapshot from raw pixels
    /// Returns None if the pixel count does not match the dimensions
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> Option<Self> {
        if pixels.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_image(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: image.pixels().map(|p| p.0).collect(),
        }
    }

    pub fn to_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.as_bytes().to_vec())
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y as usize) * (self.width as usize) + (x as usize)])
    }
}
