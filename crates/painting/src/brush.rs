//! Brush alpha masks for stamped dabs
//!
//! A brush is an immutable grid of alpha bytes. The rasterizer resamples it
//! (nearest neighbour) to the dab size, so a single mask serves every radius.

use image::RgbaImage;
use tracing::debug;

use crate::validation::CanvasError;

/// Immutable alpha mask sampled by the brush paint strategy
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    width: u32,
    height: u32,
    /// Alpha texels in row-major order
    alpha: Vec<u8>,
}

impl Brush {
    /// Create a brush from raw alpha texels
    pub fn new(width: u32, height: u32, alpha: Vec<u8>) -> Result<Self, CanvasError> {
        if width == 0 || height == 0 {
            return Err(CanvasError::ZeroSize { width, height });
        }
        let expected = (width as usize) * (height as usize);
        if alpha.len() != expected {
            return Err(CanvasError::BrushMaskLength {
                expected,
                actual: alpha.len(),
            });
        }
        Ok(Self {
            width,
            height,
            alpha,
        })
    }

    /// Create a brush from the alpha channel of an image
    pub fn from_image(image: &RgbaImage) -> Result<Self, CanvasError> {
        let (width, height) = image.dimensions();
        let alpha = image.pixels().map(|p| p.0[3]).collect();
        let brush = Self::new(width, height, alpha)?;
        debug!("Brush::from_image: loaded {}x{} mask", width, height);
        Ok(brush)
    }

    /// Generate a round brush of the given diameter
    ///
    /// `hardness` ranges from 0.0 (linear falloff to the rim) to 1.0 (hard
    /// edge).
    pub fn round(diameter: u32, hardness: f32) -> Self {
        let diameter = diameter.max(1);
        let radius = diameter as f32 / 2.0;
        let hardness = hardness.clamp(0.0, 1.0);

        let mut alpha = Vec::with_capacity((diameter * diameter) as usize);
        for y in 0..diameter {
            for x in 0..diameter {
                let dx = (x as f32 + 0.5) - radius;
                let dy = (y as f32 + 0.5) - radius;
                let distance_normalized = (dx * dx + dy * dy).sqrt() / radius;
                let value = if distance_normalized > 1.0 {
                    0.0
                } else {
                    calculate_hardness_falloff(distance_normalized, hardness)
                };
                alpha.push((value * 255.0).round() as u8);
            }
        }

        Self {
            width: diameter,
            height: diameter,
            alpha,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Alpha at a texel, None outside the mask
    #[inline]
    pub fn alpha(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.alpha[(y as usize) * (self.width as usize) + (x as usize)])
    }

    /// Nearest-neighbour sample of the mask stretched over a `side` x `side`
    /// square, at square-local coordinates `(u, v)`
    #[inline]
    pub fn sample_scaled(&self, u: u32, v: u32, side: u32) -> Option<u8> {
        if side == 0 {
            return None;
        }
        let sx = (u as u64 * self.width as u64 / side as u64) as u32;
        let sy = (v as u64 * self.height as u64 / side as u64) as u32;
        self.alpha(sx, sy)
    }
}

/// Calculate falloff based on hardness
/// distance_normalized is 0 at center, 1 at edge
/// hardness is 0.0 (soft) to 1.0 (hard)
#[inline]
pub fn calculate_hardness_falloff(distance_normalized: f32, hardness: f32) -> f32 {
    if hardness >= 1.0 {
        if distance_normalized <= 1.0 { 1.0 } else { 0.0 }
    } else {
        let t = distance_normalized.clamp(0.0, 1.0);
        let soft = 1.0 - t;
        soft * (1.0 - hardness) + hardness
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brush_mask_length_checked() {
        assert!(matches!(
            Brush::new(2, 2, vec![0; 3]),
            Err(CanvasError::BrushMaskLength { expected: 4, actual: 3 })
        ));
        assert!(Brush::new(0, 2, vec![]).is_err());
        assert!(Brush::new(2, 2, vec![255; 4]).is_ok());
    }

    #[test]
    fn test_round_brush_shape() {
        let brush = Brush::round(9, 1.0);
        assert_eq!(brush.width(), 9);
        assert_eq!(brush.alpha(4, 4), Some(255));
        assert_eq!(brush.alpha(0, 0), Some(0));
        assert_eq!(brush.alpha(9, 0), None);
    }

    #[test]
    fn test_soft_brush_fades() {
        let brush = Brush::round(21, 0.0);
        let center = brush.alpha(10, 10).unwrap();
        let near_rim = brush.alpha(10, 1).unwrap();
        assert!(center > near_rim);
    }

    #[test]
    fn test_sample_scaled_nearest() {
        // 2x1 mask: left opaque, right transparent
        let brush = Brush::new(2, 1, vec![255, 0]).unwrap();
        assert_eq!(brush.sample_scaled(0, 0, 4), Some(255));
        assert_eq!(brush.sample_scaled(1, 3, 4), Some(255));
        assert_eq!(brush.sample_scaled(2, 0, 4), Some(0));
        assert_eq!(brush.sample_scaled(4, 0, 4), None);
        assert_eq!(brush.sample_scaled(0, 0, 0), None);
    }

    #[test]
    fn test_from_image_uses_alpha() {
        let mut mask = RgbaImage::new(2, 2);
        mask.put_pixel(1, 0, image::Rgba([0, 0, 0, 77]));
        let brush = Brush::from_image(&mask).unwrap();
        assert_eq!(brush.alpha(1, 0), Some(77));
        assert_eq!(brush.alpha(0, 0), Some(0));
    }

    #[test]
    fn test_hardness_falloff() {
        assert_eq!(calculate_hardness_falloff(0.5, 1.0), 1.0);
        assert_eq!(calculate_hardness_falloff(0.0, 0.0), 1.0);
        assert_eq!(calculate_hardness_falloff(0.5, 0.0), 0.5);
        assert_eq!(calculate_hardness_falloff(1.0, 0.0), 0.0);

        let mid = calculate_hardness_falloff(0.5, 0.5);
        assert!(mid > 0.5 && mid < 1.0);
    }
}
