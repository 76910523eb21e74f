//! Dab application for strokes

use glam::IVec2;
use tracing::debug;

use super::{clamp_radius, clip_range};
use crate::brush::Brush;
use crate::constants::AA_BAND_WIDTH;
use crate::surface::{CanvasBuffer, opaque};
use crate::types::{PixelRect, Rgba};

/// Squared distance for an integer column offset on a row with squared
/// vertical offset `dy2`
///
/// Both point strategies go through this helper so their comparisons agree
/// bit for bit.
#[inline]
fn distance_sq(dx: i32, dy2: f32) -> f32 {
    let dx = dx as f32;
    dx * dx + dy2
}

/// Largest `k >= 0` with `distance_sq(k, dy2) <= limit_sq`, None if even the
/// center column is outside
#[inline]
fn half_span(limit_sq: f32, dy2: f32) -> Option<i32> {
    if dy2 > limit_sq {
        return None;
    }
    let mut k = (limit_sq - dy2).sqrt().floor() as i32;
    while distance_sq(k + 1, dy2) <= limit_sq {
        k += 1;
    }
    while k > 0 && distance_sq(k, dy2) > limit_sq {
        k -= 1;
    }
    Some(k)
}

/// Paint an anti-aliased round dab by testing every pixel in its bounding box
///
/// Pixels within `radius` are replaced with the opaque color; pixels in the
/// one-pixel rim are blended with coverage `radius + 1 - d`.
pub fn paint_point(
    buffer: &mut CanvasBuffer,
    center: IVec2,
    radius: f32,
    color: Rgba,
) -> Option<PixelRect> {
    let radius = clamp_radius(buffer, radius);
    let reach = radius + AA_BAND_WIDTH;
    let extent = reach.ceil() as i32;
    let (x_min, x_max) = clip_range(
        center.x.saturating_sub(extent),
        center.x.saturating_add(extent),
        buffer.width,
    )?;
    let (y_min, y_max) = clip_range(
        center.y.saturating_sub(extent),
        center.y.saturating_add(extent),
        buffer.height,
    )?;

    let solid_sq = radius * radius;
    let reach_sq = reach * reach;
    let core = opaque(color);

    for py in y_min..=y_max {
        let dy = (py as i32 - center.y) as f32;
        let dy2 = dy * dy;
        for px in x_min..=x_max {
            let d2 = distance_sq(px as i32 - center.x, dy2);
            if d2 <= solid_sq {
                buffer.set_pixel(px, py, core);
            } else if d2 <= reach_sq {
                buffer.blend_pixel(px, py, color, reach - d2.sqrt());
            }
        }
    }

    Some(PixelRect::from_inclusive(x_min, y_min, x_max, y_max))
}

/// Paint the same dab as [`paint_point`] one scanline at a time
///
/// Each row solves its solid and rim half-spans from the row offset, fills
/// the solid span directly and only evaluates distances in the two rim
/// flanks.
pub fn paint_point_optimized(
    buffer: &mut CanvasBuffer,
    center: IVec2,
    radius: f32,
    color: Rgba,
) -> Option<PixelRect> {
    let radius = clamp_radius(buffer, radius);
    let reach = radius + AA_BAND_WIDTH;
    let extent = reach.ceil() as i32;
    let (y_min, y_max) = clip_range(
        center.y.saturating_sub(extent),
        center.y.saturating_add(extent),
        buffer.height,
    )?;
    // Reject dabs whose columns miss the buffer entirely
    clip_range(
        center.x.saturating_sub(extent),
        center.x.saturating_add(extent),
        buffer.width,
    )?;

    let solid_sq = radius * radius;
    let reach_sq = reach * reach;
    let core = opaque(color);
    let mut region: Option<PixelRect> = None;

    for py in y_min..=y_max {
        let dy = (py as i32 - center.y) as f32;
        let dy2 = dy * dy;
        let Some(reach_k) = half_span(reach_sq, dy2) else {
            continue;
        };
        let Some((row_min, row_max)) =
            clip_range(center.x - reach_k, center.x + reach_k, buffer.width)
        else {
            continue;
        };

        let blend_flank = |buffer: &mut CanvasBuffer, lo: i32, hi: i32| {
            if let Some((lo, hi)) = clip_range(lo, hi, buffer.width) {
                for px in lo..=hi {
                    let d = distance_sq(px as i32 - center.x, dy2).sqrt();
                    buffer.blend_pixel(px, py, color, reach - d);
                }
            }
        };

        match half_span(solid_sq, dy2) {
            Some(solid_k) => {
                if let Some((lo, hi)) =
                    clip_range(center.x - solid_k, center.x + solid_k, buffer.width)
                {
                    buffer.fill_span(py, lo, hi, core);
                }
                blend_flank(buffer, center.x - reach_k, center.x - solid_k - 1);
                blend_flank(buffer, center.x + solid_k + 1, center.x + reach_k);
            }
            None => blend_flank(buffer, center.x - reach_k, center.x + reach_k),
        }

        let row = PixelRect::from_inclusive(row_min, py, row_max, py);
        region = PixelRect::merge(region, Some(row));
    }

    region
}

/// Stamp `brush` stretched over a `2 * radius` square centred on `center`
///
/// Texel alpha is the blend coverage; transparent texels leave the buffer
/// untouched.
pub fn stamp_brush(
    buffer: &mut CanvasBuffer,
    brush: &Brush,
    center: IVec2,
    radius: f32,
    color: Rgba,
) -> Option<PixelRect> {
    let radius = clamp_radius(buffer, radius);
    let side = (radius * 2.0).round().max(1.0) as i32;
    let origin = center - IVec2::splat(side / 2);
    let (x_min, x_max) = clip_range(origin.x, origin.x + side - 1, buffer.width)?;
    let (y_min, y_max) = clip_range(origin.y, origin.y + side - 1, buffer.height)?;

    let mut stamped = 0usize;
    for py in y_min..=y_max {
        let v = (py as i32 - origin.y) as u32;
        for px in x_min..=x_max {
            let u = (px as i32 - origin.x) as u32;
            let Some(alpha) = brush.sample_scaled(u, v, side as u32) else {
                continue;
            };
            if alpha == 0 {
                continue;
            }
            buffer.blend_pixel(px, py, color, alpha as f32 / 255.0);
            stamped += 1;
        }
    }

    debug!(
        "stamp_brush: center=({}, {}), side={}, stamped {} texels",
        center.x, center.y, side, stamped
    );
    Some(PixelRect::from_inclusive(x_min, y_min, x_max, y_max))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAR: Rgba = [255, 255, 255, 0];
    const INK: Rgba = [3, 5, 26, 255];

    fn buffer(width: u32, height: u32) -> CanvasBuffer {
        CanvasBuffer::new(width, height, CLEAR).unwrap()
    }

    #[test]
    fn test_point_dab_center_and_far_pixel() {
        let mut surface = buffer(10, 10);
        let region = paint_point(&mut surface, IVec2::new(5, 5), 2.0, INK);

        assert!(region.is_some());
        assert_eq!(surface.get_pixel(5, 5), Some(INK));
        assert_eq!(surface.get_pixel(9, 9), Some(CLEAR));
    }

    #[test]
    fn test_point_dab_soft_rim() {
        let mut surface = buffer(10, 10);
        paint_point(&mut surface, IVec2::new(5, 5), 2.0, INK);

        // d = 2 is solid, d = sqrt(5) sits in the rim, d = 3 gets zero coverage
        assert_eq!(surface.get_pixel(7, 5), Some(INK));
        let rim = surface.get_pixel(7, 6).unwrap();
        assert!(rim[3] > 0 && rim[3] < 255);
        assert_eq!(surface.get_pixel(8, 5), Some(CLEAR));
    }

    #[test]
    fn test_point_alpha_monotonic() {
        let mut surface = buffer(16, 16);
        let centers = [
            IVec2::new(8, 8),
            IVec2::new(9, 8),
            IVec2::new(7, 10),
            IVec2::new(8, 8),
            IVec2::new(12, 3),
        ];
        let mut previous: Vec<u8> = surface.pixels().iter().map(|p| p[3]).collect();

        for (i, center) in centers.iter().enumerate() {
            paint_point(&mut surface, *center, 1.5 + i as f32 * 0.7, INK);
            let current: Vec<u8> = surface.pixels().iter().map(|p| p[3]).collect();
            for (before, after) in previous.iter().zip(&current) {
                assert!(after >= before);
            }
            previous = current;
        }
    }

    #[test]
    fn test_optimized_matches_point() {
        let radii = [0.0, 0.4, 1.0, 2.0, 2.5, 3.7, 5.0, 8.25];
        let centers = [
            IVec2::new(0, 0),
            IVec2::new(10, 7),
            IVec2::new(19, 14),
            IVec2::new(-3, 5),
            IVec2::new(22, 16),
        ];

        for radius in radii {
            for center in centers {
                let mut seeded = buffer(20, 15);
                // Seed with a partial stroke so blending has history
                paint_point(&mut seeded, IVec2::new(9, 6), 3.3, [200, 10, 10, 255]);
                let mut point = buffer(20, 15);
                point.apply_template(&seeded.snapshot().to_image().unwrap());
                let mut optimized = buffer(20, 15);
                optimized.apply_template(&seeded.snapshot().to_image().unwrap());

                paint_point(&mut point, center, radius, INK);
                paint_point_optimized(&mut optimized, center, radius, INK);

                assert_eq!(
                    point.pixels(),
                    optimized.pixels(),
                    "radius {radius}, center {center:?}"
                );
            }
        }
    }

    #[test]
    fn test_dab_outside_buffer() {
        let mut surface = buffer(10, 10);
        assert!(paint_point(&mut surface, IVec2::new(40, 40), 2.0, INK).is_none());
        assert!(paint_point_optimized(&mut surface, IVec2::new(40, 40), 2.0, INK).is_none());
        assert!(surface.pixels().iter().all(|p| *p == CLEAR));
    }

    #[test]
    fn test_dab_clipped_at_edge() {
        let mut surface = buffer(10, 10);
        let region = paint_point_optimized(&mut surface, IVec2::new(0, 0), 3.0, INK).unwrap();
        assert_eq!((region.x, region.y), (0, 0));
        assert_eq!(surface.get_pixel(0, 0), Some(INK));
        assert_eq!(surface.get_pixel(3, 0), Some(INK));
    }

    #[test]
    fn test_half_span() {
        assert_eq!(half_span(4.0, 0.0), Some(2));
        assert_eq!(half_span(4.0, 4.0), Some(0));
        assert_eq!(half_span(4.0, 9.0), None);
        assert_eq!(half_span(25.0, 9.0), Some(4));
    }

    #[test]
    fn test_brush_stamp() {
        let mut surface = buffer(12, 12);
        let brush = Brush::round(16, 1.0);
        let region = stamp_brush(&mut surface, &brush, IVec2::new(6, 6), 3.0, INK).unwrap();

        // 2 * radius square centred on the dab
        assert_eq!(region, PixelRect::new(3, 3, 6, 6));
        assert_eq!(surface.get_pixel(6, 6), Some(INK));
        // Corner texels of a round brush are transparent
        assert_eq!(surface.get_pixel(3, 3), Some(CLEAR));
        assert_eq!(surface.get_pixel(10, 6), Some(CLEAR));
    }

    #[test]
    fn test_brush_stamp_partial_alpha_accumulates() {
        let mut surface = buffer(4, 4);
        let brush = Brush::new(1, 1, vec![64]).unwrap();

        stamp_brush(&mut surface, &brush, IVec2::new(2, 2), 1.0, INK);
        let first = surface.get_pixel(2, 2).unwrap()[3];
        stamp_brush(&mut surface, &brush, IVec2::new(2, 2), 1.0, INK);
        let second = surface.get_pixel(2, 2).unwrap()[3];

        assert!(first > 0 && first < 255);
        assert!(second > first);
    }
}
