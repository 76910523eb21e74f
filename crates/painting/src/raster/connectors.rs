//! Connectors between consecutive dabs of a stroke

use glam::{IVec2, Vec2};
use tracing::debug;

use super::dab_application::stamp_brush;
use super::{clamp_radius, clip_range};
use crate::brush::Brush;
use crate::constants::MIN_DISPERSION_STEP;
use crate::surface::{CanvasBuffer, opaque};
use crate::types::{PixelRect, Rgba};

/// Fill the inclusive float rectangle, snapped inwards to whole pixels
fn fill_rect(
    buffer: &mut CanvasBuffer,
    x_lo: f32,
    x_hi: f32,
    y_lo: f32,
    y_hi: f32,
    color: Rgba,
) -> Option<PixelRect> {
    let (x_min, x_max) = clip_range(x_lo.ceil() as i32, x_hi.floor() as i32, buffer.width)?;
    let (y_min, y_max) = clip_range(y_lo.ceil() as i32, y_hi.floor() as i32, buffer.height)?;
    for py in y_min..=y_max {
        buffer.fill_span(py, x_min, x_max, color);
    }
    Some(PixelRect::from_inclusive(x_min, y_min, x_max, y_max))
}

/// Fill a thick segment of half-width `radius` between two dab centers
///
/// Axis-aligned segments are plain rectangles. Diagonal segments are filled
/// row by row between the two long edges (offset by `radius` along the
/// normal) and the two end caps. The fill is opaque; unlike dabs it has no
/// soft rim.
pub fn connect_thick_line(
    buffer: &mut CanvasBuffer,
    from: IVec2,
    to: IVec2,
    radius: f32,
    color: Rgba,
) -> Option<PixelRect> {
    if from == to {
        return None;
    }
    let radius = clamp_radius(buffer, radius);
    let core = opaque(color);
    let start = from.as_vec2();
    let end = to.as_vec2();

    if from.x == to.x {
        return fill_rect(
            buffer,
            start.x - radius,
            start.x + radius,
            start.y.min(end.y),
            start.y.max(end.y),
            core,
        );
    }
    if from.y == to.y {
        return fill_rect(
            buffer,
            start.x.min(end.x),
            start.x.max(end.x),
            start.y - radius,
            start.y + radius,
            core,
        );
    }

    let dir = (end - start).normalize();
    let normal = dir.perp();
    let offset = normal * radius;
    let corners = [start + offset, end + offset, end - offset, start - offset];
    let y_lo = corners.iter().map(|c| c.y).fold(f32::INFINITY, f32::min);
    let y_hi = corners.iter().map(|c| c.y).fold(f32::NEG_INFINITY, f32::max);
    let (row_min, row_max) = clip_range(y_lo.ceil() as i32, y_hi.floor() as i32, buffer.height)?;

    // x where the line through `p` along `d` crosses row `y`; neither
    // direction is horizontal for a diagonal segment
    let cross_x = |p: Vec2, d: Vec2, y: f32| p.x + (y - p.y) * d.x / d.y;

    let mut region = None;
    for py in row_min..=row_max {
        let y = py as f32;
        let edge_a = cross_x(start + offset, dir, y);
        let edge_b = cross_x(start - offset, dir, y);
        let cap_a = cross_x(start, normal, y);
        let cap_b = cross_x(end, normal, y);

        // min/max pick the left and right bound for either slope sign
        let lo = edge_a.min(edge_b).max(cap_a.min(cap_b));
        let hi = edge_a.max(edge_b).min(cap_a.max(cap_b));
        if lo > hi {
            continue;
        }
        let Some((x_min, x_max)) = clip_range(lo.ceil() as i32, hi.floor() as i32, buffer.width)
        else {
            continue;
        };
        buffer.fill_span(py, x_min, x_max, core);
        region = PixelRect::merge(region, Some(PixelRect::from_inclusive(x_min, py, x_max, py)));
    }

    region
}

/// Stamp brush copies every `spacing * radius` pixels of arc length between
/// two dab centers (endpoints excluded, they carry their own dabs)
///
/// Stepping runs along whichever axis has the larger extent, so vertical,
/// horizontal and sloped segments all advance by a well-conditioned amount.
pub fn connect_brush(
    buffer: &mut CanvasBuffer,
    brush: &Brush,
    from: IVec2,
    to: IVec2,
    radius: f32,
    spacing: f32,
    color: Rgba,
) -> Option<PixelRect> {
    if from == to {
        return None;
    }
    let radius = clamp_radius(buffer, radius);
    let delta = (to - from).as_vec2();
    let length = delta.length();
    let step = (radius * spacing).max(MIN_DISPERSION_STEP);

    let x_major = delta.x.abs() >= delta.y.abs();
    let (major, minor) = if x_major {
        (delta.x, delta.y)
    } else {
        (delta.y, delta.x)
    };
    let slope = minor / major;
    let axis_step = step * major.abs() / length;

    let origin = from.as_vec2();
    let mut region = None;
    let mut stamps = 0usize;
    let mut travelled = axis_step;
    while travelled < major.abs() {
        let m = travelled * major.signum();
        let offset = if x_major {
            Vec2::new(m, m * slope)
        } else {
            Vec2::new(m * slope, m)
        };
        let center = (origin + offset).round().as_ivec2();
        region = PixelRect::merge(region, stamp_brush(buffer, brush, center, radius, color));
        stamps += 1;
        travelled += axis_step;
    }

    debug!(
        "connect_brush: ({}, {}) -> ({}, {}), step={:.2}, {} stamps",
        from.x, from.y, to.x, to.y, step, stamps
    );
    region
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAR: Rgba = [255, 255, 255, 0];
    const INK: Rgba = [3, 5, 26, 255];

    fn buffer(width: u32, height: u32) -> CanvasBuffer {
        CanvasBuffer::new(width, height, CLEAR).unwrap()
    }

    fn only_clear_or_ink(surface: &CanvasBuffer) -> bool {
        surface.pixels().iter().all(|p| *p == CLEAR || *p == INK)
    }

    #[test]
    fn test_horizontal_connector() {
        let mut surface = buffer(12, 12);
        let region = connect_thick_line(&mut surface, IVec2::new(2, 5), IVec2::new(8, 5), 1.0, INK);

        assert_eq!(region, Some(PixelRect::new(2, 4, 7, 3)));
        assert_eq!(surface.get_pixel(5, 4), Some(INK));
        assert_eq!(surface.get_pixel(5, 6), Some(INK));
        assert_eq!(surface.get_pixel(5, 7), Some(CLEAR));
        assert_eq!(surface.get_pixel(1, 5), Some(CLEAR));
    }

    #[test]
    fn test_vertical_connector() {
        let mut surface = buffer(12, 12);
        connect_thick_line(&mut surface, IVec2::new(6, 9), IVec2::new(6, 1), 2.0, INK);

        assert_eq!(surface.get_pixel(4, 5), Some(INK));
        assert_eq!(surface.get_pixel(8, 1), Some(INK));
        assert_eq!(surface.get_pixel(9, 5), Some(CLEAR));
        assert_eq!(surface.get_pixel(6, 10), Some(CLEAR));
    }

    #[test]
    fn test_diagonal_connector() {
        let mut surface = buffer(16, 16);
        connect_thick_line(&mut surface, IVec2::new(2, 2), IVec2::new(12, 12), 1.5, INK);

        assert_eq!(surface.get_pixel(7, 7), Some(INK));
        // Perpendicular distance sqrt(2) is inside, 3/sqrt(2) is not
        assert_eq!(surface.get_pixel(7, 9), Some(INK));
        assert_eq!(surface.get_pixel(7, 10), Some(CLEAR));
        // Past the end cap
        assert_eq!(surface.get_pixel(14, 14), Some(CLEAR));
        assert!(only_clear_or_ink(&surface));
    }

    #[test]
    fn test_diagonal_connector_negative_slope() {
        let mut surface = buffer(16, 16);
        connect_thick_line(&mut surface, IVec2::new(12, 2), IVec2::new(2, 12), 1.5, INK);

        assert_eq!(surface.get_pixel(7, 7), Some(INK));
        assert_eq!(surface.get_pixel(5, 7), Some(INK));
        assert_eq!(surface.get_pixel(4, 7), Some(CLEAR));
        assert!(only_clear_or_ink(&surface));
    }

    #[test]
    fn test_connector_clipped_to_buffer() {
        let mut surface = buffer(8, 8);
        let region = connect_thick_line(&mut surface, IVec2::new(-20, -5), IVec2::new(30, 4), 3.0, INK);
        let region = region.unwrap();
        assert!(region.x + region.width <= 8 && region.y + region.height <= 8);
    }

    #[test]
    fn test_brush_connector_horizontal() {
        let mut surface = buffer(20, 20);
        let brush = Brush::round(8, 1.0);
        connect_brush(&mut surface, &brush, IVec2::new(2, 10), IVec2::new(18, 10), 2.0, 0.5, INK);

        for x in 2..=17 {
            assert_eq!(surface.get_pixel(x, 10).unwrap()[3], 255, "column {x}");
        }
        assert_eq!(surface.get_pixel(0, 0), Some(CLEAR));
    }

    #[test]
    fn test_brush_connector_vertical_and_sloped() {
        let brush = Brush::round(8, 1.0);

        let mut surface = buffer(20, 20);
        connect_brush(&mut surface, &brush, IVec2::new(5, 2), IVec2::new(5, 16), 2.0, 0.5, INK);
        assert_eq!(surface.get_pixel(5, 9).unwrap()[3], 255);

        let mut surface = buffer(20, 20);
        connect_brush(&mut surface, &brush, IVec2::new(2, 3), IVec2::new(17, 8), 2.0, 0.5, INK);
        // Midpoint of the segment
        assert_eq!(surface.get_pixel(10, 6).unwrap()[3], 255);
    }

    #[test]
    fn test_brush_connector_zero_length() {
        let mut surface = buffer(6, 6);
        let brush = Brush::round(4, 1.0);
        assert!(connect_brush(&mut surface, &brush, IVec2::ONE, IVec2::ONE, 2.0, 0.5, INK).is_none());
    }
}
