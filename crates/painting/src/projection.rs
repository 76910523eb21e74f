//! Surface projection: 3D contact points to 2D canvas pixels.
//!
//! A surface is described by its center, normal, up vector and half-extents.
//! Points are dropped orthogonally onto the surface plane and then placed on
//! the canvas by their distance from the center and their signed angle from
//! the up vector (a polar reinterpretation, not an orthographic unwrap).
//! Points behind the center along `-up` fold towards the same edge no matter
//! which side they sit on, which suits disk-like surfaces and slightly
//! distorts rectangular ones.

use glam::{UVec2, Vec2, Vec3};

use crate::constants::GEOMETRY_EPSILON;
use crate::validation::{CanvasError, validate_extents};

/// Orientation and bounds of a physical drawing surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceFrame {
    /// World-space center of the surface
    pub center: Vec3,
    /// Surface normal (need not be normalized)
    pub normal: Vec3,
    /// Direction that maps to increasing canvas y
    pub up: Vec3,
    /// Half of the physical width and height
    pub half_extents: Vec2,
}

impl SurfaceFrame {
    pub fn new(center: Vec3, normal: Vec3, up: Vec3, half_extents: Vec2) -> Self {
        Self {
            center,
            normal,
            up,
            half_extents,
        }
    }

    /// Full physical width and height
    #[inline]
    pub fn physical_size(&self) -> Vec2 {
        self.half_extents * 2.0
    }

    /// Reject geometry that would divide by zero during projection, and an
    /// `up` with no component in the surface plane (every angle would be 90°)
    pub fn validate(&self) -> Result<(), CanvasError> {
        validate_extents(self.half_extents)?;
        let usable = |v: Vec3| v.is_finite() && v.length_squared() > GEOMETRY_EPSILON;
        if !usable(self.normal) {
            return Err(CanvasError::DegenerateAxis("normal"));
        }
        if !usable(self.up) {
            return Err(CanvasError::DegenerateAxis("up"));
        }
        let in_plane = self.normal.normalize().cross(self.up.normalize());
        if in_plane.length_squared() < GEOMETRY_EPSILON {
            return Err(CanvasError::DegenerateAxis("up"));
        }
        Ok(())
    }

    /// Project a world-space point to a pixel of a `buffer_size` canvas
    ///
    /// Never fails: points beyond the surface saturate to the border pixel,
    /// so the result is always inside `[0, width) x [0, height)`.
    pub fn project(&self, point: Vec3, buffer_size: UVec2) -> UVec2 {
        let normal = self.normal.normalize_or_zero();
        let closest = point - normal * normal.dot(point - self.center);
        let relative = closest - self.center;
        let distance = relative.length();

        let angle = signed_angle(self.up, relative, normal);
        let local = Vec2::new(angle.sin(), angle.cos()) * distance;

        let fraction = ((local + self.half_extents) / self.physical_size())
            .clamp(Vec2::ZERO, Vec2::ONE);
        let pixel = (fraction * buffer_size.as_vec2()).round();

        UVec2::new(
            (pixel.x as u32).min(buffer_size.x.saturating_sub(1)),
            (pixel.y as u32).min(buffer_size.y.saturating_sub(1)),
        )
    }
}

/// Signed angle in radians from `from` to `to`, measured around `axis`
///
/// The magnitude is the unsigned angle between the vectors (0..=PI); the sign
/// follows `axis . (from x to)`. Zero-length inputs yield 0.
pub fn signed_angle(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    let denominator = (from.length_squared() * to.length_squared()).sqrt();
    if denominator < 1e-15 {
        return 0.0;
    }
    let cos = (from.dot(to) / denominator).clamp(-1.0, 1.0);
    let unsigned = cos.acos();
    if axis.dot(from.cross(to)) < 0.0 {
        -unsigned
    } else {
        unsigned
    }
}
