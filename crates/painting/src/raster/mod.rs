//! Dab and connector rasterization
//!
//! Every strategy draws the same conceptual stroke: a filled circular dab
//! with a soft one-pixel rim, optionally joined to the previous dab by a
//! segment of the same radius. The strategy is chosen once per configuration
//! and then used for every dab.

mod connectors;
mod dab_application;

use std::sync::Arc;

use glam::IVec2;
use inkseal_config::PaintMethod;
use tracing::debug;

use crate::brush::Brush;
use crate::surface::CanvasBuffer;
use crate::types::{PixelRect, Rgba};
use crate::validation::CanvasError;

pub use connectors::{connect_brush, connect_thick_line};
pub use dab_application::{paint_point, paint_point_optimized, stamp_brush};

/// How dabs and connectors are written into a canvas buffer
#[derive(Debug, Clone)]
pub enum PaintStrategy {
    /// Per-pixel distance test
    Point,
    /// Scanline spans solved per row; same output as `Point`
    OptimizedPoint,
    /// Stamped alpha mask; connectors stamp every `spacing * radius` pixels
    Brush { brush: Arc<Brush>, spacing: f32 },
}

impl PaintStrategy {
    /// Resolve a configured paint method into a strategy
    pub fn from_method(
        method: PaintMethod,
        brush: Option<Arc<Brush>>,
        spacing: f32,
    ) -> Result<Self, CanvasError> {
        let strategy = match method {
            PaintMethod::Point => PaintStrategy::Point,
            PaintMethod::OptimizedPoint => PaintStrategy::OptimizedPoint,
            PaintMethod::Brush => PaintStrategy::Brush {
                brush: brush.ok_or(CanvasError::MissingBrush)?,
                spacing,
            },
        };
        debug!("PaintStrategy::from_method: {:?}", method);
        Ok(strategy)
    }

    pub fn method(&self) -> PaintMethod {
        match self {
            PaintStrategy::Point => PaintMethod::Point,
            PaintStrategy::OptimizedPoint => PaintMethod::OptimizedPoint,
            PaintStrategy::Brush { .. } => PaintMethod::Brush,
        }
    }

    /// Paint one dab centred on `center`
    /// Returns the affected region, or None if nothing landed on the buffer
    pub fn stamp_dab(
        &self,
        buffer: &mut CanvasBuffer,
        center: IVec2,
        radius: f32,
        color: Rgba,
    ) -> Option<PixelRect> {
        match self {
            PaintStrategy::Point => paint_point(buffer, center, radius, color),
            PaintStrategy::OptimizedPoint => paint_point_optimized(buffer, center, radius, color),
            PaintStrategy::Brush { brush, .. } => stamp_brush(buffer, brush, center, radius, color),
        }
    }

    /// Fill the gap between two consecutive dabs
    /// Zero-length segments are a no-op
    pub fn connect(
        &self,
        buffer: &mut CanvasBuffer,
        from: IVec2,
        to: IVec2,
        radius: f32,
        color: Rgba,
    ) -> Option<PixelRect> {
        if from == to {
            return None;
        }
        match self {
            PaintStrategy::Point | PaintStrategy::OptimizedPoint => {
                connect_thick_line(buffer, from, to, radius, color)
            }
            PaintStrategy::Brush { brush, spacing } => {
                connect_brush(buffer, brush, from, to, radius, *spacing, color)
            }
        }
    }
}

/// Radii beyond the buffer diagonal cover the same pixels as the diagonal
/// itself; capping them keeps the integer span math in range.
pub(crate) fn clamp_radius(buffer: &CanvasBuffer, radius: f32) -> f32 {
    if radius.is_nan() {
        return 0.0;
    }
    radius.clamp(0.0, buffer.diagonal() + 2.0)
}

/// Clip an inclusive integer range to `0..len`
#[inline]
pub(crate) fn clip_range(lo: i32, hi: i32, len: u32) -> Option<(u32, u32)> {
    let lo = lo.max(0);
    let hi = hi.min(len as i32 - 1);
    if lo > hi {
        return None;
    }
    Some((lo as u32, hi as u32))
}
