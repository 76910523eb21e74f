use glam::{UVec2, Vec2};
use inkseal_config::ConfigError;
use thiserror::Error;

use crate::constants::GEOMETRY_EPSILON;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Resolution target must be positive")]
    ZeroResolution,
    #[error("Degenerate surface extents: {width} x {height}")]
    DegenerateExtents { width: f32, height: f32 },
    #[error("Degenerate surface {0} vector")]
    DegenerateAxis(&'static str),
    #[error("Canvas size must be positive, got {width} x {height}")]
    ZeroSize { width: u32, height: u32 },
    #[error("Brush paint method selected but no brush was provided")]
    MissingBrush,
    #[error("Brush mask has {actual} texels, expected {expected}")]
    BrushMaskLength { expected: usize, actual: usize },
    #[error("Invalid canvas configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Check that surface half-extents describe a usable, non-degenerate rectangle
pub fn validate_extents(half_extents: Vec2) -> Result<(), CanvasError> {
    let usable = |v: f32| v.is_finite() && v > GEOMETRY_EPSILON;
    if !usable(half_extents.x) || !usable(half_extents.y) {
        return Err(CanvasError::DegenerateExtents {
            width: half_extents.x * 2.0,
            height: half_extents.y * 2.0,
        });
    }
    Ok(())
}

/// Compute buffer dimensions for a physical surface size
///
/// The longer physical side receives `resolution` pixels and the other side
/// is scaled to preserve the aspect ratio (never below one pixel).
pub fn buffer_dimensions(physical_size: Vec2, resolution: u32) -> Result<UVec2, CanvasError> {
    if resolution == 0 {
        return Err(CanvasError::ZeroResolution);
    }
    validate_extents(physical_size * 0.5)?;

    let res = resolution as f32;
    let dims = if physical_size.x >= physical_size.y {
        let height = (res * physical_size.y / physical_size.x).round() as u32;
        UVec2::new(resolution, height.max(1))
    } else {
        let width = (res * physical_size.x / physical_size.y).round() as u32;
        UVec2::new(width.max(1), resolution)
    };
    Ok(dims)
}

/// Pixels per surface unit for a buffer covering `physical_width` units
pub fn pixel_density(buffer_width: u32, physical_width: f32) -> f32 {
    buffer_width as f32 / physical_width
}
