use inkseal_config::ConfigError;
use thiserror::Error;

use crate::map::Category;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Classification map has no {0:?} pixels")]
    EmptyCategory(Category),
    #[error("Canvas is {canvas_width}x{canvas_height} but the map is {map_width}x{map_height}")]
    DimensionMismatch {
        canvas_width: u32,
        canvas_height: u32,
        map_width: u32,
        map_height: u32,
    },
    #[error("Map has {actual} cells, expected {expected}")]
    MapLength { expected: usize, actual: usize },
    #[error("Image size must be positive, got {width} x {height}")]
    ZeroSize { width: u32, height: u32 },
    #[error("Invalid settings: {0}")]
    Config(#[from] ConfigError),
}
