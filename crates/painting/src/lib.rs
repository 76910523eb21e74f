//! Inkseal painting system - projection, rasterization and canvas buffers
//!
//! This crate provides the drawing half of Inkseal:
//! - [`projection`] - Map 3D contact points onto a surface's pixel grid
//! - [`surface`] - RGBA8 canvas buffer with dirty tracking and snapshots
//! - [`brush`] - Immutable alpha masks for stamped dabs
//! - [`raster`] - Dab and connector rasterization strategies
//! - [`pipeline`] - Per-surface canvas tying the pieces together
//! - [`validation`] - Surface geometry checks and buffer sizing

pub mod brush;
pub mod constants;
pub mod pipeline;
pub mod projection;
pub mod raster;
pub mod surface;
pub mod types;
pub mod validation;

pub use brush::*;
pub use constants::*;
pub use pipeline::*;
pub use projection::*;
pub use raster::*;
pub use surface::*;
pub use types::*;
pub use validation::*;
