//! Inkseal spell system - grading drawings against reference patterns
//!
//! - [`map`] - Per-pixel categories of a reference pattern and value images
//! - [`classifier`] - Grading a canvas snapshot against a map
//! - [`scan`] - Checking a drawing against an ordered list of spells
//! - [`distance_field`] - Offline value map generation from stencils
//! - [`spellbook`] - Spell definitions, collections and learned spells

pub mod classifier;
pub mod distance_field;
pub mod error;
pub mod map;
pub mod scan;
pub mod spellbook;

pub use classifier::*;
pub use distance_field::*;
pub use error::*;
pub use map::*;
pub use scan::*;
pub use spellbook::*;
