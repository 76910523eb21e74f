/// Alpha written by opaque dab cores and connector fills.
pub const OPAQUE_ALPHA: u8 = 255;

/// Width of the anti-aliased ring around a point dab, in pixels.
pub const AA_BAND_WIDTH: f32 = 1.0;

/// Smallest arc-length interval between brush connector stamps, in pixels.
pub const MIN_DISPERSION_STEP: f32 = 1.0;

/// Smallest accepted surface half-extent or axis length.
pub const GEOMETRY_EPSILON: f32 = 1e-6;
