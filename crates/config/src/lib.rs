//! Shared configuration for Inkseal
//!
//! This crate is the single source of truth for canvas setup, classifier
//! thresholds and the offline spell map generator settings. Every struct
//! derives serde so a host can load the whole set from one JSON document.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Default buffer resolution along the longer physical side, in pixels
pub const DEFAULT_RESOLUTION: u32 = 1000;

/// Default clear color: white, fully transparent
pub const DEFAULT_CLEAR_COLOR: [u8; 4] = [255, 255, 255, 0];

/// Default brush dispersion step as a fraction of the dab radius
pub const DEFAULT_BRUSH_SPACING: f32 = 0.25;

/// Default fraction of mandatory pixels that must be painted
pub const DEFAULT_MIN_REQUIRED_RATIO: f32 = 0.9;

/// Default fraction of forbidden pixels that may be painted
pub const DEFAULT_MAX_FORBIDDEN_RATIO: f32 = 0.01;

/// Default balance floor below which a drawing is graded bad
pub const DEFAULT_MIN_BONUS_RATIO: f32 = 0.4;

/// Default balance above which a drawing is graded great
pub const DEFAULT_IDEAL_BONUS_RATIO: f32 = 0.75;

/// Default distance (pixels) beyond which empty stencil pixels are forbidden
pub const DEFAULT_RED_MIN_DISTANCE: u32 = 55;

/// Default distance (pixels) within which empty stencil pixels earn a bonus
pub const DEFAULT_GREEN_MAX_DISTANCE: u32 = 10;

/// Default fraction of the deepest stroke interior that counts as required
pub const DEFAULT_BLUE_THRESHOLD: f32 = 0.4;

/// Default half-width of the distance field search window
pub const DEFAULT_INFLUENCE_SIZE: u32 = 55;

/// Default alpha fraction separating filled from empty stencil pixels
pub const DEFAULT_ALPHA_THRESHOLD: f32 = 0.1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Rasterization method used to stamp dabs onto the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaintMethod {
    /// Per-pixel distance test over the bounding box
    Point,
    /// Scanline evaluation with direct span solving
    #[default]
    OptimizedPoint,
    /// Stamped alpha mask
    Brush,
}

/// Canvas creation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Pixels along the longer physical side of the surface
    pub resolution: u32,
    /// Color written by `clear`; alpha is expected to be 0
    pub clear_color: [u8; 4],
    /// How dabs are rasterized
    pub paint_method: PaintMethod,
    /// Fill the gap between consecutive dabs of a stroke
    pub connect_dots: bool,
    /// Brush connector stamp interval as a fraction of the radius
    pub brush_spacing: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            clear_color: DEFAULT_CLEAR_COLOR,
            paint_method: PaintMethod::default(),
            connect_dots: true,
            brush_spacing: DEFAULT_BRUSH_SPACING,
        }
    }
}

impl CanvasConfig {
    /// Create a canvas config with the given resolution and paint method
    pub fn new(resolution: u32, paint_method: PaintMethod) -> Self {
        Self {
            resolution,
            paint_method,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution == 0 {
            return Err(ConfigError::Invalid {
                field: "canvas.resolution",
                reason: "must be positive".to_string(),
            });
        }
        if !(self.brush_spacing.is_finite() && self.brush_spacing > 0.0) {
            return Err(ConfigError::Invalid {
                field: "canvas.brush_spacing",
                reason: format!("must be a positive number, got {}", self.brush_spacing),
            });
        }
        Ok(())
    }
}

/// Grading thresholds for pattern classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Painted fraction of required pixels needed to qualify
    pub min_required_ratio: f32,
    /// Painted fraction of forbidden pixels tolerated before disqualifying
    pub max_forbidden_ratio: f32,
    /// Pass floor for the bonus balance
    pub min_bonus_ratio: f32,
    /// Balance above which the result is great
    pub ideal_bonus_ratio: f32,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            min_required_ratio: DEFAULT_MIN_REQUIRED_RATIO,
            max_forbidden_ratio: DEFAULT_MAX_FORBIDDEN_RATIO,
            min_bonus_ratio: DEFAULT_MIN_BONUS_RATIO,
            ideal_bonus_ratio: DEFAULT_IDEAL_BONUS_RATIO,
        }
    }
}

impl ClassifierThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("classifier.min_required_ratio", self.min_required_ratio),
            ("classifier.max_forbidden_ratio", self.max_forbidden_ratio),
            ("classifier.min_bonus_ratio", self.min_bonus_ratio),
            ("classifier.ideal_bonus_ratio", self.ideal_bonus_ratio),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be finite, got {value}"),
                });
            }
        }
        if self.ideal_bonus_ratio < self.min_bonus_ratio {
            return Err(ConfigError::Invalid {
                field: "classifier.ideal_bonus_ratio",
                reason: format!(
                    "{} is below min_bonus_ratio {}",
                    self.ideal_bonus_ratio, self.min_bonus_ratio
                ),
            });
        }
        Ok(())
    }
}

/// Settings for the offline spell map generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellMapSettings {
    pub red_min_distance: u32,
    pub green_max_distance: u32,
    pub blue_threshold: f32,
    /// Half-width of the square search window
    pub influence_size: u32,
    /// Alpha fraction (0-1) above which a stencil pixel is filled
    pub alpha_threshold: f32,
}

impl Default for SpellMapSettings {
    fn default() -> Self {
        Self {
            red_min_distance: DEFAULT_RED_MIN_DISTANCE,
            green_max_distance: DEFAULT_GREEN_MAX_DISTANCE,
            blue_threshold: DEFAULT_BLUE_THRESHOLD,
            influence_size: DEFAULT_INFLUENCE_SIZE,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
        }
    }
}

impl SpellMapSettings {
    /// Alpha byte at or below which a stencil pixel counts as empty
    pub fn min_alpha(&self) -> u8 {
        (u8::MAX as f32 * self.alpha_threshold.clamp(0.0, 1.0)) as u8
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.influence_size == 0 {
            return Err(ConfigError::Invalid {
                field: "spell_map.influence_size",
                reason: "must be positive".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.blue_threshold) {
            return Err(ConfigError::Invalid {
                field: "spell_map.blue_threshold",
                reason: format!("must be within 0..=1, got {}", self.blue_threshold),
            });
        }
        if !(0.0..=1.0).contains(&self.alpha_threshold) {
            return Err(ConfigError::Invalid {
                field: "spell_map.alpha_threshold",
                reason: format!("must be within 0..=1, got {}", self.alpha_threshold),
            });
        }
        Ok(())
    }
}

/// Complete configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InksealConfig {
    pub canvas: CanvasConfig,
    pub classifier: ClassifierThresholds,
    pub spell_map: SpellMapSettings,
}

impl InksealConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.canvas.validate()?;
        self.classifier.validate()?;
        self.spell_map.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InksealConfig::default();
        assert_eq!(config.canvas.resolution, DEFAULT_RESOLUTION);
        assert_eq!(config.canvas.clear_color[3], 0);
        assert!(config.canvas.connect_dots);
        assert_eq!(config.classifier.min_required_ratio, DEFAULT_MIN_REQUIRED_RATIO);
        assert_eq!(config.spell_map.influence_size, DEFAULT_INFLUENCE_SIZE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = InksealConfig::from_json_str(
            r#"{ "canvas": { "resolution": 512, "paint_method": "brush" } }"#,
        )
        .unwrap();
        assert_eq!(config.canvas.resolution, 512);
        assert_eq!(config.canvas.paint_method, PaintMethod::Brush);
        assert_eq!(config.canvas.brush_spacing, DEFAULT_BRUSH_SPACING);
        assert_eq!(config.classifier, ClassifierThresholds::default());
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let result = InksealConfig::from_json_str(r#"{ "canvas": { "resolution": 0 } }"#);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "canvas.resolution", .. })
        ));
    }

    #[test]
    fn test_inverted_bonus_thresholds_rejected() {
        let thresholds = ClassifierThresholds {
            min_bonus_ratio: 0.8,
            ideal_bonus_ratio: 0.2,
            ..Default::default()
        };
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        let result = InksealConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_min_alpha() {
        let settings = SpellMapSettings::default();
        assert_eq!(settings.min_alpha(), 25);
    }
}
