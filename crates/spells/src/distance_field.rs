//! Value map generation from stencil artwork
//!
//! The generator runs a windowed, approximate distance transform: every
//! filled pixel scans a square window for its nearest empty pixel, and every
//! empty pixel it visits keeps the negated squared distance to the closest
//! filled pixel that reached it. Pixels never reached by any window keep the
//! image diagonal as their distance. The signed field is then cut into
//! categories:
//! - deep inside the artwork: required
//! - near either side of the outline: bonus
//! - far outside the artwork: forbidden
//! - everything in between: neutral
//!
//! Cost is `O(filled pixels * window area)`, meant for offline use.

use std::time::Instant;

use image::RgbaImage;
use inkseal_config::SpellMapSettings;
use tracing::{debug, info};

use crate::error::ClassifyError;
use crate::map::{Category, ClassificationMap};

/// Filled/empty mask derived from a stencil image's alpha channel
#[derive(Debug, Clone, PartialEq)]
pub struct Stencil {
    width: u32,
    height: u32,
    filled: Vec<bool>,
}

impl Stencil {
    pub fn new(width: u32, height: u32, filled: Vec<bool>) -> Result<Self, ClassifyError> {
        if width == 0 || height == 0 {
            return Err(ClassifyError::ZeroSize { width, height });
        }
        let expected = (width as usize) * (height as usize);
        if filled.len() != expected {
            return Err(ClassifyError::MapLength {
                expected,
                actual: filled.len(),
            });
        }
        Ok(Self {
            width,
            height,
            filled,
        })
    }

    /// Pixels with alpha above `min_alpha` are filled
    pub fn from_image(image: &RgbaImage, min_alpha: u8) -> Result<Self, ClassifyError> {
        let (width, height) = image.dimensions();
        let filled = image.pixels().map(|p| p.0[3] > min_alpha).collect();
        Self::new(width, height, filled)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn is_filled(&self, x: u32, y: u32) -> bool {
        x < self.width
            && y < self.height
            && self.filled[(y as usize) * (self.width as usize) + (x as usize)]
    }

    pub fn filled_count(&self) -> usize {
        self.filled.iter().filter(|f| **f).count()
    }
}

/// Signed squared distances produced by [`DistanceFieldGenerator::compute_field`]
///
/// Positive values are filled pixels (distance to the nearest empty pixel in
/// the window), negative values are empty pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceField {
    pub width: u32,
    pub height: u32,
    pub values: Vec<i64>,
    /// Largest value among filled pixels
    pub farthest: i64,
}

#[derive(Debug, Clone, Default)]
pub struct DistanceFieldGenerator {
    settings: SpellMapSettings,
}

impl DistanceFieldGenerator {
    pub fn new(settings: SpellMapSettings) -> Result<Self, ClassifyError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    #[inline]
    pub fn settings(&self) -> &SpellMapSettings {
        &self.settings
    }

    pub fn compute_field(&self, stencil: &Stencil) -> DistanceField {
        let width = stencil.width as i64;
        let height = stencil.height as i64;
        let max_dist = width * width + height * height;
        let influence = self.settings.influence_size as i64;

        let mut values: Vec<i64> = stencil
            .filled
            .iter()
            .map(|&filled| if filled { 0 } else { -max_dist })
            .collect();
        let mut farthest = 0i64;

        for y in 0..height {
            let y_start = (y - influence).max(0);
            let y_end = (y + influence).min(height - 1);
            for x in 0..width {
                let index = (y * width + x) as usize;
                if !stencil.filled[index] {
                    continue;
                }
                let x_start = (x - influence).max(0);
                let x_end = (x + influence).min(width - 1);

                let mut closest_empty = max_dist;
                for y2 in y_start..=y_end {
                    let dy = y2 - y;
                    let dy2 = dy * dy;
                    let row = y2 * width;
                    for x2 in x_start..=x_end {
                        let neighbour = (row + x2) as usize;
                        if stencil.filled[neighbour] {
                            continue;
                        }
                        let dx = x2 - x;
                        let dist = dx * dx + dy2;
                        closest_empty = closest_empty.min(dist);
                        values[neighbour] = values[neighbour].max(-dist);
                    }
                }

                farthest = farthest.max(closest_empty);
                values[index] = closest_empty;
            }
        }

        DistanceField {
            width: stencil.width,
            height: stencil.height,
            values,
            farthest,
        }
    }

    pub fn categorize(&self, field: &DistanceField) -> Vec<Category> {
        let red = self.settings.red_min_distance as i64;
        let green = self.settings.green_max_distance as i64;
        let red_threshold = -(red * red);
        let green_min_threshold = -(green * green);
        let blue = self.settings.blue_threshold as f64;
        let blue_threshold = field.farthest as f64 * blue * blue;
        debug!(
            "categorize: red < {}, green > {}, blue > {:.1} (farthest {})",
            red_threshold, green_min_threshold, blue_threshold, field.farthest
        );

        field
            .values
            .iter()
            .map(|&value| {
                if value < 0 {
                    if value < red_threshold {
                        Category::Forbidden
                    } else if value > green_min_threshold {
                        Category::Bonus
                    } else {
                        Category::Neutral
                    }
                } else if value > 0 {
                    if value as f64 > blue_threshold {
                        Category::Required
                    } else {
                        Category::Bonus
                    }
                } else {
                    Category::Neutral
                }
            })
            .collect()
    }

    /// Build a classification map for a stencil
    pub fn generate(&self, stencil: &Stencil) -> Result<ClassificationMap, ClassifyError> {
        let start = Instant::now();
        let field = self.compute_field(stencil);
        let field_time = start.elapsed();
        let categories = self.categorize(&field);
        let map = ClassificationMap::from_categories(field.width, field.height, categories)?;

        info!(
            "Generated {}x{} value map in {:?} (field {:?}): {:?}",
            field.width,
            field.height,
            start.elapsed(),
            field_time,
            map.counts()
        );
        Ok(map)
    }

    /// Threshold a stencil image's alpha and build its classification map
    pub fn generate_from_image(&self, image: &RgbaImage) -> Result<ClassificationMap, ClassifyError> {
        let stencil = Stencil::from_image(image, self.settings.min_alpha())?;
        self.generate(&stencil)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::CategoryCounts;

    fn settings() -> SpellMapSettings {
        SpellMapSettings {
            red_min_distance: 3,
            green_max_distance: 2,
            blue_threshold: 0.4,
            influence_size: 4,
            ..Default::default()
        }
    }

    /// 9x1 strip: three filled pixels on the left
    fn strip() -> Stencil {
        let filled = (0..9).map(|x| x < 3).collect();
        Stencil::new(9, 1, filled).unwrap()
    }

    #[test]
    fn test_field_values() {
        let generator = DistanceFieldGenerator::new(settings()).unwrap();
        let field = generator.compute_field(&strip());

        // Diagonal squared is 9^2 + 1^2; x = 7 and 8 are outside every window
        assert_eq!(field.values, vec![9, 4, 1, -1, -4, -9, -16, -82, -82]);
        assert_eq!(field.farthest, 9);
    }

    #[test]
    fn test_categorize_strip() {
        let generator = DistanceFieldGenerator::new(settings()).unwrap();
        let map = generator.generate(&strip()).unwrap();

        use Category::*;
        assert_eq!(
            map.categories(),
            &[Required, Required, Bonus, Bonus, Neutral, Neutral, Forbidden, Forbidden, Forbidden]
        );
        assert_eq!(map.counts(), CategoryCounts::new(2, 3, 2, 2));
    }

    #[test]
    fn test_all_filled_stencil_is_required() {
        let generator = DistanceFieldGenerator::default();
        let stencil = Stencil::new(6, 4, vec![true; 24]).unwrap();
        let map = generator.generate(&stencil).unwrap();

        assert!(map.categories().iter().all(|c| *c == Category::Required));
    }

    #[test]
    fn test_empty_stencil_has_no_inside() {
        let generator = DistanceFieldGenerator::new(settings()).unwrap();
        let stencil = Stencil::new(5, 5, vec![false; 25]).unwrap();
        let map = generator.generate(&stencil).unwrap();

        assert_eq!(map.counts().required, 0);
        assert_eq!(map.counts().bonus, 0);
    }

    #[test]
    fn test_stencil_alpha_threshold() {
        let mut art = RgbaImage::new(3, 1);
        art.put_pixel(1, 0, image::Rgba([0, 0, 0, 25]));
        art.put_pixel(2, 0, image::Rgba([0, 0, 0, 26]));
        let stencil = Stencil::from_image(&art, SpellMapSettings::default().min_alpha()).unwrap();

        assert!(!stencil.is_filled(0, 0));
        assert!(!stencil.is_filled(1, 0));
        assert!(stencil.is_filled(2, 0));
        assert_eq!(stencil.filled_count(), 1);
    }

    #[test]
    fn test_window_limits_reach() {
        // A single filled pixel only marks empties inside its window
        let mut filled = vec![false; 15 * 15];
        filled[7 * 15 + 7] = true;
        let stencil = Stencil::new(15, 15, filled).unwrap();
        let generator = DistanceFieldGenerator::new(SpellMapSettings {
            influence_size: 2,
            ..settings()
        })
        .unwrap();
        let field = generator.compute_field(&stencil);

        assert_eq!(field.values[7 * 15 + 9], -4);
        assert_eq!(field.values[7 * 15 + 10], -(15 * 15 + 15 * 15));
        assert_eq!(field.values[7 * 15 + 7], 1);
    }
}
