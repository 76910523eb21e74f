//! Classification maps: per-pixel categories of a reference pattern
//!
//! Maps are stored on disk as value images. Each pixel is decoded by
//! checking red, then green, then blue:
//! - red: forbidden (painting here disqualifies)
//! - green: bonus (raises the score)
//! - blue: required (must be covered)
//! - black: neutral (lowers the score)

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClassifyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Required,
    Forbidden,
    Bonus,
    #[default]
    Neutral,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Required,
        Category::Forbidden,
        Category::Bonus,
        Category::Neutral,
    ];

    /// Decode a value-map pixel
    #[inline]
    pub fn from_value_pixel(pixel: [u8; 4]) -> Self {
        if pixel[0] > 0 {
            Category::Forbidden
        } else if pixel[1] > 0 {
            Category::Bonus
        } else if pixel[2] > 0 {
            Category::Required
        } else {
            Category::Neutral
        }
    }

    /// Opaque value-map color for this category
    #[inline]
    pub fn value_pixel(self) -> [u8; 4] {
        match self {
            Category::Forbidden => [255, 0, 0, 255],
            Category::Bonus => [0, 255, 0, 255],
            Category::Required => [0, 0, 255, 255],
            Category::Neutral => [0, 0, 0, 255],
        }
    }
}

/// Pixel count per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub required: usize,
    pub forbidden: usize,
    pub bonus: usize,
    pub neutral: usize,
}

impl CategoryCounts {
    pub fn new(required: usize, forbidden: usize, bonus: usize, neutral: usize) -> Self {
        Self {
            required,
            forbidden,
            bonus,
            neutral,
        }
    }

    #[inline]
    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Required => self.required,
            Category::Forbidden => self.forbidden,
            Category::Bonus => self.bonus,
            Category::Neutral => self.neutral,
        }
    }

    #[inline]
    pub fn increment(&mut self, category: Category) {
        match category {
            Category::Required => self.required += 1,
            Category::Forbidden => self.forbidden += 1,
            Category::Bonus => self.bonus += 1,
            Category::Neutral => self.neutral += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.required + self.forbidden + self.bonus + self.neutral
    }

    pub fn tally(categories: &[Category]) -> Self {
        let mut counts = Self::default();
        for &category in categories {
            counts.increment(category);
        }
        counts
    }
}

/// Categorized reference pattern, read-only once built
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationMap {
    width: u32,
    height: u32,
    /// Row-major categories, `width * height` long
    categories: Vec<Category>,
    /// Totals used as ratio denominators
    counts: CategoryCounts,
}

impl ClassificationMap {
    /// Build a map from row-major categories; totals are tallied from them
    pub fn from_categories(
        width: u32,
        height: u32,
        categories: Vec<Category>,
    ) -> Result<Self, ClassifyError> {
        if width == 0 || height == 0 {
            return Err(ClassifyError::ZeroSize { width, height });
        }
        let expected = (width as usize) * (height as usize);
        if categories.len() != expected {
            return Err(ClassifyError::MapLength {
                expected,
                actual: categories.len(),
            });
        }
        let counts = CategoryCounts::tally(&categories);
        Ok(Self {
            width,
            height,
            categories,
            counts,
        })
    }

    /// Replace the tallied totals with externally supplied ones
    pub fn with_counts(mut self, counts: CategoryCounts) -> Self {
        self.counts = counts;
        self
    }

    /// Decode a value image
    pub fn from_value_image(image: &RgbaImage) -> Result<Self, ClassifyError> {
        let (width, height) = image.dimensions();
        let categories = image
            .pixels()
            .map(|p| Category::from_value_pixel(p.0))
            .collect();
        let map = Self::from_categories(width, height, categories)?;
        debug!(
            "ClassificationMap::from_value_image: {}x{}, {:?}",
            width, height, map.counts
        );
        Ok(map)
    }

    /// Encode as an opaque value image
    pub fn to_value_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let category = self.categories[self.index(x, y)];
            Rgba(category.value_pixel())
        })
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Category at a pixel, None out of bounds
    #[inline]
    pub fn category(&self, x: u32, y: u32) -> Option<Category> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.categories[self.index(x, y)])
    }

    #[inline]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[inline]
    pub fn counts(&self) -> CategoryCounts {
        self.counts
    }

    /// A map is usable for classification only if every total is non-zero
    pub fn validate(&self) -> Result<(), ClassifyError> {
        for category in Category::ALL {
            if self.counts.get(category) == 0 {
                return Err(ClassifyError::EmptyCategory(category));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_pixel_priority() {
        assert_eq!(Category::from_value_pixel([255, 255, 255, 255]), Category::Forbidden);
        assert_eq!(Category::from_value_pixel([0, 1, 255, 255]), Category::Bonus);
        assert_eq!(Category::from_value_pixel([0, 0, 9, 0]), Category::Required);
        assert_eq!(Category::from_value_pixel([0, 0, 0, 255]), Category::Neutral);
    }

    #[test]
    fn test_value_image_round_trip() {
        let categories = vec![
            Category::Required,
            Category::Forbidden,
            Category::Bonus,
            Category::Neutral,
            Category::Bonus,
            Category::Bonus,
        ];
        let map = ClassificationMap::from_categories(3, 2, categories).unwrap();
        let image = map.to_value_image();
        assert_eq!(image.get_pixel(1, 0).0, [255, 0, 0, 255]);

        let decoded = ClassificationMap::from_value_image(&image).unwrap();
        assert_eq!(decoded, map);
        assert_eq!(decoded.counts(), CategoryCounts::new(1, 1, 3, 1));
        assert_eq!(decoded.category(0, 1), Some(Category::Neutral));
        assert_eq!(decoded.category(3, 0), None);
    }

    #[test]
    fn test_length_checked() {
        assert!(matches!(
            ClassificationMap::from_categories(2, 2, vec![Category::Neutral; 3]),
            Err(ClassifyError::MapLength { expected: 4, actual: 3 })
        ));
        assert!(matches!(
            ClassificationMap::from_categories(0, 2, vec![]),
            Err(ClassifyError::ZeroSize { .. })
        ));
    }

    #[test]
    fn test_validate_requires_every_category() {
        let map = ClassificationMap::from_categories(2, 1, vec![Category::Required, Category::Bonus])
            .unwrap();
        assert!(matches!(
            map.validate(),
            Err(ClassifyError::EmptyCategory(Category::Forbidden))
        ));

        let map = map.with_counts(CategoryCounts::new(1, 1, 1, 1));
        assert!(map.validate().is_ok());
    }
}
