//! Grading a drawing against a classification map
//!
//! Painted pixels (alpha above [`PAINTED_ALPHA`]) are counted per map
//! category and divided by the map's totals. The required and forbidden
//! ratios act as hard gates; the rest is graded on the balance
//! `bonus - neutral - forbidden * 100`.

use inkseal_config::ClassifierThresholds;
use painting::CanvasSnapshot;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClassifyError;
use crate::map::{Category, CategoryCounts, ClassificationMap};

/// Alpha above which a canvas pixel counts as painted (10% of full)
pub const PAINTED_ALPHA: u8 = 25;

/// Weight of forbidden coverage in the balance
pub const FORBIDDEN_PENALTY: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationResult {
    Failed,
    Bad,
    Fair,
    Good,
    Great,
}

impl ClassificationResult {
    /// Grade painted ratios
    pub fn from_ratios(
        thresholds: &ClassifierThresholds,
        required: f32,
        forbidden: f32,
        bonus: f32,
        neutral: f32,
    ) -> Self {
        if required < thresholds.min_required_ratio {
            return ClassificationResult::Failed;
        }
        if forbidden > thresholds.max_forbidden_ratio {
            return ClassificationResult::Failed;
        }

        let balance = balance(forbidden, bonus, neutral);
        if balance > thresholds.ideal_bonus_ratio {
            ClassificationResult::Great
        } else if balance > thresholds.min_bonus_ratio {
            ClassificationResult::Good
        } else if balance < thresholds.min_bonus_ratio {
            ClassificationResult::Bad
        } else {
            ClassificationResult::Fair
        }
    }

    #[inline]
    pub fn is_match(self) -> bool {
        self != ClassificationResult::Failed
    }
}

#[inline]
fn balance(forbidden: f32, bonus: f32, neutral: f32) -> f32 {
    bonus - neutral - forbidden * FORBIDDEN_PENALTY
}

/// Measurements behind a classification result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Painted pixel count per category
    pub painted: CategoryCounts,
    pub required_ratio: f32,
    pub forbidden_ratio: f32,
    pub bonus_ratio: f32,
    pub neutral_ratio: f32,
    pub balance: f32,
    pub result: ClassificationResult,
}

/// Compares canvas snapshots against classification maps
///
/// Stateless apart from its thresholds; safe to call repeatedly on the same
/// inputs.
#[derive(Debug, Clone, Default)]
pub struct PatternClassifier {
    thresholds: ClassifierThresholds,
}

impl PatternClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Result<Self, ClassifyError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    #[inline]
    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    /// Grade `snapshot` against `map`
    pub fn classify(
        &self,
        snapshot: &CanvasSnapshot,
        map: &ClassificationMap,
    ) -> Result<ClassificationResult, ClassifyError> {
        Ok(self.measure(snapshot, map)?.result)
    }

    /// Grade `snapshot` against `map`, returning the counts and ratios too
    ///
    /// Fails if the sizes differ or any map total is zero.
    pub fn measure(
        &self,
        snapshot: &CanvasSnapshot,
        map: &ClassificationMap,
    ) -> Result<ClassificationReport, ClassifyError> {
        if snapshot.width != map.width() || snapshot.height != map.height() {
            return Err(ClassifyError::DimensionMismatch {
                canvas_width: snapshot.width,
                canvas_height: snapshot.height,
                map_width: map.width(),
                map_height: map.height(),
            });
        }
        map.validate()?;

        let mut painted = CategoryCounts::default();
        for (pixel, category) in snapshot.pixels().iter().zip(map.categories()) {
            if pixel[3] > PAINTED_ALPHA {
                painted.increment(*category);
            }
        }

        let totals = map.counts();
        let ratio = |category: Category| painted.get(category) as f32 / totals.get(category) as f32;
        let required_ratio = ratio(Category::Required);
        let forbidden_ratio = ratio(Category::Forbidden);
        let bonus_ratio = ratio(Category::Bonus);
        let neutral_ratio = ratio(Category::Neutral);

        let result = ClassificationResult::from_ratios(
            &self.thresholds,
            required_ratio,
            forbidden_ratio,
            bonus_ratio,
            neutral_ratio,
        );
        let report = ClassificationReport {
            painted,
            required_ratio,
            forbidden_ratio,
            bonus_ratio,
            neutral_ratio,
            balance: balance(forbidden_ratio, bonus_ratio, neutral_ratio),
            result,
        };
        debug!(
            "measure: required={:.3}, forbidden={:.3}, bonus={:.3}, neutral={:.3}, balance={:.3} -> {:?}",
            required_ratio, forbidden_ratio, bonus_ratio, neutral_ratio, report.balance, result
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAR: [u8; 4] = [255, 255, 255, 0];
    const INK: [u8; 4] = [3, 5, 26, 255];

    /// 10x10 map: 20 required, 5 forbidden, 30 bonus, 45 neutral, in
    /// row-major runs
    fn reference_map() -> ClassificationMap {
        let mut categories = Vec::with_capacity(100);
        categories.extend([Category::Required; 20]);
        categories.extend([Category::Forbidden; 5]);
        categories.extend([Category::Bonus; 30]);
        categories.extend([Category::Neutral; 45]);
        ClassificationMap::from_categories(10, 10, categories).unwrap()
    }

    /// Snapshot with the given row-major index ranges painted
    fn drawing(painted: &[std::ops::Range<usize>]) -> CanvasSnapshot {
        let mut pixels = vec![CLEAR; 100];
        for range in painted {
            for pixel in &mut pixels[range.clone()] {
                *pixel = INK;
            }
        }
        CanvasSnapshot::from_pixels(10, 10, pixels).unwrap()
    }

    #[test]
    fn test_cleared_canvas_fails() {
        let classifier = PatternClassifier::default();
        let result = classifier.classify(&drawing(&[]), &reference_map()).unwrap();
        assert_eq!(result, ClassificationResult::Failed);
    }

    #[test]
    fn test_grades_from_coverage() {
        let classifier = PatternClassifier::default();
        let map = reference_map();

        // All required, all bonus
        let great = classifier.classify(&drawing(&[0..20, 25..55]), &map).unwrap();
        assert_eq!(great, ClassificationResult::Great);

        // All required, half the bonus
        let good = classifier.classify(&drawing(&[0..20, 25..40]), &map).unwrap();
        assert_eq!(good, ClassificationResult::Good);

        // Required only
        let bad = classifier.classify(&drawing(&[0..20]), &map).unwrap();
        assert_eq!(bad, ClassificationResult::Bad);

        // One forbidden pixel is 20% of the forbidden area
        let forbidden = classifier.classify(&drawing(&[0..21, 25..55]), &map).unwrap();
        assert_eq!(forbidden, ClassificationResult::Failed);

        // 17 of 20 required is below the 0.9 floor
        let sparse = classifier.classify(&drawing(&[0..17, 25..55]), &map).unwrap();
        assert_eq!(sparse, ClassificationResult::Failed);
    }

    #[test]
    fn test_decision_rule_boundaries() {
        let t = ClassifierThresholds::default();
        let grade = |required, forbidden, bonus, neutral| {
            ClassificationResult::from_ratios(&t, required, forbidden, bonus, neutral)
        };

        assert_eq!(grade(0.9, 0.0, 1.0, 0.0), ClassificationResult::Great);
        assert_eq!(grade(0.89, 0.0, 1.0, 0.0), ClassificationResult::Failed);
        assert_eq!(grade(1.0, 0.02, 1.0, 0.0), ClassificationResult::Failed);
        assert_eq!(grade(1.0, 0.0, 0.75, 0.0), ClassificationResult::Good);
        assert_eq!(grade(1.0, 0.0, 0.4, 0.0), ClassificationResult::Fair);
        assert_eq!(grade(1.0, 0.0, 0.9, 0.6), ClassificationResult::Bad);
        // Tolerated forbidden coverage still weighs 100x in the balance
        assert_eq!(grade(1.0, 0.005, 1.0, 0.0), ClassificationResult::Good);
    }

    #[test]
    fn test_painted_threshold() {
        let classifier = PatternClassifier::default();
        let map = reference_map();
        let mut pixels = vec![CLEAR; 100];
        pixels[0] = [0, 0, 0, PAINTED_ALPHA];
        pixels[1] = [0, 0, 0, PAINTED_ALPHA + 1];
        let snapshot = CanvasSnapshot::from_pixels(10, 10, pixels).unwrap();

        let report = classifier.measure(&snapshot, &map).unwrap();
        assert_eq!(report.painted, CategoryCounts::new(1, 0, 0, 0));
        assert!((report.required_ratio - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = PatternClassifier::default();
        let map = reference_map();
        let snapshot = drawing(&[0..19, 30..50, 60..70]);

        let first = classifier.measure(&snapshot, &map).unwrap();
        let second = classifier.measure(&snapshot, &map).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_category_is_error() {
        let classifier = PatternClassifier::default();
        let map = ClassificationMap::from_categories(10, 10, vec![Category::Required; 100]).unwrap();
        assert!(matches!(
            classifier.classify(&drawing(&[]), &map),
            Err(ClassifyError::EmptyCategory(Category::Forbidden))
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let classifier = PatternClassifier::default();
        let snapshot = CanvasSnapshot::from_pixels(5, 20, vec![CLEAR; 100]).unwrap();
        assert!(matches!(
            classifier.classify(&snapshot, &reference_map()),
            Err(ClassifyError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let thresholds = ClassifierThresholds {
            min_required_ratio: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            PatternClassifier::new(thresholds),
            Err(ClassifyError::Config(_))
        ));
    }
}
