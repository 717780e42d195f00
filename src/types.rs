//! Core data types for ground truth, predictions and evaluation results.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::error::{LogoEvalError, Result};
use crate::metrics::f1_score::calculate_f1_score;
use crate::metrics::precision_recall::calculate_precision_recall;

/// Axis-aligned bounding box in absolute pixel coordinates (XYXY).
///
/// Coordinates are unsigned, so every corner is `>= 0`. The constructor
/// guarantees `x_min <= x_max` and `y_min <= y_max`; fields are private so a
/// box cannot be mutated into an inverted state afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBoundingBox")]
pub struct BoundingBox {
    x_min: u32,
    y_min: u32,
    x_max: u32,
    y_max: u32,
}

#[derive(Deserialize)]
struct RawBoundingBox {
    x_min: u32,
    y_min: u32,
    x_max: u32,
    y_max: u32,
}

impl TryFrom<RawBoundingBox> for BoundingBox {
    type Error = LogoEvalError;

    fn try_from(raw: RawBoundingBox) -> Result<Self> {
        BoundingBox::new(raw.x_min, raw.y_min, raw.x_max, raw.y_max)
    }
}

impl BoundingBox {
    /// Create a new bounding box from its corners.
    ///
    /// # Errors
    ///
    /// Returns [`LogoEvalError::InvalidBoundingBox`] if a max corner lies
    /// before its min corner.
    ///
    /// # Example
    ///
    /// ```
    /// use logo_eval::types::BoundingBox;
    ///
    /// let bbox = BoundingBox::new(10, 20, 50, 80).unwrap();
    /// assert_eq!(bbox.width(), 40);
    /// assert!(BoundingBox::new(50, 20, 10, 80).is_err());
    /// ```
    pub fn new(x_min: u32, y_min: u32, x_max: u32, y_max: u32) -> Result<Self> {
        if x_min > x_max || y_min > y_max {
            return Err(LogoEvalError::InvalidBoundingBox(format!(
                "corners out of order: ({x_min}, {y_min}, {x_max}, {y_max})"
            )));
        }
        Ok(Self {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Build a box from signed coordinates, clamping negative values to zero.
    ///
    /// Converted labels can extend past the top-left image edge; those
    /// coordinates are pulled back onto the image.
    pub fn from_signed(x_min: i64, y_min: i64, x_max: i64, y_max: i64) -> Result<Self> {
        let clamp = |v: i64| v.clamp(0, i64::from(u32::MAX)) as u32;
        Self::new(clamp(x_min), clamp(y_min), clamp(x_max), clamp(y_max))
    }

    pub fn x_min(&self) -> u32 {
        self.x_min
    }

    pub fn y_min(&self) -> u32 {
        self.y_min
    }

    pub fn x_max(&self) -> u32 {
        self.x_max
    }

    pub fn y_max(&self) -> u32 {
        self.y_max
    }

    /// Box width in pixels.
    pub fn width(&self) -> u32 {
        self.x_max - self.x_min
    }

    /// Box height in pixels.
    pub fn height(&self) -> u32 {
        self.y_max - self.y_min
    }

    /// Area in square pixels.
    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// A box with zero width or zero height.
    pub fn is_degenerate(&self) -> bool {
        self.area() == 0
    }

    /// Corners as `[x_min, y_min, x_max, y_max]`.
    pub fn to_array(&self) -> [u32; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }
}

/// Ground-truth boxes for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub file_name: String,
    pub boxes: Vec<BoundingBox>,
}

impl Annotation {
    pub fn new(file_name: impl Into<String>, boxes: Vec<BoundingBox>) -> Self {
        Self {
            file_name: file_name.into(),
            boxes,
        }
    }
}

/// Boxes returned by the detector for one image, in detector order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub file_name: String,
    pub boxes: Vec<BoundingBox>,
}

impl Prediction {
    pub fn new(file_name: impl Into<String>, boxes: Vec<BoundingBox>) -> Self {
        Self {
            file_name: file_name.into(),
            boxes,
        }
    }
}

/// Outcome of matching one image's predictions against its ground truth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl MatchResult {
    pub fn new(true_positives: usize, false_positives: usize, false_negatives: usize) -> Self {
        Self {
            true_positives,
            false_positives,
            false_negatives,
        }
    }
}

/// Precision, recall and F1 derived from accumulated counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Running totals for one evaluation run.
///
/// Created empty, updated once per evaluated image, finalized once. Partial
/// summaries can be combined with [`EvaluationSummary::merge`] in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub images_evaluated: usize,
}

impl EvaluationSummary {
    /// Create a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one image's match counts to the running totals.
    pub fn accumulate(&mut self, result: &MatchResult) {
        self.true_positives += result.true_positives;
        self.false_positives += result.false_positives;
        self.false_negatives += result.false_negatives;
        self.images_evaluated += 1;
    }

    /// Add another partial summary into this one.
    pub fn merge(&mut self, other: &EvaluationSummary) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
        self.images_evaluated += other.images_evaluated;
    }

    /// Derive precision, recall and F1. Zero denominators resolve to 0.0.
    ///
    /// # Example
    ///
    /// ```
    /// use logo_eval::types::{EvaluationSummary, MatchResult};
    ///
    /// let mut summary = EvaluationSummary::new();
    /// summary.accumulate(&MatchResult::new(8, 2, 2));
    /// let metrics = summary.finalize();
    /// assert!((metrics.f1 - 0.8).abs() < 1e-10);
    /// ```
    pub fn finalize(&self) -> Metrics {
        let pr = calculate_precision_recall(
            self.true_positives,
            self.false_positives,
            self.false_negatives,
        );
        Metrics {
            precision: pr.precision,
            recall: pr.recall,
            f1: calculate_f1_score(pr.precision, pr.recall),
        }
    }
}

impl AddAssign<&MatchResult> for EvaluationSummary {
    fn add_assign(&mut self, result: &MatchResult) {
        self.accumulate(result);
    }
}
