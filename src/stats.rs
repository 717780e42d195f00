/// Statistics tracking for an evaluation run
///
/// Counts what happened to each ground-truth image while the evaluator walked
/// the dataset: evaluated, skipped, or evaluated after a contained failure.
/// None of these counters affect TP/FP/FN.
use serde::{Deserialize, Serialize};

/// Statistics collected while processing images
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Number of images listed in the ground-truth table
    pub total_images: usize,

    /// Number of images that were matched and accumulated
    pub evaluated_images: usize,

    /// Images skipped because the file was absent
    pub skipped_missing_images: usize,

    /// Images skipped because the file could not be read
    pub skipped_unreadable_images: usize,

    /// Detector calls that failed and were scored as empty predictions
    pub detector_failures: usize,

    /// Overlays that could not be rendered or written
    pub render_failures: usize,

    /// Total number of boxes returned by the detector
    pub total_predicted_boxes: usize,

    /// Total number of ground-truth boxes in evaluated images
    pub total_truth_boxes: usize,
}

impl RunStats {
    /// Create a new `RunStats` with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an image that was matched and accumulated
    pub fn record_evaluated(&mut self, predicted_boxes: usize, truth_boxes: usize) {
        self.evaluated_images += 1;
        self.total_predicted_boxes += predicted_boxes;
        self.total_truth_boxes += truth_boxes;
    }

    pub fn skip_missing_image(&mut self) {
        self.skipped_missing_images += 1;
    }

    pub fn skip_unreadable_image(&mut self) {
        self.skipped_unreadable_images += 1;
    }

    pub fn record_detector_failure(&mut self) {
        self.detector_failures += 1;
    }

    pub fn record_render_failure(&mut self) {
        self.render_failures += 1;
    }

    /// Calculate the total number of skipped images
    pub fn total_skipped(&self) -> usize {
        self.skipped_missing_images + self.skipped_unreadable_images
    }

    /// Get a formatted string summary of the statistics
    pub fn summary_string(&self) -> String {
        format!(
            "RunStats {{ images: {}, evaluated: {}, skipped: {}, detector_failures: {}, render_failures: {} }}",
            self.total_images,
            self.evaluated_images,
            self.total_skipped(),
            self.detector_failures,
            self.render_failures
        )
    }
}
