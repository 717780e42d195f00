//! Evaluation driver: runs the detector over a labeled image set and scores it.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::detector::{detect_or_empty, Detector};
use crate::error::{LogoEvalError, Result};
use crate::loader::load_ground_truth;
use crate::matching::{match_boxes, validate_threshold, DEFAULT_IOU_THRESHOLD};
use crate::render::save_overlay;
use crate::stats::RunStats;
use crate::types::{Annotation, EvaluationSummary, MatchResult, Metrics};

/// Settings for one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Directory holding the images named in the ground-truth table.
    pub images_dir: PathBuf,
    /// Ground-truth CSV table.
    pub labels_path: PathBuf,
    /// Minimum IoU for a true positive.
    pub iou_threshold: f64,
    /// Write overlays of ground truth and predictions.
    pub draw_results: bool,
    /// Where overlays go.
    pub output_dir: PathBuf,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("data/validation/images"),
            labels_path: PathBuf::from("data/validation/labels.csv"),
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            draw_results: false,
            output_dir: PathBuf::from("validation_results"),
        }
    }
}

impl EvaluationConfig {
    /// Check the settings that can be checked without touching the disk.
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.iou_threshold)
    }
}

/// Final result of an evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub iou_threshold: f64,
    pub summary: EvaluationSummary,
    pub metrics: Metrics,
    pub stats: RunStats,
    /// Set when overlays were written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Validation Results ---")?;
        writeln!(f, "IoU threshold: {}", self.iou_threshold)?;
        writeln!(f, "Precision: {:.4}", self.metrics.precision)?;
        writeln!(f, "Recall:    {:.4}", self.metrics.recall)?;
        writeln!(f, "F1-score:  {:.4}", self.metrics.f1)?;
        writeln!(
            f,
            "TP: {}  FP: {}  FN: {}",
            self.summary.true_positives, self.summary.false_positives, self.summary.false_negatives
        )?;
        write!(
            f,
            "Images: {} evaluated, {} skipped, {} detector failures",
            self.stats.evaluated_images,
            self.stats.total_skipped(),
            self.stats.detector_failures
        )?;
        if let Some(dir) = &self.output_dir {
            write!(f, "\nOverlays saved to: {}", dir.display())?;
        }
        Ok(())
    }
}

/// Drives one evaluation run with a given detector.
///
/// The evaluator owns the run's [`EvaluationSummary`]; images are processed
/// one at a time in the order given.
pub struct Evaluator<D> {
    config: EvaluationConfig,
    detector: D,
}

impl<D: Detector> Evaluator<D> {
    /// Create an evaluator, rejecting an invalid configuration up front.
    pub fn new(config: EvaluationConfig, detector: D) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, detector })
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Score the detector on every annotated image.
    ///
    /// Per-image problems never abort the run: a missing or unreadable image
    /// is skipped without touching the counters, a detector failure is scored
    /// as an empty prediction list, and overlay errors only bump a statistic.
    /// Every such event is logged.
    pub fn run(&self, annotations: &[Annotation]) -> Result<EvaluationReport> {
        let mut summary = EvaluationSummary::new();
        let mut stats = RunStats::new();
        stats.total_images = annotations.len();

        if annotations.is_empty() {
            warn!("Ground truth contains no images; the report will be empty");
        }

        if self.config.draw_results {
            fs::create_dir_all(&self.config.output_dir)?;
        }

        info!(
            "Evaluating {} images at IoU threshold {}",
            annotations.len(),
            self.config.iou_threshold
        );

        for annotation in annotations {
            if let Some(result) = self.evaluate_image(annotation, &mut stats) {
                summary.accumulate(&result);
            }
        }

        let metrics = summary.finalize();
        info!(
            "Finished: {} (precision {:.4}, recall {:.4}, f1 {:.4})",
            stats.summary_string(),
            metrics.precision,
            metrics.recall,
            metrics.f1
        );

        Ok(EvaluationReport {
            iou_threshold: self.config.iou_threshold,
            summary,
            metrics,
            stats,
            output_dir: self
                .config
                .draw_results
                .then(|| self.config.output_dir.clone()),
        })
    }

    /// Evaluate one image. `None` means the image was skipped.
    fn evaluate_image(&self, annotation: &Annotation, stats: &mut RunStats) -> Option<MatchResult> {
        let file_name = annotation.file_name.as_str();

        let image_bytes = match self.read_image(file_name) {
            Ok(bytes) => bytes,
            Err(e @ LogoEvalError::MissingImage(_)) => {
                warn!("{e}; skipping");
                stats.skip_missing_image();
                return None;
            }
            Err(e) => {
                warn!("Could not read image {file_name}: {e}; skipping");
                stats.skip_unreadable_image();
                return None;
            }
        };

        let (predicted, failed) = detect_or_empty(&self.detector, file_name, &image_bytes);
        if failed {
            stats.record_detector_failure();
        }

        let result = match_boxes(&predicted, &annotation.boxes, self.config.iou_threshold);
        stats.record_evaluated(predicted.len(), annotation.boxes.len());
        debug!(
            "{file_name}: {} predicted, {} truth -> TP {} FP {} FN {}",
            predicted.len(),
            annotation.boxes.len(),
            result.true_positives,
            result.false_positives,
            result.false_negatives
        );

        if self.config.draw_results {
            if let Err(e) = save_overlay(
                &image_bytes,
                &annotation.boxes,
                &predicted,
                &self.config.output_dir,
                file_name,
            ) {
                warn!("Could not write overlay for {file_name}: {e}");
                stats.record_render_failure();
            }
        }

        Some(result)
    }

    fn read_image(&self, file_name: &str) -> Result<Vec<u8>> {
        let path = self.config.images_dir.join(file_name);
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => LogoEvalError::MissingImage(path),
            _ => LogoEvalError::IoError(e),
        })
    }
}

/// Load the ground truth named by `config` and evaluate `detector` on it.
///
/// A missing ground-truth table aborts before any image is touched.
///
/// # Example
///
/// ```no_run
/// use logo_eval::detector::PredictionTableDetector;
/// use logo_eval::evaluator::{evaluate_from_paths, EvaluationConfig};
///
/// # fn main() -> logo_eval::Result<()> {
/// let detector = PredictionTableDetector::load("predictions.csv")?;
/// let report = evaluate_from_paths(EvaluationConfig::default(), detector)?;
/// println!("{report}");
/// # Ok(())
/// # }
/// ```
pub fn evaluate_from_paths<D: Detector>(config: EvaluationConfig, detector: D) -> Result<EvaluationReport> {
    config.validate()?;
    let annotations = load_ground_truth(&config.labels_path)?;
    Evaluator::new(config, detector)?.run(&annotations)
}
