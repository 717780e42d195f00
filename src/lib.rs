//! # logo-eval
//!
//! Scoring of a single-class object detector (logo localization) against
//! ground-truth boxes.
//!
//! The library provides:
//! - **IoU** (Intersection over Union) between axis-aligned pixel boxes
//! - **Greedy matching** of predicted boxes to ground truth, one image at a time
//! - **Precision**, **Recall** and **F1** from accumulated TP/FP/FN counts
//! - An **evaluation driver** that walks a labeled image set and calls a
//!   [`detector::Detector`] for each image
//!
//! ## Features
//!
//! - Load ground-truth and prediction tables (`filename,x_min,y_min,x_max,y_max` CSV)
//! - Convert YOLO normalized labels into that table
//! - Replay precomputed predictions through [`detector::PredictionTableDetector`]
//! - Render ground truth and predictions onto the images for inspection
//!
//! ## Quick Start
//!
//! ```rust
//! use logo_eval::matching::match_boxes;
//! use logo_eval::types::{BoundingBox, EvaluationSummary};
//!
//! # fn main() -> logo_eval::Result<()> {
//! let truth = vec![BoundingBox::new(10, 10, 60, 60)?];
//! let predicted = vec![BoundingBox::new(12, 10, 60, 62)?];
//!
//! let mut summary = EvaluationSummary::new();
//! summary.accumulate(&match_boxes(&predicted, &truth, 0.5));
//!
//! let metrics = summary.finalize();
//! println!("Precision: {:.4}", metrics.precision);
//! println!("Recall:    {:.4}", metrics.recall);
//! println!("F1-score:  {:.4}", metrics.f1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Ground-truth table
//!
//! ```text
//! filename,x_min,y_min,x_max,y_max
//! img_001.jpg,34,50,180,122
//! img_001.jpg,300,40,410,95
//! img_002.png,12,8,96,64
//! ```

pub mod error;
pub mod types;
pub mod metrics;
pub mod matching;
pub mod stats;
pub mod table;
pub mod loader;
pub mod convert;
pub mod detector;
pub mod render;
pub mod evaluator;

// Re-export commonly used types and functions
pub use error::{LogoEvalError, Result};
pub use types::{
    Annotation, BoundingBox, EvaluationSummary, MatchResult, Metrics, Prediction,
};
pub use matching::{match_boxes, DEFAULT_IOU_THRESHOLD};
pub use loader::{load_ground_truth, load_ground_truth_from_str, load_predictions};
pub use detector::{Detector, EmptyDetector, PredictionTableDetector};
pub use evaluator::{evaluate_from_paths, EvaluationConfig, EvaluationReport, Evaluator};
