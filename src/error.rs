//! Error types for the logo-eval library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for logo-eval operations.
pub type Result<T> = std::result::Result<T, LogoEvalError>;

/// Error types that can occur while loading data or running an evaluation.
///
/// Only [`LogoEvalError::Configuration`] and the loader errors abort a run.
/// Per-image failures (missing image, detector failure, overlay I/O) are
/// contained by the evaluator and logged.
#[derive(Error, Debug)]
pub enum LogoEvalError {
    /// Unrecoverable setup problem, e.g. the ground-truth table does not exist.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An image referenced by the ground-truth table is absent.
    #[error("Missing image: {}", .0.display())]
    MissingImage(PathBuf),

    /// The detector collaborator failed for one image.
    #[error("Detector failure: {0}")]
    Detector(String),

    /// Invalid bounding box coordinates.
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// Invalid IoU threshold.
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Required column missing from a table.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Empty dataset provided or produced.
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    /// Error during I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error during JSON serialization.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error reading or writing a table.
    #[error("Table error: {0}")]
    PolarsError(#[from] polars::prelude::PolarsError),

    /// Error decoding or encoding an image.
    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),
}
