//! Detector collaborator interface.
//!
//! The evaluator never runs a model itself. It asks a [`Detector`] for the
//! boxes in each image. Detectors are ordinary values built by the caller
//! (there is no process-wide model handle), and loading one is an explicit,
//! fallible step.

use std::collections::HashMap;
use std::path::Path;

use log::warn;

use crate::error::Result;
use crate::loader::load_predictions;
use crate::types::BoundingBox;

/// Something that localizes logos in an image.
///
/// Implementations return boxes in absolute pixel coordinates of the given
/// image, in their own order. `file_name` identifies the image; detectors that
/// run a model on `image_bytes` are free to ignore it.
pub trait Detector {
    fn detect(&self, file_name: &str, image_bytes: &[u8]) -> Result<Vec<BoundingBox>>;
}

impl<F> Detector for F
where
    F: Fn(&str, &[u8]) -> Result<Vec<BoundingBox>>,
{
    fn detect(&self, file_name: &str, image_bytes: &[u8]) -> Result<Vec<BoundingBox>> {
        self(file_name, image_bytes)
    }
}

/// Run a detector and turn a failure into an empty prediction list.
///
/// Returns the boxes and whether the call failed. Failures are logged, never
/// propagated: the image is then scored as having no predictions.
pub fn detect_or_empty<D: Detector + ?Sized>(
    detector: &D,
    file_name: &str,
    image_bytes: &[u8],
) -> (Vec<BoundingBox>, bool) {
    match detector.detect(file_name, image_bytes) {
        Ok(boxes) => (boxes, false),
        Err(e) => {
            warn!("Detector failed on {file_name}: {e}; scoring it with no predictions");
            (Vec::new(), true)
        }
    }
}

/// Replays precomputed detections from a predictions table.
///
/// Useful for scoring the output of an external inference run. Images that
/// are absent from the table get no predictions.
#[derive(Debug, Clone, Default)]
pub struct PredictionTableDetector {
    predictions: HashMap<String, Vec<BoundingBox>>,
}

impl PredictionTableDetector {
    /// Load predictions from a CSV table (`filename, x_min, y_min, x_max, y_max`).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let predictions = load_predictions(path)?
            .into_iter()
            .map(|p| (p.file_name, p.boxes))
            .collect();
        Ok(Self { predictions })
    }

    /// Build from already loaded `(filename, boxes)` pairs.
    pub fn from_boxes<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<BoundingBox>)>,
    {
        Self {
            predictions: entries.into_iter().collect(),
        }
    }

    /// Number of images with at least one row in the table.
    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

impl Detector for PredictionTableDetector {
    fn detect(&self, file_name: &str, _image_bytes: &[u8]) -> Result<Vec<BoundingBox>> {
        Ok(self.predictions.get(file_name).cloned().unwrap_or_default())
    }
}

/// Never finds anything. Baseline for recall-only sanity runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyDetector;

impl Detector for EmptyDetector {
    fn detect(&self, _file_name: &str, _image_bytes: &[u8]) -> Result<Vec<BoundingBox>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogoEvalError;

    #[test]
    fn test_table_detector_lookup() {
        let bbox = BoundingBox::new(0, 0, 10, 10).unwrap();
        let detector = PredictionTableDetector::from_boxes(vec![("a.jpg".to_string(), vec![bbox])]);

        assert_eq!(detector.detect("a.jpg", &[]).unwrap(), vec![bbox]);
        assert!(detector.detect("b.jpg", &[]).unwrap().is_empty());
        assert_eq!(detector.len(), 1);
    }

    #[test]
    fn test_closure_detector() {
        let detector = |_: &str, bytes: &[u8]| -> Result<Vec<BoundingBox>> {
            Ok(vec![BoundingBox::new(0, 0, bytes.len() as u32, 1)?])
        };
        let boxes = detector.detect("x", &[1, 2, 3]).unwrap();
        assert_eq!(boxes[0].x_max(), 3);
    }

    #[test]
    fn test_failure_becomes_empty() {
        let failing = |_: &str, _: &[u8]| -> Result<Vec<BoundingBox>> {
            Err(LogoEvalError::Detector("model exploded".to_string()))
        };
        let (boxes, failed) = detect_or_empty(&failing, "a.jpg", &[]);
        assert!(boxes.is_empty());
        assert!(failed);

        let (_, failed) = detect_or_empty(&EmptyDetector, "a.jpg", &[]);
        assert!(!failed);
    }

    #[test]
    fn test_load_missing_table() {
        let result = PredictionTableDetector::load("no/such/predictions.csv");
        assert!(matches!(result, Err(LogoEvalError::Configuration(_))));
    }
}
