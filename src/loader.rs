//! CSV loading utilities for ground-truth and prediction tables.

use std::path::Path;

use log::info;

use crate::error::{LogoEvalError, Result};
use crate::table::{group_boxes_by_filename, read_csv, read_csv_str};
use crate::types::{Annotation, Prediction};

/// Load ground-truth annotations from a CSV table.
///
/// The table has the columns `filename, x_min, y_min, x_max, y_max` with one
/// row per box. Rows are grouped into one [`Annotation`] per filename, sorted
/// by filename.
///
/// # Errors
///
/// A path that does not exist is a [`LogoEvalError::Configuration`] error:
/// without ground truth no evaluation can run. Unreadable tables, missing
/// columns and invalid boxes are reported as their own error kinds.
///
/// # Example
///
/// ```no_run
/// use logo_eval::loader::load_ground_truth;
///
/// let annotations = load_ground_truth("data/validation/labels.csv").unwrap();
/// println!("Loaded ground truth for {} images", annotations.len());
/// ```
pub fn load_ground_truth<P: AsRef<Path>>(path: P) -> Result<Vec<Annotation>> {
    let path = path.as_ref();
    require_table(path, "ground-truth")?;

    let df = read_csv(path)?;
    let annotations: Vec<Annotation> = group_boxes_by_filename(&df)?
        .into_iter()
        .map(|(file_name, boxes)| Annotation::new(file_name, boxes))
        .collect();

    info!(
        "Loaded {} ground-truth boxes for {} images from {}",
        df.height(),
        annotations.len(),
        path.display()
    );

    Ok(annotations)
}

/// Load ground-truth annotations from CSV text.
///
/// # Example
///
/// ```
/// use logo_eval::loader::load_ground_truth_from_str;
///
/// let csv = "filename,x_min,y_min,x_max,y_max\nimg.jpg,10,10,50,50\n";
/// let annotations = load_ground_truth_from_str(csv).unwrap();
/// assert_eq!(annotations[0].boxes.len(), 1);
/// ```
pub fn load_ground_truth_from_str(csv: &str) -> Result<Vec<Annotation>> {
    let df = read_csv_str(csv)?;
    Ok(group_boxes_by_filename(&df)?
        .into_iter()
        .map(|(file_name, boxes)| Annotation::new(file_name, boxes))
        .collect())
}

/// Load precomputed detector output from a CSV table with the same layout
/// as the ground truth.
pub fn load_predictions<P: AsRef<Path>>(path: P) -> Result<Vec<Prediction>> {
    let path = path.as_ref();
    require_table(path, "predictions")?;

    let df = read_csv(path)?;
    let predictions: Vec<Prediction> = group_boxes_by_filename(&df)?
        .into_iter()
        .map(|(file_name, boxes)| Prediction::new(file_name, boxes))
        .collect();

    info!(
        "Loaded {} predicted boxes for {} images from {}",
        df.height(),
        predictions.len(),
        path.display()
    );

    Ok(predictions)
}

fn require_table(path: &Path, kind: &str) -> Result<()> {
    if !path.is_file() {
        return Err(LogoEvalError::Configuration(format!(
            "{kind} table not found at {}",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_str_groups_rows() {
        let csv = "filename,x_min,y_min,x_max,y_max\n\
                   a.jpg,0,0,10,10\n\
                   a.jpg,20,20,30,30\n\
                   b.jpg,5,5,15,15\n";

        let annotations = load_ground_truth_from_str(csv).unwrap();
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].file_name, "a.jpg");
        assert_eq!(annotations[0].boxes.len(), 2);
        assert_eq!(annotations[1].boxes.len(), 1);
    }

    #[test]
    fn test_missing_table_is_configuration_error() {
        let result = load_ground_truth("definitely/not/here/labels.csv");
        assert!(matches!(result, Err(LogoEvalError::Configuration(_))));
    }

    #[test]
    fn test_missing_column() {
        let csv = "filename,x_min,y_min,x_max\na.jpg,0,0,10\n";
        let result = load_ground_truth_from_str(csv);
        match result {
            Err(LogoEvalError::MissingColumn(col)) => assert_eq!(col, "y_max"),
            other => panic!("Expected MissingColumn error, got {other:?}"),
        }
    }

    #[test]
    fn test_header_only_table_is_empty() {
        let csv = "filename,x_min,y_min,x_max,y_max\n";
        let annotations = load_ground_truth_from_str(csv).unwrap();
        assert!(annotations.is_empty());
    }
}
