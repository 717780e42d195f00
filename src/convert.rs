//! Conversion of YOLO label files into a ground-truth box table.
//!
//! YOLO labels store one object per line as `class xc yc w h`, where the
//! center and size are fractions of the image dimensions. The evaluator works
//! in absolute pixel corners, so every label is converted with the size of
//! its image.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::{LogoEvalError, Result};
use crate::table::{boxes_to_dataframe, write_csv};
use crate::types::BoundingBox;

/// Image extensions probed, in order, when looking for a label's image.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// One normalized YOLO label line.
#[derive(Debug, Clone, PartialEq)]
pub struct YoloLabel {
    pub class_id: String,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

/// One row of the converted table.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRow {
    pub file_name: String,
    pub bbox: BoundingBox,
}

/// Convert a normalized center-format box to absolute pixel corners.
///
/// `x1 = (xc - w/2)·W`, `y1 = (yc - h/2)·H`, `x2 = (xc + w/2)·W`,
/// `y2 = (yc + h/2)·H`, each truncated toward zero. Corners can be negative
/// or exceed the image when the label spills over an edge.
///
/// # Example
///
/// ```
/// use logo_eval::convert::yolo_to_xyxy;
///
/// assert_eq!(yolo_to_xyxy(0.5, 0.5, 0.5, 0.5, 100, 200), (25, 50, 75, 150));
/// ```
pub fn yolo_to_xyxy(
    x_center: f64,
    y_center: f64,
    width: f64,
    height: f64,
    image_width: u32,
    image_height: u32,
) -> (i64, i64, i64, i64) {
    let w = f64::from(image_width);
    let h = f64::from(image_height);
    (
        ((x_center - width / 2.0) * w) as i64,
        ((y_center - height / 2.0) * h) as i64,
        ((x_center + width / 2.0) * w) as i64,
        ((y_center + height / 2.0) * h) as i64,
    )
}

/// Convert absolute pixel corners back to a normalized center-format box.
pub fn xyxy_to_yolo(bbox: &BoundingBox, image_width: u32, image_height: u32) -> (f64, f64, f64, f64) {
    let w = f64::from(image_width);
    let h = f64::from(image_height);
    let x1 = f64::from(bbox.x_min());
    let y1 = f64::from(bbox.y_min());
    let x2 = f64::from(bbox.x_max());
    let y2 = f64::from(bbox.y_max());
    (
        (x1 + x2) / 2.0 / w,
        (y1 + y2) / 2.0 / h,
        (x2 - x1) / w,
        (y2 - y1) / h,
    )
}

/// Parse one label line.
///
/// Returns `Ok(None)` for lines with fewer than five fields (blank lines,
/// truncated rows); those are skipped like the rest of the YOLO tooling does.
pub fn parse_yolo_line(line: &str) -> Result<Option<YoloLabel>> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 5 {
        return Ok(None);
    }

    let number = |idx: usize| -> Result<f64> {
        parts[idx].parse::<f64>().map_err(|_| {
            LogoEvalError::InvalidBoundingBox(format!(
                "non-numeric label field {:?} in line {:?}",
                parts[idx], line
            ))
        })
    };

    Ok(Some(YoloLabel {
        class_id: parts[0].to_string(),
        x_center: number(1)?,
        y_center: number(2)?,
        width: number(3)?,
        height: number(4)?,
    }))
}

impl YoloLabel {
    /// Absolute pixel box for an image of the given size.
    ///
    /// Corners before the image origin are clamped to zero.
    pub fn to_bbox(&self, image_width: u32, image_height: u32) -> Result<BoundingBox> {
        let (x1, y1, x2, y2) = yolo_to_xyxy(
            self.x_center,
            self.y_center,
            self.width,
            self.height,
            image_width,
            image_height,
        );
        BoundingBox::from_signed(x1, y1, x2, y2)
    }
}

/// Find the image that belongs to a label file stem.
pub fn find_image_for_label(images_dir: &Path, stem: &str) -> Option<PathBuf> {
    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| images_dir.join(format!("{stem}.{ext}")))
        .find(|candidate| candidate.is_file())
}

/// Convert every `*.txt` label file in `labels_dir` into table rows.
///
/// Labels without a matching image, images whose size cannot be read, and
/// lines that do not describe a valid box are skipped with a warning. Label
/// files are processed in name order.
pub fn convert_labels(labels_dir: &Path, images_dir: &Path) -> Result<Vec<LabelRow>> {
    if !labels_dir.is_dir() {
        return Err(LogoEvalError::Configuration(format!(
            "labels directory not found at {}",
            labels_dir.display()
        )));
    }

    let mut label_files: Vec<PathBuf> = fs::read_dir(labels_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    label_files.sort();

    info!("Found {} label files in {}", label_files.len(), labels_dir.display());
    if label_files.is_empty() {
        warn!("No .txt label files found in {}", labels_dir.display());
    }

    let mut rows = Vec::new();

    for label_path in &label_files {
        let Some(stem) = label_path.file_stem().and_then(|s| s.to_str()) else {
            warn!("Skipping label with non UTF-8 name: {}", label_path.display());
            continue;
        };

        let Some(image_path) = find_image_for_label(images_dir, stem) else {
            warn!("No image found for label {}", label_path.display());
            continue;
        };

        let (width, height) = match image::image_dimensions(&image_path) {
            Ok(dims) => dims,
            Err(e) => {
                warn!("Could not read image {}: {e}", image_path.display());
                continue;
            }
        };

        let file_name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let contents = fs::read_to_string(label_path)?;
        for line in contents.lines() {
            let parsed = parse_yolo_line(line).and_then(|label| {
                label.map(|l| l.to_bbox(width, height)).transpose()
            });
            match parsed {
                Ok(Some(bbox)) => rows.push(LabelRow {
                    file_name: file_name.clone(),
                    bbox,
                }),
                Ok(None) => {}
                Err(e) => warn!("Skipping line in {}: {e}", label_path.display()),
            }
        }
    }

    Ok(rows)
}

/// Write converted rows as a ground-truth CSV table.
///
/// # Errors
///
/// Refuses to write an empty table ([`LogoEvalError::EmptyDataset`]).
pub fn write_label_table(rows: &[LabelRow], output: &Path) -> Result<()> {
    if rows.is_empty() {
        return Err(LogoEvalError::EmptyDataset(
            "no annotations were produced; check the label files".to_string(),
        ));
    }

    let mut df = boxes_to_dataframe(rows.iter().map(|r| (r.file_name.as_str(), &r.bbox)))?;
    write_csv(&mut df, output)?;
    info!("Wrote {} boxes to {}", rows.len(), output.display());
    Ok(())
}
