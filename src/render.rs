//! Overlay rendering of ground-truth and predicted boxes.
//!
//! Purely a reporting aid; nothing here feeds back into scoring.

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::error::Result;
use crate::types::BoundingBox;

/// Ground-truth outline color (green).
pub const TRUTH_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Prediction outline color (red).
pub const PREDICTION_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Outline thickness in pixels.
pub const LINE_THICKNESS: u32 = 2;

/// Draw box outlines onto an image in place.
///
/// Boxes are clipped to the image. Each extra pixel of thickness is drawn as
/// a rectangle inset by one more pixel; boxes too small for that stop early.
pub fn draw_boxes(img: &mut RgbImage, boxes: &[BoundingBox], color: Rgb<u8>, thickness: u32) {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    for bbox in boxes {
        let x_min = bbox.x_min().min(width - 1);
        let y_min = bbox.y_min().min(height - 1);
        let x_max = bbox.x_max().min(width - 1);
        let y_max = bbox.y_max().min(height - 1);

        for inset in 0..thickness {
            let left = x_min + inset;
            let top = y_min + inset;
            let right = x_max.saturating_sub(inset);
            let bottom = y_max.saturating_sub(inset);
            if right <= left || bottom <= top {
                break;
            }
            let rect = Rect::at(left as i32, top as i32).of_size(right - left + 1, bottom - top + 1);
            draw_hollow_rect_mut(img, rect, color);
        }
    }
}

/// Decode an image and draw ground truth and predictions onto it.
pub fn draw_overlay(
    image_bytes: &[u8],
    truth: &[BoundingBox],
    predicted: &[BoundingBox],
) -> Result<RgbImage> {
    let mut img = image::load_from_memory(image_bytes)?.to_rgb8();
    draw_boxes(&mut img, truth, TRUTH_COLOR, LINE_THICKNESS);
    draw_boxes(&mut img, predicted, PREDICTION_COLOR, LINE_THICKNESS);
    Ok(img)
}

/// Render an overlay and write it to `output_dir/file_name`.
///
/// The output format follows the file extension.
pub fn save_overlay(
    image_bytes: &[u8],
    truth: &[BoundingBox],
    predicted: &[BoundingBox],
    output_dir: &Path,
    file_name: &str,
) -> Result<PathBuf> {
    let img = draw_overlay(image_bytes, truth, predicted)?;
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(file_name);
    img.save(&path)?;
    Ok(path)
}
