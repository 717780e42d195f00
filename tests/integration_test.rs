//! Integration tests for the complete evaluation pipeline.

use std::fs;
use std::path::Path;

use image::RgbImage;
use logo_eval::convert::{convert_labels, write_label_table};
use logo_eval::detector::{EmptyDetector, PredictionTableDetector};
use logo_eval::error::{LogoEvalError, Result};
use logo_eval::evaluator::{evaluate_from_paths, EvaluationConfig, Evaluator};
use logo_eval::loader::load_ground_truth;
use logo_eval::types::{Annotation, BoundingBox};
use tempfile::TempDir;

fn bbox(x1: u32, y1: u32, x2: u32, y2: u32) -> BoundingBox {
    BoundingBox::new(x1, y1, x2, y2).unwrap()
}

fn write_image(dir: &Path, name: &str, width: u32, height: u32) {
    RgbImage::new(width, height).save(dir.join(name)).unwrap();
}

fn write_csv(path: &Path, rows: &[&str]) {
    let mut text = String::from("filename,x_min,y_min,x_max,y_max\n");
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    fs::write(path, text).unwrap();
}

/// Three images on disk, one referenced image missing.
fn setup_dataset() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let images = tmp.path().join("images");
    fs::create_dir_all(&images).unwrap();

    write_image(&images, "a.png", 64, 64);
    write_image(&images, "b.png", 64, 64);
    write_image(&images, "c.png", 64, 64);

    write_csv(
        &tmp.path().join("labels.csv"),
        &[
            "a.png,0,0,10,10",
            "a.png,20,20,30,30",
            "b.png,5,5,25,25",
            "c.png,40,40,60,60",
            "missing.png,0,0,10,10",
        ],
    );

    write_csv(
        &tmp.path().join("predictions.csv"),
        &[
            // a: duplicate hit on the first box, second box missed
            "a.png,0,0,10,10",
            "a.png,0,0,10,10",
            // b: perfect
            "b.png,5,5,25,25",
            // c: nothing predicted
        ],
    );

    tmp
}

fn config_for(tmp: &TempDir) -> EvaluationConfig {
    EvaluationConfig {
        images_dir: tmp.path().join("images"),
        labels_path: tmp.path().join("labels.csv"),
        iou_threshold: 0.5,
        draw_results: false,
        output_dir: tmp.path().join("overlays"),
    }
}

#[test]
fn test_full_run_with_replayed_predictions() {
    let tmp = setup_dataset();
    let detector = PredictionTableDetector::load(tmp.path().join("predictions.csv")).unwrap();

    let report = evaluate_from_paths(config_for(&tmp), detector).unwrap();

    // a: TP 1, FP 1, FN 1; b: TP 1; c: FN 1
    assert_eq!(report.summary.true_positives, 2);
    assert_eq!(report.summary.false_positives, 1);
    assert_eq!(report.summary.false_negatives, 2);
    assert_eq!(report.summary.images_evaluated, 3);

    assert_eq!(report.stats.total_images, 4);
    assert_eq!(report.stats.skipped_missing_images, 1);

    assert!((report.metrics.precision - 2.0 / 3.0).abs() < 1e-10);
    assert!((report.metrics.recall - 0.5).abs() < 1e-10);
    let expected_f1 = 2.0 * (2.0 / 3.0) * 0.5 / (2.0 / 3.0 + 0.5);
    assert!((report.metrics.f1 - expected_f1).abs() < 1e-10);
}

#[test]
fn test_empty_detector_gives_only_false_negatives() {
    let tmp = setup_dataset();
    let report = evaluate_from_paths(config_for(&tmp), EmptyDetector).unwrap();

    assert_eq!(report.summary.true_positives, 0);
    assert_eq!(report.summary.false_positives, 0);
    assert_eq!(report.summary.false_negatives, 4);
    assert_eq!(report.metrics.precision, 0.0);
    assert_eq!(report.metrics.recall, 0.0);
    assert_eq!(report.metrics.f1, 0.0);
}

#[test]
fn test_failing_detector_does_not_abort_run() {
    let tmp = setup_dataset();
    let detector = |file_name: &str, _: &[u8]| -> Result<Vec<BoundingBox>> {
        if file_name == "b.png" {
            Err(LogoEvalError::Detector("inference crashed".to_string()))
        } else {
            Ok(vec![bbox(40, 40, 60, 60)])
        }
    };

    let report = evaluate_from_paths(config_for(&tmp), detector).unwrap();

    assert_eq!(report.stats.detector_failures, 1);
    assert_eq!(report.summary.images_evaluated, 3);
    // a: FP 1, FN 2; b: FN 1 (failure scored as empty); c: TP 1
    assert_eq!(report.summary.true_positives, 1);
    assert_eq!(report.summary.false_positives, 1);
    assert_eq!(report.summary.false_negatives, 3);
}

#[test]
fn test_detector_receives_image_bytes() {
    let tmp = setup_dataset();
    let expected = fs::read(tmp.path().join("images").join("a.png")).unwrap();
    let detector = move |file_name: &str, bytes: &[u8]| -> Result<Vec<BoundingBox>> {
        if file_name == "a.png" {
            assert_eq!(bytes, expected.as_slice());
        }
        Ok(Vec::new())
    };

    evaluate_from_paths(config_for(&tmp), detector).unwrap();
}

#[test]
fn test_overlays_are_written() {
    let tmp = setup_dataset();
    let mut config = config_for(&tmp);
    config.draw_results = true;
    let detector = PredictionTableDetector::load(tmp.path().join("predictions.csv")).unwrap();

    let report = evaluate_from_paths(config, detector).unwrap();

    let overlays = tmp.path().join("overlays");
    for name in ["a.png", "b.png", "c.png"] {
        assert!(overlays.join(name).is_file(), "missing overlay {name}");
    }
    assert!(!overlays.join("missing.png").exists());
    assert_eq!(report.stats.render_failures, 0);
    assert_eq!(report.output_dir.as_deref(), Some(overlays.as_path()));

    let overlay = image::open(overlays.join("a.png")).unwrap().to_rgb8();
    assert_eq!(overlay.get_pixel(20, 25).0, [0, 255, 0]);
}

#[test]
fn test_missing_labels_aborts_before_images() {
    let tmp = setup_dataset();
    let mut config = config_for(&tmp);
    config.labels_path = tmp.path().join("nope.csv");

    let calls = std::cell::Cell::new(0);
    let detector = |_: &str, _: &[u8]| -> Result<Vec<BoundingBox>> {
        calls.set(calls.get() + 1);
        Ok(Vec::new())
    };

    let result = evaluate_from_paths(config, detector);
    assert!(matches!(result, Err(LogoEvalError::Configuration(_))));
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_report_serializes_to_json() {
    let tmp = setup_dataset();
    let evaluator = Evaluator::new(config_for(&tmp), EmptyDetector).unwrap();
    let report = evaluator
        .run(&[Annotation::new("a.png", vec![bbox(0, 0, 10, 10)])])
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["iou_threshold"], 0.5);
    assert_eq!(json["summary"]["false_negatives"], 1);
    assert!(json.get("output_dir").is_none());
}

#[test]
fn test_convert_then_evaluate() {
    let tmp = TempDir::new().unwrap();
    let images = tmp.path().join("images");
    let labels = tmp.path().join("labels");
    fs::create_dir_all(&images).unwrap();
    fs::create_dir_all(&labels).unwrap();

    write_image(&images, "logo.png", 200, 100);
    fs::write(labels.join("logo.txt"), "0 0.5 0.5 0.5 0.5\n0 0.1\n").unwrap();
    fs::write(labels.join("orphan.txt"), "0 0.5 0.5 0.5 0.5\n").unwrap();

    let rows = convert_labels(&labels, &images).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].file_name, "logo.png");
    assert_eq!(rows[0].bbox.to_array(), [50, 25, 150, 75]);

    let table = tmp.path().join("out").join("labels.csv");
    write_label_table(&rows, &table).unwrap();

    let annotations = load_ground_truth(&table).unwrap();
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].boxes, vec![bbox(50, 25, 150, 75)]);

    let config = EvaluationConfig {
        images_dir: images,
        labels_path: table,
        ..EvaluationConfig::default()
    };
    let detector = |_: &str, _: &[u8]| -> Result<Vec<BoundingBox>> { Ok(vec![bbox(50, 25, 150, 75)]) };
    let report = evaluate_from_paths(config, detector).unwrap();
    assert!((report.metrics.f1 - 1.0).abs() < 1e-10);
}
