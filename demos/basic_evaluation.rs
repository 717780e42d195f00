//! Basic evaluation example demonstrating core functionality.

use image::RgbImage;
use logo_eval::{
    load_ground_truth_from_str, match_boxes, metrics::iou::calculate_iou, BoundingBox,
    EvaluationConfig, Evaluator, LogoEvalError,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Logo Detection Evaluation Example ===\n");

    // Example 1: IoU Calculation
    println!("1. IoU Calculation");
    let bbox1 = BoundingBox::new(10, 10, 50, 50)?;
    let bbox2 = BoundingBox::new(30, 30, 70, 70)?;
    let iou = calculate_iou(&bbox1, &bbox2);
    println!("   IoU between overlapping boxes: {:.4}", iou);
    println!();

    // Example 2: Load ground truth
    println!("2. Loading Ground Truth");
    let labels_csv = "filename,x_min,y_min,x_max,y_max\n\
                      shop.png,10,10,40,40\n\
                      shop.png,60,10,90,40\n\
                      street.png,20,20,60,60\n";
    let annotations = load_ground_truth_from_str(labels_csv)?;
    for annotation in &annotations {
        println!("   {} -> {} box(es)", annotation.file_name, annotation.boxes.len());
    }
    println!();

    // Example 3: Matching a single image
    println!("3. Greedy Matching");
    let predicted = vec![
        BoundingBox::new(12, 10, 42, 40)?,
        BoundingBox::new(12, 12, 40, 40)?,
    ];
    let result = match_boxes(&predicted, &annotations[0].boxes, 0.5);
    println!(
        "   TP={} FP={} FN={}",
        result.true_positives, result.false_positives, result.false_negatives
    );
    println!();

    // Example 4: Full run with a closure detector
    println!("4. Running Full Evaluation");
    let images_dir = std::env::temp_dir().join("logo_eval_demo_images");
    std::fs::create_dir_all(&images_dir)?;
    for annotation in &annotations {
        RgbImage::new(100, 100).save(images_dir.join(&annotation.file_name))?;
    }

    let detector = |file_name: &str, _bytes: &[u8]| -> logo_eval::Result<Vec<BoundingBox>> {
        match file_name {
            "shop.png" => Ok(vec![BoundingBox::new(11, 11, 41, 41)?]),
            "street.png" => Ok(vec![
                BoundingBox::new(20, 20, 60, 60)?,
                BoundingBox::new(70, 70, 90, 90)?,
            ]),
            other => Err(LogoEvalError::Detector(format!("unknown image {other}"))),
        }
    };

    let config = EvaluationConfig {
        images_dir: images_dir.clone(),
        ..EvaluationConfig::default()
    };
    let report = Evaluator::new(config, detector)?.run(&annotations)?;
    println!("{report}");

    std::fs::remove_dir_all(&images_dir)?;
    println!("=== Example Complete ===");

    Ok(())
}
