//! Greedy matching of predicted boxes to ground-truth boxes for one image.

use crate::error::{LogoEvalError, Result};
use crate::metrics::iou::calculate_iou;
use crate::types::{BoundingBox, MatchResult};

/// Default IoU threshold for a true positive.
pub const DEFAULT_IOU_THRESHOLD: f64 = 0.5;

/// Matching outcome for a single predicted box.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxMatch {
    /// Index of the prediction in detector order.
    pub prediction_index: usize,
    /// Ground-truth box with the highest IoU, whether or not it was claimed.
    pub best_truth_index: Option<usize>,
    /// IoU with `best_truth_index` (0.0 when there is no ground truth).
    pub iou: f64,
    pub is_true_positive: bool,
}

/// Check that an IoU threshold lies in `[0, 1]`.
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(LogoEvalError::InvalidThreshold(format!(
            "IoU threshold must be within [0, 1], got {threshold}"
        )));
    }
    Ok(())
}

/// Match predictions to ground truth for a single image.
///
/// Predictions are visited in the order the detector returned them. Each one
/// looks at every ground-truth box, consumed or not, and takes the one with
/// the highest IoU (first in `truth` order on ties). It counts as a true
/// positive only if that IoU reaches `iou_threshold` and the box has not been
/// consumed by an earlier prediction; otherwise it is a false positive.
/// Ground-truth boxes left unconsumed are false negatives.
///
/// The assignment is greedy and not globally optimal: a prediction whose best
/// box is already taken does not fall back to its second-best box. Reported
/// numbers depend on this exact rule.
///
/// # Example
///
/// ```
/// use logo_eval::matching::match_boxes;
/// use logo_eval::types::BoundingBox;
///
/// let truth = vec![
///     BoundingBox::new(0, 0, 10, 10).unwrap(),
///     BoundingBox::new(20, 20, 30, 30).unwrap(),
/// ];
/// let predicted = vec![truth[0], truth[0]];
///
/// let result = match_boxes(&predicted, &truth, 0.5);
/// assert_eq!(
///     (result.true_positives, result.false_positives, result.false_negatives),
///     (1, 1, 1)
/// );
/// ```
pub fn match_boxes(predicted: &[BoundingBox], truth: &[BoundingBox], iou_threshold: f64) -> MatchResult {
    let matches = match_boxes_detailed(predicted, truth, iou_threshold);
    summarize(&matches, truth.len())
}

/// Like [`match_boxes`], but returns the per-prediction decisions.
pub fn match_boxes_detailed(
    predicted: &[BoundingBox],
    truth: &[BoundingBox],
    iou_threshold: f64,
) -> Vec<BoxMatch> {
    if truth.is_empty() {
        return (0..predicted.len())
            .map(|prediction_index| BoxMatch {
                prediction_index,
                best_truth_index: None,
                iou: 0.0,
                is_true_positive: false,
            })
            .collect();
    }

    let mut consumed = vec![false; truth.len()];
    let mut matches = Vec::with_capacity(predicted.len());

    for (prediction_index, pred_box) in predicted.iter().enumerate() {
        let mut best: Option<(usize, f64)> = None;
        for (truth_index, truth_box) in truth.iter().enumerate() {
            let iou = calculate_iou(pred_box, truth_box);
            // Strict comparison keeps the first box on ties.
            if best.map_or(true, |(_, best_iou)| iou > best_iou) {
                best = Some((truth_index, iou));
            }
        }

        let (best_truth_index, best_iou) = match best {
            Some((idx, iou)) => (Some(idx), iou),
            None => (None, 0.0),
        };

        let is_true_positive = match best_truth_index {
            Some(idx) if best_iou >= iou_threshold && !consumed[idx] => {
                consumed[idx] = true;
                true
            }
            _ => false,
        };

        matches.push(BoxMatch {
            prediction_index,
            best_truth_index,
            iou: best_iou,
            is_true_positive,
        });
    }

    matches
}

/// Collapse per-prediction decisions into TP/FP/FN counts.
pub fn summarize(matches: &[BoxMatch], truth_count: usize) -> MatchResult {
    let true_positives = matches.iter().filter(|m| m.is_true_positive).count();
    MatchResult {
        true_positives,
        false_positives: matches.len() - true_positives,
        false_negatives: truth_count - true_positives,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x1: u32, y1: u32, x2: u32, y2: u32) -> BoundingBox {
        BoundingBox::new(x1, y1, x2, y2).unwrap()
    }

    fn counts(r: MatchResult) -> (usize, usize, usize) {
        (r.true_positives, r.false_positives, r.false_negatives)
    }

    #[test]
    fn test_perfect_match() {
        let truth = vec![bbox(0, 0, 10, 10)];
        let predicted = vec![bbox(0, 0, 10, 10)];
        assert_eq!(counts(match_boxes(&predicted, &truth, 0.5)), (1, 0, 0));
    }

    #[test]
    fn test_no_predictions() {
        let truth = vec![bbox(0, 0, 10, 10)];
        assert_eq!(counts(match_boxes(&[], &truth, 0.5)), (0, 0, 1));
    }

    #[test]
    fn test_no_ground_truth() {
        let predicted = vec![bbox(0, 0, 10, 10)];
        assert_eq!(counts(match_boxes(&predicted, &[], 0.5)), (0, 1, 0));
    }

    #[test]
    fn test_both_empty() {
        assert_eq!(counts(match_boxes(&[], &[], 0.5)), (0, 0, 0));
    }

    #[test]
    fn test_duplicate_prediction_is_false_positive() {
        let truth = vec![bbox(0, 0, 10, 10), bbox(20, 20, 30, 30)];
        let predicted = vec![bbox(0, 0, 10, 10), bbox(0, 0, 10, 10)];

        let matches = match_boxes_detailed(&predicted, &truth, 0.5);
        assert!(matches[0].is_true_positive);
        assert!(!matches[1].is_true_positive);
        assert_eq!(matches[1].best_truth_index, Some(0));
        assert_eq!(counts(summarize(&matches, truth.len())), (1, 1, 1));
    }

    #[test]
    fn test_below_threshold() {
        let truth = vec![bbox(0, 0, 10, 10)];
        let predicted = vec![bbox(5, 5, 15, 15)];
        assert_eq!(counts(match_boxes(&predicted, &truth, 0.5)), (0, 1, 1));
        assert_eq!(counts(match_boxes(&predicted, &truth, 0.1)), (1, 0, 0));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let truth = vec![bbox(0, 0, 10, 10)];
        let predicted = vec![bbox(0, 0, 5, 10)];
        assert_eq!(counts(match_boxes(&predicted, &truth, 0.5)), (1, 0, 0));
    }

    #[test]
    fn test_tie_goes_to_first_truth_box() {
        // Prediction overlaps both truth boxes by the same amount.
        let truth = vec![bbox(0, 0, 10, 10), bbox(10, 0, 20, 10)];
        let predicted = vec![bbox(5, 0, 15, 10)];

        let matches = match_boxes_detailed(&predicted, &truth, 0.3);
        assert_eq!(matches[0].best_truth_index, Some(0));
        assert!(matches[0].is_true_positive);
    }

    #[test]
    fn test_greedy_does_not_fall_back_to_second_best() {
        // The first prediction takes box A. The second ties between A and B,
        // picks A, and is a false positive even though B is free.
        let truth = vec![bbox(0, 0, 10, 10), bbox(2, 0, 12, 10)];
        let predicted = vec![bbox(0, 0, 10, 10), bbox(1, 0, 11, 10)];

        let result = match_boxes(&predicted, &truth, 0.5);
        assert_eq!(counts(result), (1, 1, 1));
    }

    #[test]
    fn test_earlier_prediction_claims_the_box() {
        let truth = vec![bbox(0, 0, 10, 10)];
        let loose = bbox(0, 0, 8, 10);
        let exact = bbox(0, 0, 10, 10);

        let matches = match_boxes_detailed(&[loose, exact], &truth, 0.5);
        assert!(matches[0].is_true_positive);
        assert!(!matches[1].is_true_positive);

        let matches = match_boxes_detailed(&[exact, loose], &truth, 0.5);
        assert!(matches[0].is_true_positive);
        assert!(!matches[1].is_true_positive);
    }

    #[test]
    fn test_validate_threshold() {
        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(1.0).is_ok());
        assert!(validate_threshold(-0.1).is_err());
        assert!(validate_threshold(1.5).is_err());
        assert!(validate_threshold(f64::NAN).is_err());
    }
}
