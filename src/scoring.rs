//! Scoring: per-case correctness, puzzle-level accuracy, and the
//! confidence-calibration score.
//!
//! Absent predictions and absent confidence are valid, representable
//! states: they propagate as `is_correct = false` and `trustworthiness =
//! None` respectively, never as errors and never as fake zeros. The only `Err`
//! here is a ground-truth count that doesn't match the slot count, which is
//! a caller bug and fails loudly.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ContractViolation;
use crate::extract::ExtractionOutcome;
use crate::grid::Grid;

/// Correctness verdict for one puzzle evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    /// Exact-match verdict per test case; absent predictions are incorrect.
    pub case_correct: Vec<bool>,
    pub correct_count: usize,
    /// AND over all test cases.
    pub all_correct: bool,
    /// `correct_count / case count`, unrounded. 1 of 3 correct is 0.333…,
    /// not 0 and not 1.
    pub average_accuracy: f64,
}

/// Compare each slot against its ground truth.
///
/// Ground truths are borrowed from the puzzle definition and trusted as
/// already valid; this engine never re-validates them.
pub fn validate(
    outcome: &ExtractionOutcome,
    ground_truths: &[Grid],
) -> Result<ValidationOutcome, ContractViolation> {
    if ground_truths.len() != outcome.len() {
        return Err(ContractViolation::GroundTruthMismatch {
            ground_truths: ground_truths.len(),
            slots: outcome.len(),
        });
    }

    let case_correct: Vec<bool> = outcome
        .slots
        .iter()
        .zip(ground_truths)
        .map(|(slot, truth)| slot.grid.as_ref() == Some(truth))
        .collect();

    let correct_count = case_correct.iter().filter(|&&c| c).count();
    let total = case_correct.len();
    let validation = ValidationOutcome {
        all_correct: correct_count == total,
        average_accuracy: correct_count as f64 / total as f64,
        case_correct,
        correct_count,
    };
    debug!(
        correct = correct_count,
        total,
        accuracy = validation.average_accuracy,
        "validated predictions"
    );
    Ok(validation)
}

/// Calibration score in `[0,1]` for a self-reported confidence claim.
///
/// Per test case: `1 - ((confidence/100) - actual)^2` with `actual` 0 or 1,
/// averaged across cases. Confident-and-correct scores near 1, confident-
/// and-wrong near 0.19 for a 90 claim, and a 50 claim lands at 0.75 either
/// way: admitting uncertainty is neither rewarded nor punished much.
///
/// `None` when no confidence was claimed: absence propagates rather than
/// masquerading as poor calibration.
pub fn trustworthiness(validation: &ValidationOutcome, confidence: Option<u8>) -> Option<f64> {
    let confidence = confidence?;
    let stated = f64::from(confidence.min(100)) / 100.0;
    let total = validation.case_correct.len();
    if total == 0 {
        return None;
    }
    let sum: f64 = validation
        .case_correct
        .iter()
        .map(|&correct| {
            let actual = if correct { 1.0 } else { 0.0 };
            1.0 - (stated - actual).powi(2)
        })
        .sum();
    Some(sum / total as f64)
}
