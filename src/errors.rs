//! Domain error types for gridjudge.
//!
//! Almost every anomaly this engine meets is *expected* model behavior
//! (missing predictions, malformed grids, prose instead of JSON) and is
//! absorbed as data (`absent` slots, `is_correct = false`), never raised.
//! The only hard failures are caller contract violations: bugs in the
//! orchestration layer, not in the model's answer. Keeping them as a typed
//! enum lets callers pattern-match the bug class instead of string-probing.

use thiserror::Error;

/// Caller contract violations: programmer errors, not model errors.
///
/// A model that produced nothing usable is represented by empty slots in
/// [`crate::extract::ExtractionOutcome`]; it never surfaces here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    /// A puzzle always has at least one test case, so asking for zero
    /// predictions means the caller lost track of the puzzle definition.
    #[error("expected prediction count must be at least 1 (got {0})")]
    InvalidExpectedCount(usize),

    /// Ground-truth grids and prediction slots must pair up one-to-one.
    #[error("ground truth count {ground_truths} does not match prediction slot count {slots}")]
    GroundTruthMismatch { ground_truths: usize, slots: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_expected_count_display() {
        let e = ContractViolation::InvalidExpectedCount(0);
        assert_eq!(
            e.to_string(),
            "expected prediction count must be at least 1 (got 0)"
        );
    }

    #[test]
    fn test_ground_truth_mismatch_display() {
        let e = ContractViolation::GroundTruthMismatch {
            ground_truths: 3,
            slots: 2,
        };
        assert!(e.to_string().contains('3'));
        assert!(e.to_string().contains('2'));
    }

    #[test]
    fn test_violations_are_comparable() {
        assert_eq!(
            ContractViolation::InvalidExpectedCount(0),
            ContractViolation::InvalidExpectedCount(0)
        );
        assert_ne!(
            ContractViolation::InvalidExpectedCount(0),
            ContractViolation::GroundTruthMismatch {
                ground_truths: 1,
                slots: 2
            }
        );
    }
}
