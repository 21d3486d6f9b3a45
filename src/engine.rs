//! The extract-and-score facade consumed by the response-handling caller.
//!
//! One pure, synchronous call per (puzzle, response) pair: no I/O, no shared
//! state, no cross-call caches of puzzle data. Callers running many
//! provider requests in flight invoke this concurrently with no
//! coordination; identical inputs always produce identical outputs.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::errors::ContractViolation;
use crate::extract::{extract_with_config, ExtractionOutcome};
use crate::grid::Grid;
use crate::response::RawResponse;
use crate::scoring::{trustworthiness, validate, ValidationOutcome};

/// Everything the caller needs to persist or render for one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub extraction: ExtractionOutcome,
    pub validation: ValidationOutcome,
    /// Calibration score; present only when a confidence claim was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trustworthiness: Option<f64>,
    /// The claim that produced the score, echoed for observability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_claim: Option<u8>,
}

/// Extract predictions from `response` and score them against
/// `ground_truths`, with default configuration.
///
/// An explicit `confidence` argument wins; otherwise the response's own
/// self-reported claim (if any) is used.
pub fn extract_and_score(
    response: &RawResponse,
    expected_count: usize,
    ground_truths: &[Grid],
    confidence: Option<u8>,
) -> Result<Evaluation, ContractViolation> {
    extract_and_score_with_config(
        response,
        expected_count,
        ground_truths,
        confidence,
        &EngineConfig::default(),
    )
}

/// Configurable variant of [`extract_and_score`].
pub fn extract_and_score_with_config(
    response: &RawResponse,
    expected_count: usize,
    ground_truths: &[Grid],
    confidence: Option<u8>,
    config: &EngineConfig,
) -> Result<Evaluation, ContractViolation> {
    if expected_count == 0 {
        return Err(ContractViolation::InvalidExpectedCount(0));
    }
    if ground_truths.len() != expected_count {
        return Err(ContractViolation::GroundTruthMismatch {
            ground_truths: ground_truths.len(),
            slots: expected_count,
        });
    }

    let extraction = extract_with_config(response, expected_count, config)?;
    let validation = validate(&extraction, ground_truths)?;
    let confidence_claim = confidence.or_else(|| response.confidence_claim());
    let trustworthiness = trustworthiness(&validation, confidence_claim);

    Ok(Evaluation {
        extraction,
        validation,
        trustworthiness,
        confidence_claim,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use serde_json::json;

    fn truth(v: serde_json::Value) -> Grid {
        Grid::parse(&v).unwrap()
    }

    #[test]
    fn test_count_mismatch_rejected_before_extraction() {
        let r = RawResponse::new(json!({"predictedOutput": [[1]]}));
        let err = extract_and_score(&r, 2, &[truth(json!([[1]]))], None).unwrap_err();
        assert_eq!(
            err,
            ContractViolation::GroundTruthMismatch {
                ground_truths: 1,
                slots: 2
            }
        );
    }

    #[test]
    fn test_zero_count_rejected() {
        let r = RawResponse::new(json!({}));
        assert_eq!(
            extract_and_score(&r, 0, &[], None).unwrap_err(),
            ContractViolation::InvalidExpectedCount(0)
        );
    }

    #[test]
    fn test_explicit_confidence_beats_response_claim() {
        let r = RawResponse::new(json!({
            "predictedOutput": [[1]],
            "confidence": 10
        }));
        let eval = extract_and_score(&r, 1, &[truth(json!([[1]]))], Some(90)).unwrap();
        assert_eq!(eval.confidence_claim, Some(90));
        assert!((eval.trustworthiness.unwrap() - 0.99).abs() < 1e-12);
    }

    #[test]
    fn test_response_claim_used_when_no_explicit_confidence() {
        let r = RawResponse::new(json!({
            "predictedOutput": [[1]],
            "confidence": 90
        }));
        let eval = extract_and_score(&r, 1, &[truth(json!([[1]]))], None).unwrap();
        assert_eq!(eval.confidence_claim, Some(90));
    }

    #[test]
    fn test_no_confidence_anywhere_leaves_trustworthiness_undefined() {
        let r = RawResponse::new(json!({"predictedOutput": [[1]]}));
        let eval = extract_and_score(&r, 1, &[truth(json!([[1]]))], None).unwrap();
        assert_eq!(eval.trustworthiness, None);
        assert!(eval.validation.all_correct);
    }

    #[test]
    fn test_evaluation_serializes_camel_case() {
        let r = RawResponse::new(json!({"predictedOutput": [[1]], "confidence": 75}));
        let eval = extract_and_score(&r, 1, &[truth(json!([[1]]))], None).unwrap();
        let v = serde_json::to_value(&eval).unwrap();
        assert!(v["validation"]["allCorrect"].as_bool().unwrap());
        assert_eq!(v["confidenceClaim"], 75);
        assert_eq!(
            v["extraction"]["slots"][0]["method"],
            "structuredField"
        );
    }
}
