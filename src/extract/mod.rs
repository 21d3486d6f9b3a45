//! Prediction extraction: recover grids from a raw model response.
//!
//! Strategies run in fixed priority order (structured fields, the secondary
//! provider payload, then free-text mining) and are mutually exclusive *per
//! slot*, not per call: a strategy only ever fills slots the earlier ones
//! left empty. Grids that were found are never discarded because other slots
//! stayed empty; silently dropping partial answers is a data-integrity
//! defect, not strictness.

pub(crate) mod mining;
pub(crate) mod structured;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::errors::ContractViolation;
use crate::grid::Grid;
use crate::response::RawResponse;

/// Which strategy produced a slot's grid. Diagnostic metadata: scoring never
/// reads it, observability and regression tests do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtractionMethod {
    /// Named field from the contract vocabulary (single or numbered).
    StructuredField,
    /// Positional element of a prediction-array field.
    StructuredArray,
    /// Object carrying an explicit test-case index.
    TaggedObject,
    /// Any structured shape, found in the alternate provider payload.
    SecondaryPayload,
    /// JSON inside a fenced code block in free text.
    FencedCodeBlock,
    /// Bracketed literal following "output:" / "answer:" and friends.
    KeywordAnchor,
    /// Raw `[[`-anchored bracket matching in free text.
    BracketScan,
}

impl ExtractionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionMethod::StructuredField => "structuredField",
            ExtractionMethod::StructuredArray => "structuredArray",
            ExtractionMethod::TaggedObject => "taggedObject",
            ExtractionMethod::SecondaryPayload => "secondaryPayload",
            ExtractionMethod::FencedCodeBlock => "fencedCodeBlock",
            ExtractionMethod::KeywordAnchor => "keywordAnchor",
            ExtractionMethod::BracketScan => "bracketScan",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One prediction slot: a recovered grid plus the strategy that found it, or
/// absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotPrediction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<Grid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<ExtractionMethod>,
}

impl SlotPrediction {
    const fn absent() -> Self {
        Self {
            grid: None,
            method: None,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.grid.is_some()
    }
}

/// Result of running the extraction strategies for one puzzle: exactly one
/// slot per expected prediction, each either a valid grid or absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionOutcome {
    pub slots: Vec<SlotPrediction>,
    /// Valid candidates found beyond the puzzle's test-case count and
    /// dropped in encounter order. Nonzero means the model over-answered.
    pub truncated_candidates: usize,
}

impl ExtractionOutcome {
    fn empty(expected: usize) -> Self {
        Self {
            slots: vec![SlotPrediction::absent(); expected],
            truncated_candidates: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_filled()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|s| s.is_filled())
    }

    /// Fill a slot if it is still empty. Returns whether the grid was taken.
    pub(crate) fn fill(&mut self, slot: usize, grid: Grid, method: ExtractionMethod) -> bool {
        match self.slots.get_mut(slot) {
            Some(s) if !s.is_filled() => {
                debug!(slot, method = %method, grid = %grid, "recovered prediction");
                s.grid = Some(grid);
                s.method = Some(method);
                true
            }
            _ => false,
        }
    }

    /// Index of the first empty slot, if any.
    pub(crate) fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(|s| !s.is_filled())
    }
}

/// Interpret a candidate value as grids: either one grid, or an array of
/// grids. Anything else contributes nothing.
pub(crate) fn grids_from_value(value: &Value) -> Vec<Grid> {
    if let Some(grid) = Grid::parse(value) {
        return vec![grid];
    }
    match value.as_array() {
        Some(items) => items.iter().filter_map(Grid::parse).collect(),
        None => Vec::new(),
    }
}

/// Run the ordered extraction strategies with default configuration.
pub fn extract(
    response: &RawResponse,
    expected_count: usize,
) -> Result<ExtractionOutcome, ContractViolation> {
    extract_with_config(response, expected_count, &EngineConfig::default())
}

/// Run the ordered extraction strategies.
///
/// Always returns an outcome of exactly `expected_count` slots; a response
/// with nothing recoverable yields all-absent slots, not an error. The only
/// `Err` is the caller asking for zero predictions.
pub fn extract_with_config(
    response: &RawResponse,
    expected_count: usize,
    config: &EngineConfig,
) -> Result<ExtractionOutcome, ContractViolation> {
    if expected_count == 0 {
        return Err(ContractViolation::InvalidExpectedCount(0));
    }

    let mut outcome = ExtractionOutcome::empty(expected_count);

    // Strategy 1: structured fields on the primary payload.
    structured::extract_into(&mut outcome, response.value(), config, None);

    // Strategy 2: same probing against the alternate provider payload.
    if !outcome.is_complete() {
        if let Some(secondary) = response.secondary_payload() {
            structured::extract_into(
                &mut outcome,
                &secondary,
                config,
                Some(ExtractionMethod::SecondaryPayload),
            );
        }
    }

    // Strategy 3: mine free-text fields, filling remaining slots in order
    // of appearance.
    if !outcome.is_complete() {
        let texts = response.text_fields();
        let mut mined = mining::mine_texts(&texts, config).into_iter();
        while let Some(slot) = outcome.first_empty() {
            match mined.next() {
                Some(found) => {
                    outcome.fill(slot, found.grid, found.method);
                }
                None => break,
            }
        }
        outcome.truncated_candidates += mined.count();
    }

    if outcome.truncated_candidates > 0 {
        if config.warn_on_excess_candidates {
            warn!(
                excess = outcome.truncated_candidates,
                expected = expected_count,
                "response supplied more valid grids than the puzzle has test cases"
            );
        } else {
            debug!(
                excess = outcome.truncated_candidates,
                expected = expected_count,
                "truncated excess candidate grids"
            );
        }
    }

    debug!(
        filled = outcome.filled_count(),
        expected = expected_count,
        "extraction finished"
    );
    Ok(outcome)
}
