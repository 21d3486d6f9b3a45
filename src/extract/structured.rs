//! Structured-field extraction (strategies 1 and 2).
//!
//! Probes a payload for the shapes the output contract vocabulary describes
//! (numbered fields, a prediction array, index-tagged objects, a single
//! field), plus the fixed alias set models actually use when they ignore the
//! requested names. The heterogeneous payload is classified into
//! [`StructuredShape`] variants first, then each variant is consumed by
//! exhaustive match, so acceptance logic per shape is testable in isolation.

use serde_json::{Map, Value};

use super::{grids_from_value, ExtractionMethod, ExtractionOutcome};
use crate::config::EngineConfig;
use crate::contract::SINGLE_PREDICTION_FIELD;
use crate::grid::Grid;

/// Alternate names meaning "the answer", beyond the contract's own field.
const SINGLE_FIELD_ALIASES: &[&str] = &[
    "predicted_output",
    "prediction",
    "output",
    "answer",
    "solution",
    "result",
    "grid",
];

/// Names for the array-of-predictions field.
const ARRAY_FIELD_ALIASES: &[&str] = &[
    "predictedOutputs",
    "predicted_outputs",
    "predictions",
    "outputs",
    "answers",
    "solutions",
];

/// Prefixes for numbered per-case fields (`predictedOutput2`, `answer2`, ...).
const NUMBERED_PREFIXES: &[&str] = &["predictedOutput", "prediction", "output", "answer"];

/// Keys under which a tagged object declares which test case it answers.
const TAGGED_INDEX_KEYS: &[&str] = &["index", "testCase", "test_case", "caseIndex", "case_index"];

/// The response shapes structured extraction understands, most specific
/// first. One payload can exhibit several at once (e.g. numbered fields
/// *and* a stray single field); they are consumed in declaration order and
/// only ever fill slots still empty.
#[derive(Debug)]
enum StructuredShape<'a> {
    /// `(slot, candidate)` pairs from numbered fields, already 0-based.
    Numbered(Vec<(usize, &'a Value)>),
    /// Array elements answering test cases positionally.
    ArrayField(&'a [Value]),
    /// Array of objects each declaring its own test-case index.
    Tagged(&'a [Value]),
    /// One field holding one candidate.
    Single(&'a Value),
    /// The payload itself is the prediction (bare grid or bare array).
    Bare(&'a Value),
}

/// Probe `payload` and fill whatever empty slots it can.
///
/// `tag_override` is set when probing the secondary provider payload so the
/// slot metadata records *where* the grid came from rather than which
/// sub-shape matched.
pub(crate) fn extract_into(
    outcome: &mut ExtractionOutcome,
    payload: &Value,
    config: &EngineConfig,
    tag_override: Option<ExtractionMethod>,
) {
    let expected = outcome.len();
    for shape in classify(payload, expected, config) {
        match shape {
            StructuredShape::Numbered(pairs) => {
                for (slot, value) in pairs {
                    try_fill(
                        outcome,
                        slot,
                        value,
                        tag_override.unwrap_or(ExtractionMethod::StructuredField),
                    );
                }
            }
            StructuredShape::ArrayField(items) => {
                fill_positional(
                    outcome,
                    items,
                    tag_override.unwrap_or(ExtractionMethod::StructuredArray),
                );
            }
            StructuredShape::Tagged(items) => {
                fill_tagged(
                    outcome,
                    items,
                    config,
                    tag_override.unwrap_or(ExtractionMethod::TaggedObject),
                );
            }
            StructuredShape::Single(value) => {
                if let Some(slot) = outcome.first_empty() {
                    try_fill(
                        outcome,
                        slot,
                        value,
                        tag_override.unwrap_or(ExtractionMethod::StructuredField),
                    );
                }
            }
            StructuredShape::Bare(value) => {
                let grids = grids_from_value(value);
                fill_in_order(
                    outcome,
                    grids,
                    tag_override.unwrap_or(ExtractionMethod::StructuredArray),
                );
            }
        }
    }
}

fn classify<'a>(
    payload: &'a Value,
    expected: usize,
    config: &EngineConfig,
) -> Vec<StructuredShape<'a>> {
    let mut shapes = Vec::new();

    let map = match payload {
        Value::Object(map) => map,
        Value::Array(items) => {
            if is_tagged_array(items) {
                shapes.push(StructuredShape::Tagged(items.as_slice()));
            } else {
                shapes.push(StructuredShape::Bare(payload));
            }
            return shapes;
        }
        _ => return shapes,
    };

    // Numbered fields: predictedOutput1..N and alias variants.
    let mut numbered: Vec<(usize, &Value)> = Vec::new();
    for slot in 0..expected {
        if let Some(value) = numbered_field(map, slot + 1, config) {
            numbered.push((slot, value));
        }
    }
    if !numbered.is_empty() {
        shapes.push(StructuredShape::Numbered(numbered));
    }

    // Array / tagged-object fields.
    for name in array_field_names(config) {
        if let Some(Value::Array(items)) = map.get(name) {
            if is_tagged_array(items) {
                shapes.push(StructuredShape::Tagged(items.as_slice()));
            } else {
                shapes.push(StructuredShape::ArrayField(items.as_slice()));
            }
        }
    }

    // Single fields. A single-alias field holding an array *of grids* is the
    // array shape wearing the wrong name; reroute it so positional mapping
    // and the one-element looseness rule still apply.
    for name in single_field_names(config) {
        match map.get(name) {
            Some(value @ Value::Array(_)) => {
                if Grid::parse(value).is_some() {
                    shapes.push(StructuredShape::Single(value));
                } else if let Value::Array(items) = value {
                    if is_tagged_array(items) {
                        shapes.push(StructuredShape::Tagged(items.as_slice()));
                    } else {
                        shapes.push(StructuredShape::ArrayField(items.as_slice()));
                    }
                }
            }
            Some(value) => shapes.push(StructuredShape::Single(value)),
            None => {}
        }
    }

    shapes
}

/// A tagged array is non-empty and every element is an object carrying an
/// index key.
fn is_tagged_array(items: &[Value]) -> bool {
    !items.is_empty()
        && items.iter().all(|item| {
            item.as_object()
                .map(|obj| TAGGED_INDEX_KEYS.iter().any(|k| obj.contains_key(*k)))
                .unwrap_or(false)
        })
}

fn numbered_field<'a>(
    map: &'a Map<String, Value>,
    number: usize,
    config: &EngineConfig,
) -> Option<&'a Value> {
    for prefix in NUMBERED_PREFIXES
        .iter()
        .copied()
        .chain(config.extra_field_aliases.iter().map(String::as_str))
    {
        if let Some(value) = map.get(&format!("{}{}", prefix, number)) {
            return Some(value);
        }
    }
    None
}

fn single_field_names(config: &EngineConfig) -> impl Iterator<Item = &str> {
    std::iter::once(SINGLE_PREDICTION_FIELD)
        .chain(SINGLE_FIELD_ALIASES.iter().copied())
        .chain(config.extra_field_aliases.iter().map(String::as_str))
}

fn array_field_names(config: &EngineConfig) -> impl Iterator<Item = &str> {
    ARRAY_FIELD_ALIASES
        .iter()
        .copied()
        .chain(config.extra_field_aliases.iter().map(String::as_str))
}

/// Validate and place a candidate into a specific slot.
fn try_fill(
    outcome: &mut ExtractionOutcome,
    slot: usize,
    value: &Value,
    method: ExtractionMethod,
) -> bool {
    match Grid::parse(value) {
        Some(grid) => outcome.fill(slot, grid, method),
        None => false,
    }
}

/// Array elements answer test cases by position: element `j` goes to slot
/// `j`. Valid elements beyond the slot count are truncated and counted.
fn fill_positional(outcome: &mut ExtractionOutcome, items: &[Value], method: ExtractionMethod) {
    let expected = outcome.len();
    for (position, item) in items.iter().enumerate() {
        if position >= expected {
            if Grid::parse(item).is_some() {
                outcome.truncated_candidates += 1;
            }
            continue;
        }
        try_fill(outcome, position, item, method);
    }
}

/// Mined or bare grids have no positional meaning; they fill empty slots in
/// encounter order.
fn fill_in_order(outcome: &mut ExtractionOutcome, grids: Vec<Grid>, method: ExtractionMethod) {
    for grid in grids {
        match outcome.first_empty() {
            Some(slot) => {
                outcome.fill(slot, grid, method);
            }
            None => {
                outcome.truncated_candidates += 1;
            }
        }
    }
}

/// Tagged objects name their own test case, so assignment is by declared
/// index, not array position; models emit these out of order.
fn fill_tagged(
    outcome: &mut ExtractionOutcome,
    items: &[Value],
    config: &EngineConfig,
    method: ExtractionMethod,
) {
    // Indices are 1-based unless the array uses an explicit zero.
    let base = if items.iter().any(|i| tagged_index(i) == Some(0)) {
        0
    } else {
        1
    };

    for item in items {
        let obj = match item.as_object() {
            Some(obj) => obj,
            None => continue,
        };
        let index = match tagged_index(item) {
            Some(i) => i,
            None => continue,
        };
        let slot = match index.checked_sub(base) {
            Some(slot) if slot < outcome.len() => slot,
            _ => continue,
        };
        for name in single_field_names(config) {
            if let Some(value) = obj.get(name) {
                if try_fill(outcome, slot, value, method) {
                    break;
                }
            }
        }
    }
}

fn tagged_index(item: &Value) -> Option<usize> {
    let obj = item.as_object()?;
    for key in TAGGED_INDEX_KEYS {
        if let Some(n) = obj.get(*key).and_then(Value::as_u64) {
            return Some(n as usize);
        }
    }
    None
}
