//! Output-contract builder.
//!
//! Given how many predictions a puzzle requires, produces the contract the
//! request-assembling caller asks a provider to honor: which field names,
//! which cardinality, which presence rules. The extractor reads the same
//! vocabulary (see `extract::structured`), so "structured success" means the
//! same thing on both sides of the provider call.
//!
//! Only the fields the puzzle actually needs are requested: a two-test
//! puzzle never advertises `predictedOutput3`, which would just invite the
//! model to fill it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::ContractViolation;

/// Field requested for a single-prediction puzzle.
pub const SINGLE_PREDICTION_FIELD: &str = "predictedOutput";
/// Prefix for numbered prediction fields (`predictedOutput1..N`).
pub const NUMBERED_PREDICTION_PREFIX: &str = "predictedOutput";
/// Boolean flag paired with the numbered fields.
pub const MULTI_PREDICTION_FLAG: &str = "multiplePredictedOutputs";
/// Array-shaped alternative for multi-prediction puzzles.
pub const PREDICTION_ARRAY_FIELD: &str = "predictedOutputs";
/// Self-reported confidence field (0-100).
pub const CONFIDENCE_FIELD: &str = "confidence";

/// What a provider's structured-output mechanism can actually enforce.
///
/// Providers that cannot pin an array's exact length still get asked for the
/// right shape, but the contract records that cardinality is advisory so the
/// extractor never assumes the provider obeyed it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCapabilities {
    /// Provider supports a structured-output / JSON-schema mechanism at all.
    #[serde(default = "default_true")]
    pub structured_output: bool,
    /// Provider enforces `minItems`/`maxItems` on array fields.
    #[serde(default = "default_true")]
    pub enforces_array_length: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ProviderCapabilities {
    fn default() -> Self {
        Self {
            structured_output: true,
            enforces_array_length: true,
        }
    }
}

/// One acceptable response shape. A contract lists every shape the extractor
/// will treat as structured success for the puzzle at hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ContractShape {
    /// One prediction under a single field.
    SingleField { field: String },
    /// Boolean flag plus one numbered field per test case.
    NumberedFields { flag: String, fields: Vec<String> },
    /// One array field carrying all predictions in test-case order.
    ArrayField { field: String, length: usize },
}

/// The output contract for one puzzle: acceptable shapes plus whether the
/// declared cardinality can be trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDescriptor {
    pub expected_count: usize,
    /// Acceptable shapes, most specific first. The first entry is the one
    /// rendered into the request schema.
    pub shapes: Vec<ContractShape>,
    /// False when the provider cannot enforce exact array length (or has no
    /// structured output at all); the extractor must treat cardinality as
    /// a request, not a guarantee.
    pub strict_cardinality: bool,
}

/// Build the output contract for a puzzle requiring `expected_count`
/// predictions.
///
/// `expected_count == 0` is a caller bug: puzzles always have at least one
/// test case.
pub fn build_output_contract(
    expected_count: usize,
    caps: &ProviderCapabilities,
) -> Result<ContractDescriptor, ContractViolation> {
    if expected_count == 0 {
        return Err(ContractViolation::InvalidExpectedCount(0));
    }

    let shapes = if expected_count == 1 {
        vec![
            ContractShape::SingleField {
                field: SINGLE_PREDICTION_FIELD.to_string(),
            },
            // A one-element array is tolerated shape looseness, so the
            // extractor needs to know it counts as structured success too.
            ContractShape::ArrayField {
                field: PREDICTION_ARRAY_FIELD.to_string(),
                length: 1,
            },
        ]
    } else {
        vec![
            ContractShape::NumberedFields {
                flag: MULTI_PREDICTION_FLAG.to_string(),
                fields: (1..=expected_count)
                    .map(|i| format!("{}{}", NUMBERED_PREDICTION_PREFIX, i))
                    .collect(),
            },
            ContractShape::ArrayField {
                field: PREDICTION_ARRAY_FIELD.to_string(),
                length: expected_count,
            },
        ]
    };

    Ok(ContractDescriptor {
        expected_count,
        shapes,
        strict_cardinality: caps.structured_output && caps.enforces_array_length,
    })
}

impl ContractDescriptor {
    /// Render the contract's primary shape as a JSON Schema for the
    /// request-assembling caller.
    ///
    /// Cardinality constraints (`minItems`/`maxItems`) are only emitted when
    /// the provider enforces them; otherwise the schema requests the shape
    /// and the extractor copes with whatever comes back.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        let mut required: Vec<Value> = Vec::new();

        match &self.shapes[0] {
            ContractShape::SingleField { field } => {
                properties.insert(field.clone(), grid_schema());
                required.push(json!(field));
            }
            ContractShape::NumberedFields { flag, fields } => {
                properties.insert(flag.clone(), json!({ "type": "boolean" }));
                required.push(json!(flag));
                for field in fields {
                    properties.insert(field.clone(), grid_schema());
                    required.push(json!(field));
                }
            }
            ContractShape::ArrayField { field, length } => {
                let mut schema = serde_json::Map::new();
                schema.insert("type".into(), json!("array"));
                schema.insert("items".into(), grid_schema());
                if self.strict_cardinality {
                    schema.insert("minItems".into(), json!(length));
                    schema.insert("maxItems".into(), json!(length));
                }
                properties.insert(field.clone(), Value::Object(schema));
                required.push(json!(field));
            }
        }

        // Confidence is always requested; scoring treats it as optional.
        properties.insert(
            CONFIDENCE_FIELD.to_string(),
            json!({ "type": "integer", "minimum": 0, "maximum": 100 }),
        );

        json!({
            "type": "object",
            "properties": Value::Object(properties),
            "required": Value::Array(required),
        })
    }
}

/// JSON Schema for one grid: array of arrays of integers 0-9.
fn grid_schema() -> Value {
    json!({
        "type": "array",
        "minItems": 1,
        "items": {
            "type": "array",
            "minItems": 1,
            "items": { "type": "integer", "minimum": 0, "maximum": 9 }
        }
    })
}
