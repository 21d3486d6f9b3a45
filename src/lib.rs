//! gridjudge: prediction extraction, validation, and scoring for ARC-style
//! grid puzzles.
//!
//! A pure function of (puzzle ground truth, raw model response): build the
//! output contract a puzzle needs, recover predicted grids from whatever the
//! model actually returned, compare them exactly against ground truth, and
//! produce correctness/accuracy/calibration metrics. No HTTP, no storage,
//! no prompts; those belong to the callers.

pub mod config;
pub mod contract;
pub mod engine;
pub mod errors;
pub mod extract;
pub mod grid;
pub mod response;
pub mod scoring;

pub use config::EngineConfig;
pub use contract::{build_output_contract, ContractDescriptor, ContractShape, ProviderCapabilities};
pub use engine::{extract_and_score, extract_and_score_with_config, Evaluation};
pub use errors::ContractViolation;
pub use extract::{extract, extract_with_config, ExtractionMethod, ExtractionOutcome, SlotPrediction};
pub use grid::{is_valid_grid, Grid};
pub use response::RawResponse;
pub use scoring::{trustworthiness, validate, ValidationOutcome};
