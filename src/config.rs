//! Engine configuration.
//!
//! All structs use `#[serde(rename_all = "camelCase")]` so that JSON config
//! files use camelCase keys while Rust code uses snake_case fields. Every
//! field has a default; `EngineConfig::default()` is what the convenience
//! entry points use.

use serde::{Deserialize, Serialize};

/// Tunables for extraction. None of these affect scoring arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Emit a `warn!` (instead of `debug!`) when a response supplies more
    /// valid candidate grids than the puzzle has test cases.
    #[serde(default)]
    pub warn_on_excess_candidates: bool,

    /// Upper bound on how much of each free-text field the mining scanners
    /// will look at. Keeps extraction cost proportional to a known cap even
    /// when a model rambles for megabytes.
    #[serde(default = "default_max_text_scan_bytes")]
    pub max_text_scan_bytes: usize,

    /// Additional structured field names accepted alongside the built-in
    /// vocabulary (`predictedOutput`, `answer`, `solution`, ...).
    #[serde(default)]
    pub extra_field_aliases: Vec<String>,
}

fn default_max_text_scan_bytes() -> usize {
    256 * 1024
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            warn_on_excess_candidates: false,
            max_text_scan_bytes: default_max_text_scan_bytes(),
            extra_field_aliases: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::default();
        assert!(!cfg.warn_on_excess_candidates);
        assert_eq!(cfg.max_text_scan_bytes, 256 * 1024);
        assert!(cfg.extra_field_aliases.is_empty());
    }

    #[test]
    fn test_deserializes_from_empty_object() {
        let cfg: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.max_text_scan_bytes, 256 * 1024);
    }

    #[test]
    fn test_deserializes_camel_case_keys() {
        let cfg: EngineConfig = serde_json::from_str(
            r#"{"warnOnExcessCandidates": true, "maxTextScanBytes": 1024, "extraFieldAliases": ["finalGrid"]}"#,
        )
        .unwrap();
        assert!(cfg.warn_on_excess_candidates);
        assert_eq!(cfg.max_text_scan_bytes, 1024);
        assert_eq!(cfg.extra_field_aliases, vec!["finalGrid".to_string()]);
    }
}
