//! Raw model response wrapper.
//!
//! Whatever a provider returned arrives here as one loosely-typed
//! `serde_json::Value`: a well-formed object honoring the contract, an
//! object with alternate field names, a provider metadata wrapper carrying a
//! duplicate payload, a bare grid, or plain prose. `RawResponse` owns that
//! value and gives the extraction strategies the few accessors they need;
//! it never judges validity itself.

use serde_json::Value;

/// Wrapper keys under which providers nest a duplicate/alternate copy of the
/// payload. Checked in order.
const SECONDARY_PAYLOAD_KEYS: &[&str] = &[
    "providerRawResponse",
    "rawResponse",
    "providerResponse",
    "raw",
];

/// Field names under which models self-report confidence.
const CONFIDENCE_KEYS: &[&str] = &["confidence", "confidenceLevel", "confidence_level"];

/// An opaque model/provider response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    value: Value,
}

impl RawResponse {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Wrap a plain-text response (no JSON structure at all).
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            value: Value::String(text.into()),
        }
    }

    /// Parse a response body as JSON. Callers with possibly-non-JSON bodies
    /// should fall back to [`RawResponse::from_text`] on error.
    pub fn from_json_str(body: &str) -> serde_json::Result<Self> {
        Ok(Self {
            value: serde_json::from_str(body)?,
        })
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The alternate/raw copy of the provider payload, if one is nested
    /// under a known wrapper key.
    ///
    /// Some providers double-encode: the wrapper holds a *string* whose
    /// content is itself JSON. That one level of re-parsing happens here so
    /// the structured strategies only ever see values.
    pub fn secondary_payload(&self) -> Option<Value> {
        let obj = self.value.as_object()?;
        for key in SECONDARY_PAYLOAD_KEYS {
            match obj.get(*key) {
                Some(Value::String(s)) => {
                    if let Ok(parsed) = serde_json::from_str::<Value>(s) {
                        if parsed.is_object() || parsed.is_array() {
                            return Some(parsed);
                        }
                    }
                }
                Some(v @ Value::Object(_)) | Some(v @ Value::Array(_)) => {
                    return Some(v.clone());
                }
                _ => {}
            }
        }
        None
    }

    /// Every free-text field in the response, in a stable traversal order.
    ///
    /// This is what the mining scanners get to work with: rationale fields,
    /// strategy descriptions, even a double-encoded payload string. Any of
    /// them may carry a grid rendered as bracketed text.
    pub fn text_fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_strings(&self.value, &mut out);
        out
    }

    /// The model's self-reported confidence, normalized to an integer
    /// `0..=100`.
    ///
    /// Accepts integers, floats (values in `[0,1]` are read as fractions),
    /// and numeric strings with an optional trailing `%`. Out-of-range
    /// values clamp; absence stays absent.
    pub fn confidence_claim(&self) -> Option<u8> {
        let obj = self.value.as_object()?;
        for key in CONFIDENCE_KEYS {
            if let Some(v) = obj.get(*key) {
                if let Some(c) = normalize_confidence(v) {
                    return Some(c);
                }
            }
        }
        None
    }
}

fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => {
            // Shorter than the smallest possible grid rendering "[[0]]".
            if s.len() >= 5 {
                out.push(s);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_strings(item, out);
            }
        }
        Value::Object(map) => {
            for (_, v) in map {
                collect_strings(v, out);
            }
        }
        _ => {}
    }
}

fn normalize_confidence(value: &Value) -> Option<u8> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_u64() {
                return Some(i.min(100) as u8);
            }
            let f = n.as_f64()?;
            if !f.is_finite() || f < 0.0 {
                return None;
            }
            // Fractional confidence ("0.85") scales to percent.
            let pct = if f <= 1.0 { f * 100.0 } else { f };
            Some(pct.round().min(100.0) as u8)
        }
        Value::String(s) => {
            let trimmed = s.trim().trim_end_matches('%').trim();
            let f: f64 = trimmed.parse().ok()?;
            normalize_confidence(&serde_json::json!(f))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_secondary_payload_object() {
        let r = RawResponse::new(json!({
            "predictedOutput": null,
            "providerRawResponse": { "predictedOutput": [[1]] }
        }));
        let secondary = r.secondary_payload().unwrap();
        assert_eq!(secondary["predictedOutput"], json!([[1]]));
    }

    #[test]
    fn test_secondary_payload_double_encoded_string() {
        let r = RawResponse::new(json!({
            "rawResponse": "{\"predictedOutput\": [[2, 3]]}"
        }));
        let secondary = r.secondary_payload().unwrap();
        assert_eq!(secondary["predictedOutput"], json!([[2, 3]]));
    }

    #[test]
    fn test_secondary_payload_absent() {
        assert!(RawResponse::new(json!({"answer": [[1]]}))
            .secondary_payload()
            .is_none());
        assert!(RawResponse::from_text("no structure here at all")
            .secondary_payload()
            .is_none());
        // A wrapper string that isn't JSON is just text, not a payload.
        assert!(RawResponse::new(json!({"raw": "plain prose"}))
            .secondary_payload()
            .is_none());
    }

    #[test]
    fn test_text_fields_walks_nested_values() {
        let r = RawResponse::new(json!({
            "patternDescription": "mirror the grid",
            "meta": { "solvingStrategy": "the answer is [[0,1],[1,0]]" },
            "confidence": 80,
            "steps": ["first invert", "then transpose rows"]
        }));
        let texts = r.text_fields();
        assert_eq!(texts.len(), 4);
        assert!(texts.iter().any(|t| t.contains("mirror")));
        assert!(texts.iter().any(|t| t.contains("[[0,1],[1,0]]")));
    }

    #[test]
    fn test_text_fields_of_plain_text_response() {
        let r = RawResponse::from_text("output: [[1,2],[3,4]]");
        assert_eq!(r.text_fields(), vec!["output: [[1,2],[3,4]]"]);
    }

    #[test]
    fn test_confidence_integer_and_clamp() {
        assert_eq!(
            RawResponse::new(json!({"confidence": 85})).confidence_claim(),
            Some(85)
        );
        assert_eq!(
            RawResponse::new(json!({"confidence": 250})).confidence_claim(),
            Some(100)
        );
    }

    #[test]
    fn test_confidence_fraction_scales() {
        assert_eq!(
            RawResponse::new(json!({"confidence": 0.85})).confidence_claim(),
            Some(85)
        );
        assert_eq!(
            RawResponse::new(json!({"confidence": 1.0})).confidence_claim(),
            Some(100)
        );
    }

    #[test]
    fn test_confidence_string_and_percent_sign() {
        assert_eq!(
            RawResponse::new(json!({"confidence": "90"})).confidence_claim(),
            Some(90)
        );
        assert_eq!(
            RawResponse::new(json!({"confidenceLevel": "72%"})).confidence_claim(),
            Some(72)
        );
    }

    #[test]
    fn test_confidence_absent_or_garbage() {
        assert_eq!(RawResponse::new(json!({})).confidence_claim(), None);
        assert_eq!(
            RawResponse::new(json!({"confidence": "very high"})).confidence_claim(),
            None
        );
        assert_eq!(
            RawResponse::new(json!({"confidence": -3})).confidence_claim(),
            None
        );
    }
}
