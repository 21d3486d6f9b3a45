//! Free-text mining (strategy 3).
//!
//! When the structured strategies come up short, the remaining slots are
//! hunted for in prose: rationale fields, strategy descriptions, or a
//! response that is nothing but text. Three independent scanners run in
//! fixed order (fenced code blocks, keyword-anchored literals, raw bracket
//! matching) and every candidate passes the grid validator before it
//! counts. Scan cost is bounded by `max_text_scan_bytes` per field.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::{grids_from_value, ExtractionMethod};
use crate::config::EngineConfig;
use crate::grid::Grid;

/// Keyword anchor: "output", "answer", etc., followed within a few
/// characters by an opening bracket, either on the same line or indented on
/// the next one ("answer:\n[...]" is a common rendering).
static KEYWORD_ANCHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:output|answer|solution|prediction|grid)s?\b[^\[\n]{0,24}(?:\n[ \t]{0,8})?\[")
        .expect("keyword anchor regex")
});

/// A grid recovered from free text, tagged with the scanner that found it.
#[derive(Debug, Clone)]
pub(crate) struct MinedGrid {
    pub grid: Grid,
    pub method: ExtractionMethod,
}

/// Mine every text field for grids.
///
/// Candidates come back in scanner priority order, then order of appearance.
/// The same rendered grid is routinely found by more than one scanner, so
/// exact duplicates are collapsed to their first occurrence.
pub(crate) fn mine_texts(texts: &[&str], config: &EngineConfig) -> Vec<MinedGrid> {
    let mut found: Vec<MinedGrid> = Vec::new();

    for (scanner, method) in [
        (
            scan_fenced_blocks as fn(&str) -> Vec<Grid>,
            ExtractionMethod::FencedCodeBlock,
        ),
        (scan_keyword_anchors, ExtractionMethod::KeywordAnchor),
        (scan_brackets, ExtractionMethod::BracketScan),
    ] {
        for text in texts {
            for grid in scanner(clip(text, config.max_text_scan_bytes)) {
                if found.iter().any(|m| m.grid == grid) {
                    continue;
                }
                debug!(method = %method, grid = %grid, "mined candidate grid");
                found.push(MinedGrid { grid, method });
            }
        }
    }

    found
}

/// Truncate to at most `max` bytes without splitting a UTF-8 character.
fn clip(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Scanner 1: fenced code blocks whose content parses as JSON.
///
/// Line state machine over ``` fences; the fence language tag is ignored
/// (models label grid dumps as `json`, `python`, or nothing at all).
fn scan_fenced_blocks(text: &str) -> Vec<Grid> {
    let mut grids = Vec::new();
    let mut in_code_block = false;
    let mut block = String::new();

    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            if in_code_block {
                if let Ok(value) = serde_json::from_str::<Value>(block.trim()) {
                    grids.extend(grids_from_value(&value));
                }
                block.clear();
                in_code_block = false;
            } else {
                in_code_block = true;
            }
        } else if in_code_block {
            block.push_str(line);
            block.push('\n');
        }
    }

    // Unterminated fence: still worth a parse attempt.
    if in_code_block && !block.is_empty() {
        if let Ok(value) = serde_json::from_str::<Value>(block.trim()) {
            grids.extend(grids_from_value(&value));
        }
    }

    grids
}

/// Scanner 2: bracketed literals anchored by answer-ish keywords.
fn scan_keyword_anchors(text: &str) -> Vec<Grid> {
    let mut grids = Vec::new();
    for m in KEYWORD_ANCHOR_RE.find_iter(text) {
        // The match ends at the opening bracket.
        let start = m.end() - 1;
        if let Some(span) = balanced_span(text, start) {
            if let Ok(value) = serde_json::from_str::<Value>(span) {
                grids.extend(grids_from_value(&value));
            }
        }
    }
    grids
}

/// Scanner 3: every `[[`-anchored balanced span that parses as a grid (or
/// array of grids). The last-ditch scanner; no anchor text required.
fn scan_brackets(text: &str) -> Vec<Grid> {
    let mut grids = Vec::new();
    let mut at = 0;
    while let Some(offset) = text[at..].find("[[") {
        let start = at + offset;
        let mut advanced = false;
        if let Some(span) = balanced_span(text, start) {
            if let Ok(value) = serde_json::from_str::<Value>(span) {
                let parsed = grids_from_value(&value);
                if !parsed.is_empty() {
                    grids.extend(parsed);
                    at = start + span.len();
                    advanced = true;
                }
            }
        }
        if !advanced {
            // Nothing usable here; step past the first bracket and retry.
            at = start + 1;
        }
    }
    grids
}

/// The balanced-bracket span starting at `start` (which must be `[`).
/// Only brackets count toward depth; grid literals have no strings to fool
/// the counter.
fn balanced_span(text: &str, start: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
