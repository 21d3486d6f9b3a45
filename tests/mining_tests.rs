// Free-text recovery against realistic model prose: rambling rationale,
// markdown fences, mixed commentary. Structured fields are deliberately
// absent or useless in every fixture here.

use serde_json::json;

use gridjudge::{extract, ExtractionMethod, RawResponse};

#[test]
fn markdown_heavy_response_with_fenced_answer() {
    let r = RawResponse::from_text(
        "## Analysis\n\
         The transformation rotates each shape 90 degrees clockwise.\n\n\
         ```json\n\
         [[0, 3, 0], [3, 3, 3], [0, 3, 0]]\n\
         ```\n\n\
         I verified this against all three training examples.",
    );
    let outcome = extract(&r, 1).unwrap();
    assert_eq!(
        outcome.slots[0].method,
        Some(ExtractionMethod::FencedCodeBlock)
    );
    assert_eq!(
        outcome.slots[0].grid.as_ref().unwrap().to_string(),
        "[[0,3,0],[3,3,3],[0,3,0]]"
    );
}

#[test]
fn python_labelled_fence_is_still_mined() {
    let r = RawResponse::from_text("```python\n[[1, 1], [1, 1]]\n```");
    let outcome = extract(&r, 1).unwrap();
    assert_eq!(
        outcome.slots[0].method,
        Some(ExtractionMethod::FencedCodeBlock)
    );
}

#[test]
fn keyword_anchored_grid_in_rationale_field() {
    let r = RawResponse::new(json!({
        "patternDescription": "Colors invert along the diagonal.",
        "solvingStrategy": "Apply inversion, so the output is [[9, 0], [0, 9]]."
    }));
    let outcome = extract(&r, 1).unwrap();
    assert_eq!(
        outcome.slots[0].method,
        Some(ExtractionMethod::KeywordAnchor)
    );
    assert_eq!(
        outcome.slots[0].grid.as_ref().unwrap().to_string(),
        "[[9,0],[0,9]]"
    );
}

#[test]
fn multiline_pretty_printed_grid_parses() {
    // Keyword on one line, pretty-printed literal starting on the next.
    let r = RawResponse::from_text(
        "answer:\n[\n  [1, 2, 3],\n  [4, 5, 6]\n]",
    );
    let outcome = extract(&r, 1).unwrap();
    assert_eq!(
        outcome.slots[0].method,
        Some(ExtractionMethod::KeywordAnchor)
    );
    assert_eq!(
        outcome.slots[0].grid.as_ref().unwrap().to_string(),
        "[[1,2,3],[4,5,6]]"
    );
}

#[test]
fn pretty_printed_nested_grid_is_recovered() {
    let r = RawResponse::from_text(
        "Final grids:\n[[\n  [1, 2],\n  [3, 4]\n]]",
    );
    let outcome = extract(&r, 1).unwrap();
    assert_eq!(outcome.filled_count(), 1);
    assert_eq!(
        outcome.slots[0].grid.as_ref().unwrap().to_string(),
        "[[1,2],[3,4]]"
    );
}

#[test]
fn several_grids_in_one_rationale_fill_slots_in_order() {
    let r = RawResponse::new(json!({
        "solvingStrategy": "Case one becomes [[1]]. Case two becomes [[2]]. Case three becomes [[3]]."
    }));
    let outcome = extract(&r, 3).unwrap();
    let rendered: Vec<String> = outcome
        .slots
        .iter()
        .map(|s| s.grid.as_ref().unwrap().to_string())
        .collect();
    assert_eq!(rendered, vec!["[[1]]", "[[2]]", "[[3]]"]);
}

#[test]
fn coordinates_and_ranges_in_prose_are_not_grids() {
    let r = RawResponse::from_text(
        "Cells [0, 1] and [2, 3] swap; values in [0, 9] stay. See rows[1][2].",
    );
    let outcome = extract(&r, 1).unwrap();
    assert_eq!(outcome.filled_count(), 0);
}

#[test]
fn grid_inside_double_encoded_payload_text_is_reachable() {
    // The wrapper string fails structured probing (it has no known fields)
    // but is itself a text field, so the bracket scanner still gets a shot.
    let r = RawResponse::new(json!({
        "raw": "{\"commentary\": \"grid: [[5, 5], [5, 5]]\"}"
    }));
    let outcome = extract(&r, 1).unwrap();
    assert_eq!(outcome.filled_count(), 1);
}

#[test]
fn mining_never_overwrites_structured_hits() {
    let r = RawResponse::new(json!({
        "predictedOutput": [[7]],
        "reasoning": "though [[8]] also looked plausible"
    }));
    let outcome = extract(&r, 1).unwrap();
    assert_eq!(outcome.slots[0].grid.as_ref().unwrap().to_string(), "[[7]]");
    assert_eq!(
        outcome.slots[0].method,
        Some(ExtractionMethod::StructuredField)
    );
}
