//! Next-edit location heuristic and selection bounds
//!
//! `/next_edit_loc` is answered locally, with no provider call: up to six
//! candidate locations derived from the request's diagnostics, or a single
//! zero-length fallback at the request's own path.

use serde_json::Value;

use crate::protocol::envelope::NextEditLocation;
use crate::protocol::loose::{array_of, number_of, pick, string_of, truthy};

const MAX_LOCATION_CANDIDATES: usize = 6;

/// Clamp a loose line number: non-finite is unusable, negatives clamp to
/// zero, fractions floor.
fn normalize_line_number(value: Option<&Value>) -> Option<i64> {
    let n = number_of(value)?;
    if !n.is_finite() {
        return None;
    }
    if n <= 0.0 {
        return Some(0);
    }
    Some(n.floor() as i64)
}

/// First present, non-null value along a chain of lookups (the producer's
/// `??` semantics: explicit zeros and empty strings win).
fn coalesce<'a>(candidates: impl IntoIterator<Item = Option<&'a Value>>) -> Option<&'a Value> {
    candidates.into_iter().flatten().find(|v| !v.is_null())
}

fn diagnostic_path(diag: &Value) -> String {
    let mut value = None;
    for key in ["path", "file_path", "filePath"] {
        if let Some(v) = pick(diag, &[key]) {
            if truthy(Some(v)) {
                value = Some(v);
                break;
            }
        }
    }
    let value = value.or_else(|| pick(diag, &["item"]).and_then(|item| pick(item, &["path"])));
    string_of(value).trim().to_string()
}

fn diagnostic_range(diag: &Value) -> Option<&Value> {
    [
        pick(diag, &["range"]),
        pick(diag, &["item"]).and_then(|i| pick(i, &["range"])),
        pick(diag, &["location"]).and_then(|l| pick(l, &["range"])),
    ]
    .into_iter()
    .flatten()
    .find(|v| truthy(Some(v)))
}

/// Up to `min(6, num_results)` candidates from the diagnostics list,
/// tagged "diagnostic"; else one zero-length candidate at the request's own
/// path, tagged "fallback".
pub fn pick_next_edit_location_candidates(body: &Value) -> Vec<NextEditLocation> {
    let max = match number_of(pick(body, &["num_results", "numResults"])) {
        Some(n) if n.is_finite() && n > 0.0 => (n.floor() as usize).min(MAX_LOCATION_CANDIDATES),
        _ => 1,
    };

    let mut out = Vec::new();
    for diag in array_of(pick(body, &["diagnostics"])) {
        let path = diagnostic_path(diag);
        if path.is_empty() {
            continue;
        }
        let Some(range) = diagnostic_range(diag) else {
            continue;
        };
        let start_value = coalesce([
            pick(range, &["start"]).and_then(|s| pick(s, &["line"])),
            pick(range, &["start_line", "startLine"]),
            pick(range, &["start"]),
        ]);
        let Some(start) = normalize_line_number(start_value) else {
            continue;
        };
        let stop_value = coalesce([
            pick(range, &["end"]).and_then(|e| pick(e, &["line"])),
            pick(range, &["stop"]).and_then(|s| pick(s, &["line"])),
            pick(range, &["end_line", "stopLine"]),
            pick(range, &["stop"]),
        ]);
        let stop = normalize_line_number(stop_value).unwrap_or(start);
        out.push(NextEditLocation::new(path, start, start.max(stop), "diagnostic"));
        if out.len() >= max {
            break;
        }
    }

    if out.is_empty() {
        let path = string_of(pick(body, &["path"])).trim().to_string();
        if !path.is_empty() {
            out.push(NextEditLocation::new(path, 0, 0, "fallback"));
        }
    }

    out
}

/// Selection character bounds for `/next-edit-stream`: the end defaults to
/// the start, and the start to zero, when missing or non-finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionBounds {
    pub begin: i64,
    pub end: i64,
}

pub fn selection_bounds(body: &Value) -> SelectionBounds {
    let begin = match number_of(pick(body, &["selection_begin_char", "selectionBeginChar"])) {
        Some(n) if n.is_finite() => n.trunc() as i64,
        _ => 0,
    };
    let end = match number_of(pick(body, &["selection_end_char", "selectionEndChar"])) {
        Some(n) if n.is_finite() => n.trunc() as i64,
        _ => begin,
    };
    SelectionBounds { begin, end }
}
