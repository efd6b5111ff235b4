//! Tolerant JSON recovery from module process output.
//!
//! Modules are expected to emit a single JSON object on stdout, but many
//! surround it with log lines. We recover the object by parsing the substring
//! between the first `{` and the last `}`. Known gap: unrelated brace-bearing
//! text before or after the payload can defeat the substring parse; the
//! behavior is kept for compatibility with the existing module fleet.

use serde_json::{json, Value};

/// Try to recover a JSON object embedded in `text`.
///
/// Returns `None` when no brace pair exists or the substring does not parse.
pub fn extract_json(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Parse module stdout into a result payload.
///
/// Falls back to wrapping the raw (trimmed) text under an `output` field when
/// no JSON object can be recovered.
pub fn parse_module_output(text: &str) -> Value {
    match extract_json(text) {
        Some(value) => value,
        None => json!({ "output": text.trim() }),
    }
}

/// Re-apply extraction to a stored payload.
///
/// Older records may hold the raw-text fallback even though the text itself
/// contains a recoverable JSON object; readers get the recovered object.
pub fn reparse_wrapped(value: Value) -> Value {
    if let Some(raw) = value.get("output").and_then(Value::as_str) {
        if value.as_object().map(|o| o.len()) == Some(1) {
            if let Some(inner) = extract_json(raw) {
                return inner;
            }
        }
    }
    value
}

// ── Tests ────────────────────────────────────────────────────────────
