//! Tool-call extraction from model-generated text.
//!
//! The model embeds invocations as a marker token followed by a brace
//! object: `tool_code {"tool": "multiply", "args": {"numbers": [2, 3]}}`.
//! Everything here is a pure function of the text — no shared state — so
//! the scanner is trivially unit-testable and replaceable if the wire
//! format changes.

use tracing::warn;

use toolstream_core::ToolCall;

/// The literal token that prefixes an embedded invocation.
pub const CALL_MARKER: &str = "tool_code";

/// The single occurrence rule shared by the probe and the extractor:
/// marker, then optional whitespace, then an opening brace. Returns the
/// byte index of that brace.
fn payload_start(text: &str, marker_end: usize) -> Option<usize> {
    let rest = &text[marker_end..];
    let offset = rest.find(|c: char| !c.is_whitespace())?;
    rest[offset..].starts_with('{').then_some(marker_end + offset)
}

/// Scan a balanced brace object starting at `open` (which must point at a
/// `{`). Tracks brace depth and an in-string flag; a backslash escape
/// consumes the following character, so `\"` neither toggles quoting nor
/// counts as a delimiter. Returns the span through the matching close
/// brace, or `None` if the text ends first.
fn balanced_object(text: &str, open: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text[open..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[open..open + i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Extract every well-formed tool call, in source order.
///
/// Malformed occurrences — truncated spans, unparseable payloads, payloads
/// missing the `tool` or `args` fields — are dropped without aborting
/// extraction of the rest.
pub fn extract_calls(text: &str) -> Vec<ToolCall> {
    let mut calls = Vec::new();

    for (start, _) in text.match_indices(CALL_MARKER) {
        let Some(open) = payload_start(text, start + CALL_MARKER.len()) else {
            continue;
        };
        let Some(payload) = balanced_object(text, open) else {
            // Truncated before the braces balanced.
            continue;
        };

        let parsed: serde_json::Value = match serde_json::from_str(payload) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, payload, "Failed to parse tool call payload");
                continue;
            }
        };

        let Some(name) = parsed.get("tool").and_then(|v| v.as_str()) else {
            continue;
        };
        let Some(arguments) = parsed.get("args") else {
            continue;
        };

        calls.push(ToolCall {
            name: name.to_string(),
            arguments: arguments.clone(),
            raw_span: text[start..open + payload.len()].to_string(),
        });
    }

    calls
}

/// Cheap existence probe. Shares `payload_start` with the extractor so the
/// two can never disagree on what counts as an occurrence.
pub fn has_any_call(text: &str) -> bool {
    text.match_indices(CALL_MARKER)
        .any(|(start, _)| payload_start(text, start + CALL_MARKER.len()).is_some())
}

/// Remove every extracted call's raw span verbatim and trim the remainder.
pub fn strip_calls(text: &str) -> String {
    let mut clean = text.to_string();
    for call in extract_calls(text) {
        clean = clean.replacen(&call.raw_span, "", 1);
    }
    clean.trim().to_string()
}
