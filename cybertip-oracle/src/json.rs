// cybertip-oracle/src/json.rs
// ============================================================================
// Module: Response JSON Extraction
// Description: Recovers a JSON value from a raw oracle text response.
// Purpose: Tolerate chatty model output without accepting malformed JSON.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Oracle responses are plain text; most are bare JSON, some wrap JSON in a
//! fenced code block, and some add surrounding prose. Extraction is tried in
//! a fixed fallback order and stops at the first method that parses. A
//! response that matches none of them is a failed invocation, never a
//! best-effort guess.

use serde_json::Value;

/// An oracle response did not contain a value extractable as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonExtractionError {
    /// Human-readable description of why extraction failed.
    pub message: String,
}

impl std::fmt::Display for JsonExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "json extraction failed: {}", self.message)
    }
}

impl std::error::Error for JsonExtractionError {}

/// Extracts a JSON value from raw oracle response text.
///
/// Tries, in order: a direct parse of the full text, the contents of the
/// first fenced code block, and the first balanced `{...}` span found
/// anywhere in the text. Returns an error if none of these parse as JSON.
///
/// # Errors
///
/// Returns [`JsonExtractionError`] when no extraction strategy yields valid
/// JSON.
pub fn extract_json(raw_text: &str) -> Result<Value, JsonExtractionError> {
    if let Ok(value) = serde_json::from_str::<Value>(raw_text.trim()) {
        return Ok(value);
    }
    if let Some(fenced) = extract_fenced_code_block(raw_text) {
        if let Ok(value) = serde_json::from_str::<Value>(fenced.trim()) {
            return Ok(value);
        }
    }
    if let Some(brace_span) = first_balanced_brace_span(raw_text) {
        if let Ok(value) = serde_json::from_str::<Value>(brace_span) {
            return Ok(value);
        }
    }
    Err(JsonExtractionError {
        message: "no direct parse, fenced code block, or balanced brace span produced valid JSON"
            .to_string(),
    })
}

/// Returns the contents of the first fenced code block (` ``` `) in `text`,
/// stripping a leading language tag such as `json` on the opening fence.
fn extract_fenced_code_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_open = start + 3;
    let rest = &text[after_open..];
    let body_start = rest.find('\n').map_or(0, |index| index + 1);
    let body = &rest[body_start..];
    let end = body.find("```")?;
    Some(&body[..end])
}

/// Returns the first balanced `{...}` span in `text`, tracking string
/// literals and escapes so braces inside JSON string values do not
/// prematurely close the span.
fn first_balanced_brace_span(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let mut index = start;
    while index < bytes.len() {
        let byte = bytes[index];
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
        } else {
            match byte {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[start..=index]);
                    }
                }
                _ => {}
            }
        }
        index += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only framing assertions.")]

    use super::extract_json;

    #[test]
    fn extracts_bare_json() {
        let value = extract_json(r#"{"tier": "Urgent", "score": 70}"#).expect("parse");
        assert_eq!(value["tier"], "Urgent");
    }

    #[test]
    fn extracts_json_from_fenced_code_block() {
        let text = "Here is the classification:\n```json\n{\"tier\": \"Monitor\"}\n```\nDone.";
        let value = extract_json(text).expect("parse");
        assert_eq!(value["tier"], "Monitor");
    }

    #[test]
    fn extracts_first_balanced_brace_span_from_prose() {
        let text = "I looked at the tip and concluded {\"tier\": \"Standard\", \"score\": 42} based on the facts.";
        let value = extract_json(text).expect("parse");
        assert_eq!(value["score"], 42);
    }

    #[test]
    fn brace_scan_ignores_braces_inside_string_values() {
        let text = r#"prefix {"note": "contains a brace } inside a string", "tier": "Monitor"} suffix"#;
        let value = extract_json(text).expect("parse");
        assert_eq!(value["tier"], "Monitor");
    }

    #[test]
    fn returns_error_when_no_strategy_parses() {
        let result = extract_json("no json anywhere in this response");
        assert!(result.is_err());
    }
}
