// src/normalizer.rs
//! Turns the raw model text into the JSON object it carries.
//!
//! Models tend to wrap their JSON in markdown fences or surround it with
//! chatter. A fence opened before the first `{` wins; otherwise the first
//! top-level object is taken. The object is passed on as-is, whatever keys
//! and value types the model chose.

use serde_json::{Map, Value};

use crate::errors::{AuraError, Result};

/// Returns the JSON object candidate inside `text`, if any.
pub fn extract_json(text: &str) -> Option<&str> {
    let fence = text.find("```");
    let brace = text.find('{');
    // a fence after the first brace sits inside the object, not around it
    if fence.is_some_and(|f| brace.is_none_or(|b| f < b)) {
        if let Some(fenced) = fenced_block(text) {
            let fenced = fenced.trim();
            return first_object(fenced).or(Some(fenced));
        }
    }
    first_object(text)
}

/// Parses the first JSON object in `text`. Fails only when there is none.
pub fn parse_object(text: &str) -> Result<Map<String, Value>> {
    let json = extract_json(text).ok_or_else(|| AuraError::UnparseableResponse(preview(text)))?;
    serde_json::from_str(json).map_err(|e| AuraError::UnparseableResponse(e.to_string()))
}

/// Content between the first opening fence (```` ``` ```` with an optional
/// language tag) and the next closing fence. An unclosed fence runs to the end.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    // the language tag runs up to the end of the line
    let body_start = match after_fence.find('\n') {
        Some(nl) if after_fence[..nl].trim().chars().all(|c| c.is_ascii_alphanumeric()) => nl + 1,
        _ => after_fence
            .strip_prefix("json")
            .map_or(0, |_| "json".len()),
    };
    let body = &after_fence[body_start..];
    Some(match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    })
}

/// Finds the first balanced `{...}` span, ignoring braces inside strings.
fn first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn preview(text: &str) -> String {
    let truncated: String = text.chars().take(120).collect();
    if truncated.len() < text.len() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}
