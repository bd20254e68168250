//! Text helpers shared by the stages, the fast path and the post-processor.
use serde_json::Value;

/// Keys probed, in order, when a model wraps its answer in a JSON object.
pub const ANSWER_KEYS: [&str; 4] = ["result", "content", "output", "text"];

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Removes a surrounding markdown code fence (```json ... ```), if any.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}

/// Unwraps one level of incidental JSON around a plain-text answer.
///
/// `{"result": "..."}` becomes the inner string. Text that does not parse as
/// an object holding one of [`ANSWER_KEYS`] is returned trimmed and unchanged.
pub fn unwrap_embedded_json(text: &str) -> String {
    let candidate = strip_code_fence(text);
    if !candidate.starts_with('{') {
        return text.trim().to_string();
    }
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(candidate) else {
        return text.trim().to_string();
    };
    for key in ANSWER_KEYS {
        match map.get(key) {
            Some(Value::String(inner)) if !inner.trim().is_empty() => {
                return inner.trim().to_string();
            }
            Some(Value::Null) | None => continue,
            Some(Value::String(_)) => continue,
            Some(other) => return other.to_string(),
        }
    }
    text.trim().to_string()
}
