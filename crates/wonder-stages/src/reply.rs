//! Shared plumbing for LLM-backed stages: prompt variables, prompt rendering
//! and strict reply parsing.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use wonder_core::text::strip_code_fence;
use wonder_core::{Audience, GenerationContext, ProviderError, StageError};

/// Template variables for a snapshot: every text entry under its key name,
/// plus the audience phrases.
pub(crate) fn prompt_vars(ctx: &GenerationContext) -> Value {
    let audience = Audience::new(ctx.age(), ctx.interests().map(str::to_string));
    let mut vars = Map::new();
    for key in ctx.keys() {
        if let Some(text) = ctx.text(key) {
            vars.insert(key.as_str().to_string(), Value::String(text.to_string()));
        }
    }
    vars.insert("age_phrase".to_string(), Value::String(audience.age_phrase()));
    vars.insert(
        "interests_phrase".to_string(),
        Value::String(audience.interests_phrase()),
    );
    Value::Object(vars)
}

pub(crate) fn render_prompt(name: &str, vars: &Value) -> Result<String, StageError> {
    wonder_prompts::render(name, vars).map_err(|e| StageError::ExecutionFailed(e.to_string()))
}

/// Parse a stage reply against its schema. A surrounding code fence is
/// tolerated; anything else that does not match is a malformed payload.
pub(crate) fn parse_reply<T: DeserializeOwned>(stage: &str, raw: &str) -> Result<T, ProviderError> {
    serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| ProviderError::MalformedPayload(format!("{} reply: {}", stage, e)))
}

/// Reject a required field that came back blank.
pub(crate) fn non_empty(stage: &str, field: &str, value: String) -> Result<String, ProviderError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::MalformedPayload(format!(
            "{} reply: '{}' is empty",
            stage, field
        )));
    }
    Ok(trimmed.to_string())
}
