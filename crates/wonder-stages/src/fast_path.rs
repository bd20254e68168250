//! Fast path: one model call for simple questions and for images.
//!
//! Any failure returns `None` so the caller falls back to the full pipeline.

use bytes::Bytes;
use serde_json::json;
use tracing::{info, warn};
use wonder_core::text::unwrap_embedded_json;
use wonder_core::Audience;
use wonder_prompts::names;
use wonder_provider::{AiProvider, CompletionRequest, VisionRequest};

/// Interrogative phrases that mark a question as simple (case-insensitive substring).
pub const SIMPLE_QUESTION_PHRASES: [&str; 9] = [
    "what is",
    "what are",
    "how do",
    "why do",
    "what makes",
    "what causes",
    "how does",
    "why does",
    "what does",
];

pub const FAST_PATH_MAX_TOKENS: u32 = 150;
pub const FAST_PATH_TEMPERATURE: f32 = 0.7;

pub fn is_simple_question(topic: &str) -> bool {
    let lowered = topic.to_lowercase();
    SIMPLE_QUESTION_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

/// Short answer to a text question, or `None` on any failure.
pub async fn fast_path_text(
    provider: &dyn AiProvider,
    topic: &str,
    audience: &Audience,
) -> Option<String> {
    let prompt = render(
        names::FAST_PATH_TEXT,
        json!({
            "topic": topic,
            "age_phrase": audience.age_phrase(),
            "interests_phrase": audience.interests_phrase(),
        }),
    )?;

    let request = CompletionRequest::new(prompt, FAST_PATH_MAX_TOKENS, FAST_PATH_TEMPERATURE);
    match provider.complete(&request).await {
        Ok(raw) => accept("text", &raw),
        Err(error) => {
            warn!(%error, "fast path failed, falling back to pipeline");
            None
        }
    }
}

/// Short explanation of an image, or `None` on any failure.
pub async fn fast_path_image(
    provider: &dyn AiProvider,
    image: Bytes,
    audience: &Audience,
) -> Option<String> {
    let prompt = render(
        names::FAST_PATH_IMAGE,
        json!({
            "age_phrase": audience.age_phrase(),
            "interests_phrase": audience.interests_phrase(),
        }),
    )?;

    let request = VisionRequest::new(image, prompt, FAST_PATH_MAX_TOKENS, FAST_PATH_TEMPERATURE);
    match provider.describe_image(&request).await {
        Ok(raw) => accept("image", &raw),
        Err(error) => {
            warn!(%error, "fast path image analysis failed, falling back to pipeline");
            None
        }
    }
}

fn render(name: &str, vars: serde_json::Value) -> Option<String> {
    match wonder_prompts::render(name, &vars) {
        Ok(prompt) => Some(prompt),
        Err(error) => {
            warn!(%error, template = name, "fast path prompt unavailable");
            None
        }
    }
}

fn accept(kind: &str, raw: &str) -> Option<String> {
    let answer = unwrap_embedded_json(raw);
    if answer.is_empty() {
        warn!(kind, "fast path returned an empty answer");
        return None;
    }
    info!(kind, chars = answer.chars().count(), "fast path answered");
    Some(answer)
}
