//! Generate orchestration: cache, fast path or pipeline, safety check,
//! post-processing, then cache and session bookkeeping.

use bytes::Bytes;
use chrono::Utc;
use std::path::Path;
use tracing::{debug, info, warn};
use uuid::Uuid;
use wonder_core::{
    Audience, GenerationContext, PipelineResult, StageTrace, WonderError, TOPIC_XOR_IMAGE,
};
use wonder_policy::check_content;
use wonder_stages::{fast_path_image, fast_path_text, is_simple_question, run_pipeline};
use wonder_store::{CacheKey, SessionRecord, User};

use crate::state::AppState;

const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// An uploaded image as received
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

/// Raw generate form fields
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub topic: Option<String>,
    pub image: Option<UploadedImage>,
    pub age: Option<u32>,
    pub interests: Option<String>,
}

#[derive(Debug, Clone)]
pub enum GenerateInput {
    Topic(String),
    Image(UploadedImage),
}

impl GenerateRequest {
    /// Exactly one of topic and image. Blank topics and empty files count as absent.
    pub fn into_input(self) -> Result<(GenerateInput, Audience), WonderError> {
        let topic = self.topic.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        let image = self.image.filter(|img| !img.bytes.is_empty());
        let input = match (topic, image) {
            (Some(topic), None) => GenerateInput::Topic(topic),
            (None, Some(image)) => GenerateInput::Image(image),
            _ => return Err(WonderError::Validation(TOPIC_XOR_IMAGE.to_string())),
        };
        Ok((input, Audience::new(self.age, self.interests)))
    }
}

/// How a result was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationRoute {
    CacheHit,
    FastPath,
    Pipeline,
}

impl GenerationRoute {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationRoute::CacheHit => "cache_hit",
            GenerationRoute::FastPath => "fast_path",
            GenerationRoute::Pipeline => "pipeline",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    pub result: PipelineResult,
    pub route: GenerationRoute,
    /// One entry per pipeline stage; empty for cache hits and the fast path
    pub trace: Vec<StageTrace>,
}

/// Everything needed to finish a request once the explanation exists.
struct Fresh {
    key: CacheKey,
    explanation: String,
    route: GenerationRoute,
    session_topic: String,
    audience: Audience,
    trace: Vec<StageTrace>,
}

pub async fn generate(
    state: &AppState,
    request: GenerateRequest,
    user: Option<&User>,
) -> Result<GenerateOutcome, WonderError> {
    let (input, audience) = request.into_input()?;
    state.require_ai()?;

    let fresh = match input {
        GenerateInput::Topic(topic) => {
            let key = CacheKey::for_topic(&topic, &audience);
            if let Some(result) = state.cache.get(&key).await {
                info!(%topic, "returning cached explanation");
                return Ok(cache_hit(result));
            }
            explain_topic(state, key, topic, audience).await?
        }
        GenerateInput::Image(image) => {
            let key = CacheKey::for_image(&image.bytes, &audience);
            if let Some(result) = state.cache.get(&key).await {
                info!(bytes = image.bytes.len(), "returning cached image explanation");
                return Ok(cache_hit(result));
            }
            explain_image(state, key, image, audience).await?
        }
    };

    finish(state, fresh, user).await
}

fn cache_hit(result: PipelineResult) -> GenerateOutcome {
    GenerateOutcome {
        result,
        route: GenerationRoute::CacheHit,
        trace: Vec::new(),
    }
}

async fn explain_topic(
    state: &AppState,
    key: CacheKey,
    topic: String,
    audience: Audience,
) -> Result<Fresh, WonderError> {
    if is_simple_question(&topic) {
        info!(%topic, "using fast path for simple question");
        if let Some(explanation) = fast_path_text(state.provider.as_ref(), &topic, &audience).await {
            return Ok(Fresh {
                key,
                explanation,
                route: GenerationRoute::FastPath,
                session_topic: topic,
                audience,
                trace: Vec::new(),
            });
        }
    }

    let ctx = GenerationContext::for_topic(topic.clone(), audience.age, audience.interests.clone())?;
    let outcome = run_pipeline(state.provider.clone(), ctx).await?;
    log_trace(&outcome.trace);
    Ok(Fresh {
        key,
        explanation: outcome.result,
        route: GenerationRoute::Pipeline,
        session_topic: topic,
        audience,
        trace: outcome.trace,
    })
}

async fn explain_image(
    state: &AppState,
    key: CacheKey,
    image: UploadedImage,
    audience: Audience,
) -> Result<Fresh, WonderError> {
    let stored_name = format!("{}.{}", Uuid::new_v4().simple(), extension_of(image.file_name.as_deref()));
    state.uploads().save(&stored_name, &image.bytes).await?;
    let stored_path = state.uploads().path().join(&stored_name);
    info!(path = %stored_path.display(), bytes = image.bytes.len(), "uploaded image saved");

    let session_topic = format!(
        "Image Analysis: {}",
        image.file_name.as_deref().unwrap_or(&stored_name)
    );

    info!("trying fast path for image analysis");
    if let Some(explanation) =
        fast_path_image(state.provider.as_ref(), image.bytes.clone(), &audience).await
    {
        return Ok(Fresh {
            key,
            explanation,
            route: GenerationRoute::FastPath,
            session_topic,
            audience,
            trace: Vec::new(),
        });
    }

    let ctx = GenerationContext::for_image(
        stored_path.to_string_lossy().into_owned(),
        audience.age,
        audience.interests.clone(),
    )?;
    let outcome = run_pipeline(state.provider.clone(), ctx).await?;
    log_trace(&outcome.trace);
    Ok(Fresh {
        key,
        explanation: outcome.result,
        route: GenerationRoute::Pipeline,
        session_topic,
        audience,
        trace: outcome.trace,
    })
}

async fn finish(
    state: &AppState,
    fresh: Fresh,
    user: Option<&User>,
) -> Result<GenerateOutcome, WonderError> {
    let verdict = check_content(&fresh.explanation);
    if !verdict.is_safe() {
        warn!(
            route = fresh.route.as_str(),
            severity = ?verdict.severity(),
            terms = ?verdict.matched_terms(),
            message = verdict.message().unwrap_or(""),
            "content filter flagged explanation"
        );
    }
    if state.safety_mode.blocks(&verdict) {
        return Err(WonderError::Unsafe(
            "The explanation did not pass the content safety check".to_string(),
        ));
    }

    let result = state.postprocessor.process(&fresh.explanation).await;
    state.cache.insert(fresh.key, result.clone()).await;

    if let Some(user) = user {
        state
            .store
            .append_session(SessionRecord {
                user_id: user.id.clone(),
                topic: fresh.session_topic,
                explanation: result.result.clone(),
                diagram_url: Some(result.diagram_url.clone()),
                audio_url: Some(result.audio_url.clone()),
                timestamp: Utc::now(),
                age: fresh.audience.age,
                interests: fresh.audience.interests.clone(),
            })
            .await;
    }

    info!(route = fresh.route.as_str(), "explanation ready");
    Ok(GenerateOutcome {
        result,
        route: fresh.route,
        trace: fresh.trace,
    })
}

fn log_trace(trace: &[StageTrace]) {
    for step in trace {
        debug!(
            stage = %step.id,
            reads = ?step.input_keys,
            writes = ?step.written_keys,
            in_hash = %step.in_hash,
            out_hash = %step.out_hash,
            latency_ms = step.latency_ms,
            "stage trace"
        );
    }
}

fn extension_of(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(bytes: &'static [u8]) -> UploadedImage {
        UploadedImage {
            file_name: Some("cat.jpg".to_string()),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[test]
    fn test_exactly_one_input() {
        let both = GenerateRequest {
            topic: Some("rain".into()),
            image: Some(image(b"jpg")),
            ..Default::default()
        };
        assert!(matches!(both.into_input(), Err(WonderError::Validation(_))));

        let neither = GenerateRequest::default();
        assert!(matches!(neither.into_input(), Err(WonderError::Validation(_))));

        let blank_topic_and_empty_file = GenerateRequest {
            topic: Some("   ".into()),
            image: Some(image(b"")),
            ..Default::default()
        };
        assert!(blank_topic_and_empty_file.into_input().is_err());

        let blank_topic_with_image = GenerateRequest {
            topic: Some("".into()),
            image: Some(image(b"jpg")),
            age: Some(7),
            interests: Some(" trains ".into()),
        };
        let (input, audience) = blank_topic_with_image.into_input().unwrap();
        assert!(matches!(input, GenerateInput::Image(_)));
        assert_eq!(audience, Audience::new(Some(7), Some("trains".into())));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Some("Cat.JPG")), "jpg");
        assert_eq!(extension_of(Some("noext")), "png");
        assert_eq!(extension_of(None), "png");
        assert_eq!(extension_of(Some("weird.p$g")), "png");
    }
}
