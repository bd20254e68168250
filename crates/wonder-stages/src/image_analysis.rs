use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use wonder_core::{ContextKey, GenerationContext, Stage, StageError};
use wonder_prompts::names;
use wonder_provider::{AiProvider, VisionRequest};

use crate::reply::{non_empty, parse_reply, prompt_vars, render_prompt};

const MAX_TOKENS: u32 = 500;
/// Low temperature keeps descriptions consistent.
const TEMPERATURE: f32 = 0.1;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ImageAnalysisReply {
    image_description: String,
}

/// Factual description of the uploaded picture at `image_path`.
pub struct ImageAnalysisStage {
    provider: Arc<dyn AiProvider>,
}

impl ImageAnalysisStage {
    pub fn new(provider: Arc<dyn AiProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Stage for ImageAnalysisStage {
    fn id(&self) -> &'static str {
        "image_analysis.vision.v1"
    }

    fn reads(&self) -> &'static [ContextKey] {
        &[ContextKey::ImagePath]
    }

    fn writes(&self) -> &'static [ContextKey] {
        &[ContextKey::ImageDescription]
    }

    async fn run(&self, ctx: &GenerationContext) -> Result<GenerationContext, StageError> {
        let path = ctx.require_text(ContextKey::ImagePath)?;
        let image = tokio::fs::read(path).await.map_err(|e| {
            StageError::ExecutionFailed(format!("cannot read image '{}': {}", path, e))
        })?;
        debug!(stage = self.id(), bytes = image.len(), "image loaded");

        let prompt = render_prompt(names::IMAGE_ANALYSIS, &prompt_vars(ctx))?;
        let raw = self
            .provider
            .describe_image(&VisionRequest::new(image, prompt, MAX_TOKENS, TEMPERATURE))
            .await?;

        let reply: ImageAnalysisReply = parse_reply(self.id(), &raw)?;
        let description = non_empty(self.id(), "image_description", reply.image_description)?;
        Ok(ctx.extend(ContextKey::ImageDescription, description)?)
    }
}
