use async_trait::async_trait;
use std::sync::Arc;
use wonder_core::{ContextKey, GenerationContext, Stage, StageError};
use wonder_prompts::names;
use wonder_provider::{AiProvider, CompletionRequest};

use crate::present::PresentReply;
use crate::reply::{non_empty, parse_reply, prompt_vars, render_prompt};

const MAX_TOKENS: u32 = 600;
const TEMPERATURE: f32 = 0.7;

/// Kid-friendly retelling of the image description.
pub struct ImagePresentStage {
    provider: Arc<dyn AiProvider>,
}

impl ImagePresentStage {
    pub fn new(provider: Arc<dyn AiProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Stage for ImagePresentStage {
    fn id(&self) -> &'static str {
        "image_present.text.v1"
    }

    fn reads(&self) -> &'static [ContextKey] {
        &[ContextKey::ImageDescription]
    }

    fn writes(&self) -> &'static [ContextKey] {
        &[ContextKey::Result]
    }

    async fn run(&self, ctx: &GenerationContext) -> Result<GenerationContext, StageError> {
        let prompt = render_prompt(names::IMAGE_PRESENT, &prompt_vars(ctx))?;
        let raw = self
            .provider
            .complete(&CompletionRequest::new(prompt, MAX_TOKENS, TEMPERATURE).json())
            .await?;

        let reply: PresentReply = parse_reply(self.id(), &raw)?;
        let result = non_empty(self.id(), "result", reply.result)?;
        Ok(ctx.extend(ContextKey::Result, result)?)
    }
}
