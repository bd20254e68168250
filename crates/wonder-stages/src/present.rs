use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use wonder_core::{ContextKey, GenerationContext, Stage, StageError};
use wonder_prompts::names;
use wonder_provider::{AiProvider, CompletionRequest};

use crate::reply::{non_empty, parse_reply, prompt_vars, render_prompt};

const MAX_TOKENS: u32 = 800;
const TEMPERATURE: f32 = 0.7;

/// Both presenters answer with the same shape.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PresentReply {
    pub(crate) result: String,
}

/// Merges explanation, safety review and analogy into the final reply.
pub struct PresentStage {
    provider: Arc<dyn AiProvider>,
}

impl PresentStage {
    pub fn new(provider: Arc<dyn AiProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Stage for PresentStage {
    fn id(&self) -> &'static str {
        "present.text.v1"
    }

    fn reads(&self) -> &'static [ContextKey] {
        &[
            ContextKey::Topic,
            ContextKey::Content,
            ContextKey::Status,
            ContextKey::Notes,
            ContextKey::Analogy,
        ]
    }

    fn writes(&self) -> &'static [ContextKey] {
        &[ContextKey::Result]
    }

    async fn run(&self, ctx: &GenerationContext) -> Result<GenerationContext, StageError> {
        let prompt = render_prompt(names::PRESENT, &prompt_vars(ctx))?;
        let raw = self
            .provider
            .complete(&CompletionRequest::new(prompt, MAX_TOKENS, TEMPERATURE).json())
            .await?;

        let reply: PresentReply = parse_reply(self.id(), &raw)?;
        let result = non_empty(self.id(), "result", reply.result)?;
        Ok(ctx.extend(ContextKey::Result, result)?)
    }
}
