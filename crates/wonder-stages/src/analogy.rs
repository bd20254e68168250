use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use wonder_core::{ContextKey, GenerationContext, Stage, StageError};
use wonder_prompts::names;
use wonder_provider::{AiProvider, CompletionRequest};

use crate::reply::{non_empty, parse_reply, prompt_vars, render_prompt};

const MAX_TOKENS: u32 = 400;
const TEMPERATURE: f32 = 0.8;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnalogyReply {
    analogy: String,
}

/// One vivid analogy or mini-story for the reviewed explanation.
pub struct AnalogyStage {
    provider: Arc<dyn AiProvider>,
}

impl AnalogyStage {
    pub fn new(provider: Arc<dyn AiProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Stage for AnalogyStage {
    fn id(&self) -> &'static str {
        "analogy.text.v1"
    }

    fn reads(&self) -> &'static [ContextKey] {
        &[ContextKey::Topic, ContextKey::Content, ContextKey::Status, ContextKey::Notes]
    }

    fn writes(&self) -> &'static [ContextKey] {
        &[ContextKey::Analogy]
    }

    async fn run(&self, ctx: &GenerationContext) -> Result<GenerationContext, StageError> {
        let prompt = render_prompt(names::ANALOGY, &prompt_vars(ctx))?;
        let raw = self
            .provider
            .complete(&CompletionRequest::new(prompt, MAX_TOKENS, TEMPERATURE).json())
            .await?;

        let reply: AnalogyReply = parse_reply(self.id(), &raw)?;
        let analogy = non_empty(self.id(), "analogy", reply.analogy)?;
        Ok(ctx.extend(ContextKey::Analogy, analogy)?)
    }
}
