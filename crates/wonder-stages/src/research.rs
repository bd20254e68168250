use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use wonder_core::{ContextKey, GenerationContext, Stage, StageError};
use wonder_prompts::names;
use wonder_provider::{AiProvider, CompletionRequest};

use crate::reply::{non_empty, parse_reply, prompt_vars, render_prompt};

const MAX_TOKENS: u32 = 600;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResearchReply {
    content: String,
}

/// First-pass explanation of the topic.
pub struct ResearchStage {
    provider: Arc<dyn AiProvider>,
}

impl ResearchStage {
    pub fn new(provider: Arc<dyn AiProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Stage for ResearchStage {
    fn id(&self) -> &'static str {
        "research.text.v1"
    }

    fn reads(&self) -> &'static [ContextKey] {
        &[ContextKey::Topic]
    }

    fn writes(&self) -> &'static [ContextKey] {
        &[ContextKey::Content]
    }

    async fn run(&self, ctx: &GenerationContext) -> Result<GenerationContext, StageError> {
        let prompt = render_prompt(names::RESEARCH, &prompt_vars(ctx))?;
        let raw = self
            .provider
            .complete(&CompletionRequest::new(prompt, MAX_TOKENS, TEMPERATURE).json())
            .await?;

        let reply: ResearchReply = parse_reply(self.id(), &raw)?;
        let content = non_empty(self.id(), "content", reply.content)?;
        Ok(ctx.extend(ContextKey::Content, content)?)
    }
}
