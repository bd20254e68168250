use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use wonder_core::{ContextKey, GenerationContext, Stage, StageError};
use wonder_prompts::names;
use wonder_provider::{AiProvider, CompletionRequest};

use crate::reply::{parse_reply, prompt_vars, render_prompt};

const MAX_TOKENS: u32 = 300;
const TEMPERATURE: f32 = 0.0;

/// Review outcome. Models vary the casing, so matching ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
enum ReviewStatus {
    Safe,
    Unsafe,
}

impl TryFrom<String> for ReviewStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "safe" => Ok(ReviewStatus::Safe),
            "unsafe" => Ok(ReviewStatus::Unsafe),
            _ => Err(format!("unknown status `{}`, expected `safe` or `unsafe`", value)),
        }
    }
}

impl ReviewStatus {
    fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Safe => "safe",
            ReviewStatus::Unsafe => "unsafe",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ValidateReply {
    status: ReviewStatus,
    notes: String,
}

/// Model-based safety review of `content`.
///
/// The verdict is informational: it is written to the snapshot and passed on
/// to later prompts, but no stage stops on `unsafe`.
pub struct ValidateStage {
    provider: Arc<dyn AiProvider>,
}

impl ValidateStage {
    pub fn new(provider: Arc<dyn AiProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Stage for ValidateStage {
    fn id(&self) -> &'static str {
        "validate.safety.v1"
    }

    fn reads(&self) -> &'static [ContextKey] {
        &[ContextKey::Topic, ContextKey::Content]
    }

    fn writes(&self) -> &'static [ContextKey] {
        &[ContextKey::Status, ContextKey::Notes]
    }

    async fn run(&self, ctx: &GenerationContext) -> Result<GenerationContext, StageError> {
        let prompt = render_prompt(names::VALIDATE, &prompt_vars(ctx))?;
        let raw = self
            .provider
            .complete(&CompletionRequest::new(prompt, MAX_TOKENS, TEMPERATURE).json())
            .await?;

        let reply: ValidateReply = parse_reply(self.id(), &raw)?;
        let notes = reply.notes.trim().to_string();
        match reply.status {
            ReviewStatus::Safe => info!(stage = self.id(), "content reviewed as safe"),
            ReviewStatus::Unsafe => warn!(stage = self.id(), %notes, "content reviewed as unsafe"),
        }

        Ok(ctx
            .extend(ContextKey::Status, reply.status.as_str())?
            .extend(ContextKey::Notes, notes)?)
    }
}
