//! Stage Trait: single contract for every pipeline stage
use async_trait::async_trait;
use thiserror::Error;

use crate::context::{ContextError, ContextKey, GenerationContext};
use crate::error::ProviderError;

/// One transformation step of the explanation pipeline.
///
/// `reads` lists the keys the stage cannot run without; `writes` lists the keys
/// it adds. The runner checks both when the pipeline is assembled and again
/// after every run.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Unique stage id (ex: "research.text.v1")
    fn id(&self) -> &'static str;

    fn reads(&self) -> &'static [ContextKey];

    fn writes(&self) -> &'static [ContextKey];

    async fn run(&self, ctx: &GenerationContext) -> Result<GenerationContext, StageError>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Context(#[from] ContextError),

    #[error("STAGE/WIRING: {stage} {reason} '{key}'")]
    Wiring {
        stage: String,
        key: ContextKey,
        reason: String,
    },

    #[error("STAGE/CONTRACT: {stage}: {reason}")]
    Contract { stage: String, reason: String },

    #[error("STAGE/EXEC: {0}")]
    ExecutionFailed(String),
}
