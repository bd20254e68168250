//! WonderBot Core: Stage Trait, Runner, Context and Data Model
//!
//! Generic staged core shared by the explanation pipeline, the fast path and
//! the HTTP layer.

pub mod context;
pub mod data_model;
pub mod error;
pub mod runner;
pub mod stage;
pub mod text;

pub use context::{ContextError, ContextKey, GenerationContext, GenerationMode, TOPIC_XOR_IMAGE};
pub use data_model::{Audience, PipelineResult, StageTrace};
pub use error::{ProviderError, WonderError};
pub use runner::{PipelineRun, PipelineRunner};
pub use stage::{Stage, StageError};

/// WonderBot engine version
pub const WONDER_VERSION: &str = "1.0.0";
