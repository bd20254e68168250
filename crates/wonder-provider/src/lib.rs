//! WonderBot provider layer
//!
//! [`AiProvider`] is the single seam to the external AI vendor. The OpenAI
//! client implements it over HTTP, [`RetryingProvider`] adds backoff for
//! transient failures and [`ScriptedProvider`] serves canned answers in tests.

pub mod openai;
pub mod provider;
pub mod retry;
pub mod scripted;

pub use openai::{OpenAiConfig, OpenAiProvider, OPENAI_API_URL};
pub use provider::{
    sniff_image_mime, AiProvider, CompletionRequest, ResponseFormat, VisionRequest,
    MAX_IMAGE_PROMPT_CHARS, MAX_SPEECH_CHARS,
};
pub use retry::{with_retry, RetryConfig, RetryingProvider};
pub use scripted::{ProviderCall, ScriptedProvider, FAKE_MP3, FAKE_PNG};
