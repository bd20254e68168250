//! AI provider trait and request types
//!
//! Defines the abstraction over the four capabilities the service needs from
//! the external AI vendor.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use wonder_core::ProviderError;

/// Longest prompt accepted by image generation. Callers truncate.
pub const MAX_IMAGE_PROMPT_CHARS: usize = 4000;

/// Longest input accepted by speech synthesis. Callers truncate.
pub const MAX_SPEECH_CHARS: usize = 4096;

/// Main trait for AI providers
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Provider name (e.g. "openai")
    fn name(&self) -> &str;

    /// Text completion
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;

    /// Describe an image with a vision-capable model
    async fn describe_image(&self, request: &VisionRequest) -> Result<String, ProviderError>;

    /// Generate an image and return its bytes
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ProviderError>;

    /// Synthesize speech and return encoded audio
    async fn synthesize_speech(&self, text: &str) -> Result<Vec<u8>, ProviderError>;
}

#[async_trait]
impl<P: AiProvider + ?Sized> AiProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        (**self).complete(request).await
    }

    async fn describe_image(&self, request: &VisionRequest) -> Result<String, ProviderError> {
        (**self).describe_image(request).await
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ProviderError> {
        (**self).generate_image(prompt).await
    }

    async fn synthesize_speech(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        (**self).synthesize_speech(text).await
    }
}

/// Expected shape of a completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Text,
    /// Ask the model for a single JSON object
    JsonObject,
}

/// Request for a text completion
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub format: ResponseFormat,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            temperature,
            format: ResponseFormat::Text,
        }
    }

    pub fn json(mut self) -> Self {
        self.format = ResponseFormat::JsonObject;
        self
    }
}

/// Request to describe an image
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub image: Bytes,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl VisionRequest {
    pub fn new(image: impl Into<Bytes>, prompt: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            image: image.into(),
            prompt: prompt.into(),
            max_tokens,
            temperature,
        }
    }

    /// MIME type guessed from the leading bytes. Unknown data is sent as JPEG.
    pub fn mime_type(&self) -> &'static str {
        sniff_image_mime(&self.image)
    }
}

pub fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF8") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/jpeg"
    }
}
