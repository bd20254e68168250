//! Scripted provider for tests
//!
//! Completions and image descriptions are served from FIFO queues; image and
//! speech results are sticky. Every call is recorded so tests can assert on
//! exactly what reached the vendor.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use wonder_core::ProviderError;

use crate::provider::{AiProvider, CompletionRequest, ResponseFormat, VisionRequest};

/// Minimal valid PNG header, enough for tests that only check bytes landed on disk.
pub const FAKE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Minimal ID3 tag standing in for MP3 audio.
pub const FAKE_MP3: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00";

/// One recorded provider call
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    Complete {
        prompt: String,
        max_tokens: u32,
        temperature: f32,
        json: bool,
    },
    DescribeImage {
        prompt: String,
        image_len: usize,
    },
    GenerateImage {
        prompt: String,
    },
    SynthesizeSpeech {
        text: String,
    },
}

struct Script {
    completions: VecDeque<Result<String, ProviderError>>,
    descriptions: VecDeque<Result<String, ProviderError>>,
    image: Result<Vec<u8>, ProviderError>,
    speech: Result<Vec<u8>, ProviderError>,
    calls: Vec<ProviderCall>,
}

pub struct ScriptedProvider {
    script: Mutex<Script>,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script {
                completions: VecDeque::new(),
                descriptions: VecDeque::new(),
                image: Ok(FAKE_PNG.to_vec()),
                speech: Ok(FAKE_MP3.to_vec()),
                calls: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_completion(self, text: impl Into<String>) -> Self {
        self.push_completion(Ok(text.into()));
        self
    }

    pub fn with_completion_error(self, error: ProviderError) -> Self {
        self.push_completion(Err(error));
        self
    }

    /// Queue a completion after construction
    pub fn push_completion(&self, result: Result<String, ProviderError>) {
        self.lock().completions.push_back(result);
    }

    pub fn with_description(self, text: impl Into<String>) -> Self {
        self.lock().descriptions.push_back(Ok(text.into()));
        self
    }

    pub fn with_description_error(self, error: ProviderError) -> Self {
        self.lock().descriptions.push_back(Err(error));
        self
    }

    pub fn with_image_result(self, result: Result<Vec<u8>, ProviderError>) -> Self {
        self.lock().image = result;
        self
    }

    pub fn with_speech_result(self, result: Result<Vec<u8>, ProviderError>) -> Self {
        self.lock().speech = result;
        self
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.lock().calls.clone()
    }

    pub fn completion_prompts(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                ProviderCall::Complete { prompt, .. } => Some(prompt.clone()),
                _ => None,
            })
            .collect()
    }

    /// Queued completions not yet consumed
    pub fn pending_completions(&self) -> usize {
        self.lock().completions.len()
    }
}

#[async_trait]
impl AiProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let mut script = self.lock();
        script.calls.push(ProviderCall::Complete {
            prompt: request.prompt.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            json: request.format == ResponseFormat::JsonObject,
        });
        script
            .completions
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Empty("scripted completions exhausted".to_string())))
    }

    async fn describe_image(&self, request: &VisionRequest) -> Result<String, ProviderError> {
        let mut script = self.lock();
        script.calls.push(ProviderCall::DescribeImage {
            prompt: request.prompt.clone(),
            image_len: request.image.len(),
        });
        script
            .descriptions
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Empty("scripted descriptions exhausted".to_string())))
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ProviderError> {
        let mut script = self.lock();
        script.calls.push(ProviderCall::GenerateImage {
            prompt: prompt.to_string(),
        });
        script.image.clone()
    }

    async fn synthesize_speech(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        let mut script = self.lock();
        script.calls.push(ProviderCall::SynthesizeSpeech {
            text: text.to_string(),
        });
        script.speech.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completions_are_served_in_order() {
        let provider = ScriptedProvider::new()
            .with_completion("first")
            .with_completion("second");

        let request = CompletionRequest::new("q", 10, 0.5);
        assert_eq!(provider.complete(&request).await.unwrap(), "first");
        assert_eq!(provider.complete(&request).await.unwrap(), "second");
        assert!(matches!(
            provider.complete(&request).await,
            Err(ProviderError::Empty(_))
        ));
        assert_eq!(provider.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_records_json_mode() {
        let provider = ScriptedProvider::new().with_completion("{}");
        provider
            .complete(&CompletionRequest::new("quiz", 2000, 0.7).json())
            .await
            .unwrap();

        assert_eq!(
            provider.calls()[0],
            ProviderCall::Complete {
                prompt: "quiz".into(),
                max_tokens: 2000,
                temperature: 0.7,
                json: true,
            }
        );
    }

    #[tokio::test]
    async fn test_sticky_media_results() {
        let provider = ScriptedProvider::new()
            .with_image_result(Err(ProviderError::Download("gone".into())));

        assert!(provider.generate_image("a").await.is_err());
        assert!(provider.generate_image("b").await.is_err());
        assert_eq!(provider.synthesize_speech("hi").await.unwrap(), FAKE_MP3);
    }
}
