//! OpenAI API provider implementation
//!
//! Chat completions (text and vision), image generation and text-to-speech
//! against the OpenAI REST API or any compatible base URL.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};
use wonder_core::ProviderError;

use crate::provider::{AiProvider, CompletionRequest, ResponseFormat, VisionRequest};

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Timeout for fetching a generated image from its returned URL.
const IMAGE_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// `None` leaves the provider unconfigured; every call then fails fast
    pub api_key: Option<String>,
    pub base_url: String,
    pub chat_model: String,
    pub vision_model: String,
    pub image_model: String,
    pub image_size: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub request_timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: OPENAI_API_URL.to_string(),
            chat_model: "gpt-3.5-turbo".to_string(),
            vision_model: "gpt-4o".to_string(),
            image_model: "dall-e-3".to_string(),
            image_size: "1024x1024".to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("OpenAI API key not configured".to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Response, ProviderError> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(response).await
    }

    async fn chat(&self, body: Value) -> Result<String, ProviderError> {
        let response = self.post_json("chat/completions", &body).await?;
        let parsed: ChatResponse = response.json().await.map_err(map_reqwest_error)?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedPayload("No choices in response".to_string()))?
            .message
            .content
            .unwrap_or_default();

        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(ProviderError::Empty("completion returned no text".to_string()));
        }
        Ok(content)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        info!("Downloading generated image");
        let response = self
            .client
            .get(url)
            .timeout(IMAGE_DOWNLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|e| ProviderError::Download(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Download(format!(
                "image download returned HTTP {}",
                response.status().as_u16()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Download(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let mut body = json!({
            "model": self.config.chat_model,
            "messages": [ChatMessage::user_text(&request.prompt)],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });
        if request.format == ResponseFormat::JsonObject {
            body["response_format"] = json!({ "type": "json_object" });
        }
        debug!(model = %self.config.chat_model, max_tokens = request.max_tokens, "chat completion");
        self.chat(body).await
    }

    async fn describe_image(&self, request: &VisionRequest) -> Result<String, ProviderError> {
        let data_url = format!(
            "data:{};base64,{}",
            request.mime_type(),
            BASE64.encode(&request.image)
        );
        let body = json!({
            "model": self.config.vision_model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": request.prompt },
                    { "type": "image_url", "image_url": { "url": data_url } }
                ]
            }],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });
        debug!(model = %self.config.vision_model, bytes = request.image.len(), "vision completion");
        self.chat(body).await
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ProviderError> {
        let body = json!({
            "model": self.config.image_model,
            "prompt": prompt,
            "n": 1,
            "size": self.config.image_size,
        });
        let response = self.post_json("images/generations", &body).await?;
        let parsed: ImageResponse = response.json().await.map_err(map_reqwest_error)?;

        let image = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedPayload("No images in response".to_string()))?;

        if let Some(b64) = image.b64_json.filter(|s| !s.is_empty()) {
            return BASE64
                .decode(b64)
                .map_err(|e| ProviderError::MalformedPayload(e.to_string()));
        }
        match image.url.filter(|u| !u.is_empty()) {
            Some(url) => self.download(&url).await,
            None => Err(ProviderError::Empty("image response missing URL".to_string())),
        }
    }

    async fn synthesize_speech(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        let body = json!({
            "model": self.config.tts_model,
            "voice": self.config.tts_voice,
            "input": text,
        });
        let response = self.post_json("audio/speech", &body).await?;
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        if bytes.is_empty() {
            return Err(ProviderError::Empty("speech response was empty".to_string()));
        }
        Ok(bytes.to_vec())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else if err.is_decode() {
        ProviderError::MalformedPayload(err.to_string())
    } else {
        ProviderError::Network(err.to_string())
    }
}

async fn ensure_success(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    Err(ProviderError::Status {
        status: status.as_u16(),
        message,
    })
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> ChatMessage<'a> {
    fn user_text(content: &'a str) -> Self {
        Self { role: "user", content }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
    b64_json: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
