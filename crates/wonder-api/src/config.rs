//! Service configuration from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use wonder_core::WonderError;
use wonder_policy::SafetyMode;
use wonder_provider::{OpenAiConfig, RetryConfig};

pub const DEFAULT_ADDR: &str = "0.0.0.0:8787";
pub const DEFAULT_UPLOAD_DIR: &str = "./uploaded_images";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub addr: String,
    pub upload_dir: PathBuf,
    pub openai: OpenAiConfig,
    pub retry: RetryConfig,
    pub safety_mode: SafetyMode,
    /// Serve `/debug/storage`; it lists users and hash prefixes
    pub debug_endpoints: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            openai: OpenAiConfig::default(),
            retry: RetryConfig::default(),
            safety_mode: SafetyMode::default(),
            debug_endpoints: false,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, WonderError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WonderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        config.openai.api_key = get("OPENAI_API_KEY");
        if let Some(base_url) = get("OPENAI_BASE_URL") {
            config.openai.base_url = base_url;
        }
        if let Some(addr) = get("WONDER_ADDR") {
            config.addr = addr;
        }
        if let Some(dir) = get("WONDER_UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }
        if let Some(model) = get("WONDER_CHAT_MODEL") {
            config.openai.chat_model = model;
        }
        if let Some(model) = get("WONDER_VISION_MODEL") {
            config.openai.vision_model = model;
        }
        if let Some(model) = get("WONDER_IMAGE_MODEL") {
            config.openai.image_model = model;
        }
        if let Some(model) = get("WONDER_TTS_MODEL") {
            config.openai.tts_model = model;
        }
        if let Some(voice) = get("WONDER_TTS_VOICE") {
            config.openai.tts_voice = voice;
        }
        if let Some(mode) = get("WONDER_SAFETY_MODE") {
            config.safety_mode = mode
                .parse()
                .map_err(|e| WonderError::Configuration(format!("WONDER_SAFETY_MODE: {}", e)))?;
        }
        if let Some(flag) = get("WONDER_DEBUG_ENDPOINTS") {
            config.debug_endpoints = parse_flag("WONDER_DEBUG_ENDPOINTS", &flag)?;
        }
        if let Some(secs) = get("WONDER_REQUEST_TIMEOUT_SECS") {
            config.openai.request_timeout =
                Duration::from_secs(parse_number("WONDER_REQUEST_TIMEOUT_SECS", &secs)?);
        }
        if let Some(retries) = get("WONDER_MAX_RETRIES") {
            config.retry.max_retries = parse_number("WONDER_MAX_RETRIES", &retries)?;
        }

        Ok(config)
    }

    pub fn ai_configured(&self) -> bool {
        self.openai.api_key.is_some()
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, WonderError> {
    value.parse().map_err(|_| {
        WonderError::Configuration(format!("{} must be a non-negative integer, got '{}'", key, value))
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, WonderError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(WonderError::Configuration(format!(
            "{} must be true or false, got '{}'",
            key, value
        ))),
    }
}
