//! Application state shared across handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;
use wonder_core::WonderError;
use wonder_media::{AssetDir, PostProcessor};
use wonder_policy::SafetyMode;
use wonder_provider::{AiProvider, OpenAiProvider, RetryingProvider};
use wonder_store::{MemoryStore, ResponseCache};

use crate::config::ServiceConfig;
use crate::metrics::Metrics;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub provider: Arc<dyn AiProvider>,
    /// False when no API key was supplied; AI-backed endpoints answer 503
    pub ai_configured: bool,
    pub cache: ResponseCache,
    pub store: MemoryStore,
    pub postprocessor: PostProcessor,
    pub safety_mode: SafetyMode,
    /// Off unless configured; `/debug/storage` answers 404 otherwise
    pub debug_endpoints: bool,
    pub metrics: Metrics,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn AiProvider>,
        ai_configured: bool,
        upload_dir: impl Into<PathBuf>,
    ) -> Result<Self, WonderError> {
        let metrics = Metrics::new()
            .map_err(|e| WonderError::Configuration(format!("metrics registry: {}", e)))?;
        let postprocessor = PostProcessor::new(provider.clone(), AssetDir::new(upload_dir));

        Ok(Self {
            provider,
            ai_configured,
            cache: ResponseCache::new(),
            store: MemoryStore::new(),
            postprocessor,
            safety_mode: SafetyMode::default(),
            debug_endpoints: false,
            metrics,
            start_time: Instant::now(),
        })
    }

    pub fn with_safety_mode(mut self, safety_mode: SafetyMode) -> Self {
        self.safety_mode = safety_mode;
        self
    }

    pub fn with_debug_endpoints(mut self, enabled: bool) -> Self {
        self.debug_endpoints = enabled;
        self
    }

    /// Wire the OpenAI client behind the retry decorator.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, WonderError> {
        let client = OpenAiProvider::new(config.openai.clone())?;
        if !client.is_configured() {
            warn!("OPENAI_API_KEY is not set; AI-backed endpoints will answer 503");
        }
        let provider: Arc<dyn AiProvider> =
            Arc::new(RetryingProvider::new(client, config.retry.clone()));

        Ok(Self::new(provider, config.ai_configured(), config.upload_dir.clone())?
            .with_safety_mode(config.safety_mode)
            .with_debug_endpoints(config.debug_endpoints))
    }

    pub fn uploads(&self) -> &AssetDir {
        self.postprocessor.assets()
    }

    /// Fail fast before any provider call when no key is configured.
    pub fn require_ai(&self) -> Result<(), WonderError> {
        if self.ai_configured {
            Ok(())
        } else {
            Err(WonderError::Configuration(
                "OpenAI API key not configured".to_string(),
            ))
        }
    }
}
