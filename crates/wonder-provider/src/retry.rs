//! Retry logic for provider calls with exponential backoff
//!
//! [`RetryingProvider`] wraps any [`AiProvider`] so every operation shares the
//! same policy. Only transient failures are retried.

use async_trait::async_trait;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};
use wonder_core::ProviderError;

use crate::provider::{AiProvider, CompletionRequest, VisionRequest};

/// Retry configuration with smart defaults
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 disables retrying)
    pub max_retries: u32,
    /// Base delay in milliseconds (exponentially increased)
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds
    pub max_delay_ms: u64,
    /// Jitter percentage (0.0 to 1.0)
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
            jitter: 0.2,
        }
    }
}

impl RetryConfig {
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Calculate delay for a given attempt number
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponential_ms = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        let capped_ms = exponential_ms.min(self.max_delay_ms);

        let jitter_range = (capped_ms as f64 * self.jitter.clamp(0.0, 1.0)) as i64;
        let jitter_ms = if jitter_range > 0 {
            rand::thread_rng().gen_range(-jitter_range..=jitter_range)
        } else {
            0
        };

        let final_ms = (capped_ms as i64 + jitter_ms).max(0) as u64;
        Duration::from_millis(final_ms)
    }
}

/// Retry an async operation with exponential backoff
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    config: &RetryConfig,
    operation_name: &str,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    info!(operation = operation_name, attempts = attempt + 1, "retry succeeded");
                }
                return Ok(result);
            }
            Err(error) => {
                if !error.is_transient() || attempt >= config.max_retries {
                    return Err(error);
                }

                let delay = config.calculate_delay(attempt);
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    %error,
                    "transient provider failure, retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Decorator applying [`with_retry`] to every provider operation
pub struct RetryingProvider<P> {
    inner: P,
    config: RetryConfig,
}

impl<P: AiProvider> RetryingProvider<P> {
    pub fn new(inner: P, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: AiProvider> AiProvider for RetryingProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        with_retry(|| self.inner.complete(request), &self.config, "complete").await
    }

    async fn describe_image(&self, request: &VisionRequest) -> Result<String, ProviderError> {
        with_retry(|| self.inner.describe_image(request), &self.config, "describe_image").await
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ProviderError> {
        with_retry(|| self.inner.generate_image(prompt), &self.config, "generate_image").await
    }

    async fn synthesize_speech(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        with_retry(|| self.inner.synthesize_speech(text), &self.config, "synthesize_speech").await
    }
}
