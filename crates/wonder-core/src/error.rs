//! Unified Error Model
use thiserror::Error;

use crate::context::ContextError;
use crate::stage::StageError;

/// Failure talking to the external AI provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("PROVIDER/NOT_CONFIGURED: {0}")]
    NotConfigured(String),

    #[error("PROVIDER/NETWORK: {0}")]
    Network(String),

    #[error("PROVIDER/TIMEOUT")]
    Timeout,

    #[error("PROVIDER/HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("PROVIDER/MALFORMED: {0}")]
    MalformedPayload(String),

    #[error("PROVIDER/EMPTY: {0}")]
    Empty(String),

    #[error("PROVIDER/DOWNLOAD: {0}")]
    Download(String),
}

impl ProviderError {
    /// Whether retrying the same call could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Network(_) | ProviderError::Timeout | ProviderError::Download(_) => true,
            ProviderError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            ProviderError::NotConfigured(_)
            | ProviderError::MalformedPayload(_)
            | ProviderError::Empty(_) => false,
        }
    }
}

/// Top-level error surfaced to the HTTP layer.
#[derive(Error, Debug)]
pub enum WonderError {
    #[error("CONFIG/{0}")]
    Configuration(String),

    #[error("{0}")]
    Provider(ProviderError),

    #[error("VALIDATION/{0}")]
    Validation(String),

    #[error("NOT_FOUND/{0}")]
    NotFound(String),

    #[error("AUTH/{0}")]
    Unauthorized(String),

    #[error("FORBIDDEN/{0}")]
    Forbidden(String),

    #[error("CONFLICT/{0}")]
    Conflict(String),

    #[error("{0}")]
    Stage(StageError),

    #[error("SAFETY/{0}")]
    Unsafe(String),

    #[error("IO/{0}")]
    Io(#[from] std::io::Error),
}

impl From<ProviderError> for WonderError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(msg) => WonderError::Configuration(msg),
            other => WonderError::Provider(other),
        }
    }
}

impl From<StageError> for WonderError {
    fn from(err: StageError) -> Self {
        match err {
            StageError::Provider(ProviderError::NotConfigured(msg)) => {
                WonderError::Configuration(msg)
            }
            other => WonderError::Stage(other),
        }
    }
}

impl From<ContextError> for WonderError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::InvalidInput(msg) => WonderError::Validation(msg),
            other => WonderError::Stage(StageError::Context(other)),
        }
    }
}
