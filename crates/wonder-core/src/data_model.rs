//! Data Model: PipelineResult, StageTrace, Audience
use serde::{Deserialize, Serialize};

use crate::context::ContextKey;

/// Final answer for one generate request. Cached as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Kid-facing explanation text
    pub result: String,
    /// Local asset URL or placeholder
    pub diagram_url: String,
    /// Human-readable reason when `diagram_url` is a placeholder
    pub diagram_error: Option<String>,
    /// Local asset URL or placeholder
    pub audio_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTrace {
    pub id: String,
    /// Keys visible in the snapshot the stage received
    pub input_keys: Vec<ContextKey>,
    pub written_keys: Vec<ContextKey>,
    pub in_hash: String,
    pub out_hash: String,
    pub latency_ms: u64,
}

/// Who the explanation is for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Audience {
    pub age: Option<u32>,
    pub interests: Option<String>,
}

impl Audience {
    pub fn new(age: Option<u32>, interests: Option<String>) -> Self {
        Self {
            age,
            interests: interests
                .map(|i| i.trim().to_string())
                .filter(|i| !i.is_empty()),
        }
    }

    /// " for a 8-year-old child" or " for children aged 6-12"
    pub fn age_phrase(&self) -> String {
        match self.age {
            Some(age) => format!(" for a {}-year-old child", age),
            None => " for children aged 6-12".to_string(),
        }
    }

    /// " who loves dinosaurs" or empty
    pub fn interests_phrase(&self) -> String {
        match &self.interests {
            Some(interests) => format!(" who loves {}", interests),
            None => String::new(),
        }
    }
}
