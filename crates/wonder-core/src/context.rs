//! Generation Context: immutable snapshots threaded through the pipeline
//!
//! A stage never mutates the snapshot it receives. It calls [`GenerationContext::extend`]
//! to produce the next snapshot, and extending refuses to overwrite a key that
//! is already present.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Keys a context can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKey {
    Topic,
    ImagePath,
    Age,
    Interests,
    Content,
    Status,
    Notes,
    Analogy,
    ImageDescription,
    Result,
}

impl ContextKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKey::Topic => "topic",
            ContextKey::ImagePath => "image_path",
            ContextKey::Age => "age",
            ContextKey::Interests => "interests",
            ContextKey::Content => "content",
            ContextKey::Status => "status",
            ContextKey::Notes => "notes",
            ContextKey::Analogy => "analogy",
            ContextKey::ImageDescription => "image_description",
            ContextKey::Result => "result",
        }
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("CONTEXT/WRITTEN: key '{0}' was already written by an earlier stage")]
    AlreadyWritten(ContextKey),

    #[error("CONTEXT/MISSING: key '{0}' is not present")]
    Missing(ContextKey),

    #[error("CONTEXT/TYPE: key '{0}' does not hold text")]
    NotText(ContextKey),

    #[error("{0}")]
    InvalidInput(String),
}

/// Rejection message when a request carries both or neither of topic and image.
pub const TOPIC_XOR_IMAGE: &str = "Please provide either a question or an image, but not both.";

/// Which stage ordering a context selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    Text,
    Image,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationContext {
    entries: BTreeMap<ContextKey, Value>,
}

impl GenerationContext {
    /// Build the entry snapshot. Exactly one of `topic` or `image_path` must be given.
    pub fn from_inputs(
        topic: Option<String>,
        image_path: Option<String>,
        age: Option<u32>,
        interests: Option<String>,
    ) -> Result<Self, ContextError> {
        let topic = topic.filter(|t| !t.trim().is_empty());
        let image_path = image_path.filter(|p| !p.trim().is_empty());

        let mut entries = BTreeMap::new();
        match (topic, image_path) {
            (Some(topic), None) => {
                entries.insert(ContextKey::Topic, Value::String(topic));
            }
            (None, Some(path)) => {
                entries.insert(ContextKey::ImagePath, Value::String(path));
            }
            _ => {
                return Err(ContextError::InvalidInput(TOPIC_XOR_IMAGE.to_string()))
            }
        }

        if let Some(age) = age {
            entries.insert(ContextKey::Age, Value::from(age));
        }
        if let Some(interests) = interests.filter(|i| !i.trim().is_empty()) {
            entries.insert(ContextKey::Interests, Value::String(interests));
        }

        Ok(Self { entries })
    }

    pub fn for_topic(topic: impl Into<String>, age: Option<u32>, interests: Option<String>) -> Result<Self, ContextError> {
        Self::from_inputs(Some(topic.into()), None, age, interests)
    }

    pub fn for_image(path: impl Into<String>, age: Option<u32>, interests: Option<String>) -> Result<Self, ContextError> {
        Self::from_inputs(None, Some(path.into()), age, interests)
    }

    pub fn mode(&self) -> GenerationMode {
        if self.entries.contains_key(&ContextKey::ImagePath) {
            GenerationMode::Image
        } else {
            GenerationMode::Text
        }
    }

    /// Next snapshot with `key` added. Fails if `key` is already present.
    pub fn extend(&self, key: ContextKey, value: impl Into<Value>) -> Result<Self, ContextError> {
        if self.entries.contains_key(&key) {
            return Err(ContextError::AlreadyWritten(key));
        }
        let mut entries = self.entries.clone();
        entries.insert(key, value.into());
        Ok(Self { entries })
    }

    pub fn contains(&self, key: ContextKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn get(&self, key: ContextKey) -> Option<&Value> {
        self.entries.get(&key)
    }

    pub fn text(&self, key: ContextKey) -> Option<&str> {
        self.entries.get(&key).and_then(Value::as_str)
    }

    pub fn require_text(&self, key: ContextKey) -> Result<&str, ContextError> {
        match self.entries.get(&key) {
            None => Err(ContextError::Missing(key)),
            Some(value) => value.as_str().ok_or(ContextError::NotText(key)),
        }
    }

    pub fn age(&self) -> Option<u32> {
        self.entries
            .get(&ContextKey::Age)
            .and_then(Value::as_u64)
            .and_then(|a| u32::try_from(a).ok())
    }

    pub fn interests(&self) -> Option<&str> {
        self.text(ContextKey::Interests)
    }

    pub fn keys(&self) -> Vec<ContextKey> {
        self.entries.keys().copied().collect()
    }

    /// True when `next` holds every entry of `self` unchanged.
    pub fn is_extended_by(&self, next: &GenerationContext) -> bool {
        self.entries
            .iter()
            .all(|(key, value)| next.entries.get(key) == Some(value))
    }

    /// Stable BLAKE3 fingerprint of the snapshot.
    pub fn fingerprint(&self) -> String {
        let bytes = serde_json::to_vec(&self.entries).unwrap_or_default();
        format!("blake3:{}", blake3::hash(&bytes))
    }
}
