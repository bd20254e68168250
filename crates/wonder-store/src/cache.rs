//! Response cache: memoizes finished results for the life of the process.

use md5::{Digest, Md5};
use std::collections::HashMap;
use tokio::sync::RwLock;
use wonder_core::{Audience, PipelineResult};

/// Structured cache key. Topic and image keys can never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Topic {
        topic: String,
        audience: Audience,
    },
    Image {
        md5: String,
        audience: Audience,
    },
}

impl CacheKey {
    pub fn for_topic(topic: &str, audience: &Audience) -> Self {
        CacheKey::Topic {
            topic: normalize_topic(topic),
            audience: audience.clone(),
        }
    }

    pub fn for_image(bytes: &[u8], audience: &Audience) -> Self {
        CacheKey::Image {
            md5: md5_hex(bytes),
            audience: audience.clone(),
        }
    }
}

/// Trim, collapse inner whitespace, lowercase.
pub fn normalize_topic(topic: &str) -> String {
    topic
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn md5_hex(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

#[derive(Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<CacheKey, PipelineResult>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &CacheKey) -> Option<PipelineResult> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn insert(&self, key: CacheKey, result: PipelineResult) {
        self.entries.write().await.insert(key, result);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
