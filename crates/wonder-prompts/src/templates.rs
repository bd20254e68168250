//! Prompt catalogue loading.
//!
//! The catalogue is a YAML document with named Handlebars templates:
//!
//! ```yaml
//! version: "1.0"
//! templates:
//!   research:
//!     description: First-pass explanation of a topic
//!     template: "Explain {{topic}}"
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::PromptError;

/// Catalogue compiled into the binary.
pub const KID_PROMPTS_YAML: &str = include_str!("../prompts/kid-prompts.yaml");

/// Top-level catalogue file structure
#[derive(Debug, Clone, Deserialize)]
pub struct PromptCatalogue {
    pub version: String,
    pub templates: BTreeMap<String, PromptTemplate>,
}

/// A single template definition
#[derive(Debug, Clone, Deserialize)]
pub struct PromptTemplate {
    pub description: String,
    pub template: String,
}

impl PromptCatalogue {
    /// Parse a catalogue from YAML content
    pub fn from_yaml(yaml: &str) -> Result<Self, PromptError> {
        serde_yaml::from_str(yaml).map_err(|e| PromptError::Catalogue(e.to_string()))
    }

    /// The catalogue shipped with the crate
    pub fn embedded() -> Result<Self, PromptError> {
        Self::from_yaml(KID_PROMPTS_YAML)
    }

    pub fn get(&self, name: &str) -> Option<&PromptTemplate> {
        self.templates.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(|s| s.as_str()).collect()
    }

    /// First name in `required` that the catalogue lacks, if any
    pub fn missing<'a>(&self, required: &[&'a str]) -> Option<&'a str> {
        required
            .iter()
            .copied()
            .find(|name| !self.templates.contains_key(*name))
    }
}
