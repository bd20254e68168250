//! WonderBot prompt catalogue
//!
//! Every prompt the service sends to the language model lives in an embedded
//! YAML catalogue of Handlebars templates. [`render`] renders against the
//! shared compiled catalogue.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use wonder_prompts::{names, render};
//!
//! let prompt = render(names::FAST_PATH_TEXT, &json!({
//!     "topic": "What is a volcano?",
//!     "age_phrase": " for a 7-year-old child",
//!     "interests_phrase": "",
//! })).unwrap();
//! assert!(prompt.contains("What is a volcano?"));
//! ```

pub mod renderer;
pub mod templates;

use lazy_static::lazy_static;
use serde::Serialize;
use thiserror::Error;

pub use renderer::PromptRenderer;
pub use templates::{PromptCatalogue, PromptTemplate, KID_PROMPTS_YAML};

/// Template names in the embedded catalogue
pub mod names {
    pub const FAST_PATH_TEXT: &str = "fast_path_text";
    pub const FAST_PATH_IMAGE: &str = "fast_path_image";
    pub const IMAGE_ANALYSIS: &str = "image_analysis";
    pub const IMAGE_PRESENT: &str = "image_present";
    pub const RESEARCH: &str = "research";
    pub const VALIDATE: &str = "validate";
    pub const ANALOGY: &str = "analogy";
    pub const PRESENT: &str = "present";
    pub const QUIZ: &str = "quiz";

    pub const ALL: &[&str] = &[
        FAST_PATH_TEXT,
        FAST_PATH_IMAGE,
        IMAGE_ANALYSIS,
        IMAGE_PRESENT,
        RESEARCH,
        VALIDATE,
        ANALOGY,
        PRESENT,
        QUIZ,
    ];
}

/// Errors that can occur while loading or rendering prompts
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("PROMPT/CATALOGUE: {0}")]
    Catalogue(String),
    #[error("PROMPT/MISSING: no template named '{0}'")]
    Missing(String),
    #[error("PROMPT/RENDER: {0}")]
    Render(String),
}

lazy_static! {
    static ref KID_PROMPTS: Result<PromptRenderer, PromptError> = load_embedded();
}

fn load_embedded() -> Result<PromptRenderer, PromptError> {
    let catalogue = PromptCatalogue::embedded()?;
    if let Some(name) = catalogue.missing(names::ALL) {
        return Err(PromptError::Missing(name.to_string()));
    }
    PromptRenderer::new(catalogue)
}

/// The shared renderer over the embedded catalogue
pub fn kid_prompts() -> Result<&'static PromptRenderer, PromptError> {
    KID_PROMPTS.as_ref().map_err(Clone::clone)
}

/// Render a template from the embedded catalogue
pub fn render<T: Serialize>(name: &str, data: &T) -> Result<String, PromptError> {
    kid_prompts()?.render(name, data)
}
