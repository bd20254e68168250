//! Prompt rendering.
//!
//! Uses Handlebars with HTML escaping disabled and two helpers:
//! - truncate: cut a string to at most N characters, marking the cut with "..."
//! - default: fall back to a literal when a value is null or empty

use handlebars::{handlebars_helper, no_escape, Handlebars};
use serde::Serialize;
use serde_json::Value;

use crate::templates::PromptCatalogue;
use crate::PromptError;

handlebars_helper!(truncate: |text: str, max: u64| {
    let max = max as usize;
    if text.chars().count() > max {
        let mut cut: String = text.chars().take(max).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
});

handlebars_helper!(default_value: |value: Json, fallback: str| {
    match value {
        Value::Null => fallback.to_string(),
        Value::String(s) if s.trim().is_empty() => fallback.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
});

/// Compiled catalogue with registered helpers
pub struct PromptRenderer {
    handlebars: Handlebars<'static>,
    catalogue: PromptCatalogue,
}

impl PromptRenderer {
    /// Compile every template in `catalogue`
    pub fn new(catalogue: PromptCatalogue) -> Result<Self, PromptError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_escape_fn(no_escape);

        handlebars.register_helper("truncate", Box::new(truncate));
        handlebars.register_helper("default", Box::new(default_value));

        for (name, template) in &catalogue.templates {
            handlebars
                .register_template_string(name, &template.template)
                .map_err(|e| PromptError::Catalogue(format!("template '{}': {}", name, e)))?;
        }

        Ok(PromptRenderer { handlebars, catalogue })
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, PromptError> {
        Self::new(PromptCatalogue::from_yaml(yaml)?)
    }

    /// Render a named template with data
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, PromptError> {
        if self.catalogue.get(name).is_none() {
            return Err(PromptError::Missing(name.to_string()));
        }
        self.handlebars
            .render(name, data)
            .map_err(|e| PromptError::Render(e.to_string()))
    }

    pub fn catalogue(&self) -> &PromptCatalogue {
        &self.catalogue
    }
}
