//! Diagram generation. Never fails: every error maps to a placeholder.

use tracing::{info, warn};
use uuid::Uuid;
use wonder_core::text::truncate_chars;
use wonder_core::ProviderError;
use wonder_provider::{AiProvider, MAX_IMAGE_PROMPT_CHARS};

use crate::assets::AssetDir;

pub const DIAGRAM_PROMPT_PREFIX: &str = "Create a simple, colorful diagram for kids that illustrates: ";

const PLACEHOLDER_NO_KEY: &str = "https://placehold.co/400x300?text=No+API+Key";
const PLACEHOLDER_NO_DIAGRAM: &str = "https://placehold.co/400x300?text=No+Diagram+Available";
const PLACEHOLDER_DOWNLOAD_FAILED: &str = "https://placehold.co/400x300?text=Download+Failed";
const PLACEHOLDER_SAVE_FAILED: &str = "https://placehold.co/400x300?text=Download+Error";
const PLACEHOLDER_GENERATION_FAILED: &str = "https://placehold.co/400x300?text=Generation+Failed";

const SAVE_FAILED_MESSAGE: &str = "Sorry, we couldn't save the diagram. Please try again!";

/// Where the diagram ended up, and why not when it is a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramOutcome {
    pub url: String,
    pub error: Option<String>,
}

impl DiagramOutcome {
    fn placeholder(url: &str, error: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            error: Some(error.into()),
        }
    }
}

/// Prefix plus as much of `explanation` as fits in the image prompt limit.
pub fn diagram_prompt(explanation: &str) -> String {
    let budget = MAX_IMAGE_PROMPT_CHARS - DIAGRAM_PROMPT_PREFIX.chars().count();
    format!("{}{}", DIAGRAM_PROMPT_PREFIX, truncate_chars(explanation, budget))
}

pub(crate) async fn generate_diagram(
    provider: &dyn AiProvider,
    assets: &AssetDir,
    explanation: &str,
) -> DiagramOutcome {
    let prompt = diagram_prompt(explanation);
    let image = match provider.generate_image(&prompt).await {
        Ok(image) => image,
        Err(error) => {
            warn!(%error, "diagram generation failed");
            return placeholder_for(&error);
        }
    };

    let file_name = format!("diagram_{}.png", Uuid::new_v4().simple());
    match assets.save(&file_name, &image).await {
        Ok(url) => {
            info!(%url, "diagram saved");
            DiagramOutcome { url, error: None }
        }
        Err(error) => {
            warn!(%error, "could not save diagram");
            DiagramOutcome::placeholder(PLACEHOLDER_SAVE_FAILED, SAVE_FAILED_MESSAGE)
        }
    }
}

fn placeholder_for(error: &ProviderError) -> DiagramOutcome {
    match error {
        ProviderError::NotConfigured(_) => DiagramOutcome::placeholder(
            PLACEHOLDER_NO_KEY,
            "API key not configured. Please check your OpenAI API key.",
        ),
        ProviderError::Empty(_) => DiagramOutcome::placeholder(
            PLACEHOLDER_NO_DIAGRAM,
            "Sorry, we couldn't generate a diagram for this topic. Please try a different question!",
        ),
        ProviderError::Download(_) => {
            DiagramOutcome::placeholder(PLACEHOLDER_DOWNLOAD_FAILED, SAVE_FAILED_MESSAGE)
        }
        other => DiagramOutcome::placeholder(
            PLACEHOLDER_GENERATION_FAILED,
            format!("Sorry, we couldn't generate a diagram. Error: {}", other),
        ),
    }
}
