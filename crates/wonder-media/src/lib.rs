//! WonderBot Media: diagram and audio for a finished explanation.
//!
//! Both sub-steps run concurrently and degrade to placeholders instead of
//! failing, so a [`PostProcessor`] always produces a complete
//! [`PipelineResult`].

pub mod assets;
mod audio;
pub mod diagram;

use std::sync::Arc;
use wonder_core::PipelineResult;
use wonder_provider::AiProvider;

pub use assets::{AssetDir, ASSET_URL_PREFIX};
pub use audio::AUDIO_ERROR_URL;
pub use diagram::{diagram_prompt, DiagramOutcome, DIAGRAM_PROMPT_PREFIX};

pub struct PostProcessor {
    provider: Arc<dyn AiProvider>,
    assets: AssetDir,
}

impl PostProcessor {
    pub fn new(provider: Arc<dyn AiProvider>, assets: AssetDir) -> Self {
        Self { provider, assets }
    }

    pub fn assets(&self) -> &AssetDir {
        &self.assets
    }

    /// Attach a diagram and an audio rendition to `explanation`.
    pub async fn process(&self, explanation: &str) -> PipelineResult {
        let provider = self.provider.as_ref();
        let (diagram, audio_url) = tokio::join!(
            diagram::generate_diagram(provider, &self.assets, explanation),
            audio::generate_audio(provider, &self.assets, explanation),
        );

        PipelineResult {
            result: explanation.to_string(),
            diagram_url: diagram.url,
            diagram_error: diagram.error,
            audio_url,
        }
    }
}
