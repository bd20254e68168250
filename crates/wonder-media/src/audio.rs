//! Speech synthesis. Never fails: every error maps to a fixed placeholder.

use tracing::{info, warn};
use uuid::Uuid;
use wonder_core::text::truncate_chars;
use wonder_provider::{AiProvider, MAX_SPEECH_CHARS};

use crate::assets::AssetDir;

/// Returned whenever audio could not be produced.
pub const AUDIO_ERROR_URL: &str = "/uploaded_images/audio_error.mp3";

pub(crate) async fn generate_audio(
    provider: &dyn AiProvider,
    assets: &AssetDir,
    explanation: &str,
) -> String {
    let text = truncate_chars(explanation, MAX_SPEECH_CHARS);
    let audio = match provider.synthesize_speech(text).await {
        Ok(audio) => audio,
        Err(error) => {
            warn!(%error, "speech synthesis failed");
            return AUDIO_ERROR_URL.to_string();
        }
    };

    let file_name = format!("audio_{}.mp3", Uuid::new_v4().simple());
    match assets.save(&file_name, &audio).await {
        Ok(url) => {
            info!(%url, "audio saved");
            url
        }
        Err(error) => {
            warn!(%error, "could not save audio");
            AUDIO_ERROR_URL.to_string()
        }
    }
}
