//! Pipeline assembly for both generation modes.

use std::sync::Arc;
use tracing::{error, info};
use wonder_core::{
    ContextKey, GenerationContext, GenerationMode, PipelineRunner, Stage, StageError, StageTrace,
};
use wonder_provider::AiProvider;

use crate::{
    AnalogyStage, ImageAnalysisStage, ImagePresentStage, PresentStage, ResearchStage, ValidateStage,
};

/// Research → Validate → Analogy → Present
pub fn build_text_pipeline(provider: Arc<dyn AiProvider>) -> Result<PipelineRunner, StageError> {
    let stages: Vec<Box<dyn Stage>> = vec![
        Box::new(ResearchStage::new(provider.clone())),
        Box::new(ValidateStage::new(provider.clone())),
        Box::new(AnalogyStage::new(provider.clone())),
        Box::new(PresentStage::new(provider)),
    ];
    PipelineRunner::new(stages, &[ContextKey::Topic])
}

/// ImageAnalysis → ImagePresent
pub fn build_image_pipeline(provider: Arc<dyn AiProvider>) -> Result<PipelineRunner, StageError> {
    let stages: Vec<Box<dyn Stage>> = vec![
        Box::new(ImageAnalysisStage::new(provider.clone())),
        Box::new(ImagePresentStage::new(provider)),
    ];
    PipelineRunner::new(stages, &[ContextKey::ImagePath])
}

/// Final explanation plus the per-stage trace.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub result: String,
    pub trace: Vec<StageTrace>,
}

/// Run the pipeline matching the snapshot's mode and extract `result`.
pub async fn run_pipeline(
    provider: Arc<dyn AiProvider>,
    input: GenerationContext,
) -> Result<PipelineOutcome, StageError> {
    let runner = match input.mode() {
        GenerationMode::Text => build_text_pipeline(provider)?,
        GenerationMode::Image => build_image_pipeline(provider)?,
    };
    info!(pipeline = runner.pipeline_id(), "running full pipeline");

    let run = runner.run(input).await.map_err(|e| {
        error!(pipeline = runner.pipeline_id(), error = %e, "pipeline aborted");
        e
    })?;
    let result = run.context.require_text(ContextKey::Result)?.to_string();
    Ok(PipelineOutcome {
        result,
        trace: run.trace,
    })
}
