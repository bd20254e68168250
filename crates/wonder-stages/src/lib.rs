//! WonderBot Stages: the fast path and the LLM-backed pipeline stages.
//!
//! # Pipeline Flow
//!
//! ```text
//! text:  topic → Research → Validate → Analogy → Present → result
//!                   ↓          ↓          ↓
//!                content  status/notes  analogy
//!
//! image: image_path → ImageAnalysis → ImagePresent → result
//!                          ↓
//!                   image_description
//! ```
//!
//! Every stage asks for a JSON object with a fixed shape and rejects any
//! other reply as a malformed payload.

mod analogy;
pub mod fast_path;
mod image_analysis;
mod image_present;
pub mod pipeline;
mod present;
mod reply;
mod research;
mod validate;

pub use analogy::AnalogyStage;
pub use fast_path::{fast_path_image, fast_path_text, is_simple_question, SIMPLE_QUESTION_PHRASES};
pub use image_analysis::ImageAnalysisStage;
pub use image_present::ImagePresentStage;
pub use pipeline::{build_image_pipeline, build_text_pipeline, run_pipeline, PipelineOutcome};
pub use present::PresentStage;
pub use research::ResearchStage;
pub use validate::ValidateStage;
