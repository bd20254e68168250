//! Pipeline Runner: chains stages, checks their contracts and records a trace
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::debug;

use crate::context::{ContextKey, GenerationContext};
use crate::data_model::StageTrace;
use crate::stage::{Stage, StageError};

pub struct PipelineRunner {
    stages: Vec<Box<dyn Stage>>,
    pipeline_id: String,
}

/// Final snapshot plus one trace entry per executed stage.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub context: GenerationContext,
    pub trace: Vec<StageTrace>,
}

impl PipelineRunner {
    /// Assemble a pipeline over the given entry keys.
    ///
    /// Fails when a stage reads a key that neither the entry snapshot nor an
    /// earlier stage provides, or writes a key that already exists.
    pub fn new(stages: Vec<Box<dyn Stage>>, entry_keys: &[ContextKey]) -> Result<Self, StageError> {
        let mut available: BTreeSet<ContextKey> = entry_keys.iter().copied().collect();

        for stage in &stages {
            for key in stage.reads() {
                if !available.contains(key) {
                    return Err(StageError::Wiring {
                        stage: stage.id().to_string(),
                        key: *key,
                        reason: "reads unavailable key".to_string(),
                    });
                }
            }
            for key in stage.writes() {
                if !available.insert(*key) {
                    return Err(StageError::Wiring {
                        stage: stage.id().to_string(),
                        key: *key,
                        reason: "overwrites key".to_string(),
                    });
                }
            }
        }

        let pipeline_id = stages
            .iter()
            .map(|s| s.id().split('.').next().unwrap_or("?"))
            .collect::<Vec<_>>()
            .join("→");

        Ok(Self { stages, pipeline_id })
    }

    pub async fn run(&self, input: GenerationContext) -> Result<PipelineRun, StageError> {
        let mut current = input;
        let mut trace = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let start = Instant::now();
            let in_hash = current.fingerprint();
            let input_keys = current.keys();

            let next = stage.run(&current).await?;
            self.check_contract(stage.as_ref(), &current, &next)?;

            let latency_ms = start.elapsed().as_millis() as u64;
            debug!(stage = stage.id(), latency_ms, "stage completed");

            trace.push(StageTrace {
                id: stage.id().to_string(),
                input_keys,
                written_keys: stage.writes().to_vec(),
                in_hash,
                out_hash: next.fingerprint(),
                latency_ms,
            });

            current = next;
        }

        Ok(PipelineRun { context: current, trace })
    }

    fn check_contract(
        &self,
        stage: &dyn Stage,
        before: &GenerationContext,
        after: &GenerationContext,
    ) -> Result<(), StageError> {
        if !before.is_extended_by(after) {
            return Err(StageError::Contract {
                stage: stage.id().to_string(),
                reason: "mutated or dropped an existing key".to_string(),
            });
        }
        for key in stage.writes() {
            if !after.contains(*key) {
                return Err(StageError::Contract {
                    stage: stage.id().to_string(),
                    reason: format!("did not write '{}'", key),
                });
            }
        }
        Ok(())
    }

    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
