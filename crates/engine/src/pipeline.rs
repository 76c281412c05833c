// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The contract between the job runner and an engine's inference pipeline.

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::model_manager::LoadError;

/// Logical output name → written file path.
pub type JobOutputs = BTreeMap<String, String>;

/// Why a pipeline run ended without producing outputs.
///
/// `Cancelled` is a sentinel result, not an error condition: the runner
/// translates it to the `CANCELLED` terminal state. Everything else
/// becomes `FAILED` with the message text.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cancelled")]
    Cancelled,
    #[error("{0}")]
    Failed(String),
}

impl PipelineError {
    pub fn failed(message: impl Into<String>) -> Self {
        PipelineError::Failed(message.into())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::Failed(e.to_string())
    }
}

impl From<LoadError> for PipelineError {
    fn from(e: LoadError) -> Self {
        PipelineError::Failed(e.to_string())
    }
}

/// One job as handed to a pipeline.
pub struct JobSpec<P> {
    pub job_id: String,
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub params: P,
}

/// An engine's inference pipeline.
///
/// `run` executes synchronously on the job worker thread. Implementations
/// check `cancel` at their cooperative boundaries (between chunks for
/// ASR, after inference for diarization) and report progress through the
/// callback; progress received after cancellation is dropped upstream.
pub trait Pipeline: Send + Sync + 'static {
    type Params: Send + 'static;

    fn run(
        &self,
        job: &JobSpec<Self::Params>,
        cancel: &CancellationToken,
        progress: &mut dyn FnMut(f64, &str),
    ) -> Result<JobOutputs, PipelineError>;
}
