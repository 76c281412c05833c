// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The diarization pipeline.
//!
//! Single-shot: the underlying models are not cancellable mid-inference,
//! so the cancel token is honored after the model returns. Progress is
//! coarse (0 then 1).

use std::fs;
use std::sync::Arc;

use hark_core::{Clock, SystemClock};
use hark_engine::{JobOutputs, JobSpec, LoadedModel, ModelManager, Pipeline, PipelineError};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::audio;
use crate::model::{DiarModel, DynSortformerModel, DynSpeakerPipeline, PyannoteOptions, StreamingConfig};
use crate::normalize::{normalize_pyannote, normalize_sortformer, DiarSegment};
use crate::params::{DiarParams, OutputFormat};
use crate::rttm::{build_document, write_document, write_rttm};

/// Diarization inference pipeline over the loaded model.
pub struct DiarPipeline {
    manager: Arc<ModelManager<DiarModel>>,
}

impl DiarPipeline {
    pub fn new(manager: Arc<ModelManager<DiarModel>>) -> Self {
        Self { manager }
    }
}

#[derive(Serialize)]
struct ResultManifest<'a> {
    model_id: &'a str,
    model_name: &'a str,
    audio_path: String,
    output_dir: String,
    segment_count: usize,
    audio_seconds: f64,
    created_unix_ms: u64,
    params: &'a DiarParams,
    outputs: ResultOutputs,
}

#[derive(Serialize)]
struct ResultOutputs {
    diarization: String,
    rttm: Option<String>,
}

impl Pipeline for DiarPipeline {
    type Params = DiarParams;

    fn run(
        &self,
        job: &JobSpec<DiarParams>,
        cancel: &CancellationToken,
        progress: &mut dyn FnMut(f64, &str),
    ) -> Result<JobOutputs, PipelineError> {
        let params = &job.params;
        fs::create_dir_all(&job.output_dir)?;
        progress(0.0, "RUNNING");

        let loaded = self
            .manager
            .get_loaded()
            .ok_or_else(|| PipelineError::failed("no model loaded"))?;

        // A per-job model override rebuilds the spec and goes through the
        // idempotent load path with the caller's token.
        let mut spec = loaded.spec.clone();
        if let Some(model) = &params.model {
            if *model != spec.model_name {
                spec.model_name = model.clone();
            }
        }
        let loaded: LoadedModel<DiarModel> =
            self.manager.ensure_loaded(&spec, params.hf_token.as_deref())?;

        let audio_seconds = audio::duration_seconds(&job.input_path);
        info!(
            job_id = %job.job_id,
            input = %job.input_path.display(),
            kind = loaded.handle.kind(),
            audio_seconds,
            "diarization started"
        );

        let segments = match &loaded.handle {
            DiarModel::Pyannote(pipeline) => run_pyannote(pipeline, job, params)?,
            DiarModel::Sortformer(model) => run_sortformer(model, job, params)?,
        };
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let diarization_path = job.output_dir.join("diarization.json");
        let document = build_document(
            &job.input_path,
            &loaded.spec.model_id,
            &loaded.spec.model_name,
            segments,
            audio_seconds,
        );
        write_document(&diarization_path, &document)?;

        let rttm_path = if params.output_format == OutputFormat::Rttm {
            let path = job.output_dir.join("diarization.rttm");
            write_rttm(&path, &job.input_path, &document.segments)?;
            Some(path)
        } else {
            None
        };

        let result_path = job.output_dir.join("result.json");
        let manifest = ResultManifest {
            model_id: &loaded.spec.model_id,
            model_name: &loaded.spec.model_name,
            audio_path: job.input_path.display().to_string(),
            output_dir: job.output_dir.display().to_string(),
            segment_count: document.segments.len(),
            audio_seconds,
            created_unix_ms: SystemClock.epoch_ms(),
            params,
            outputs: ResultOutputs {
                diarization: diarization_path.display().to_string(),
                rttm: rttm_path.as_ref().map(|p| p.display().to_string()),
            },
        };
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| PipelineError::failed(e.to_string()))?;
        fs::write(&result_path, json)?;

        let mut outputs = JobOutputs::new();
        outputs.insert("diarization".to_string(), diarization_path.display().to_string());
        if let Some(path) = rttm_path {
            outputs.insert("rttm".to_string(), path.display().to_string());
        }
        outputs.insert("result".to_string(), result_path.display().to_string());

        info!(
            job_id = %job.job_id,
            segments = document.segments.len(),
            speakers = document.speaker_count,
            "diarization finished"
        );
        progress(1.0, "COMPLETED");
        Ok(outputs)
    }
}

fn run_pyannote(
    pipeline: &DynSpeakerPipeline,
    job: &JobSpec<DiarParams>,
    params: &DiarParams,
) -> Result<Vec<DiarSegment>, PipelineError> {
    let device = params.device.resolve(pipeline.cuda_available());
    pipeline.to_device(device);
    if params.torch_threads.is_some() || params.torch_interop_threads.is_some() {
        pipeline.set_thread_counts(params.torch_threads, params.torch_interop_threads);
    }
    pipeline.apply_segmentation(params.segmentation_onset, params.segmentation_offset);

    let options = PyannoteOptions {
        min_speakers: params.min_speakers,
        max_speakers: params.max_speakers,
        segmentation_batch_size: params.segmentation_batch_size,
        embedding_batch_size: params.embedding_batch_size,
        embedding_exclude_overlap: params.embedding_exclude_overlap,
        exclusive: params.exclusive,
    };
    let output = pipeline
        .diarize(&job.input_path, &options)
        .map_err(|e| PipelineError::failed(e.to_string()))?;
    Ok(normalize_pyannote(output))
}

fn run_sortformer(
    model: &DynSortformerModel,
    job: &JobSpec<DiarParams>,
    params: &DiarParams,
) -> Result<Vec<DiarSegment>, PipelineError> {
    if params.streaming_mode {
        let config = StreamingConfig {
            chunk_len: params.chunk_len,
            chunk_right_context: params.chunk_right_context,
            fifo_len: params.fifo_len,
            spkcache_update_period: params.spkcache_update_period,
        };
        if !model.configure_streaming(&config) {
            debug!(job_id = %job.job_id, "streaming configuration unsupported, running offline");
        }
    }
    let raw = model
        .diarize(&job.input_path, params.batch_size)
        .map_err(|e| PipelineError::failed(e.to_string()))?;
    normalize_sortformer(&raw).map_err(|e| PipelineError::failed(e.to_string()))
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
