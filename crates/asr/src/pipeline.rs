// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The chunked, batched transcription pipeline.
//!
//! Audio is partitioned into fixed-length chunks (no overlap, short final
//! chunk allowed), recognized in batches, and reassembled into sentence
//! segments with word-level timing. The cancel token is checked per chunk
//! result; progress is published once per batch as
//! `min(1.0, batch_end / audio_seconds)`.

use std::fs;
use std::sync::Arc;

use hark_core::{Clock, SystemClock};
use hark_engine::{JobOutputs, JobSpec, ModelManager, Pipeline, PipelineError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::audio::AudioDecoder;
use crate::model::{DynAsrModel, RecognizeOptions, RecognizeOutput};
use crate::output::{
    index_segments, write_jsonl, write_result, write_transcript, ResultManifest, ResultOutputs,
};
use crate::params::AsrParams;
use crate::postprocess::{merge_short_segments, SegmentDraft};
use crate::timestamps::{split_sentences, words_from_text, words_from_tokens};

/// One contiguous audio span submitted to the recognizer.
#[derive(Debug, Clone, PartialEq)]
struct ChunkPlan {
    start_sample: usize,
    end_sample: usize,
    start_s: f64,
    end_s: f64,
}

fn plan_chunks(total_samples: usize, sample_rate: u32, chunk_len_s: f64) -> Vec<ChunkPlan> {
    if total_samples == 0 || sample_rate == 0 {
        return Vec::new();
    }
    let chunk_len_s = chunk_len_s.max(1.0);
    let chunk_samples = ((chunk_len_s * sample_rate as f64) as usize).max(1);
    let rate = sample_rate as f64;

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < total_samples {
        let end = (start + chunk_samples).min(total_samples);
        chunks.push(ChunkPlan {
            start_sample: start,
            end_sample: end,
            start_s: start as f64 / rate,
            end_s: end as f64 / rate,
        });
        start = end;
    }
    chunks
}

/// ASR inference pipeline over the loaded recognizer model.
pub struct AsrPipeline {
    manager: Arc<ModelManager<DynAsrModel>>,
    decoder: Arc<dyn AudioDecoder>,
}

impl AsrPipeline {
    pub fn new(manager: Arc<ModelManager<DynAsrModel>>, decoder: Arc<dyn AudioDecoder>) -> Self {
        Self { manager, decoder }
    }
}

impl Pipeline for AsrPipeline {
    type Params = AsrParams;

    fn run(
        &self,
        job: &JobSpec<AsrParams>,
        cancel: &CancellationToken,
        progress: &mut dyn FnMut(f64, &str),
    ) -> Result<JobOutputs, PipelineError> {
        let params = &job.params;
        fs::create_dir_all(&job.output_dir)?;

        let loaded = self
            .manager
            .get_loaded()
            .ok_or_else(|| PipelineError::failed("no model loaded"))?;

        let audio = self
            .decoder
            .decode(&job.input_path, params.sample_rate)
            .map_err(|e| PipelineError::failed(e.to_string()))?;
        let audio_seconds = audio.len() as f64 / params.sample_rate as f64;
        info!(
            job_id = %job.job_id,
            input = %job.input_path.display(),
            audio_seconds,
            "transcription started"
        );

        // Word and segment outputs need per-token timing when available.
        let mut model: DynAsrModel = loaded.handle.clone();
        if params.include_words || params.include_segments {
            if let Some(timed) = model.timestamped() {
                model = timed;
            }
        }

        let options = RecognizeOptions {
            language: params.language.clone(),
            target_language: params.target_language.clone(),
            pnc: params.pnc,
            sample_rate: params.sample_rate,
        };

        let chunks = plan_chunks(audio.len(), params.sample_rate, params.chunk_len_s);
        let mut drafts: Vec<SegmentDraft> = Vec::new();

        for batch in chunks.chunks(params.chunk_batch_size.max(1)) {
            let slices: Vec<&[f32]> =
                batch.iter().map(|c| &audio[c.start_sample..c.end_sample]).collect();
            let results = model
                .recognize_batch(&slices, &options)
                .map_err(|e| PipelineError::failed(e.to_string()))?;

            for (chunk, result) in batch.iter().zip(results) {
                if cancel.is_cancelled() {
                    return Err(PipelineError::Cancelled);
                }
                let text = result.text().trim().to_string();
                let words = match &result {
                    RecognizeOutput::Timed { tokens, timestamps, .. } => {
                        let words =
                            words_from_tokens(tokens, timestamps, chunk.start_s, chunk.end_s);
                        if words.is_empty() {
                            words_from_text(&text, chunk.start_s, chunk.end_s)
                        } else {
                            words
                        }
                    }
                    RecognizeOutput::Text(_) => words_from_text(&text, chunk.start_s, chunk.end_s),
                };
                for group in split_sentences(words, params.segment_gap_s) {
                    if let Some(draft) = SegmentDraft::from_words(group) {
                        drafts.push(draft);
                    }
                }
            }

            if audio_seconds > 0.0 {
                if let Some(last) = batch.last() {
                    progress((last.end_s / audio_seconds).min(1.0), "RUNNING");
                }
            }
        }

        if params.merge_short_segments {
            drafts = merge_short_segments(
                drafts,
                params.merge_attach_threshold_s,
                params.merge_attach_max_words,
            );
        }

        let (segments, words) = index_segments(&drafts);
        debug!(
            job_id = %job.job_id,
            segments = segments.len(),
            words = words.len(),
            "writing transcript outputs"
        );

        let transcript_path = job.output_dir.join("transcript.txt");
        write_transcript(&transcript_path, &drafts)?;

        let segments_path = if params.include_segments {
            let path = job.output_dir.join("segments.jsonl");
            write_jsonl(&path, &segments)?;
            Some(path)
        } else {
            None
        };
        let words_path = if params.include_words {
            let path = job.output_dir.join("words.jsonl");
            write_jsonl(&path, &words)?;
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
            segment_count: segments.len(),
            audio_seconds,
            created_unix_ms: SystemClock.epoch_ms(),
            params,
            outputs: ResultOutputs {
                transcript: transcript_path.display().to_string(),
                segments: segments_path.as_ref().map(|p| p.display().to_string()),
                words: words_path.as_ref().map(|p| p.display().to_string()),
            },
        };
        write_result(&result_path, &manifest)?;

        let mut outputs = JobOutputs::new();
        outputs.insert("transcript".to_string(), transcript_path.display().to_string());
        if let Some(path) = segments_path {
            outputs.insert("segments".to_string(), path.display().to_string());
        }
        if let Some(path) = words_path {
            outputs.insert("words".to_string(), path.display().to_string());
        }
        outputs.insert("result".to_string(), result_path.display().to_string());
        info!(job_id = %job.job_id, segments = segments.len(), "transcription finished");
        Ok(outputs)
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
