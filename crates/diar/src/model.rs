// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diarization model contracts.
//!
//! Two model families with distinct loading and invocation shapes sit
//! behind one [`DiarModel`] handle. Result formats the underlying
//! libraries expose are modeled as tagged variants produced by the
//! integrations; the pipeline only consumes the variants.

use std::path::Path;
use std::sync::Arc;

use hark_engine::Device;
use thiserror::Error;

pub type DynSpeakerPipeline = Arc<dyn SpeakerPipeline>;
pub type DynSortformerModel = Arc<dyn SortformerModel>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("diarization backend error: {0}")]
    Backend(String),
}

/// A loaded diarization model, tagged by family.
#[derive(Clone)]
pub enum DiarModel {
    Pyannote(DynSpeakerPipeline),
    Sortformer(DynSortformerModel),
}

impl DiarModel {
    pub fn kind(&self) -> &'static str {
        match self {
            DiarModel::Pyannote(_) => "pyannote",
            DiarModel::Sortformer(_) => "sortformer",
        }
    }
}

/// A span of audio time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSpan {
    pub start_s: f64,
    pub end_s: f64,
}

impl TimeSpan {
    pub fn new(start_s: f64, end_s: f64) -> Self {
        Self { start_s, end_s }
    }

    pub fn duration_s(&self) -> f64 {
        self.end_s - self.start_s
    }
}

/// The two result formats pyannote pipelines expose.
#[derive(Debug, Clone, PartialEq)]
pub enum PyannoteOutput {
    /// Newer format: `(turn, speaker)` pairs.
    SpeakerTurns(Vec<(TimeSpan, String)>),
    /// Older format: `(segment, track id, speaker)` triples.
    Tracks(Vec<(TimeSpan, String, String)>),
}

/// Invocation options; only the non-empty subset reaches the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PyannoteOptions {
    pub min_speakers: Option<i64>,
    pub max_speakers: Option<i64>,
    pub segmentation_batch_size: Option<i64>,
    pub embedding_batch_size: Option<i64>,
    pub embedding_exclude_overlap: Option<bool>,
    pub exclusive: bool,
}

/// A loaded pyannote speaker-diarization pipeline.
pub trait SpeakerPipeline: Send + Sync {
    /// Whether this host can place the pipeline on CUDA.
    fn cuda_available(&self) -> bool {
        false
    }

    fn to_device(&self, device: Device);

    fn set_thread_counts(&self, intra: Option<i64>, interop: Option<i64>);

    /// Mutate the segmentation thresholds. Best effort: integrations
    /// without a matching parameter tree ignore the call.
    fn apply_segmentation(&self, onset: Option<f64>, offset: Option<f64>);

    fn diarize(&self, input: &Path, options: &PyannoteOptions) -> Result<PyannoteOutput, ModelError>;
}

/// Streaming knobs for sortformer models that support them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamingConfig {
    pub chunk_len: i64,
    pub chunk_right_context: i64,
    pub fifo_len: i64,
    pub spkcache_update_period: i64,
}

/// One element of a sortformer result list, before normalization.
///
/// The underlying models emit whitespace-delimited `"start end speaker"`
/// strings, bare triples, keyed records, or a single nested list holding
/// any of those.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSegment {
    Line(String),
    Triple(f64, f64, String),
    Record {
        start: f64,
        end: f64,
        speaker: Option<String>,
        label: Option<String>,
        confidence: Option<f64>,
    },
    Batch(Vec<RawSegment>),
}

/// A loaded sortformer diarization model.
pub trait SortformerModel: Send + Sync {
    /// Apply streaming configuration. Returns false when the model does
    /// not support streaming setup; the caller then runs it offline.
    fn configure_streaming(&self, config: &StreamingConfig) -> bool;

    fn diarize(&self, input: &Path, batch_size: usize) -> Result<Vec<RawSegment>, ModelError>;
}
