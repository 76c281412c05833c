// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hark-diar: the speaker diarization engine.
//!
//! Partitions audio into speaker-attributed segments with a pyannote or
//! sortformer model and writes them as JSON and optionally RTTM.

pub mod align;
pub mod audio;
pub mod command;
pub mod model;
pub mod normalize;
pub mod params;
pub mod pipeline;
pub mod rttm;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use align::estimate_alignment_offset;
pub use model::{
    DiarModel, DynSortformerModel, DynSpeakerPipeline, ModelError, PyannoteOptions,
    PyannoteOutput, RawSegment, SortformerModel, SpeakerPipeline, StreamingConfig, TimeSpan,
};
pub use normalize::{normalize_pyannote, normalize_sortformer, DiarSegment};
pub use params::{DiarParams, OutputFormat};
pub use pipeline::DiarPipeline;
pub use rttm::{build_document, parse_rttm, write_rttm, DiarizationDocument};
