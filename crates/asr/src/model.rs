// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The recognizer model contract.
//!
//! Models are opaque callables loaded by the model manager. Each
//! integration declares which recognize options it honors; the pipeline
//! always passes the full option set and the integration drops the rest,
//! so model variants with narrower surfaces stay usable.

use std::sync::Arc;

use thiserror::Error;

use crate::params::Pnc;

/// Shared handle to a loaded recognizer.
pub type DynAsrModel = Arc<dyn AsrModel>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("recognizer backend error: {0}")]
    Backend(String),
}

/// Recognize options a model integration may honor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKey {
    Language,
    TargetLanguage,
    Pnc,
    SampleRate,
}

impl OptionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKey::Language => "language",
            OptionKey::TargetLanguage => "target_language",
            OptionKey::Pnc => "pnc",
            OptionKey::SampleRate => "sample_rate",
        }
    }
}

/// The full option set handed to every recognize call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizeOptions {
    pub language: Option<String>,
    pub target_language: Option<String>,
    pub pnc: Option<Pnc>,
    pub sample_rate: u32,
}

/// Result of recognizing one chunk.
///
/// Models either return bare text or a timestamp-augmented result with
/// per-token timing (chunk-relative seconds). The pipeline only ever
/// consumes this tagged form.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognizeOutput {
    Text(String),
    Timed {
        text: String,
        tokens: Vec<String>,
        timestamps: Vec<f64>,
    },
}

impl RecognizeOutput {
    pub fn text(&self) -> &str {
        match self {
            RecognizeOutput::Text(text) => text,
            RecognizeOutput::Timed { text, .. } => text,
        }
    }
}

/// A loaded recognizer.
pub trait AsrModel: Send + Sync {
    /// Recognize a batch of chunks; one output per chunk, in order.
    fn recognize_batch(
        &self,
        chunks: &[&[f32]],
        options: &RecognizeOptions,
    ) -> Result<Vec<RecognizeOutput>, ModelError>;

    /// The timestamp-augmented variant of this model, when it exposes one.
    fn timestamped(&self) -> Option<DynAsrModel> {
        None
    }

    /// Whether this integration honors the given recognize option.
    fn honors(&self, key: OptionKey) -> bool;
}
