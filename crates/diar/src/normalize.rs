// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Normalization of model output into speaker-attributed segments.

use serde::{Deserialize, Serialize};

use crate::model::{ModelError, PyannoteOutput, RawSegment};

/// A speaker-attributed span, sorted ascending by start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiarSegment {
    #[serde(rename = "start")]
    pub start_s: f64,
    #[serde(rename = "end")]
    pub end_s: f64,
    pub speaker: String,
    #[serde(rename = "duration")]
    pub duration_s: f64,
    pub confidence: f64,
}

impl DiarSegment {
    pub fn new(start_s: f64, end_s: f64, speaker: impl Into<String>, confidence: f64) -> Self {
        Self {
            start_s,
            end_s,
            speaker: speaker.into(),
            duration_s: end_s - start_s,
            confidence,
        }
    }
}

fn sort_by_start(mut segments: Vec<DiarSegment>) -> Vec<DiarSegment> {
    segments.sort_by(|a, b| a.start_s.total_cmp(&b.start_s));
    segments
}

/// Flatten a pyannote result into segments with unit confidence.
pub fn normalize_pyannote(output: PyannoteOutput) -> Vec<DiarSegment> {
    let segments = match output {
        PyannoteOutput::SpeakerTurns(turns) => turns
            .into_iter()
            .map(|(span, speaker)| DiarSegment::new(span.start_s, span.end_s, speaker, 1.0))
            .collect(),
        PyannoteOutput::Tracks(tracks) => tracks
            .into_iter()
            .map(|(span, _, speaker)| DiarSegment::new(span.start_s, span.end_s, speaker, 1.0))
            .collect(),
    };
    sort_by_start(segments)
}

/// Normalize a sortformer result list.
///
/// Accepts a flat list or a list holding one nested list. String items
/// with fewer than three fields are skipped; unparsable numbers fail the
/// job. Records missing both speaker and label get `speaker_{i}`.
pub fn normalize_sortformer(segments: &[RawSegment]) -> Result<Vec<DiarSegment>, ModelError> {
    let items: &[RawSegment] = match segments {
        [RawSegment::Batch(inner)] => inner,
        other => other,
    };

    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item {
            RawSegment::Line(line) => {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() < 3 {
                    continue;
                }
                let start = parse_time(parts[0])?;
                let end = parse_time(parts[1])?;
                out.push(DiarSegment::new(start, end, parts[2], 1.0));
            }
            RawSegment::Triple(start, end, speaker) => {
                out.push(DiarSegment::new(*start, *end, speaker.clone(), 1.0));
            }
            RawSegment::Record { start, end, speaker, label, confidence } => {
                let speaker = speaker
                    .clone()
                    .or_else(|| label.clone())
                    .unwrap_or_else(|| format!("speaker_{i}"));
                out.push(DiarSegment::new(*start, *end, speaker, confidence.unwrap_or(1.0)));
            }
            RawSegment::Batch(_) => {
                return Err(ModelError::Backend(
                    "unexpected nested segment list in diarization output".to_string(),
                ));
            }
        }
    }
    Ok(sort_by_start(out))
}

fn parse_time(value: &str) -> Result<f64, ModelError> {
    value
        .parse::<f64>()
        .map_err(|_| ModelError::Backend(format!("malformed segment time: {value}")))
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
