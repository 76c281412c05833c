// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The diarization document and RTTM writers.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::normalize::DiarSegment;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingInfo {
    pub total_segments: usize,
    /// Sum of segment durations in seconds.
    pub total_speech_time: f64,
}

/// The `diarization.json` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiarizationDocument {
    pub audio_file: String,
    pub model_name: String,
    pub model_id: String,
    pub segments: Vec<DiarSegment>,
    /// Unique speaker labels, sorted.
    pub speakers: Vec<String>,
    pub speaker_count: usize,
    pub total_duration: f64,
    pub processing_info: ProcessingInfo,
}

pub fn build_document(
    audio_file: &Path,
    model_id: &str,
    model_name: &str,
    segments: Vec<DiarSegment>,
    audio_seconds: f64,
) -> DiarizationDocument {
    let speakers: BTreeSet<String> = segments.iter().map(|s| s.speaker.clone()).collect();
    let total_speech_time = segments.iter().map(|s| s.duration_s).sum();
    DiarizationDocument {
        audio_file: audio_file.display().to_string(),
        model_name: model_name.to_string(),
        model_id: model_id.to_string(),
        speaker_count: speakers.len(),
        speakers: speakers.into_iter().collect(),
        total_duration: audio_seconds,
        processing_info: ProcessingInfo {
            total_segments: segments.len(),
            total_speech_time,
        },
        segments,
    }
}

pub fn write_document(path: &Path, document: &DiarizationDocument) -> io::Result<()> {
    let json = serde_json::to_string_pretty(document).map_err(io::Error::other)?;
    fs::write(path, json)
}

/// Write one `SPEAKER` line per segment:
/// `SPEAKER <stem> 1 <start:.3> <duration:.3> <NA> <NA> <speaker> <NA> <NA>`.
pub fn write_rttm(path: &Path, audio_path: &Path, segments: &[DiarSegment]) -> io::Result<()> {
    let stem = audio_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "audio".to_string());
    let mut file = fs::File::create(path)?;
    for segment in segments {
        writeln!(
            file,
            "SPEAKER {stem} 1 {:.3} {:.3} <NA> <NA> {} <NA> <NA>",
            segment.start_s,
            segment.duration_s.max(0.0),
            segment.speaker
        )?;
    }
    Ok(())
}

/// Parse `SPEAKER` lines back into `(start, duration, speaker)` triples.
/// Lines that are not well-formed `SPEAKER` records are skipped.
pub fn parse_rttm(content: &str) -> Vec<(f64, f64, String)> {
    content
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 8 || fields[0] != "SPEAKER" {
                return None;
            }
            let start = fields[3].parse::<f64>().ok()?;
            let duration = fields[4].parse::<f64>().ok()?;
            Some((start, duration, fields[7].to_string()))
        })
        .collect()
}

#[cfg(test)]
#[path = "rttm_tests.rs"]
mod tests;
