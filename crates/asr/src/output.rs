// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk transcript artifacts.
//!
//! `transcript.txt` is the space-join of segment texts plus a trailing
//! newline. The JSONL files carry one record per line with 1-based dense
//! indices and `HH:MM:SS.mmm` twins of every timestamp. `result.json` is
//! the job manifest; its presence marks the output set complete.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use hark_core::format_hhmmss;
use serde::{Deserialize, Serialize};

use crate::params::AsrParams;
use crate::postprocess::SegmentDraft;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub segment_index: usize,
    pub start: f64,
    pub end: f64,
    pub start_hhmmss: String,
    pub end_hhmmss: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordRecord {
    pub global_word_index: usize,
    pub segment_index: usize,
    pub word_index_in_segment: usize,
    pub word: String,
    pub start: f64,
    pub end: f64,
    pub start_hhmmss: String,
    pub end_hhmmss: String,
}

/// Paths of the written output files.
#[derive(Debug, Clone)]
pub struct WrittenOutputs {
    pub transcript: String,
    pub segments: Option<String>,
    pub words: Option<String>,
    pub result: String,
}

/// Assign dense 1-based indices across the final segment list.
pub fn index_segments(drafts: &[SegmentDraft]) -> (Vec<SegmentRecord>, Vec<WordRecord>) {
    let mut segments = Vec::with_capacity(drafts.len());
    let mut words = Vec::new();
    let mut global_word_index = 0;

    for (si, draft) in drafts.iter().enumerate() {
        let segment_index = si + 1;
        segments.push(SegmentRecord {
            segment_index,
            start: draft.start_s,
            end: draft.end_s,
            start_hhmmss: format_hhmmss(Some(draft.start_s)),
            end_hhmmss: format_hhmmss(Some(draft.end_s)),
            text: draft.text.clone(),
        });
        for (wi, word) in draft.words.iter().enumerate() {
            global_word_index += 1;
            words.push(WordRecord {
                global_word_index,
                segment_index,
                word_index_in_segment: wi + 1,
                word: word.word.clone(),
                start: word.start_s,
                end: word.end_s,
                start_hhmmss: format_hhmmss(Some(word.start_s)),
                end_hhmmss: format_hhmmss(Some(word.end_s)),
            });
        }
    }
    (segments, words)
}

/// Write the flat transcript: segment texts joined by single spaces,
/// trimmed, newline-terminated.
pub fn write_transcript(path: &Path, drafts: &[SegmentDraft]) -> io::Result<()> {
    let text = drafts
        .iter()
        .map(|s| s.text.as_str())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    fs::write(path, format!("{}\n", text.trim()))
}

/// Write one JSON object per line.
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    for record in records {
        let line = serde_json::to_string(record).map_err(io::Error::other)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
    }
    Ok(())
}

/// Job manifest written last; readers treat its presence as the
/// completion marker for the whole output directory.
#[derive(Debug, Serialize)]
pub struct ResultManifest<'a> {
    pub model_id: &'a str,
    pub model_name: &'a str,
    pub audio_path: String,
    pub output_dir: String,
    pub segment_count: usize,
    pub audio_seconds: f64,
    pub created_unix_ms: u64,
    pub params: &'a AsrParams,
    pub outputs: ResultOutputs,
}

#[derive(Debug, Serialize)]
pub struct ResultOutputs {
    pub transcript: String,
    pub segments: Option<String>,
    pub words: Option<String>,
}

pub fn write_result(path: &Path, manifest: &ResultManifest<'_>) -> io::Result<()> {
    let json = serde_json::to_string_pretty(manifest).map_err(io::Error::other)?;
    fs::write(path, json)
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
