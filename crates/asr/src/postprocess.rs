// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Segment post-processing: folding short segments into their predecessor.

use crate::timestamps::WordSpan;

/// A sentence-like span of transcribed text, before index assignment.
///
/// Carries its word spans so merging keeps words attached to the segment
/// they end up in.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentDraft {
    pub text: String,
    pub start_s: f64,
    pub end_s: f64,
    pub words: Vec<WordSpan>,
}

impl SegmentDraft {
    /// Build a draft from a non-empty word group. Text is the space-join
    /// of the words; the time bounds come from the first and last word.
    pub fn from_words(words: Vec<WordSpan>) -> Option<Self> {
        let first = words.first()?;
        let last = words.last()?;
        let text = words.iter().map(|w| w.word.as_str()).collect::<Vec<_>>().join(" ");
        if text.trim().is_empty() {
            return None;
        }
        Some(Self { text, start_s: first.start_s, end_s: last.end_s, words })
    }

    pub fn duration_s(&self) -> f64 {
        (self.end_s - self.start_s).max(0.0)
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Fold short segments into their predecessor.
///
/// A segment attaches when its duration is under `attach_threshold_s` or
/// its word count is at most `attach_max_words`. The predecessor keeps
/// its start and takes over the text, end time and words. Empty-text
/// segments are dropped outright.
pub fn merge_short_segments(
    segments: Vec<SegmentDraft>,
    attach_threshold_s: f64,
    attach_max_words: usize,
) -> Vec<SegmentDraft> {
    let mut merged: Vec<SegmentDraft> = Vec::new();

    for seg in segments {
        let text = seg.text.trim().to_string();
        if text.is_empty() {
            continue;
        }
        let attach_by_duration = seg.duration_s() < attach_threshold_s;
        let attach_by_words = seg.word_count() <= attach_max_words;

        match merged.last_mut() {
            Some(prev) if attach_by_duration || attach_by_words => {
                prev.text = format!("{} {}", prev.text, text).trim().to_string();
                prev.end_s = prev.end_s.max(seg.end_s);
                prev.words.extend(seg.words);
            }
            _ => merged.push(SegmentDraft { text, ..seg }),
        }
    }

    merged
}

#[cfg(test)]
#[path = "postprocess_tests.rs"]
mod tests;
