// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Word-level timing derivation and sentence splitting.
//!
//! Preferred source is model-supplied tokens with per-token timestamps
//! (space-prefix heuristic); the fallback interpolates word times from
//! character lengths across the chunk. Both paths pin the last word's end
//! to the chunk end.

/// A whitespace-delimited token with time bounds, in global audio time.
#[derive(Debug, Clone, PartialEq)]
pub struct WordSpan {
    pub word: String,
    pub start_s: f64,
    pub end_s: f64,
}

/// Derive words from model tokens and chunk-relative timestamps.
///
/// A token beginning with a space starts a new word; any other token
/// extends the current one. Returns an empty vec when the token data is
/// unusable (empty, or length-mismatched with the timestamps) so the
/// caller can fall back to interpolation.
pub fn words_from_tokens(
    tokens: &[String],
    timestamps: &[f64],
    chunk_start_s: f64,
    chunk_end_s: f64,
) -> Vec<WordSpan> {
    if tokens.is_empty() || tokens.len() != timestamps.len() {
        return Vec::new();
    }

    // Group tokens into words with each word's start time.
    let mut words: Vec<(String, f64)> = Vec::new();
    for (token, ts) in tokens.iter().zip(timestamps) {
        let piece = token.trim();
        if piece.is_empty() {
            continue;
        }
        let starts_word = token.starts_with(' ') || words.is_empty();
        if starts_word {
            words.push((piece.to_string(), chunk_start_s + ts));
        } else if let Some((current, _)) = words.last_mut() {
            current.push_str(piece);
        }
    }

    let starts: Vec<f64> = words.iter().map(|(_, start)| *start).collect();
    words
        .into_iter()
        .enumerate()
        .map(|(i, (word, start_s))| {
            let end_s = starts.get(i + 1).copied().unwrap_or(chunk_end_s).min(chunk_end_s);
            WordSpan { word, start_s, end_s: end_s.max(start_s) }
        })
        .collect()
}

/// Interpolate word times proportionally to character length.
///
/// Gives longer words more of the span instead of equal shares, so "a"
/// and "velociraptor" don't get the same duration. Not forced alignment.
pub fn words_from_text(text: &str, start_s: f64, end_s: f64) -> Vec<WordSpan> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() || end_s <= start_s {
        return Vec::new();
    }

    let lengths: Vec<f64> = words.iter().map(|w| w.chars().count().max(1) as f64).collect();
    let total: f64 = lengths.iter().sum();
    let duration = end_s - start_s;

    let mut out = Vec::with_capacity(words.len());
    let mut t = start_s;
    for (word, len) in words.iter().zip(&lengths) {
        let word_end = t + duration * (len / total);
        out.push(WordSpan { word: word.to_string(), start_s: t, end_s: word_end });
        t = word_end;
    }
    if let Some(last) = out.last_mut() {
        last.end_s = end_s;
    }
    out
}

/// Split a chunk's words into sentence-like groups.
///
/// A group closes after a word ending in `.`, `!` or `?`, or when the
/// gap to the next word meets the configured threshold.
pub fn split_sentences(words: Vec<WordSpan>, gap_s: Option<f64>) -> Vec<Vec<WordSpan>> {
    let mut groups: Vec<Vec<WordSpan>> = Vec::new();
    let mut current: Vec<WordSpan> = Vec::new();

    for i in 0..words.len() {
        let ends_sentence = words[i].word.ends_with(['.', '!', '?']);
        let gap_break = match gap_s {
            Some(gap) if i + 1 < words.len() => words[i + 1].start_s - words[i].end_s >= gap,
            _ => false,
        };
        current.push(words[i].clone());
        if ends_sentence || gap_break {
            groups.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

#[cfg(test)]
#[path = "timestamps_tests.rs"]
mod tests;
