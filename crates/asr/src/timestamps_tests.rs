// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn tokens(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn spans(words: &[(&str, f64, f64)]) -> Vec<WordSpan> {
    words
        .iter()
        .map(|(w, s, e)| WordSpan { word: w.to_string(), start_s: *s, end_s: *e })
        .collect()
}

#[test]
fn space_prefixed_tokens_start_new_words() {
    let words = words_from_tokens(
        &tokens(&["he", "llo", " wor", "ld"]),
        &[0.0, 0.2, 0.5, 0.7],
        10.0,
        12.0,
    );
    assert_eq!(
        words,
        spans(&[("hello", 10.0, 10.5), ("world", 10.5, 12.0)])
    );
}

#[test]
fn first_token_starts_a_word_even_without_space() {
    let words = words_from_tokens(&tokens(&["hi"]), &[0.1], 0.0, 1.0);
    assert_eq!(words, spans(&[("hi", 0.1, 1.0)]));
}

#[test]
fn last_word_end_is_clamped_to_chunk_end() {
    let words = words_from_tokens(&tokens(&[" a", " b"]), &[0.0, 1.5], 0.0, 2.0);
    assert_eq!(words, spans(&[("a", 0.0, 1.5), ("b", 1.5, 2.0)]));

    // A stray timestamp beyond the chunk never yields a negative duration.
    let words = words_from_tokens(&tokens(&[" a", " b"]), &[0.0, 5.0], 0.0, 2.0);
    assert!(words.iter().all(|w| w.end_s >= w.start_s));
}

#[test]
fn mismatched_token_data_yields_no_words() {
    assert!(words_from_tokens(&tokens(&["a", "b"]), &[0.0], 0.0, 1.0).is_empty());
    assert!(words_from_tokens(&[], &[], 0.0, 1.0).is_empty());
}

#[test]
fn whitespace_only_tokens_are_skipped() {
    let words = words_from_tokens(&tokens(&[" ", "hi", " "]), &[0.0, 0.3, 0.6], 0.0, 1.0);
    assert_eq!(words.len(), 1);
    assert_eq!(words[0].word, "hi");
}

#[test]
fn interpolation_allocates_time_by_character_length() {
    let words = words_from_text("a bcd", 0.0, 4.0);
    assert_eq!(words.len(), 2);
    assert_eq!(words[0].word, "a");
    assert!((words[0].end_s - 1.0).abs() < 1e-9);
    assert_eq!(words[1].word, "bcd");
    assert_eq!(words[1].end_s, 4.0);
}

#[test]
fn interpolation_pins_last_word_to_segment_end() {
    let words = words_from_text("one two three", 1.0, 2.0);
    assert_eq!(words.last().unwrap().end_s, 2.0);
    assert_eq!(words.first().unwrap().start_s, 1.0);
}

#[test]
fn interpolation_rejects_degenerate_spans() {
    assert!(words_from_text("hello", 1.0, 1.0).is_empty());
    assert!(words_from_text("", 0.0, 1.0).is_empty());
    assert!(words_from_text("   ", 0.0, 1.0).is_empty());
}

#[test]
fn sentences_split_on_terminal_punctuation() {
    let words = spans(&[
        ("Hello.", 0.0, 0.5),
        ("How", 0.6, 0.8),
        ("are", 0.8, 1.0),
        ("you?", 1.0, 1.2),
        ("Fine", 1.3, 1.5),
    ]);
    let groups = split_sentences(words, None);
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].len(), 1);
    assert_eq!(groups[1].len(), 3);
    assert_eq!(groups[2].len(), 1);
}

#[test]
fn sentences_split_on_time_gaps_when_configured() {
    let words = spans(&[("one", 0.0, 0.5), ("two", 2.0, 2.5), ("three", 2.6, 3.0)]);
    let groups = split_sentences(words.clone(), Some(1.0));
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].len(), 1);
    assert_eq!(groups[1].len(), 2);

    // Without a gap threshold the same words form one segment.
    let groups = split_sentences(words, None);
    assert_eq!(groups.len(), 1);
}

#[test]
fn empty_word_list_yields_no_groups() {
    assert!(split_sentences(Vec::new(), Some(1.0)).is_empty());
}
