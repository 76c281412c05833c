// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::PathBuf;

fn segments() -> Vec<DiarSegment> {
    vec![
        DiarSegment::new(0.0, 1.5, "speaker_1", 1.0),
        DiarSegment::new(1.5, 2.0, "speaker_2", 1.0),
        DiarSegment::new(2.25, 4.0, "speaker_1", 1.0),
    ]
}

#[test]
fn document_collects_sorted_unique_speakers() {
    let doc = build_document(
        &PathBuf::from("/in/jfk.wav"),
        "pyannote",
        "pyannote/speaker-diarization-community-1",
        segments(),
        4.0,
    );
    assert_eq!(doc.audio_file, "/in/jfk.wav");
    assert_eq!(doc.model_id, "pyannote");
    assert_eq!(doc.speakers, vec!["speaker_1".to_string(), "speaker_2".to_string()]);
    assert_eq!(doc.speaker_count, 2);
    assert_eq!(doc.total_duration, 4.0);
    assert_eq!(doc.processing_info.total_segments, 3);
    assert!((doc.processing_info.total_speech_time - 3.75).abs() < 1e-9);
}

#[test]
fn document_round_trips_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diarization.json");
    let doc = build_document(&PathBuf::from("a.wav"), "pyannote", "model", segments(), 4.0);
    write_document(&path, &doc).unwrap();

    let back: DiarizationDocument =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn rttm_lines_use_the_audio_stem_and_millisecond_precision() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diarization.rttm");
    write_rttm(&path, &PathBuf::from("/audio/jfk.wav"), &segments()).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "SPEAKER jfk 1 0.000 1.500 <NA> <NA> speaker_1 <NA> <NA>");
    assert_eq!(lines[1], "SPEAKER jfk 1 1.500 0.500 <NA> <NA> speaker_2 <NA> <NA>");
}

#[test]
fn rttm_round_trips_against_the_document_segments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diarization.rttm");
    let segments = segments();
    write_rttm(&path, &PathBuf::from("clip.wav"), &segments).unwrap();

    let parsed = parse_rttm(&fs::read_to_string(&path).unwrap());
    assert_eq!(parsed.len(), segments.len());
    for (parsed, segment) in parsed.iter().zip(&segments) {
        assert!((parsed.0 - segment.start_s).abs() < 1e-3);
        assert!((parsed.1 - segment.duration_s).abs() < 1e-3);
        assert_eq!(parsed.2, segment.speaker);
    }
}

#[test]
fn parse_rttm_skips_malformed_lines() {
    let parsed = parse_rttm("garbage\nSPEAKER a 1 bad 1.0 <NA> <NA> s <NA> <NA>\nSPEAKER a 1 0.5 1.0 <NA> <NA> s <NA> <NA>\n");
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0], (0.5, 1.0, "s".to_string()));
}

#[test]
fn empty_segment_list_writes_an_empty_rttm() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diarization.rttm");
    write_rttm(&path, &PathBuf::from("clip.wav"), &[]).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}
