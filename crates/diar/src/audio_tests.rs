// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn reads_duration_from_wav_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for _ in 0..24_000 {
        writer.write_sample(0.0_f32).unwrap();
    }
    writer.finalize().unwrap();

    assert!((duration_seconds(&path) - 1.5).abs() < 1e-9);
}

#[test]
fn unreadable_files_report_zero() {
    assert_eq!(duration_seconds(Path::new("/nonexistent/clip.wav")), 0.0);
}
