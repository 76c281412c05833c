// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cheap audio duration readout.

use std::path::Path;

/// Duration in seconds from the WAV header. Returns 0.0 when the file
/// cannot be read; a missing duration is tolerated downstream.
pub fn duration_seconds(path: &Path) -> f64 {
    match hound::WavReader::open(path) {
        Ok(reader) => {
            let spec = reader.spec();
            if spec.sample_rate == 0 {
                0.0
            } else {
                reader.duration() as f64 / spec.sample_rate as f64
            }
        }
        Err(_) => 0.0,
    }
}

#[cfg(test)]
#[path = "audio_tests.rs"]
mod tests;
