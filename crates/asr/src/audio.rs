// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Audio decoding contract and the WAV implementation.
//!
//! The pipeline only needs two operations: decode a file to mono float32
//! at a target rate, and read its duration cheaply from the header.

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to read audio {path}: {message}")]
    Read { path: String, message: String },
    #[error("unsupported audio format in {path}: {message}")]
    Unsupported { path: String, message: String },
}

impl AudioError {
    fn read(path: &Path, message: impl std::fmt::Display) -> Self {
        AudioError::Read { path: path.display().to_string(), message: message.to_string() }
    }

    fn unsupported(path: &Path, message: impl std::fmt::Display) -> Self {
        AudioError::Unsupported { path: path.display().to_string(), message: message.to_string() }
    }
}

/// Decodes audio files for the pipeline.
pub trait AudioDecoder: Send + Sync {
    /// Decode to mono float32 samples at `sample_rate`.
    fn decode(&self, path: &Path, sample_rate: u32) -> Result<Vec<f32>, AudioError>;

    /// Duration in seconds from a header read, without decoding samples.
    fn duration_seconds(&self, path: &Path) -> Result<f64, AudioError>;
}

/// WAV decoder: int and float encodings, channel averaging to mono,
/// linear-interpolation resampling to the target rate.
#[derive(Default, Clone)]
pub struct WavDecoder;

impl AudioDecoder for WavDecoder {
    fn decode(&self, path: &Path, sample_rate: u32) -> Result<Vec<f32>, AudioError> {
        let mut reader = hound::WavReader::open(path).map_err(|e| AudioError::read(path, e))?;
        let spec = reader.spec();
        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| AudioError::read(path, e))?,
            hound::SampleFormat::Int => {
                if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                    return Err(AudioError::unsupported(
                        path,
                        format!("{}-bit integer samples", spec.bits_per_sample),
                    ));
                }
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()
                    .map_err(|e| AudioError::read(path, e))?
            }
        };

        let channels = spec.channels.max(1) as usize;
        let mono = to_mono(&interleaved, channels);
        Ok(resample(&mono, spec.sample_rate, sample_rate))
    }

    fn duration_seconds(&self, path: &Path) -> Result<f64, AudioError> {
        let reader = hound::WavReader::open(path).map_err(|e| AudioError::read(path, e))?;
        let spec = reader.spec();
        if spec.sample_rate == 0 {
            return Ok(0.0);
        }
        Ok(reader.duration() as f64 / spec.sample_rate as f64)
    }
}

fn to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

fn resample(samples: &[f32], from: u32, to: u32) -> Vec<f32> {
    if from == to || samples.is_empty() || from == 0 || to == 0 {
        return samples.to_vec();
    }
    let ratio = from as f64 / to as f64;
    let out_len = ((samples.len() as f64) / ratio).round().max(1.0) as usize;
    (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = pos.floor() as usize;
            let frac = (pos - idx as f64) as f32;
            let a = samples[idx.min(samples.len() - 1)];
            let b = samples[(idx + 1).min(samples.len() - 1)];
            a + (b - a) * frac
        })
        .collect()
}

#[cfg(test)]
#[path = "audio_tests.rs"]
mod tests;
