// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake recognizer and fixture helpers for tests.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use hark_engine::Loader;
use parking_lot::Mutex;

use crate::model::{AsrModel, DynAsrModel, ModelError, OptionKey, RecognizeOptions, RecognizeOutput};

/// Scripted in-process recognizer: yields queued outputs one per chunk,
/// then empty text. Records the options of the last recognize call.
pub struct FakeAsrModel {
    outputs: Mutex<VecDeque<RecognizeOutput>>,
    fail: Option<String>,
    batch_delay: Option<std::time::Duration>,
    last_options: Mutex<Option<RecognizeOptions>>,
}

impl FakeAsrModel {
    pub fn with_outputs(outputs: Vec<RecognizeOutput>) -> Arc<Self> {
        Arc::new(Self {
            outputs: Mutex::new(outputs.into()),
            fail: None,
            batch_delay: None,
            last_options: Mutex::new(None),
        })
    }

    /// A model producing one text chunk then silence.
    pub fn with_text(text: &str) -> Arc<Self> {
        Self::with_outputs(vec![RecognizeOutput::Text(text.to_string())])
    }

    /// A model that sleeps per recognize call, for scheduling tests.
    pub fn slow(text: &str, batch_delay: std::time::Duration) -> Arc<Self> {
        Arc::new(Self {
            outputs: Mutex::new(vec![RecognizeOutput::Text(text.to_string())].into()),
            fail: None,
            batch_delay: Some(batch_delay),
            last_options: Mutex::new(None),
        })
    }

    /// A model whose recognize call always fails.
    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            outputs: Mutex::new(VecDeque::new()),
            fail: Some(message.to_string()),
            batch_delay: None,
            last_options: Mutex::new(None),
        })
    }

    pub fn last_options(&self) -> Option<RecognizeOptions> {
        self.last_options.lock().clone()
    }

    /// Model-manager loader that always yields this fake.
    pub fn loader(model: Arc<Self>) -> Loader<DynAsrModel> {
        Arc::new(move |_spec, _auth_token| Ok(Arc::clone(&model) as DynAsrModel))
    }
}

impl AsrModel for FakeAsrModel {
    fn recognize_batch(
        &self,
        chunks: &[&[f32]],
        options: &RecognizeOptions,
    ) -> Result<Vec<RecognizeOutput>, ModelError> {
        *self.last_options.lock() = Some(options.clone());
        if let Some(delay) = self.batch_delay {
            std::thread::sleep(delay);
        }
        if let Some(message) = &self.fail {
            return Err(ModelError::Backend(message.clone()));
        }
        let mut queued = self.outputs.lock();
        Ok(chunks
            .iter()
            .map(|_| queued.pop_front().unwrap_or(RecognizeOutput::Text(String::new())))
            .collect())
    }

    fn honors(&self, _key: OptionKey) -> bool {
        true
    }
}

/// Write a mono float32 WAV of the given length filled with a quiet tone.
#[allow(clippy::unwrap_used)]
pub fn write_test_wav(path: &Path, seconds: f64, sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let samples = (seconds * sample_rate as f64) as usize;
    for i in 0..samples {
        let t = i as f32 / sample_rate as f32;
        writer.write_sample((t * 220.0 * std::f32::consts::TAU).sin() * 0.1).unwrap();
    }
    writer.finalize().unwrap();
}
