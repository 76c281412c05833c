// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake diarization models for tests.

use std::path::Path;
use std::sync::Arc;

use hark_engine::{Device, Loader};
use parking_lot::Mutex;

use crate::model::{
    DiarModel, ModelError, PyannoteOptions, PyannoteOutput, RawSegment, SortformerModel,
    SpeakerPipeline, StreamingConfig,
};

/// Scripted pyannote pipeline recording how the engine drove it.
pub struct FakeSpeakerPipeline {
    output: PyannoteOutput,
    cuda: bool,
    pub device: Mutex<Option<Device>>,
    pub threads: Mutex<Option<(Option<i64>, Option<i64>)>>,
    pub segmentation: Mutex<Option<(Option<f64>, Option<f64>)>>,
    pub last_options: Mutex<Option<PyannoteOptions>>,
    fail: Option<String>,
}

impl FakeSpeakerPipeline {
    pub fn with_output(output: PyannoteOutput) -> Arc<Self> {
        Arc::new(Self {
            output,
            cuda: false,
            device: Mutex::new(None),
            threads: Mutex::new(None),
            segmentation: Mutex::new(None),
            last_options: Mutex::new(None),
            fail: None,
        })
    }

    pub fn with_cuda(output: PyannoteOutput) -> Arc<Self> {
        let mut fake = Self::with_output(output);
        if let Some(f) = Arc::get_mut(&mut fake) {
            f.cuda = true;
        }
        fake
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            output: PyannoteOutput::SpeakerTurns(Vec::new()),
            cuda: false,
            device: Mutex::new(None),
            threads: Mutex::new(None),
            segmentation: Mutex::new(None),
            last_options: Mutex::new(None),
            fail: Some(message.to_string()),
        })
    }
}

impl SpeakerPipeline for FakeSpeakerPipeline {
    fn cuda_available(&self) -> bool {
        self.cuda
    }

    fn to_device(&self, device: Device) {
        *self.device.lock() = Some(device);
    }

    fn set_thread_counts(&self, intra: Option<i64>, interop: Option<i64>) {
        *self.threads.lock() = Some((intra, interop));
    }

    fn apply_segmentation(&self, onset: Option<f64>, offset: Option<f64>) {
        *self.segmentation.lock() = Some((onset, offset));
    }

    fn diarize(&self, _input: &Path, options: &PyannoteOptions) -> Result<PyannoteOutput, ModelError> {
        *self.last_options.lock() = Some(options.clone());
        if let Some(message) = &self.fail {
            return Err(ModelError::Backend(message.clone()));
        }
        Ok(self.output.clone())
    }
}

/// Scripted sortformer model.
pub struct FakeSortformerModel {
    raw: Vec<RawSegment>,
    supports_streaming: bool,
    pub streaming: Mutex<Option<StreamingConfig>>,
    pub last_batch_size: Mutex<Option<usize>>,
}

impl FakeSortformerModel {
    pub fn with_raw(raw: Vec<RawSegment>, supports_streaming: bool) -> Arc<Self> {
        Arc::new(Self {
            raw,
            supports_streaming,
            streaming: Mutex::new(None),
            last_batch_size: Mutex::new(None),
        })
    }
}

impl SortformerModel for FakeSortformerModel {
    fn configure_streaming(&self, config: &StreamingConfig) -> bool {
        if !self.supports_streaming {
            return false;
        }
        *self.streaming.lock() = Some(*config);
        true
    }

    fn diarize(&self, _input: &Path, batch_size: usize) -> Result<Vec<RawSegment>, ModelError> {
        *self.last_batch_size.lock() = Some(batch_size);
        Ok(self.raw.clone())
    }
}

/// Model-manager loader that always yields this handle.
pub fn fixed_loader(model: DiarModel) -> Loader<DiarModel> {
    Arc::new(move |_spec, _auth_token| Ok(model.clone()))
}
