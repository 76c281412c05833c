// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diarization integrations driving external model runner processes.
//!
//! Same runner protocol as the recognizer side: the artifact ships an
//! executable resolved from `ModelSpec.model_path` or
//! `$HARK_MODEL_DIR/<model_name>/run`, probed once with `capabilities`
//! and invoked with `diarize`. The pyannote runner receives its auth
//! token through the `HF_TOKEN` environment variable, never argv.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use hark_engine::{device_from_providers, Device, LoadError, Loader, ModelSpec};
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::model::{
    DiarModel, ModelError, PyannoteOptions, PyannoteOutput, RawSegment, SortformerModel,
    SpeakerPipeline, StreamingConfig, TimeSpan,
};

/// Environment variable pointing at the model artifact directory tree.
pub const MODEL_DIR_ENV: &str = "HARK_MODEL_DIR";

const HF_TOKEN_ENV: &str = "HF_TOKEN";
const PYANNOTE_TOKEN_ENV: &str = "PYANNOTE_TOKEN";

/// Loader with kind dispatch for the diarization model manager.
pub fn loader() -> Loader<DiarModel> {
    Arc::new(|spec, auth_token| match spec.model_id.as_str() {
        "pyannote" => {
            let token = auth_token
                .map(str::to_string)
                .or_else(|| std::env::var(HF_TOKEN_ENV).ok())
                .or_else(|| std::env::var(PYANNOTE_TOKEN_ENV).ok());
            CommandSpeakerPipeline::load(spec, token)
                .map(|p| DiarModel::Pyannote(p as Arc<dyn SpeakerPipeline>))
        }
        "sortformer" => CommandSortformerModel::load(spec)
            .map(|m| DiarModel::Sortformer(m as Arc<dyn SortformerModel>)),
        other => Err(LoadError::Unsupported(other.to_string())),
    })
}

/// Whether a changed auth token must reload the slot (pyannote only).
pub fn token_sensitive(spec: &ModelSpec) -> bool {
    spec.model_id == "pyannote"
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Capabilities {
    #[serde(default)]
    providers: Vec<String>,
    #[serde(default)]
    streaming: bool,
}

fn resolve_program(spec: &ModelSpec) -> Result<PathBuf, LoadError> {
    let candidate = match &spec.model_path {
        Some(path) => PathBuf::from(path),
        None => {
            let base = std::env::var(MODEL_DIR_ENV).map_err(|_| {
                LoadError::Failed(format!("no model_path given and {MODEL_DIR_ENV} is not set"))
            })?;
            Path::new(&base).join(&spec.model_name).join("run")
        }
    };
    if !candidate.is_file() {
        return Err(LoadError::Failed(format!(
            "model runner not found: {}",
            candidate.display()
        )));
    }
    Ok(candidate)
}

fn probe_capabilities(program: &Path) -> Result<Capabilities, LoadError> {
    let output = Command::new(program)
        .arg("capabilities")
        .output()
        .map_err(|e| LoadError::Failed(format!("failed to run {}: {e}", program.display())))?;
    if !output.status.success() {
        return Err(LoadError::Failed(format!(
            "capabilities probe failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    serde_json::from_slice(&output.stdout)
        .map_err(|e| LoadError::Failed(format!("malformed capabilities output: {e}")))
}

fn cuda_in(providers: &[String]) -> bool {
    providers.iter().any(|p| {
        let lower = p.to_ascii_lowercase();
        lower.contains("cuda") || lower.contains("tensorrt")
    })
}

// --- pyannote ---

/// Pyannote pipeline behind an external runner process.
pub struct CommandSpeakerPipeline {
    program: PathBuf,
    token: Option<String>,
    cuda: bool,
    device: Mutex<Device>,
    threads: Mutex<(Option<i64>, Option<i64>)>,
    segmentation: Mutex<(Option<f64>, Option<f64>)>,
}

impl CommandSpeakerPipeline {
    pub fn load(spec: &ModelSpec, token: Option<String>) -> Result<Arc<Self>, LoadError> {
        let program = resolve_program(spec)?;
        let capabilities = probe_capabilities(&program)?;
        // Initial placement comes from the load-time provider list; jobs
        // re-place the pipeline from their own device param.
        let device = device_from_providers(&spec.providers);
        debug!(program = %program.display(), %device, "pyannote runner loaded");
        Ok(Arc::new(Self {
            program,
            token,
            cuda: cuda_in(&capabilities.providers),
            device: Mutex::new(device),
            threads: Mutex::new((None, None)),
            segmentation: Mutex::new((None, None)),
        }))
    }
}

#[derive(Debug, Deserialize)]
struct PyannoteTurn {
    start: f64,
    end: f64,
    speaker: String,
    #[serde(default)]
    track: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PyannoteResult {
    #[serde(default)]
    format: String,
    #[serde(default)]
    turns: Vec<PyannoteTurn>,
}

impl SpeakerPipeline for CommandSpeakerPipeline {
    fn cuda_available(&self) -> bool {
        self.cuda
    }

    fn to_device(&self, device: Device) {
        *self.device.lock() = device;
    }

    fn set_thread_counts(&self, intra: Option<i64>, interop: Option<i64>) {
        *self.threads.lock() = (intra, interop);
    }

    fn apply_segmentation(&self, onset: Option<f64>, offset: Option<f64>) {
        *self.segmentation.lock() = (onset, offset);
    }

    fn diarize(&self, input: &Path, options: &PyannoteOptions) -> Result<PyannoteOutput, ModelError> {
        let mut command = Command::new(&self.program);
        command.arg("diarize");
        command.arg("--device").arg(self.device.lock().to_string());
        let (intra, interop) = *self.threads.lock();
        if let Some(n) = intra {
            command.arg("--threads").arg(n.to_string());
        }
        if let Some(n) = interop {
            command.arg("--interop-threads").arg(n.to_string());
        }
        let (onset, offset) = *self.segmentation.lock();
        if let Some(v) = onset {
            command.arg("--segmentation-onset").arg(v.to_string());
        }
        if let Some(v) = offset {
            command.arg("--segmentation-offset").arg(v.to_string());
        }
        if let Some(n) = options.min_speakers {
            command.arg("--min-speakers").arg(n.to_string());
        }
        if let Some(n) = options.max_speakers {
            command.arg("--max-speakers").arg(n.to_string());
        }
        if let Some(n) = options.segmentation_batch_size {
            command.arg("--segmentation-batch-size").arg(n.to_string());
        }
        if let Some(n) = options.embedding_batch_size {
            command.arg("--embedding-batch-size").arg(n.to_string());
        }
        if let Some(v) = options.embedding_exclude_overlap {
            command.arg("--embedding-exclude-overlap").arg(v.to_string());
        }
        if options.exclusive {
            command.arg("--exclusive");
        }
        command.arg(input);
        if let Some(token) = &self.token {
            command.env(HF_TOKEN_ENV, token);
        }

        let output = command
            .output()
            .map_err(|e| ModelError::Backend(format!("failed to run diarizer: {e}")))?;
        if !output.status.success() {
            return Err(ModelError::Backend(format!(
                "diarizer exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let result: PyannoteResult = serde_json::from_slice(&output.stdout)
            .map_err(|e| ModelError::Backend(format!("malformed diarizer output: {e}")))?;

        // The runner reports which result surface the underlying library
        // exposed; both carry the same span data.
        if result.format == "itertracks" {
            Ok(PyannoteOutput::Tracks(
                result
                    .turns
                    .into_iter()
                    .map(|t| {
                        let track = t.track.unwrap_or_default();
                        (TimeSpan::new(t.start, t.end), track, t.speaker)
                    })
                    .collect(),
            ))
        } else {
            Ok(PyannoteOutput::SpeakerTurns(
                result
                    .turns
                    .into_iter()
                    .map(|t| (TimeSpan::new(t.start, t.end), t.speaker))
                    .collect(),
            ))
        }
    }
}

// --- sortformer ---

/// Sortformer model behind an external runner process.
pub struct CommandSortformerModel {
    program: PathBuf,
    supports_streaming: bool,
    streaming: Mutex<Option<StreamingConfig>>,
}

impl CommandSortformerModel {
    pub fn load(spec: &ModelSpec) -> Result<Arc<Self>, LoadError> {
        let program = resolve_program(spec)?;
        let capabilities = probe_capabilities(&program)?;
        debug!(
            program = %program.display(),
            streaming = capabilities.streaming,
            "sortformer runner loaded"
        );
        Ok(Arc::new(Self {
            program,
            supports_streaming: capabilities.streaming,
            streaming: Mutex::new(None),
        }))
    }
}

impl SortformerModel for CommandSortformerModel {
    fn configure_streaming(&self, config: &StreamingConfig) -> bool {
        if !self.supports_streaming {
            return false;
        }
        *self.streaming.lock() = Some(*config);
        true
    }

    fn diarize(&self, input: &Path, batch_size: usize) -> Result<Vec<RawSegment>, ModelError> {
        let mut command = Command::new(&self.program);
        command.arg("diarize");
        command.arg("--batch-size").arg(batch_size.to_string());
        if let Some(cfg) = *self.streaming.lock() {
            command.arg("--chunk-len").arg(cfg.chunk_len.to_string());
            command.arg("--chunk-right-context").arg(cfg.chunk_right_context.to_string());
            command.arg("--fifo-len").arg(cfg.fifo_len.to_string());
            command.arg("--spkcache-update-period").arg(cfg.spkcache_update_period.to_string());
        }
        command.arg(input);

        let output = command
            .output()
            .map_err(|e| ModelError::Backend(format!("failed to run diarizer: {e}")))?;
        if !output.status.success() {
            return Err(ModelError::Backend(format!(
                "diarizer exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        parse_raw_segments(&output.stdout)
    }
}

/// Parse the runner's JSON-lines output into raw segments: each line is
/// a `"start end speaker"` string, a `[start, end, speaker]` array, or a
/// keyed record.
fn parse_raw_segments(stdout: &[u8]) -> Result<Vec<RawSegment>, ModelError> {
    let text = String::from_utf8_lossy(stdout);
    let mut segments = Vec::new();
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let value: serde_json::Value = serde_json::from_str(line)
            .map_err(|e| ModelError::Backend(format!("malformed diarizer output: {e}")))?;
        segments.push(raw_segment_from_value(value)?);
    }
    Ok(segments)
}

fn raw_segment_from_value(value: serde_json::Value) -> Result<RawSegment, ModelError> {
    use serde_json::Value;
    match value {
        Value::String(line) => Ok(RawSegment::Line(line)),
        Value::Array(items) if items.len() >= 3 => {
            let start = items[0].as_f64();
            let end = items[1].as_f64();
            let speaker = items[2].as_str();
            match (start, end, speaker) {
                (Some(start), Some(end), Some(speaker)) => {
                    Ok(RawSegment::Triple(start, end, speaker.to_string()))
                }
                _ => Err(ModelError::Backend(format!("malformed segment triple: {items:?}"))),
            }
        }
        Value::Object(map) => {
            let get_f64 = |key: &str| map.get(key).and_then(Value::as_f64).unwrap_or(0.0);
            let get_str =
                |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
            Ok(RawSegment::Record {
                start: get_f64("start"),
                end: get_f64("end"),
                speaker: get_str("speaker"),
                label: get_str("label"),
                confidence: map.get("confidence").and_then(Value::as_f64),
            })
        }
        other => {
            warn!(value = %other, "unrecognized diarizer output value");
            Err(ModelError::Backend(format!("unrecognized segment value: {other}")))
        }
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
