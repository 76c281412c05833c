// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recognizer integration driving an external model runner process.
//!
//! A model artifact ships its own runner executable. The engine resolves
//! it from `ModelSpec.model_path`, or from `$HARK_MODEL_DIR/<model_name>/run`.
//! The runner speaks a two-verb protocol:
//!
//! - `<runner> capabilities` prints one JSON object describing the
//!   accepted recognize options, timestamp support, and the execution
//!   providers available on this host.
//! - `<runner> recognize [flags] <chunk.wav>...` prints one JSON object
//!   per chunk, in order: `{"text": …, "tokens": […], "timestamps": […]}`
//!   with tokens/timestamps optional.
//!
//! The capabilities probe is what lets the engine pass the full option
//! set while the integration drops the options the model does not honor.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use hark_engine::{resolve_providers, LoadError, ModelSpec, CUDA_PROVIDER};
use serde::Deserialize;
use tracing::debug;

use crate::model::{AsrModel, DynAsrModel, ModelError, OptionKey, RecognizeOptions, RecognizeOutput};

/// Environment variable pointing at the model artifact directory tree.
pub const MODEL_DIR_ENV: &str = "HARK_MODEL_DIR";

/// What a runner declared in its `capabilities` probe.
#[derive(Debug, Clone, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub accepts: Vec<String>,
    #[serde(default)]
    pub timestamps: bool,
    #[serde(default)]
    pub providers: Vec<String>,
}

/// A recognizer backed by an external runner process.
pub struct CommandAsrModel {
    program: PathBuf,
    providers: Vec<String>,
    intra_op_threads: i32,
    capabilities: Capabilities,
    emit_timestamps: bool,
}

impl CommandAsrModel {
    /// Resolve and probe the runner for a model spec.
    pub fn load(spec: &ModelSpec) -> Result<Arc<Self>, LoadError> {
        let program = resolve_program(spec)?;
        let capabilities = probe_capabilities(&program)?;
        let cuda_available = capabilities.providers.iter().any(|p| p == CUDA_PROVIDER);
        let providers = resolve_providers(&spec.providers, cuda_available);
        debug!(
            program = %program.display(),
            providers = ?providers,
            timestamps = capabilities.timestamps,
            "recognizer runner loaded"
        );
        Ok(Arc::new(Self {
            program,
            providers,
            intra_op_threads: spec.intra_op_threads,
            capabilities,
            emit_timestamps: false,
        }))
    }

    /// Loader for the ASR model manager.
    pub fn loader() -> hark_engine::Loader<DynAsrModel> {
        Arc::new(|spec, _auth_token| Self::load(spec).map(|model| model as DynAsrModel))
    }
}

fn resolve_program(spec: &ModelSpec) -> Result<PathBuf, LoadError> {
    let candidate = match &spec.model_path {
        Some(path) => PathBuf::from(path),
        None => {
            let base = std::env::var(MODEL_DIR_ENV)
                .map_err(|_| LoadError::Failed(format!(
                    "no model_path given and {MODEL_DIR_ENV} is not set"
                )))?;
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

impl AsrModel for CommandAsrModel {
    fn recognize_batch(
        &self,
        chunks: &[&[f32]],
        options: &RecognizeOptions,
    ) -> Result<Vec<RecognizeOutput>, ModelError> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }
        let dir = tempfile::tempdir()
            .map_err(|e| ModelError::Backend(format!("failed to stage chunks: {e}")))?;

        let mut command = Command::new(&self.program);
        command.arg("recognize");
        command.arg("--threads").arg(self.intra_op_threads.to_string());
        for provider in &self.providers {
            command.arg("--provider").arg(provider);
        }
        if self.honors(OptionKey::SampleRate) {
            command.arg("--sample-rate").arg(options.sample_rate.to_string());
        }
        if self.honors(OptionKey::Language) {
            if let Some(language) = &options.language {
                command.arg("--language").arg(language);
            }
        }
        if self.honors(OptionKey::TargetLanguage) {
            if let Some(target) = &options.target_language {
                command.arg("--target-language").arg(target);
            }
        }
        if self.honors(OptionKey::Pnc) {
            if let Some(pnc) = options.pnc {
                command.arg("--pnc").arg(pnc.as_str());
            }
        }
        if self.emit_timestamps {
            command.arg("--timestamps");
        }

        for (i, chunk) in chunks.iter().enumerate() {
            let path = dir.path().join(format!("chunk-{i:04}.wav"));
            write_chunk_wav(&path, chunk, options.sample_rate)?;
            command.arg(&path);
        }

        let output = command
            .output()
            .map_err(|e| ModelError::Backend(format!("failed to run recognizer: {e}")))?;
        if !output.status.success() {
            return Err(ModelError::Backend(format!(
                "recognizer exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        parse_chunk_records(&output.stdout, chunks.len())
    }

    fn timestamped(&self) -> Option<DynAsrModel> {
        if !self.capabilities.timestamps {
            return None;
        }
        Some(Arc::new(Self {
            program: self.program.clone(),
            providers: self.providers.clone(),
            intra_op_threads: self.intra_op_threads,
            capabilities: self.capabilities.clone(),
            emit_timestamps: true,
        }))
    }

    fn honors(&self, key: OptionKey) -> bool {
        self.capabilities.accepts.iter().any(|k| k == key.as_str())
    }
}

#[derive(Deserialize)]
struct ChunkRecord {
    #[serde(default)]
    text: String,
    #[serde(default)]
    tokens: Vec<String>,
    #[serde(default)]
    timestamps: Vec<f64>,
}

fn parse_chunk_records(stdout: &[u8], expected: usize) -> Result<Vec<RecognizeOutput>, ModelError> {
    let text = String::from_utf8_lossy(stdout);
    let mut outputs = Vec::with_capacity(expected);
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let record: ChunkRecord = serde_json::from_str(line)
            .map_err(|e| ModelError::Backend(format!("malformed recognizer output: {e}")))?;
        if !record.tokens.is_empty() && record.tokens.len() == record.timestamps.len() {
            outputs.push(RecognizeOutput::Timed {
                text: record.text,
                tokens: record.tokens,
                timestamps: record.timestamps,
            });
        } else {
            outputs.push(RecognizeOutput::Text(record.text));
        }
    }
    if outputs.len() != expected {
        return Err(ModelError::Backend(format!(
            "recognizer returned {} results for {} chunks",
            outputs.len(),
            expected
        )));
    }
    Ok(outputs)
}

fn write_chunk_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), ModelError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let stage = || -> Result<(), hound::Error> {
        let mut writer = hound::WavWriter::create(path, spec)?;
        for sample in samples {
            writer.write_sample(*sample)?;
        }
        writer.finalize()
    };
    stage().map_err(|e| ModelError::Backend(format!("failed to stage chunk wav: {e}")))
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
