// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed, validated ASR job configuration.
//!
//! Built once per job from the wire-level string map and immutable after
//! that. The VAD keys are parsed and echoed into `result.json` but the
//! chunked pipeline does not consume them; they are reserved for a future
//! VAD-gated pipeline version.

use std::collections::HashMap;

use hark_core::{parse_bool, parse_float, parse_int, parse_string, FromKv};
use serde::{Serialize, Serializer};

/// Punctuation-and-casing hint accepted by some recognizer models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pnc {
    Pnc,
    NoPnc,
    Enabled,
    Disabled,
}

impl Pnc {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pnc" => Some(Pnc::Pnc),
            "nopnc" => Some(Pnc::NoPnc),
            "1" | "true" | "yes" | "y" | "on" => Some(Pnc::Enabled),
            "0" | "false" | "no" | "n" | "off" => Some(Pnc::Disabled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Pnc::Pnc => "pnc",
            Pnc::NoPnc => "nopnc",
            Pnc::Enabled => "true",
            Pnc::Disabled => "false",
        }
    }
}

impl Serialize for Pnc {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Named VAD tuning presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VadPreset {
    Conservative,
    #[default]
    Balanced,
    Aggressive,
}

hark_core::simple_display! {
    VadPreset {
        Conservative => "conservative",
        Balanced => "balanced",
        Aggressive => "aggressive",
    }
}

impl VadPreset {
    /// Unknown preset names fall back to `Balanced`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "conservative" => VadPreset::Conservative,
            "aggressive" => VadPreset::Aggressive,
            _ => VadPreset::Balanced,
        }
    }

    pub fn settings(&self) -> VadSettings {
        match self {
            VadPreset::Conservative => VadSettings {
                speech_pad_ms: 400,
                min_silence_ms: 800,
                min_speech_ms: 300,
                max_speech_s: 30,
            },
            VadPreset::Balanced => VadSettings {
                speech_pad_ms: 300,
                min_silence_ms: 600,
                min_speech_ms: 200,
                max_speech_s: 25,
            },
            VadPreset::Aggressive => VadSettings {
                speech_pad_ms: 150,
                min_silence_ms: 300,
                min_speech_ms: 120,
                max_speech_s: 20,
            },
        }
    }
}

impl Serialize for VadPreset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Resolved VAD knobs: preset values with per-key overrides applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VadSettings {
    pub speech_pad_ms: i64,
    pub min_silence_ms: i64,
    pub min_speech_ms: i64,
    pub max_speech_s: i64,
}

/// Per-job ASR configuration, parsed from the `StartJob` param map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsrParams {
    pub chunk_len_s: f64,
    pub chunk_batch_size: usize,
    pub segment_gap_s: Option<f64>,
    pub include_segments: bool,
    pub include_words: bool,
    pub merge_short_segments: bool,
    pub merge_attach_threshold_s: f64,
    pub merge_attach_max_words: usize,
    pub sample_rate: u32,
    pub language: Option<String>,
    pub target_language: Option<String>,
    pub pnc: Option<Pnc>,
    pub vad_enabled: bool,
    pub vad_preset: VadPreset,
    pub vad_speech_pad_ms: Option<i64>,
    pub vad_min_silence_ms: Option<i64>,
    pub vad_min_speech_ms: Option<i64>,
    pub vad_max_speech_s: Option<i64>,
}

impl Default for AsrParams {
    fn default() -> Self {
        Self {
            chunk_len_s: 300.0,
            chunk_batch_size: 8,
            segment_gap_s: None,
            include_segments: true,
            include_words: true,
            merge_short_segments: true,
            merge_attach_threshold_s: 0.25,
            merge_attach_max_words: 2,
            sample_rate: 16_000,
            language: None,
            target_language: None,
            pnc: None,
            vad_enabled: false,
            vad_preset: VadPreset::Balanced,
            vad_speech_pad_ms: None,
            vad_min_silence_ms: None,
            vad_min_speech_ms: None,
            vad_max_speech_s: None,
        }
    }
}

impl FromKv for AsrParams {
    fn from_kv(kv: &HashMap<String, String>) -> Self {
        let defaults = AsrParams::default();
        Self {
            chunk_len_s: parse_float(kv.get("chunk_len_s"), Some(defaults.chunk_len_s))
                .unwrap_or(defaults.chunk_len_s),
            chunk_batch_size: parse_int(kv.get("chunk_batch_size"), Some(8))
                .map(|v| v.max(1) as usize)
                .unwrap_or(defaults.chunk_batch_size),
            segment_gap_s: parse_float(kv.get("segment_gap_s"), None),
            include_segments: parse_bool(kv.get("include_segments"), true),
            include_words: parse_bool(kv.get("include_words"), true),
            merge_short_segments: parse_bool(kv.get("merge_short_segments"), true),
            merge_attach_threshold_s: parse_float(kv.get("merge_attach_threshold_s"), Some(0.25))
                .unwrap_or(defaults.merge_attach_threshold_s),
            merge_attach_max_words: parse_int(kv.get("merge_attach_max_words"), Some(2))
                .map(|v| v.max(0) as usize)
                .unwrap_or(defaults.merge_attach_max_words),
            sample_rate: parse_int(kv.get("sample_rate"), Some(16_000))
                .filter(|v| *v > 0)
                .map(|v| v as u32)
                .unwrap_or(defaults.sample_rate),
            language: parse_string(kv.get("language")),
            target_language: parse_string(kv.get("target_language")),
            pnc: kv.get("pnc").and_then(|v| Pnc::parse(v)),
            vad_enabled: parse_bool(kv.get("vad_enabled"), false),
            vad_preset: kv
                .get("vad_preset")
                .map(|v| VadPreset::parse(v))
                .unwrap_or_default(),
            vad_speech_pad_ms: parse_int(kv.get("vad_speech_pad_ms"), None),
            vad_min_silence_ms: parse_int(kv.get("vad_min_silence_ms"), None),
            vad_min_speech_ms: parse_int(kv.get("vad_min_speech_ms"), None),
            vad_max_speech_s: parse_int(kv.get("vad_max_speech_s"), None),
        }
    }
}

impl AsrParams {
    /// Preset VAD tuple with per-key overrides applied.
    pub fn resolved_vad(&self) -> VadSettings {
        let mut settings = self.vad_preset.settings();
        if let Some(v) = self.vad_speech_pad_ms {
            settings.speech_pad_ms = v;
        }
        if let Some(v) = self.vad_min_silence_ms {
            settings.min_silence_ms = v;
        }
        if let Some(v) = self.vad_min_speech_ms {
            settings.min_speech_ms = v;
        }
        if let Some(v) = self.vad_max_speech_s {
            settings.max_speech_s = v;
        }
        settings
    }
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;
