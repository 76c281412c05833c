// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed diarization job configuration.

use std::collections::HashMap;

use hark_core::{parse_bool, parse_float, parse_int, parse_string, FromKv};
use hark_engine::Device;
use serde::{Serialize, Serializer};

/// Output artifact selection. RTTM also writes the JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Rttm,
    Json,
}

hark_core::simple_display! {
    OutputFormat {
        Rttm => "rttm",
        Json => "json",
    }
}

impl OutputFormat {
    /// Unknown values fall back to `Rttm`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Rttm,
        }
    }
}

impl Serialize for OutputFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn serialize_display<S: Serializer, T: std::fmt::Display>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Per-job diarization configuration, parsed from the `StartJob` param map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiarParams {
    pub output_format: OutputFormat,
    #[serde(serialize_with = "serialize_display")]
    pub device: Device,
    /// Never echoed into manifests.
    #[serde(skip_serializing)]
    pub hf_token: Option<String>,
    pub model: Option<String>,
    pub min_speakers: Option<i64>,
    pub max_speakers: Option<i64>,
    pub segmentation_onset: Option<f64>,
    pub segmentation_offset: Option<f64>,
    pub batch_size: usize,
    pub streaming_mode: bool,
    pub chunk_length_s: f64,
    pub chunk_len: i64,
    pub chunk_right_context: i64,
    pub fifo_len: i64,
    pub spkcache_update_period: i64,
    pub exclusive: bool,
    pub segmentation_batch_size: Option<i64>,
    pub embedding_batch_size: Option<i64>,
    pub embedding_exclude_overlap: Option<bool>,
    pub torch_threads: Option<i64>,
    pub torch_interop_threads: Option<i64>,
}

impl Default for DiarParams {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Rttm,
            device: Device::Auto,
            hf_token: None,
            model: None,
            min_speakers: None,
            max_speakers: None,
            segmentation_onset: Some(0.5),
            segmentation_offset: Some(0.363),
            batch_size: 1,
            streaming_mode: false,
            chunk_length_s: 30.0,
            chunk_len: 340,
            chunk_right_context: 40,
            fifo_len: 40,
            spkcache_update_period: 300,
            exclusive: true,
            segmentation_batch_size: None,
            embedding_batch_size: None,
            embedding_exclude_overlap: None,
            torch_threads: None,
            torch_interop_threads: None,
        }
    }
}

impl FromKv for DiarParams {
    fn from_kv(kv: &HashMap<String, String>) -> Self {
        let defaults = DiarParams::default();
        Self {
            output_format: kv
                .get("output_format")
                .map(|v| OutputFormat::parse(v))
                .unwrap_or_default(),
            device: kv.get("device").map(|v| Device::parse(v)).unwrap_or_default(),
            hf_token: parse_string(kv.get("hf_token")),
            model: parse_string(kv.get("model")),
            min_speakers: parse_int(kv.get("min_speakers"), None),
            max_speakers: parse_int(kv.get("max_speakers"), None),
            segmentation_onset: parse_float(kv.get("segmentation_onset"), Some(0.5)),
            segmentation_offset: parse_float(kv.get("segmentation_offset"), Some(0.363)),
            batch_size: parse_int(kv.get("batch_size"), Some(1))
                .filter(|v| *v > 0)
                .map(|v| v as usize)
                .unwrap_or(defaults.batch_size),
            streaming_mode: parse_bool(kv.get("streaming_mode"), false),
            chunk_length_s: parse_float(kv.get("chunk_length_s"), Some(30.0))
                .filter(|v| *v > 0.0)
                .unwrap_or(defaults.chunk_length_s),
            chunk_len: parse_int(kv.get("chunk_len"), Some(340)).unwrap_or(defaults.chunk_len),
            chunk_right_context: parse_int(kv.get("chunk_right_context"), Some(40))
                .unwrap_or(defaults.chunk_right_context),
            fifo_len: parse_int(kv.get("fifo_len"), Some(40)).unwrap_or(defaults.fifo_len),
            spkcache_update_period: parse_int(kv.get("spkcache_update_period"), Some(300))
                .unwrap_or(defaults.spkcache_update_period),
            exclusive: parse_bool(kv.get("exclusive"), true),
            segmentation_batch_size: parse_int(kv.get("segmentation_batch_size"), None),
            embedding_batch_size: parse_int(kv.get("embedding_batch_size"), None),
            embedding_exclude_overlap: kv
                .get("embedding_exclude_overlap")
                .map(|v| hark_core::parse_bool(Some(v), false)),
            torch_threads: parse_int(kv.get("torch_threads"), None),
            torch_interop_threads: parse_int(kv.get("torch_interop_threads"), None),
        }
    }
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;
