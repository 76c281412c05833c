// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tolerant parsing of flat `string → string` job-parameter maps.
//!
//! `StartJob` carries its params as `map<string,string>` on the wire.
//! Malformed values fall back to the key's default instead of failing the
//! request; the params are tuning knobs, not addressing data.

use std::collections::HashMap;

/// Build typed job params from the wire-level string map.
pub trait FromKv: Sized {
    fn from_kv(kv: &HashMap<String, String>) -> Self;
}

/// Parse a boolean flag. Accepts `1/true/yes/y/on` (case-insensitive) as
/// true; anything else is false. `None` yields the default.
pub fn parse_bool(value: Option<&String>, default: bool) -> bool {
    match value {
        None => default,
        Some(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "y" | "on"),
    }
}

/// Parse an integer, falling back to the default on absence or garbage.
pub fn parse_int(value: Option<&String>, default: Option<i64>) -> Option<i64> {
    match value {
        None => default,
        Some(v) => v.trim().parse::<i64>().ok().or(default),
    }
}

/// Parse a float, falling back to the default on absence or garbage.
pub fn parse_float(value: Option<&String>, default: Option<f64>) -> Option<f64> {
    match value {
        None => default,
        Some(v) => v.trim().parse::<f64>().ok().or(default),
    }
}

/// Fetch a non-empty string value.
pub fn parse_string(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
#[path = "kv_tests.rs"]
mod tests;
