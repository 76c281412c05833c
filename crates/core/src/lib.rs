// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hark-core: shared types for the hark inference engines

pub mod macros;

pub mod clock;
pub mod job;
pub mod kv;
pub mod time_fmt;

pub use clock::{Clock, SystemClock};
pub use job::{JobState, JobStatus};
pub use kv::{parse_bool, parse_float, parse_int, parse_string, FromKv};
pub use time_fmt::format_hhmmss;

#[cfg(any(test, feature = "test-support"))]
pub use clock::FakeClock;
