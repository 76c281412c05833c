// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hark-server: the gRPC surface shared by both engines.
//!
//! [`EngineService`] binds the runtime (model manager, job runner,
//! status store) to the `hark.v1.AsrEngine` service. The two engine
//! binaries differ only in the pipeline and model loader they wire in.

pub mod cli;
pub mod metrics;
pub mod serve;
pub mod service;

pub use cli::{init_tracing, ServeArgs};
pub use serve::{serve, Bind, ServeError};
pub use service::EngineService;
