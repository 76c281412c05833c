// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hark-proto: the `hark.v1.AsrEngine` gRPC surface.
//!
//! Generated tonic/prost types plus conversions to and from the core
//! runtime types. Both engine binaries serve this one service definition.

pub mod v1 {
    tonic::include_proto!("hark.v1");
}

mod convert;

pub use v1::asr_engine_client::AsrEngineClient;
pub use v1::asr_engine_server::{AsrEngine, AsrEngineServer};
pub use v1::{
    GetEngineInfoRequest, GetEngineInfoResponse, GetJobStatusRequest, JobState, JobStatus,
    ListLoadedModelsRequest, ListLoadedModelsResponse, LoadModelRequest, LoadModelResponse,
    ModelSpec, StartJobRequest, StartJobResponse, StopJobRequest, StopJobResponse,
    StreamJobStatusRequest, UnloadModelRequest, UnloadModelResponse,
};
