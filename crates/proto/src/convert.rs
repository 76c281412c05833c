// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conversions between core runtime types and generated wire types.

use crate::v1;

impl From<hark_core::JobState> for v1::JobState {
    fn from(state: hark_core::JobState) -> Self {
        match state {
            hark_core::JobState::Queued => v1::JobState::Queued,
            hark_core::JobState::Running => v1::JobState::Running,
            hark_core::JobState::Completed => v1::JobState::Completed,
            hark_core::JobState::Failed => v1::JobState::Failed,
            hark_core::JobState::Cancelled => v1::JobState::Cancelled,
        }
    }
}

impl From<&hark_core::JobStatus> for v1::JobStatus {
    fn from(status: &hark_core::JobStatus) -> Self {
        v1::JobStatus {
            job_id: status.job_id.clone(),
            state: v1::JobState::from(status.state) as i32,
            message: status.message.clone(),
            progress: status.progress,
            outputs: status.outputs.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            started_unix_ms: status.started_unix_ms,
            finished_unix_ms: status.finished_unix_ms,
        }
    }
}

impl From<hark_core::JobStatus> for v1::JobStatus {
    fn from(status: hark_core::JobStatus) -> Self {
        v1::JobStatus::from(&status)
    }
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod tests;
