// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job state machine and status snapshots.
//!
//! A job moves monotonically through `Queued → Running → {Completed,
//! Failed, Cancelled}`. Each published [`JobStatus`] is a full snapshot;
//! the constructors below keep the transition invariants (terminal
//! snapshots carry the original start time and a finish time stamped at
//! publication).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// State of a job in the single-slot scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    /// Check if this state ends the job.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed | JobState::Cancelled)
    }
}

crate::simple_display! {
    JobState {
        Queued => "QUEUED",
        Running => "RUNNING",
        Completed => "COMPLETED",
        Failed => "FAILED",
        Cancelled => "CANCELLED",
    }
}

/// Snapshot of a job's progress, retained in the status store until the
/// process restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_id: String,
    pub state: JobState,
    pub message: String,
    /// Fraction of the job completed, in `[0.0, 1.0]`.
    pub progress: f64,
    /// Logical output name → written file path. Empty until terminal.
    pub outputs: BTreeMap<String, String>,
    pub started_unix_ms: u64,
    pub finished_unix_ms: u64,
}

impl JobStatus {
    /// Initial snapshot published when a job is accepted.
    pub fn queued(job_id: impl Into<String>, started_unix_ms: u64) -> Self {
        Self {
            job_id: job_id.into(),
            state: JobState::Queued,
            message: String::new(),
            progress: 0.0,
            outputs: BTreeMap::new(),
            started_unix_ms,
            finished_unix_ms: 0,
        }
    }

    /// Running snapshot with updated progress and message.
    pub fn running(
        job_id: impl Into<String>,
        progress: f64,
        message: impl Into<String>,
        started_unix_ms: u64,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            state: JobState::Running,
            message: message.into(),
            progress: progress.clamp(0.0, 1.0),
            outputs: BTreeMap::new(),
            started_unix_ms,
            finished_unix_ms: 0,
        }
    }

    /// Terminal success snapshot with the full output map.
    pub fn completed(
        job_id: impl Into<String>,
        outputs: BTreeMap<String, String>,
        started_unix_ms: u64,
        finished_unix_ms: u64,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            state: JobState::Completed,
            message: String::new(),
            progress: 1.0,
            outputs,
            started_unix_ms,
            finished_unix_ms: finished_unix_ms.max(started_unix_ms),
        }
    }

    /// Terminal failure snapshot carrying the error text.
    pub fn failed(
        job_id: impl Into<String>,
        message: impl Into<String>,
        started_unix_ms: u64,
        finished_unix_ms: u64,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            state: JobState::Failed,
            message: message.into(),
            progress: 0.0,
            outputs: BTreeMap::new(),
            started_unix_ms,
            finished_unix_ms: finished_unix_ms.max(started_unix_ms),
        }
    }

    /// Terminal cancellation snapshot.
    pub fn cancelled(
        job_id: impl Into<String>,
        started_unix_ms: u64,
        finished_unix_ms: u64,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            state: JobState::Cancelled,
            message: "cancelled".to_string(),
            progress: 0.0,
            outputs: BTreeMap::new(),
            started_unix_ms,
            finished_unix_ms: finished_unix_ms.max(started_unix_ms),
        }
    }

    /// Check if this snapshot ends the job.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
