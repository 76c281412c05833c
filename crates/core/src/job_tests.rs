// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn queued_starts_with_zero_progress() {
    let status = JobStatus::queued("job-1", 1000);
    assert_eq!(status.state, JobState::Queued);
    assert_eq!(status.progress, 0.0);
    assert_eq!(status.started_unix_ms, 1000);
    assert_eq!(status.finished_unix_ms, 0);
    assert!(status.outputs.is_empty());
    assert!(!status.is_terminal());
}

#[test]
fn running_clamps_progress_into_unit_interval() {
    let status = JobStatus::running("job-1", 1.5, "RUNNING", 1000);
    assert_eq!(status.progress, 1.0);
    let status = JobStatus::running("job-1", -0.5, "RUNNING", 1000);
    assert_eq!(status.progress, 0.0);
}

#[test]
fn completed_carries_outputs_and_finish_time() {
    let mut outputs = std::collections::BTreeMap::new();
    outputs.insert("transcript".to_string(), "/out/transcript.txt".to_string());
    let status = JobStatus::completed("job-1", outputs, 1000, 2000);
    assert_eq!(status.state, JobState::Completed);
    assert_eq!(status.progress, 1.0);
    assert_eq!(status.finished_unix_ms, 2000);
    assert_eq!(status.outputs["transcript"], "/out/transcript.txt");
    assert!(status.is_terminal());
}

#[test]
fn terminal_finish_never_precedes_start() {
    let status = JobStatus::failed("job-1", "boom", 2000, 1000);
    assert!(status.finished_unix_ms >= status.started_unix_ms);
}

#[test]
fn cancelled_uses_fixed_message() {
    let status = JobStatus::cancelled("job-1", 1000, 2000);
    assert_eq!(status.state, JobState::Cancelled);
    assert_eq!(status.message, "cancelled");
    assert!(status.is_terminal());
}

#[test]
fn only_three_states_are_terminal() {
    assert!(!JobState::Queued.is_terminal());
    assert!(!JobState::Running.is_terminal());
    assert!(JobState::Completed.is_terminal());
    assert!(JobState::Failed.is_terminal());
    assert!(JobState::Cancelled.is_terminal());
}

#[test]
fn state_displays_as_wire_names() {
    assert_eq!(JobState::Queued.to_string(), "QUEUED");
    assert_eq!(JobState::Cancelled.to_string(), "CANCELLED");
}

#[test]
fn status_round_trips_through_json() {
    let status = JobStatus::running("job-1", 0.5, "halfway", 1000);
    let json = serde_json::to_string(&status).unwrap();
    let back: JobStatus = serde_json::from_str(&json).unwrap();
    assert_eq!(back, status);
}
