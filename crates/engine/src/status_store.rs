// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Publish/subscribe store for job status snapshots.
//!
//! The store holds the latest [`JobStatus`] per job id and fans every
//! update out to subscriber sinks. Publications for one id are serialized
//! under the store mutex, so every subscriber observes the same order.
//! Sinks are bounded queues; a publisher never blocks. A sink that is
//! closed or has fallen [`SUBSCRIBER_BUFFER`] updates behind is dropped
//! from the subscriber set.

use std::collections::HashMap;

use hark_core::JobStatus;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::warn;

/// Queue depth per subscriber sink.
pub const SUBSCRIBER_BUFFER: usize = 256;

/// A live subscription to one job's status updates.
///
/// If a status already existed at subscribe time, it is the first value
/// the receiver yields. Call [`StatusStore::unsubscribe`] with the
/// `sink_id` when done; dropping the receiver alone leaves a dead sink
/// behind until the next publication prunes it.
pub struct Subscription {
    pub job_id: String,
    pub sink_id: u64,
    pub receiver: mpsc::Receiver<JobStatus>,
}

#[derive(Default)]
struct Inner {
    statuses: HashMap<String, JobStatus>,
    subscribers: HashMap<String, Vec<(u64, mpsc::Sender<JobStatus>)>>,
    next_sink_id: u64,
}

/// Process-wide job status state. One per engine process.
#[derive(Default)]
pub struct StatusStore {
    inner: Mutex<Inner>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored status for `status.job_id` and fan it out to
    /// every current subscriber of that id.
    pub fn set(&self, status: JobStatus) {
        let mut inner = self.inner.lock();
        let job_id = status.job_id.clone();
        inner.statuses.insert(job_id.clone(), status.clone());
        if let Some(sinks) = inner.subscribers.get_mut(&job_id) {
            sinks.retain(|(sink_id, sink)| match sink.try_send(status.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(job_id = %job_id, sink_id, "dropping subscriber that fell behind");
                    false
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            });
        }
    }

    /// Latest stored status for a job, if any.
    pub fn get(&self, job_id: &str) -> Option<JobStatus> {
        self.inner.lock().statuses.get(job_id).cloned()
    }

    /// Register a new sink for a job id. The current status, if present,
    /// is delivered before any future update.
    pub fn subscribe(&self, job_id: &str) -> Subscription {
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_BUFFER);
        let mut inner = self.inner.lock();
        let sink_id = inner.next_sink_id;
        inner.next_sink_id += 1;
        if let Some(current) = inner.statuses.get(job_id) {
            // Buffer is empty at this point, so the send cannot fail.
            let _ = sender.try_send(current.clone());
        }
        inner.subscribers.entry(job_id.to_string()).or_default().push((sink_id, sender));
        Subscription { job_id: job_id.to_string(), sink_id, receiver }
    }

    /// Remove a sink from a job's subscriber set. Idempotent.
    pub fn unsubscribe(&self, job_id: &str, sink_id: u64) {
        let mut inner = self.inner.lock();
        if let Some(sinks) = inner.subscribers.get_mut(job_id) {
            sinks.retain(|(id, _)| *id != sink_id);
            if sinks.is_empty() {
                inner.subscribers.remove(job_id);
            }
        }
    }

    /// Clear all statuses and subscriber sets.
    #[cfg(any(test, feature = "test-support"))]
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.statuses.clear();
        inner.subscribers.clear();
    }
}

#[cfg(test)]
#[path = "status_store_tests.rs"]
mod tests;
