// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-slot job scheduler.
//!
//! At most one job runs per engine process. `start_job` claims the slot,
//! publishes `QUEUED`, and hands the job to a dedicated worker thread;
//! the pipeline result is translated into exactly one terminal status.
//! Pipeline failures are terminal for the job, never for the engine — the
//! slot is always released and the runner accepts the next job.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use hark_core::{Clock, JobStatus, SystemClock};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::pipeline::{JobSpec, Pipeline, PipelineError};
use crate::status_store::StatusStore;

struct ActiveJob {
    job_id: String,
    cancel: CancellationToken,
}

/// Drives one job at a time through an engine pipeline.
pub struct JobRunner<P: Pipeline, C: Clock = SystemClock> {
    pipeline: Arc<P>,
    store: Arc<StatusStore>,
    clock: C,
    active: Arc<Mutex<Option<ActiveJob>>>,
}

impl<P: Pipeline> JobRunner<P> {
    pub fn new(pipeline: Arc<P>, store: Arc<StatusStore>) -> Self {
        Self::with_clock(pipeline, store, SystemClock)
    }
}

impl<P: Pipeline, C: Clock> JobRunner<P, C> {
    pub fn with_clock(pipeline: Arc<P>, store: Arc<StatusStore>, clock: C) -> Self {
        Self { pipeline, store, clock, active: Arc::new(Mutex::new(None)) }
    }

    /// Id of the currently running job, if any.
    pub fn active_job_id(&self) -> Option<String> {
        self.active.lock().as_ref().map(|a| a.job_id.clone())
    }

    /// Accept a job if the slot is free. Returns false when busy.
    pub fn start_job(
        &self,
        job_id: &str,
        input_path: PathBuf,
        output_dir: PathBuf,
        params: P::Params,
    ) -> bool {
        let cancel = CancellationToken::new();
        {
            let mut active = self.active.lock();
            if active.is_some() {
                return false;
            }
            *active = Some(ActiveJob { job_id: job_id.to_string(), cancel: cancel.clone() });
        }

        let started_ms = self.clock.epoch_ms();
        self.store.set(JobStatus::queued(job_id, started_ms));

        let job = JobSpec {
            job_id: job_id.to_string(),
            input_path,
            output_dir,
            params,
        };
        let pipeline = Arc::clone(&self.pipeline);
        let store = Arc::clone(&self.store);
        let active = Arc::clone(&self.active);
        let clock = self.clock.clone();

        let spawned = std::thread::Builder::new()
            .name(format!("job-{job_id}"))
            .spawn(move || {
                run_worker(pipeline, store.as_ref(), &clock, job, &cancel, started_ms);
                *active.lock() = None;
            });
        if let Err(e) = spawned {
            error!(job_id, error = %e, "failed to spawn job worker");
            self.store.set(JobStatus::failed(
                job_id,
                format!("failed to spawn job worker: {e}"),
                started_ms,
                self.clock.epoch_ms(),
            ));
            *self.active.lock() = None;
            return false;
        }
        info!(job_id, "job accepted");
        true
    }

    /// Signal cancellation for the active job. Returns false when the id
    /// does not match the active job.
    pub fn stop_job(&self, job_id: &str) -> bool {
        let active = self.active.lock();
        match active.as_ref() {
            Some(a) if a.job_id == job_id => {
                info!(job_id, "cancellation requested");
                a.cancel.cancel();
                true
            }
            _ => false,
        }
    }
}

fn run_worker<P: Pipeline, C: Clock>(
    pipeline: Arc<P>,
    store: &StatusStore,
    clock: &C,
    job: JobSpec<P::Params>,
    cancel: &CancellationToken,
    started_ms: u64,
) {
    let job_id = job.job_id.clone();
    store.set(JobStatus::running(&job_id, 0.0, "", started_ms));

    let mut last_progress = 0.0_f64;
    let result = catch_unwind(AssertUnwindSafe(|| {
        let mut progress = |p: f64, message: &str| {
            if cancel.is_cancelled() {
                return;
            }
            // Progress within RUNNING never goes backwards.
            last_progress = last_progress.max(p);
            store.set(JobStatus::running(&job_id, last_progress, message, started_ms));
        };
        pipeline.run(&job, cancel, &mut progress)
    }));

    let finished_ms = clock.epoch_ms();
    let status = match result {
        Ok(Ok(outputs)) => {
            info!(job_id = %job.job_id, "job completed");
            JobStatus::completed(&job.job_id, outputs, started_ms, finished_ms)
        }
        Ok(Err(PipelineError::Cancelled)) => {
            info!(job_id = %job.job_id, "job cancelled");
            JobStatus::cancelled(&job.job_id, started_ms, finished_ms)
        }
        Ok(Err(PipelineError::Failed(message))) => {
            warn!(job_id = %job.job_id, error = %message, "job failed");
            JobStatus::failed(&job.job_id, message, started_ms, finished_ms)
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(job_id = %job.job_id, error = %message, "pipeline panicked");
            JobStatus::failed(&job.job_id, message, started_ms, finished_ms)
        }
    };
    store.set(status);
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "pipeline panicked".to_string()
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
