// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic `AsrEngine` service implementation.
//!
//! Translates RPCs into runtime calls and runtime errors into the
//! nearest gRPC status, never leaking backtraces. One instantiation per
//! engine binary.

use std::pin::Pin;
use std::sync::Arc;

use hark_core::FromKv;
use hark_engine::{
    JobRunner, LoadError, ModelManager, ModelSpec, Pipeline, StatusStore,
};
use hark_proto::v1 as pb;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tonic::{Request, Response, Status};
use tracing::debug;

use crate::metrics::rss_bytes;

/// The runtime behind the `AsrEngine` service of one engine process.
pub struct EngineService<M, P>
where
    M: Clone + Send + Sync + 'static,
    P: Pipeline,
{
    manager: Arc<ModelManager<M>>,
    runner: Arc<JobRunner<P>>,
    store: Arc<StatusStore>,
}

impl<M, P> EngineService<M, P>
where
    M: Clone + Send + Sync + 'static,
    P: Pipeline,
{
    pub fn new(
        manager: Arc<ModelManager<M>>,
        runner: Arc<JobRunner<P>>,
        store: Arc<StatusStore>,
    ) -> Self {
        Self { manager, runner, store }
    }
}

fn to_model_spec(spec: pb::ModelSpec) -> ModelSpec {
    ModelSpec {
        model_id: spec.model_id,
        model_name: spec.model_name,
        model_path: if spec.model_path.is_empty() { None } else { Some(spec.model_path) },
        providers: spec.providers,
        intra_op_threads: if spec.intra_op_threads > 0 { spec.intra_op_threads } else { 8 },
        vad_backend: if spec.vad_backend.is_empty() {
            "silero".to_string()
        } else {
            spec.vad_backend
        },
    }
}

fn from_model_spec(spec: &ModelSpec) -> pb::ModelSpec {
    pb::ModelSpec {
        model_id: spec.model_id.clone(),
        model_name: spec.model_name.clone(),
        model_path: spec.model_path.clone().unwrap_or_default(),
        providers: spec.providers.clone(),
        intra_op_threads: spec.intra_op_threads,
        vad_backend: spec.vad_backend.clone(),
    }
}

fn load_error_status(e: LoadError) -> Status {
    match e {
        LoadError::Unsupported(_) => Status::invalid_argument(e.to_string()),
        LoadError::Failed(_) => Status::internal(e.to_string()),
    }
}

#[tonic::async_trait]
impl<M, P> pb::asr_engine_server::AsrEngine for EngineService<M, P>
where
    M: Clone + Send + Sync + 'static,
    P: Pipeline,
    P::Params: FromKv,
{
    async fn load_model(
        &self,
        request: Request<pb::LoadModelRequest>,
    ) -> Result<Response<pb::LoadModelResponse>, Status> {
        let spec = request
            .into_inner()
            .spec
            .ok_or_else(|| Status::invalid_argument("spec is required"))?;
        if spec.model_id.is_empty() {
            return Err(Status::invalid_argument("model_id is required"));
        }
        if spec.model_name.is_empty() {
            return Err(Status::invalid_argument("model_name is required"));
        }

        // Model loads block for seconds to minutes; keep them off the
        // RPC worker threads.
        let manager = Arc::clone(&self.manager);
        let model_spec = to_model_spec(spec);
        let loaded = tokio::task::spawn_blocking(move || manager.load(model_spec, None))
            .await
            .map_err(|e| Status::internal(format!("load task failed: {e}")))?
            .map_err(load_error_status)?;

        Ok(Response::new(pb::LoadModelResponse {
            model_id: loaded.spec.model_id,
            ok: true,
            message: "loaded".to_string(),
        }))
    }

    async fn unload_model(
        &self,
        request: Request<pb::UnloadModelRequest>,
    ) -> Result<Response<pb::UnloadModelResponse>, Status> {
        let model_id = request.into_inner().model_id;
        let model_id = if model_id.is_empty() { None } else { Some(model_id) };
        let ok = self.manager.unload(model_id.as_deref());
        let message = if ok { "unloaded" } else { "not_loaded" };
        Ok(Response::new(pb::UnloadModelResponse { ok, message: message.to_string() }))
    }

    async fn start_job(
        &self,
        request: Request<pb::StartJobRequest>,
    ) -> Result<Response<pb::StartJobResponse>, Status> {
        let req = request.into_inner();
        let loaded = self
            .manager
            .get_loaded()
            .ok_or_else(|| Status::failed_precondition("no model loaded"))?;
        if !req.model_id.is_empty() && req.model_id != loaded.spec.model_id {
            return Err(Status::invalid_argument("model_id mismatch"));
        }

        let params = P::Params::from_kv(&req.params);
        let accepted = self.runner.start_job(
            &req.job_id,
            req.input_path.into(),
            req.output_dir.into(),
            params,
        );
        if !accepted {
            return Err(Status::resource_exhausted("engine busy"));
        }
        Ok(Response::new(pb::StartJobResponse {
            job_id: req.job_id,
            accepted: true,
            message: "started".to_string(),
        }))
    }

    async fn stop_job(
        &self,
        request: Request<pb::StopJobRequest>,
    ) -> Result<Response<pb::StopJobResponse>, Status> {
        let ok = self.runner.stop_job(&request.into_inner().job_id);
        let message = if ok { "stopping" } else { "not_running" };
        Ok(Response::new(pb::StopJobResponse { ok, message: message.to_string() }))
    }

    async fn get_job_status(
        &self,
        request: Request<pb::GetJobStatusRequest>,
    ) -> Result<Response<pb::JobStatus>, Status> {
        let job_id = request.into_inner().job_id;
        let status = self
            .store
            .get(&job_id)
            .ok_or_else(|| Status::not_found("job not found"))?;
        Ok(Response::new(pb::JobStatus::from(&status)))
    }

    type StreamJobStatusStream = Pin<Box<dyn Stream<Item = Result<pb::JobStatus, Status>> + Send>>;

    async fn stream_job_status(
        &self,
        request: Request<pb::StreamJobStatusRequest>,
    ) -> Result<Response<Self::StreamJobStatusStream>, Status> {
        let job_id = request.into_inner().job_id;
        let subscription = self.store.subscribe(&job_id);
        let store = Arc::clone(&self.store);

        // Forward store deliveries until the terminal state or client
        // disconnect, then drop the sink. The subscription replays the
        // cached status first, so late subscribers never miss terminal.
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            let mut receiver = subscription.receiver;
            loop {
                let status = tokio::select! {
                    status = receiver.recv() => status,
                    _ = tx.closed() => None,
                };
                let Some(status) = status else { break };
                let terminal = status.is_terminal();
                if tx.send(Ok(pb::JobStatus::from(&status))).await.is_err() {
                    break;
                }
                if terminal {
                    break;
                }
            }
            debug!(job_id = %subscription.job_id, "status stream closed");
            store.unsubscribe(&subscription.job_id, subscription.sink_id);
        });

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }

    async fn list_loaded_models(
        &self,
        _request: Request<pb::ListLoadedModelsRequest>,
    ) -> Result<Response<pb::ListLoadedModelsResponse>, Status> {
        let models = self
            .manager
            .get_loaded()
            .map(|loaded| vec![from_model_spec(&loaded.spec)])
            .unwrap_or_default();
        Ok(Response::new(pb::ListLoadedModelsResponse { models }))
    }

    async fn get_engine_info(
        &self,
        _request: Request<pb::GetEngineInfoRequest>,
    ) -> Result<Response<pb::GetEngineInfoResponse>, Status> {
        let active_job_id = self.runner.active_job_id().unwrap_or_default();
        Ok(Response::new(pb::GetEngineInfoResponse {
            busy: !active_job_id.is_empty(),
            active_job_id,
            loaded_model_id: self
                .manager
                .get_loaded()
                .map(|loaded| loaded.spec.model_id)
                .unwrap_or_default(),
            rss_bytes: rss_bytes(),
        }))
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
