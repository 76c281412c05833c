// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures: in-process engines served over loopback gRPC.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use hark_asr::testing::FakeAsrModel;
use hark_asr::{AsrPipeline, WavDecoder};
use hark_diar::testing::{fixed_loader, FakeSpeakerPipeline};
use hark_diar::{DiarModel, DiarPipeline, PyannoteOutput};
use hark_engine::{JobRunner, ModelManager, StatusStore};
use hark_proto::v1::asr_engine_server::{AsrEngine, AsrEngineServer};
use hark_proto::v1 as pb;
use hark_proto::AsrEngineClient;
use hark_server::EngineService;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_stream::StreamExt;
use tonic::transport::Channel;

pub use hark_asr::testing::write_test_wav;

pub type Client = AsrEngineClient<Channel>;

/// A running engine under test.
pub struct TestEngine {
    pub client: Client,
    pub dir: tempfile::TempDir,
    server: tokio::task::JoinHandle<()>,
}

impl Drop for TestEngine {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn serve_engine<S: AsrEngine>(service: AsrEngineServer<S>) -> (Client, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(service)
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    let mut client = None;
    for _ in 0..50 {
        match AsrEngineClient::connect(format!("http://{addr}")).await {
            Ok(c) => {
                client = Some(c);
                break;
            }
            Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
        }
    }
    (client.expect("engine did not come up"), server)
}

/// Boot an ASR engine backed by the given fake recognizer.
pub async fn start_asr_engine(model: Arc<FakeAsrModel>) -> TestEngine {
    let manager = Arc::new(ModelManager::new(FakeAsrModel::loader(model)));
    let store = Arc::new(StatusStore::new());
    let pipeline = Arc::new(AsrPipeline::new(Arc::clone(&manager), Arc::new(WavDecoder)));
    let runner = Arc::new(JobRunner::new(pipeline, Arc::clone(&store)));
    let service = EngineService::new(manager, runner, store);
    let (client, server) = serve_engine(AsrEngineServer::new(service)).await;
    TestEngine { client, dir: tempfile::tempdir().unwrap(), server }
}

/// Boot a diarization engine backed by the given fake pyannote pipeline.
pub async fn start_diar_engine(pipeline: Arc<FakeSpeakerPipeline>) -> TestEngine {
    let manager = Arc::new(ModelManager::with_token_sensitivity(
        fixed_loader(DiarModel::Pyannote(pipeline)),
        |spec| spec.model_id == "pyannote",
    ));
    let store = Arc::new(StatusStore::new());
    let diar = Arc::new(DiarPipeline::new(Arc::clone(&manager)));
    let runner = Arc::new(JobRunner::new(diar, Arc::clone(&store)));
    let service = EngineService::new(manager, runner, store);
    let (client, server) = serve_engine(AsrEngineServer::new(service)).await;
    TestEngine { client, dir: tempfile::tempdir().unwrap(), server }
}

pub fn model_spec(model_id: &str, model_name: &str) -> pb::ModelSpec {
    pb::ModelSpec {
        model_id: model_id.to_string(),
        model_name: model_name.to_string(),
        model_path: String::new(),
        providers: Vec::new(),
        intra_op_threads: 0,
        vad_backend: String::new(),
    }
}

pub async fn load_model(client: &mut Client, model_id: &str, model_name: &str) {
    let response = client
        .load_model(pb::LoadModelRequest { spec: Some(model_spec(model_id, model_name)) })
        .await
        .unwrap()
        .into_inner();
    assert!(response.ok);
}

pub fn start_request(
    job_id: &str,
    input: &std::path::Path,
    output_dir: &std::path::Path,
    params: &[(&str, &str)],
) -> pb::StartJobRequest {
    let params: HashMap<String, String> =
        params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    pb::StartJobRequest {
        job_id: job_id.to_string(),
        input_path: input.display().to_string(),
        output_dir: output_dir.display().to_string(),
        model_id: String::new(),
        params,
    }
}

pub fn is_terminal(state: pb::JobState) -> bool {
    matches!(state, pb::JobState::Completed | pb::JobState::Failed | pb::JobState::Cancelled)
}

/// Drain the status stream for a job until it terminates.
pub async fn collect_stream(client: &mut Client, job_id: &str) -> Vec<pb::JobStatus> {
    let stream = client
        .stream_job_status(pb::StreamJobStatusRequest { job_id: job_id.to_string() })
        .await
        .unwrap()
        .into_inner();
    stream.map(|s| s.unwrap()).collect::<Vec<_>>().await
}

/// Canonical fake pyannote result used across the diarization specs.
pub fn two_speaker_turns() -> PyannoteOutput {
    PyannoteOutput::SpeakerTurns(vec![
        (hark_diar::TimeSpan::new(1.2, 2.0), "SPEAKER_01".to_string()),
        (hark_diar::TimeSpan::new(0.0, 1.2), "SPEAKER_00".to_string()),
    ])
}
