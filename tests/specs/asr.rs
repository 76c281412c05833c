// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end transcription specs.

use std::time::Duration;

use hark_asr::testing::FakeAsrModel;
use hark_proto::v1 as pb;
use similar_asserts::assert_eq as assert_text_eq;

use super::prelude::*;

const JFK_TEXT: &str =
    "And so my fellow Americans ask not what your country can do for you ask what you can do for your country.";

#[tokio::test]
async fn transcription_job_completes_with_golden_transcript() {
    let mut engine = start_asr_engine(FakeAsrModel::with_text(JFK_TEXT)).await;
    load_model(&mut engine.client, "nemo-parakeet-tdt-0.6b-v3", "nemo-parakeet-tdt-0.6b-v3").await;

    let input = engine.dir.path().join("jfk.wav");
    write_test_wav(&input, 2.0, 16_000);
    let output_dir = engine.dir.path().join("out");

    let response = engine
        .client
        .start_job(start_request("job-asr-1", &input, &output_dir, &[]))
        .await
        .unwrap()
        .into_inner();
    assert!(response.accepted);

    let statuses = collect_stream(&mut engine.client, "job-asr-1").await;
    let terminal = statuses.last().unwrap();
    assert_eq!(terminal.state(), pb::JobState::Completed);
    assert_eq!(terminal.progress, 1.0);

    let transcript = std::fs::read_to_string(&terminal.outputs["transcript"]).unwrap();
    assert_text_eq!(transcript, format!("{JFK_TEXT}\n"));

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&terminal.outputs["result"]).unwrap())
            .unwrap();
    assert_eq!(manifest["model_id"], "nemo-parakeet-tdt-0.6b-v3");
    assert!(manifest["segment_count"].as_u64().unwrap() > 0);

    // The store retains the terminal state for later queries.
    let cached = engine
        .client
        .get_job_status(pb::GetJobStatusRequest { job_id: "job-asr-1".to_string() })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(cached.state(), pb::JobState::Completed);
}

#[tokio::test]
async fn busy_engine_rejects_a_second_job() {
    let model = FakeAsrModel::slow("slow transcript", Duration::from_millis(150));
    let mut engine = start_asr_engine(model).await;
    load_model(&mut engine.client, "model-a", "model-a").await;

    let input = engine.dir.path().join("long.wav");
    write_test_wav(&input, 4.0, 16_000);

    let accepted = engine
        .client
        .start_job(start_request(
            "job-a",
            &input,
            &engine.dir.path().join("out-a"),
            &[("chunk_len_s", "1"), ("chunk_batch_size", "1")],
        ))
        .await
        .unwrap()
        .into_inner();
    assert!(accepted.accepted);

    let rejection = engine
        .client
        .start_job(start_request("job-b", &input, &engine.dir.path().join("out-b"), &[]))
        .await
        .unwrap_err();
    assert_eq!(rejection.code(), tonic::Code::ResourceExhausted);
    assert_eq!(rejection.message(), "engine busy");

    // Job A still completes normally.
    let statuses = collect_stream(&mut engine.client, "job-a").await;
    assert_eq!(statuses.last().unwrap().state(), pb::JobState::Completed);
    assert!(engine
        .client
        .get_job_status(pb::GetJobStatusRequest { job_id: "job-b".to_string() })
        .await
        .is_err());
}

#[tokio::test]
async fn stop_job_cancels_cooperatively_between_chunks() {
    let model = FakeAsrModel::slow("cancelled transcript", Duration::from_millis(100));
    let mut engine = start_asr_engine(model).await;
    load_model(&mut engine.client, "model-a", "model-a").await;

    let input = engine.dir.path().join("long.wav");
    write_test_wav(&input, 6.0, 16_000);
    let output_dir = engine.dir.path().join("out");

    engine
        .client
        .start_job(start_request(
            "job-cancel",
            &input,
            &output_dir,
            &[("chunk_len_s", "1"), ("chunk_batch_size", "1")],
        ))
        .await
        .unwrap();

    let mut stream = engine
        .client
        .stream_job_status(pb::StreamJobStatusRequest { job_id: "job-cancel".to_string() })
        .await
        .unwrap()
        .into_inner();

    // Wait for the first progress publication, then stop the job.
    let mut statuses = Vec::new();
    let mut stopped = false;
    let mut progress_after_stop = 0;
    while let Some(status) = stream.message().await.unwrap() {
        if stopped && status.state() == pb::JobState::Running && status.progress > 0.0 {
            progress_after_stop += 1;
        }
        let should_stop =
            !stopped && status.state() == pb::JobState::Running && status.progress > 0.0;
        statuses.push(status);
        if should_stop {
            stopped = true;
            let response = engine
                .client
                .stop_job(pb::StopJobRequest { job_id: "job-cancel".to_string() })
                .await
                .unwrap()
                .into_inner();
            assert!(response.ok);
        }
    }

    let terminal = statuses.last().unwrap();
    assert_eq!(terminal.state(), pb::JobState::Cancelled);
    assert_eq!(terminal.message, "cancelled");
    assert!(progress_after_stop <= 1, "saw {progress_after_stop} progress events after stop");
    assert!(!output_dir.join("result.json").exists());
}

#[tokio::test]
async fn model_failure_is_terminal_for_the_job_not_the_engine() {
    let mut engine = start_asr_engine(FakeAsrModel::failing("inference backend crashed")).await;
    load_model(&mut engine.client, "model-a", "model-a").await;

    let input = engine.dir.path().join("a.wav");
    write_test_wav(&input, 1.0, 16_000);

    engine
        .client
        .start_job(start_request("job-fail", &input, &engine.dir.path().join("out"), &[]))
        .await
        .unwrap();
    let statuses = collect_stream(&mut engine.client, "job-fail").await;
    let terminal = statuses.last().unwrap();
    assert_eq!(terminal.state(), pb::JobState::Failed);
    assert!(terminal.message.contains("inference backend crashed"));

    // The engine is idle again.
    let info = engine
        .client
        .get_engine_info(pb::GetEngineInfoRequest {})
        .await
        .unwrap()
        .into_inner();
    assert!(!info.busy);
}
