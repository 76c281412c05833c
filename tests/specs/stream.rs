// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status streaming specs.

use std::time::Duration;

use hark_asr::testing::FakeAsrModel;
use hark_proto::v1 as pb;

use super::prelude::*;

#[tokio::test]
async fn late_subscriber_replays_the_cached_running_status() {
    let model = FakeAsrModel::slow("replayed", Duration::from_millis(100));
    let mut engine = start_asr_engine(model).await;
    load_model(&mut engine.client, "model-a", "model-a").await;

    let input = engine.dir.path().join("long.wav");
    write_test_wav(&input, 6.0, 16_000);

    engine
        .client
        .start_job(start_request(
            "job-replay",
            &input,
            &engine.dir.path().join("out"),
            &[("chunk_len_s", "1"), ("chunk_batch_size", "1")],
        ))
        .await
        .unwrap();

    // Wait until the job is visibly RUNNING before subscribing.
    loop {
        let status = engine
            .client
            .get_job_status(pb::GetJobStatusRequest { job_id: "job-replay".to_string() })
            .await
            .unwrap()
            .into_inner();
        if status.state() == pb::JobState::Running {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let statuses = collect_stream(&mut engine.client, "job-replay").await;

    // First delivered element is the cached RUNNING snapshot, and the
    // stream still carries everything through terminal.
    assert_eq!(statuses.first().unwrap().state(), pb::JobState::Running);
    assert_eq!(statuses.last().unwrap().state(), pb::JobState::Completed);
}

#[tokio::test]
async fn stream_ends_after_the_terminal_state() {
    let mut engine = start_asr_engine(FakeAsrModel::with_text("short job")).await;
    load_model(&mut engine.client, "model-a", "model-a").await;

    let input = engine.dir.path().join("a.wav");
    write_test_wav(&input, 1.0, 16_000);

    engine
        .client
        .start_job(start_request("job-end", &input, &engine.dir.path().join("out"), &[]))
        .await
        .unwrap();

    let statuses = collect_stream(&mut engine.client, "job-end").await;
    let terminal_count = statuses.iter().filter(|s| is_terminal(s.state())).count();
    assert_eq!(terminal_count, 1);
    assert!(is_terminal(statuses.last().unwrap().state()));

    // States never move backwards: once RUNNING, no QUEUED again.
    let mut saw_running = false;
    for status in &statuses {
        match status.state() {
            pb::JobState::Queued => assert!(!saw_running),
            pb::JobState::Running => saw_running = true,
            _ => {}
        }
    }
}

#[tokio::test]
async fn concurrent_subscribers_see_the_same_sequence() {
    let model = FakeAsrModel::slow("two watchers", Duration::from_millis(50));
    let mut engine = start_asr_engine(model).await;
    load_model(&mut engine.client, "model-a", "model-a").await;

    let input = engine.dir.path().join("a.wav");
    write_test_wav(&input, 3.0, 16_000);

    let mut client_b = engine.client.clone();
    let stream_a = engine
        .client
        .stream_job_status(pb::StreamJobStatusRequest { job_id: "job-multi".to_string() })
        .await
        .unwrap()
        .into_inner();
    let stream_b = client_b
        .stream_job_status(pb::StreamJobStatusRequest { job_id: "job-multi".to_string() })
        .await
        .unwrap()
        .into_inner();

    engine
        .client
        .start_job(start_request(
            "job-multi",
            &input,
            &engine.dir.path().join("out"),
            &[("chunk_len_s", "1"), ("chunk_batch_size", "1")],
        ))
        .await
        .unwrap();

    use tokio_stream::StreamExt;
    let collect = |mut s: tonic::Streaming<pb::JobStatus>| async move {
        let mut out = Vec::new();
        while let Some(status) = s.next().await {
            out.push(status.unwrap());
        }
        out
    };
    let (a, b) = tokio::join!(collect(stream_a), collect(stream_b));

    let states_a: Vec<i32> = a.iter().map(|s| s.state).collect();
    let states_b: Vec<i32> = b.iter().map(|s| s.state).collect();
    assert_eq!(states_a, states_b);
    let progress_a: Vec<f64> = a.iter().map(|s| s.progress).collect();
    let progress_b: Vec<f64> = b.iter().map(|s| s.progress).collect();
    assert_eq!(progress_a, progress_b);
}
