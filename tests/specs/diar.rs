// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end diarization specs.

use hark_diar::parse_rttm;
use hark_diar::testing::FakeSpeakerPipeline;
use hark_proto::v1 as pb;

use super::prelude::*;

#[tokio::test]
async fn pyannote_rttm_job_writes_sorted_speaker_lines() {
    let pipeline = FakeSpeakerPipeline::with_output(two_speaker_turns());
    let mut engine = start_diar_engine(pipeline).await;
    load_model(&mut engine.client, "pyannote", "pyannote/speaker-diarization-community-1").await;

    let input = engine.dir.path().join("jfk.wav");
    write_test_wav(&input, 2.0, 16_000);
    let output_dir = engine.dir.path().join("out");

    let response = engine
        .client
        .start_job(start_request(
            "job-diar-1",
            &input,
            &output_dir,
            &[("output_format", "rttm"), ("max_speakers", "4")],
        ))
        .await
        .unwrap()
        .into_inner();
    assert!(response.accepted);

    let statuses = collect_stream(&mut engine.client, "job-diar-1").await;
    let terminal = statuses.last().unwrap();
    assert_eq!(terminal.state(), pb::JobState::Completed);

    let rttm = std::fs::read_to_string(&terminal.outputs["rttm"]).unwrap();
    let lines = parse_rttm(&rttm);
    assert!(!lines.is_empty());

    let document: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&terminal.outputs["diarization"]).unwrap())
            .unwrap();
    assert!(document["speaker_count"].as_u64().unwrap() >= 1);

    // Segments are sorted ascending by start time.
    let segments = document["segments"].as_array().unwrap();
    let starts: Vec<f64> = segments.iter().map(|s| s["start"].as_f64().unwrap()).collect();
    assert!(starts.windows(2).all(|w| w[0] <= w[1]));

    // RTTM and JSON agree up to millisecond rounding.
    assert_eq!(lines.len(), segments.len());
    for (line, segment) in lines.iter().zip(segments) {
        assert!((line.0 - segment["start"].as_f64().unwrap()).abs() < 1e-3);
        assert!((line.1 - segment["duration"].as_f64().unwrap()).abs() < 1e-3);
        assert_eq!(line.2, segment["speaker"].as_str().unwrap());
    }
}

#[tokio::test]
async fn json_only_jobs_skip_the_rttm_output() {
    let pipeline = FakeSpeakerPipeline::with_output(two_speaker_turns());
    let mut engine = start_diar_engine(pipeline).await;
    load_model(&mut engine.client, "pyannote", "pyannote/speaker-diarization-community-1").await;

    let input = engine.dir.path().join("clip.wav");
    write_test_wav(&input, 1.0, 16_000);
    let output_dir = engine.dir.path().join("out");

    engine
        .client
        .start_job(start_request("job-diar-2", &input, &output_dir, &[("output_format", "json")]))
        .await
        .unwrap();
    let statuses = collect_stream(&mut engine.client, "job-diar-2").await;
    let terminal = statuses.last().unwrap();
    assert_eq!(terminal.state(), pb::JobState::Completed);
    assert!(!terminal.outputs.contains_key("rttm"));
    assert!(terminal.outputs.contains_key("diarization"));
    assert!(terminal.outputs.contains_key("result"));
}

#[tokio::test]
async fn engine_info_has_the_same_shape_as_the_asr_engine() {
    let pipeline = FakeSpeakerPipeline::with_output(two_speaker_turns());
    let mut engine = start_diar_engine(pipeline).await;
    load_model(&mut engine.client, "pyannote", "pyannote/speaker-diarization-community-1").await;

    let info = engine
        .client
        .get_engine_info(pb::GetEngineInfoRequest {})
        .await
        .unwrap()
        .into_inner();
    assert!(!info.busy);
    assert_eq!(info.loaded_model_id, "pyannote");

    let models = engine
        .client
        .list_loaded_models(pb::ListLoadedModelsRequest {})
        .await
        .unwrap()
        .into_inner();
    assert_eq!(models.models.len(), 1);
    assert_eq!(models.models[0].model_name, "pyannote/speaker-diarization-community-1");
}
