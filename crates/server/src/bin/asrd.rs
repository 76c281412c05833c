// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The speech-recognition engine process.

use std::sync::Arc;

use clap::Parser;
use hark_asr::command::CommandAsrModel;
use hark_asr::{AsrPipeline, WavDecoder};
use hark_engine::{JobRunner, ModelManager, StatusStore};
use hark_proto::AsrEngineServer;
use hark_server::{init_tracing, serve, EngineService, ServeArgs};

const DEFAULT_PORT: u16 = 50051;

#[derive(Debug, Parser)]
#[command(name = "asrd", about = "hark speech recognition engine", version)]
struct Args {
    #[command(flatten)]
    serve: ServeArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.serve.log_level);

    let manager = Arc::new(ModelManager::new(CommandAsrModel::loader()));
    let store = Arc::new(StatusStore::new());
    let pipeline = Arc::new(AsrPipeline::new(Arc::clone(&manager), Arc::new(WavDecoder)));
    let runner = Arc::new(JobRunner::new(pipeline, Arc::clone(&store)));
    let service = EngineService::new(manager, runner, store);

    serve(AsrEngineServer::new(service), args.serve.bind(DEFAULT_PORT)).await?;
    Ok(())
}
