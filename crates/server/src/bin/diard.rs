// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The speaker diarization engine process.

use std::sync::Arc;

use clap::Parser;
use hark_diar::command;
use hark_diar::DiarPipeline;
use hark_engine::{JobRunner, ModelManager, StatusStore};
use hark_proto::AsrEngineServer;
use hark_server::{init_tracing, serve, EngineService, ServeArgs};

const DEFAULT_PORT: u16 = 50052;

#[derive(Debug, Parser)]
#[command(name = "diard", about = "hark speaker diarization engine", version)]
struct Args {
    #[command(flatten)]
    serve: ServeArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.serve.log_level);

    let manager = Arc::new(ModelManager::with_token_sensitivity(
        command::loader(),
        command::token_sensitive,
    ));
    let store = Arc::new(StatusStore::new());
    let pipeline = Arc::new(DiarPipeline::new(Arc::clone(&manager)));
    let runner = Arc::new(JobRunner::new(pipeline, Arc::clone(&store)));
    let service = EngineService::new(manager, runner, store);

    serve(AsrEngineServer::new(service), args.serve.bind(DEFAULT_PORT)).await?;
    Ok(())
}
