// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport setup: unix-domain socket (preferred) or TCP.

use std::net::SocketAddr;
use std::path::PathBuf;

use hark_proto::v1::asr_engine_server::{AsrEngine, AsrEngineServer};
use thiserror::Error;
use tokio::net::UnixListener;
use tokio_stream::wrappers::UnixListenerStream;
use tonic::transport::Server;
use tracing::info;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid listen address: {0}")]
    Addr(String),
    #[error(transparent)]
    Transport(#[from] tonic::transport::Error),
}

/// Where the engine listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bind {
    Unix(PathBuf),
    Tcp { host: String, port: u16 },
}

/// Serve the engine until the process is terminated.
///
/// A stale socket file from a previous run is removed before binding.
pub async fn serve<S: AsrEngine>(service: AsrEngineServer<S>, bind: Bind) -> Result<(), ServeError> {
    match bind {
        Bind::Unix(path) => {
            if path.exists() {
                std::fs::remove_file(&path).map_err(|source| ServeError::Bind {
                    addr: format!("unix:{}", path.display()),
                    source,
                })?;
            }
            let listener = UnixListener::bind(&path).map_err(|source| ServeError::Bind {
                addr: format!("unix:{}", path.display()),
                source,
            })?;
            info!("listening on unix:{}", path.display());
            Server::builder()
                .add_service(service)
                .serve_with_incoming(UnixListenerStream::new(listener))
                .await?;
        }
        Bind::Tcp { host, port } => {
            let addr: SocketAddr = format!("{host}:{port}")
                .parse()
                .map_err(|_| ServeError::Addr(format!("{host}:{port}")))?;
            info!("listening on {addr}");
            Server::builder().add_service(service).serve(addr).await?;
        }
    }
    Ok(())
}
