// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared CLI surface of the engine binaries.

use std::path::PathBuf;

use clap::Args;
use tracing_subscriber::EnvFilter;

use crate::serve::Bind;

/// `serve` flags shared by `asrd` and `diard`.
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Unix domain socket path. Preferred over TCP when set.
    #[arg(long)]
    pub socket: Option<PathBuf>,

    /// TCP listen host, used when no socket is given.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// TCP listen port, used when no socket is given.
    #[arg(long)]
    pub port: Option<u16>,

    /// Log filter (e.g. "info", "debug", "hark_engine=trace").
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl ServeArgs {
    pub fn bind(&self, default_port: u16) -> Bind {
        match &self.socket {
            Some(path) => Bind::Unix(path.clone()),
            None => Bind::Tcp {
                host: self.host.clone(),
                port: self.port.unwrap_or(default_port),
            },
        }
    }
}

/// Initialize process-wide tracing from the `--log-level` flag.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
