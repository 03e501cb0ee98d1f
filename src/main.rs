//! Endpoint Sidecar
//!
//! Keeps a proxy (twemproxy by default) configured for the live members of a
//! Kubernetes-backed pool.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────── SIDECAR ─────────────────────────────┐
//!   │                                                                   │
//!   │  ┌──────────┐   ┌───────────┐   ┌──────────┐   ┌─────────────┐   │
//!   │  │ interval │──▶│ discovery │──▶│  render  │──▶│    store    │   │
//!   │  │  ticker  │   │ (k8s API) │   │ template │   │ config file │   │
//!   │  └──────────┘   └───────────┘   └──────────┘   └──────┬──────┘   │
//!   │        ▲                                              │          │
//!   │        │ reconcile                                    ▼          │
//!   │  ┌─────┴──────┐        completion event        ┌─────────────┐   │
//!   │  │ reconciler │◀───────────────────────────────│ supervisor  │───┼──▶ proxy
//!   │  └────────────┘                                └─────────────┘   │
//!   └───────────────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use clap::Parser;

use endpoint_sidecar::config::{resolve_config, Args};
use endpoint_sidecar::lifecycle::startup;
use endpoint_sidecar::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match resolve_config(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("endpoint-sidecar: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.observability.log_level);
    tracing::info!("endpoint-sidecar v{} starting", env!("CARGO_PKG_VERSION"));

    let error = startup::run(config).await;
    tracing::error!(error = %error, "Fatal error, exiting");
    ExitCode::FAILURE
}
