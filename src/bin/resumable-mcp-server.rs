// ABOUTME: Server binary for the resumable MCP server
// ABOUTME: Loads configuration, initializes logging, and serves until Ctrl-C
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Resumable MCP Server Binary
//!
//! Starts the HTTP server with session replay, live streaming and cancellation.

use anyhow::Result;
use clap::Parser;
use resumable_mcp_server::{
    config::environment::ServerConfig,
    logging,
    mcp::{ServerLifecycle, ServerResources},
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "resumable-mcp-server")]
#[command(about = "Resumable MCP server - session-scoped event streaming with replay")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override bind host
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }

    info!("Starting resumable MCP server");
    info!("{}", config.summary());

    let resources = Arc::new(ServerResources::new(config));
    let lifecycle = ServerLifecycle::new(resources);

    if let Err(e) = lifecycle.run(shutdown_signal()).await {
        error!("Server error: {e}");
        return Err(e.into());
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl-C");
}
