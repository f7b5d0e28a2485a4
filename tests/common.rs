// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides logging, server resources, router, and session helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `resumable_mcp_server`

use axum::Router;
use resumable_mcp_server::{
    config::{ServerConfig, SessionConfig},
    mcp::{ServerLifecycle, ServerResources},
    session::Session,
};
use std::{
    sync::{Arc, Once},
    time::Duration,
};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Server resources with default configuration
pub fn create_test_resources() -> Arc<ServerResources> {
    create_test_resources_with(SessionConfig::default())
}

/// Server resources with a custom session configuration
pub fn create_test_resources_with(session: SessionConfig) -> Arc<ServerResources> {
    init_test_logging();
    let config = ServerConfig {
        session,
        ..ServerConfig::default()
    };
    Arc::new(ServerResources::new(config))
}

/// Full application router over `resources`
pub fn create_test_router(resources: &Arc<ServerResources>) -> Router {
    ServerLifecycle::new(Arc::clone(resources)).router()
}

/// Wait until `session` has emitted at least `id` events
pub async fn wait_for_event_id(session: &Session, id: u64) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while session.last_event_id().await < id {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("timed out waiting for session events");
}

/// Wait until `session` has an attached live stream (or not)
pub async fn wait_for_live_stream(session: &Session, attached: bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while session.has_live_stream().await != attached {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("timed out waiting for stream state");
}
