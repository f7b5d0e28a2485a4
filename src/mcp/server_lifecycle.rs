// ABOUTME: Server lifecycle management: router assembly, bind, serve, and graceful shutdown
// ABOUTME: Pairs the HTTP server with the session sweeper and closes every session on exit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::resources::ServerResources;
use crate::errors::{AppError, AppResult};
use crate::routes::{HealthRoutes, McpRoutes};
use crate::session::SessionSweeper;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Manages server lifecycle, startup, and shutdown
pub struct ServerLifecycle {
    resources: Arc<ServerResources>,
}

impl ServerLifecycle {
    /// Create a new server lifecycle manager
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Full application router
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .merge(McpRoutes::routes(Arc::clone(&self.resources)))
            .merge(HealthRoutes::routes(Arc::clone(&self.resources)))
            .layer(TraceLayer::new_for_http())
    }

    /// Bind, serve until `shutdown` resolves, then stop the sweeper
    ///
    /// Every session is closed as soon as shutdown starts so open streams end
    /// and the graceful drain can complete.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound or the server fails
    pub async fn run<F>(self, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let config = &self.resources.config;
        let addr = format!("{}:{}", config.host, config.http_port);

        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            let message = format!("Failed to bind {addr}: {e}");
            AppError::internal(message).with_source(e)
        })?;

        let sweeper = SessionSweeper::spawn(
            Arc::clone(&self.resources.sessions),
            config.session.sweep_interval(),
            config.session.timeout(),
        );

        info!(address = %addr, "Resumable MCP server listening");

        let sessions = Arc::clone(&self.resources.sessions);
        let drain = async move {
            shutdown.await;
            info!(sessions = sessions.len(), "Shutdown requested, closing sessions");
            sessions.close_all().await;
        };

        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(drain)
            .await;

        sweeper.shutdown().await;
        self.resources.sessions.close_all().await;

        served.map_err(|e| {
            let message = format!("HTTP server error: {e}");
            AppError::internal(message).with_source(e)
        })?;

        info!("Server stopped");
        Ok(())
    }
}
