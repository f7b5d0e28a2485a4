// ABOUTME: Background task that periodically removes expired sessions from the registry
// ABOUTME: Runs on a tokio interval and stops on an explicit shutdown signal or drop
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::SessionRegistry;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Handle to the running expiry sweep
pub struct SessionSweeper {
    shutdown_tx: mpsc::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl SessionSweeper {
    /// Spawn the sweep loop; must be called from within a tokio runtime
    #[must_use]
    pub fn spawn(registry: Arc<SessionRegistry>, interval: Duration, timeout: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = registry.sweep_expired(Utc::now(), timeout).await;
                        if !removed.is_empty() {
                            info!(count = removed.len(), remaining = registry.len(), "Expired sessions swept");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Session sweeper received shutdown signal");
                        break;
                    }
                }
            }
        });

        Self {
            shutdown_tx,
            handle: Some(handle),
        }
    }

    /// Stop the loop and wait for it to exit
    pub async fn shutdown(mut self) {
        if let Err(e) = self.shutdown_tx.try_send(()) {
            debug!(error = ?e, "Sweeper shutdown signal send failed (task likely finished)");
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                debug!(error = ?e, "Sweeper task ended abnormally");
            }
        }
    }
}

impl Drop for SessionSweeper {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
