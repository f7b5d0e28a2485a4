// ABOUTME: Per-invocation context handed to tool handlers
// ABOUTME: Exposes cooperative cancellation checkpoints and event/progress emission on the session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Handler Context
//!
//! Cancellation is cooperative. A handler observes it only at
//! [`HandlerContext::checkpoint`] and [`HandlerContext::suspend`]; a handler that
//! never reaches either runs to completion, and its result is then reported as
//! cancelled if a cancellation arrived before it finished.

use super::errors::HandlerError;
use crate::constants::{methods, protocol::JSONRPC_VERSION};
use crate::session::{Event, Session};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Context for one running request
#[derive(Clone)]
pub struct HandlerContext {
    session: Arc<Session>,
    request_id: Value,
    progress_token: Value,
    token: CancellationToken,
}

impl HandlerContext {
    /// Create a context; progress notifications use `progress_token`
    #[must_use]
    pub const fn new(
        session: Arc<Session>,
        request_id: Value,
        progress_token: Value,
        token: CancellationToken,
    ) -> Self {
        Self {
            session,
            request_id,
            progress_token,
            token,
        }
    }

    /// JSON-RPC id of the request being served
    #[must_use]
    pub const fn request_id(&self) -> &Value {
        &self.request_id
    }

    /// Session the request arrived on
    #[must_use]
    pub fn session_id(&self) -> &str {
        self.session.id()
    }

    /// Whether a cancellation has been signalled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Bail out if cancelled
    ///
    /// # Errors
    ///
    /// Returns `HandlerError::Cancelled` once the request was cancelled
    pub fn checkpoint(&self) -> Result<(), HandlerError> {
        if self.token.is_cancelled() {
            return Err(HandlerError::Cancelled);
        }
        Ok(())
    }

    /// Sleep for `duration`, waking early on cancellation
    ///
    /// # Errors
    ///
    /// Returns `HandlerError::Cancelled` if cancelled before or during the wait
    pub async fn suspend(&self, duration: Duration) -> Result<(), HandlerError> {
        tokio::select! {
            () = tokio::time::sleep(duration) => {}
            () = self.token.cancelled() => {}
        }
        self.checkpoint()
    }

    /// Emit an arbitrary payload on the session stream
    pub async fn emit(&self, payload: Value) -> Arc<Event> {
        self.session.emit(payload).await
    }

    /// Emit a JSON-RPC notification on the session stream
    pub async fn notify(&self, method: &str, params: Value) -> Arc<Event> {
        self.emit(json!({
            "jsonrpc": JSONRPC_VERSION,
            "method": method,
            "params": params,
        }))
        .await
    }

    /// Emit a `notifications/progress` event for this request
    pub async fn progress(
        &self,
        progress: u64,
        total: Option<u64>,
        message: Option<&str>,
    ) -> Arc<Event> {
        let mut params = json!({
            "progressToken": self.progress_token,
            "progress": progress,
        });
        if let Some(total) = total {
            params["total"] = json!(total);
        }
        if let Some(message) = message {
            params["message"] = json!(message);
        }

        self.notify(methods::NOTIFICATION_PROGRESS, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(token: CancellationToken) -> (Arc<Session>, HandlerContext) {
        let session = Arc::new(Session::new("s", 10));
        let ctx = HandlerContext::new(Arc::clone(&session), json!(5), json!("tok"), token);
        (session, ctx)
    }

    #[tokio::test]
    async fn test_suspend_wakes_on_cancel() {
        let token = CancellationToken::new();
        let (_session, ctx) = context(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let started = tokio::time::Instant::now();
        let outcome = ctx.suspend(Duration::from_secs(30)).await;

        assert_eq!(outcome, Err(HandlerError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(5));
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn test_checkpoint_passes_until_cancelled() {
        let token = CancellationToken::new();
        let (_session, ctx) = context(token.clone());

        assert!(ctx.checkpoint().is_ok());
        assert!(ctx.suspend(Duration::from_millis(1)).await.is_ok());

        token.cancel();
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.checkpoint(), Err(HandlerError::Cancelled));
    }

    #[tokio::test]
    async fn test_progress_notification_shape() {
        let (session, ctx) = context(CancellationToken::new());

        let event = ctx.progress(2, Some(4), Some("halfway")).await;

        assert_eq!(event.id(), 1);
        assert_eq!(event.payload()["method"], json!("notifications/progress"));
        assert_eq!(event.payload()["params"]["progressToken"], json!("tok"));
        assert_eq!(event.payload()["params"]["progress"], json!(2));
        assert_eq!(event.payload()["params"]["total"], json!(4));
        assert_eq!(event.payload()["params"]["message"], json!("halfway"));
        assert_eq!(session.last_event_id().await, 1);
    }
}
