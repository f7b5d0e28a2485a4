// ABOUTME: Correlates in-flight requests with cancellation notifications on the same session
// ABOUTME: Decides the single terminal event of each request under the session lock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Cancellation Tracker
//!
//! Each long-running request is registered with [`CancellationTracker::begin`]
//! and gets a `CancellationToken`. A later `notifications/cancelled` calls
//! [`CancellationTracker::cancel`], which signals the token only if the entry is
//! still pending. [`CancellationTracker::finish`] removes the entry and emits the
//! terminal event in one critical section:
//!
//! - cancel after finish finds nothing and is a silent no-op
//! - cancel before finish always yields exactly one `cancelled` event, even if
//!   the handler had already produced a result

use crate::errors::{AppError, AppResult};
use crate::jsonrpc::{request_key, JsonRpcResponse};
use crate::session::{Event, PendingEntry, Session};
use crate::tools::HandlerError;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Handle for one registered in-flight request
#[derive(Debug)]
pub struct PendingRequest {
    session: Arc<Session>,
    request_id: Value,
    key: String,
    token: CancellationToken,
}

impl PendingRequest {
    /// JSON-RPC id of the request
    #[must_use]
    pub const fn request_id(&self) -> &Value {
        &self.request_id
    }

    /// Owning session
    #[must_use]
    pub const fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Token observed by the handler
    #[must_use]
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Stateless coordinator; all state lives in the session
#[derive(Debug, Default, Clone, Copy)]
pub struct CancellationTracker;

impl CancellationTracker {
    /// Create a tracker
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Register a request as in flight
    ///
    /// # Errors
    ///
    /// Returns `RequestAlreadyPending` if the same id is still in flight on this session
    pub async fn begin(&self, session: &Arc<Session>, request_id: &Value) -> AppResult<PendingRequest> {
        let key = request_key(request_id);
        let token = CancellationToken::new();

        let mut state = session.lock().await;
        if state.pending.contains_key(&key) {
            return Err(AppError::request_already_pending(request_id.to_string())
                .with_session_id(session.id()));
        }
        state.pending.insert(
            key.clone(),
            PendingEntry {
                token: token.clone(),
                reason: None,
            },
        );
        state.touch();
        drop(state);

        debug!(session.id = %session.id(), request.id = %request_id, "Request registered");

        Ok(PendingRequest {
            session: Arc::clone(session),
            request_id: request_id.clone(),
            key,
            token,
        })
    }

    /// Signal cancellation of a pending request
    ///
    /// Returns `false` when no such request is pending (unknown or already finished).
    pub async fn cancel(&self, session: &Session, request_id: &Value, reason: Option<String>) -> bool {
        let key = request_key(request_id);
        let mut state = session.lock().await;
        state.touch();

        let Some(entry) = state.pending.get_mut(&key) else {
            debug!(session.id = %session.id(), request.id = %request_id, "Cancellation for unknown request ignored");
            return false;
        };

        if entry.reason.is_none() {
            entry.reason = reason;
        }
        entry.token.cancel();

        info!(session.id = %session.id(), request.id = %request_id, "Request cancelled");
        true
    }

    /// Retire a request and emit its terminal event
    pub async fn finish(
        &self,
        pending: PendingRequest,
        outcome: Result<Value, HandlerError>,
    ) -> Arc<Event> {
        let PendingRequest {
            session,
            request_id,
            key,
            token,
        } = pending;

        let mut state = session.lock().await;
        let reason = state.pending.remove(&key).and_then(|entry| entry.reason);

        let response = match outcome {
            Err(HandlerError::Cancelled) => JsonRpcResponse::cancelled(request_id, reason.as_deref()),
            _ if token.is_cancelled() => JsonRpcResponse::cancelled(request_id, reason.as_deref()),
            Ok(result) => JsonRpcResponse::success(Some(request_id), result),
            Err(error) => {
                JsonRpcResponse::handler_failure(request_id, error.json_rpc_code(), error.to_string())
            }
        };
        let is_success = response.is_success();

        let event = state.emit(session.id(), response.into_value());
        drop(state);

        debug!(
            session.id = %session.id(),
            event.id = event.id(),
            success = is_success,
            "Request finished"
        );
        event
    }
}
