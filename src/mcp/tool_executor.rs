// ABOUTME: Runs a tool handler on its own task and always retires the request afterwards
// ABOUTME: Panics and aborts become handler failures instead of tearing down the session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::cancellation::{CancellationTracker, PendingRequest};
use crate::session::Event;
use crate::tools::{HandlerContext, HandlerError, ToolHandler};
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, warn};

/// Spawn `tool` for a registered request
///
/// The returned handle resolves to the terminal event once it was emitted.
pub fn spawn_tool_call(
    tracker: CancellationTracker,
    tool: Arc<dyn ToolHandler>,
    pending: PendingRequest,
    arguments: Value,
    progress_token: Value,
) -> JoinHandle<Arc<Event>> {
    let ctx = HandlerContext::new(
        Arc::clone(pending.session()),
        pending.request_id().clone(),
        progress_token,
        pending.token().clone(),
    );
    let tool_name = tool.name();

    tokio::spawn(async move {
        let handler = tokio::spawn(async move { tool.call(&ctx, arguments).await });

        let outcome = match handler.await {
            Ok(outcome) => outcome,
            Err(join_error) if join_error.is_panic() => {
                error!(
                    session.id = %pending.session().id(),
                    request.id = %pending.request_id(),
                    tool = tool_name,
                    "Tool handler panicked"
                );
                Err(HandlerError::failed(format!("tool '{tool_name}' panicked")))
            }
            Err(join_error) => {
                warn!(
                    session.id = %pending.session().id(),
                    request.id = %pending.request_id(),
                    tool = tool_name,
                    error = %join_error,
                    "Tool handler task aborted"
                );
                Err(HandlerError::failed(format!("tool '{tool_name}' was aborted")))
            }
        };

        tracker.finish(pending, outcome).await
    })
}
