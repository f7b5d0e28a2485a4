// ABOUTME: MCP HTTP endpoint: JSON-RPC ingress, SSE egress with resume, explicit session close
// ABOUTME: Resolves the session from the Mcp-Session-Id header and echoes it on every response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! MCP routes
//!
//! A single path carries the whole protocol:
//!
//! - `POST /mcp` accepts one JSON-RPC message. Cheap methods are answered in the
//!   body, notifications and `tools/call` return `202 Accepted`.
//! - `GET /mcp` opens the session's event stream, replaying after `Last-Event-ID`.
//! - `DELETE /mcp` closes the session.

use crate::{
    constants::{headers, routes},
    errors::{AppError, AppResult},
    jsonrpc::{JsonRpcRequest, JsonRpcResponse},
    mcp::{McpReply, McpRequestProcessor, ServerResources},
    session::Session,
};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{sse::Sse, IntoResponse, Response},
    routing::post,
    Json, Router,
};
use futures_util::StreamExt;
use std::{convert::Infallible, sync::Arc};
use tracing::{debug, info};

/// MCP routes implementation
pub struct McpRoutes;

impl McpRoutes {
    /// Create the `/mcp` routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                routes::MCP,
                post(Self::handle_post)
                    .get(Self::handle_stream)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Ingress: parse first, then resolve the session, then dispatch
    async fn handle_post(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let request = match JsonRpcRequest::parse(&body) {
            Ok(request) => request,
            Err(error) => {
                debug!(code = error.code, "Rejected malformed message");
                let body = JsonRpcResponse::from_error(None, error);
                return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
            }
        };

        let session = resolve_ingress_session(&resources, session_header(&headers))?;
        let processor = McpRequestProcessor::new(Arc::clone(&resources));

        let response = match processor.handle_request(&session, request).await {
            McpReply::Response(reply) => (StatusCode::OK, Json(reply)).into_response(),
            McpReply::Accepted => StatusCode::ACCEPTED.into_response(),
        };

        Ok(with_session_header(response, session.id()))
    }

    /// Egress: attach a live stream, replaying after the client's cursor
    async fn handle_stream(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let session_id =
            session_header(&headers).ok_or_else(|| AppError::missing_field(headers::MCP_SESSION_ID))?;
        let session = resources.sessions.get(session_id)?;
        let cursor = last_event_id(&headers)?;

        let live = resources.multiplexer.attach(&session, cursor).await?;
        debug!(session.id = %session.id(), cursor = ?cursor, "Serving event stream");

        let frames = live
            .into_stream()
            .map(|frame| Ok::<_, Infallible>(frame.into_sse_event()));

        // Keepalive comments are produced by the stream, not by axum.
        Ok(with_session_header(Sse::new(frames).into_response(), session.id()))
    }

    /// Explicit close: cancels pending requests and ends the stream
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let session_id =
            session_header(&headers).ok_or_else(|| AppError::missing_field(headers::MCP_SESSION_ID))?;

        if resources.sessions.remove(session_id).await.is_none() {
            return Err(AppError::session_not_found(session_id));
        }

        info!(session.id = %session_id, "Session closed by client");
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

fn session_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(headers::MCP_SESSION_ID)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Parse the SSE resume cursor; absent means "no replay"
fn last_event_id(headers: &HeaderMap) -> AppResult<Option<u64>> {
    let Some(raw) = headers.get(headers::LAST_EVENT_ID) else {
        return Ok(None);
    };

    raw.to_str()
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Some)
        .ok_or_else(|| AppError::malformed_message("Last-Event-ID must be a non-negative integer"))
}

fn resolve_ingress_session(
    resources: &ServerResources,
    requested: Option<&str>,
) -> AppResult<Arc<Session>> {
    if resources.config.session.strict_sessions {
        if let Some(id) = requested {
            return resources.sessions.get(id);
        }
        return Ok(resources.sessions.create());
    }

    Ok(resources.sessions.get_or_create(requested))
}

fn with_session_header(mut response: Response, session_id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(session_id) {
        response.headers_mut().insert(headers::MCP_SESSION_ID, value);
    }
    response
}
