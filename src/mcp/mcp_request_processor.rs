// ABOUTME: MCP request processing and protocol method routing for one session
// ABOUTME: Replies directly to cheap methods and schedules tools/call as background work
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::resources::ServerResources;
use super::tool_executor::spawn_tool_call;
use crate::constants::{error_codes, methods, protocol};
use crate::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
use crate::session::Session;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// What the HTTP layer should answer
#[derive(Debug)]
pub enum McpReply {
    /// Direct JSON-RPC response in the POST body
    Response(JsonRpcResponse),
    /// `202 Accepted` with no body; any result arrives on the stream
    Accepted,
}

/// Processes MCP protocol messages for a resolved session
pub struct McpRequestProcessor {
    resources: Arc<ServerResources>,
}

impl McpRequestProcessor {
    /// Create a new MCP request processor
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Handle one parsed message on `session`
    pub async fn handle_request(&self, session: &Arc<Session>, request: JsonRpcRequest) -> McpReply {
        session.touch().await;

        let Some(id) = request.id.clone() else {
            self.handle_notification(session, &request).await;
            return McpReply::Accepted;
        };

        debug!(session.id = %session.id(), request.id = %id, method = %request.method, "Handling request");

        match request.method.as_str() {
            methods::INITIALIZE => McpReply::Response(Self::handle_initialize(id)),
            methods::PING => McpReply::Response(Self::handle_ping(id)),
            methods::TOOLS_LIST => McpReply::Response(self.handle_tools_list(id)),
            methods::TOOLS_CALL => self.handle_tools_call(session, id, &request).await,
            other => McpReply::Response(Self::handle_unknown_method(id, other)),
        }
    }

    /// Handle MCP initialize request
    fn handle_initialize(id: Value) -> JsonRpcResponse {
        JsonRpcResponse::success(
            Some(id),
            json!({
                "protocolVersion": protocol::MCP_PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {"listChanged": false}
                },
                "serverInfo": {
                    "name": protocol::SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    /// Liveness probe: answered inline, never written to the stream
    fn handle_ping(id: Value) -> JsonRpcResponse {
        JsonRpcResponse::success(Some(id), json!({}))
    }

    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        JsonRpcResponse::success(Some(id), json!({ "tools": self.resources.tools.list() }))
    }

    /// Schedule a tool; its terminal response is delivered as a stream event
    async fn handle_tools_call(
        &self,
        session: &Arc<Session>,
        id: Value,
        request: &JsonRpcRequest,
    ) -> McpReply {
        let Some(name) = request.param("name").and_then(Value::as_str) else {
            return McpReply::Response(JsonRpcResponse::error(
                Some(id),
                error_codes::INVALID_PARAMS,
                "Missing tool name",
            ));
        };

        let Some(tool) = self.resources.tools.get(name) else {
            return McpReply::Response(JsonRpcResponse::error(
                Some(id),
                error_codes::INVALID_PARAMS,
                format!("Unknown tool: {name}"),
            ));
        };

        let arguments = request
            .param("arguments")
            .cloned()
            .unwrap_or_else(|| json!({}));
        let progress_token = request
            .params
            .as_ref()
            .and_then(|params| params.pointer("/_meta/progressToken"))
            .cloned()
            .unwrap_or_else(|| id.clone());

        let pending = match self.resources.cancellation.begin(session, &id).await {
            Ok(pending) => pending,
            Err(e) => {
                warn!(session.id = %session.id(), request.id = %id, "Duplicate in-flight request id");
                return McpReply::Response(JsonRpcResponse::error(
                    Some(id),
                    error_codes::INVALID_REQUEST,
                    e.message,
                ));
            }
        };

        debug!(session.id = %session.id(), request.id = %id, tool = name, "Tool call scheduled");
        spawn_tool_call(
            self.resources.cancellation,
            tool,
            pending,
            arguments,
            progress_token,
        );

        McpReply::Accepted
    }

    fn handle_unknown_method(id: Value, method: &str) -> JsonRpcResponse {
        debug!(method, "Unknown method");
        JsonRpcResponse::error(
            Some(id),
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {method}"),
        )
    }

    async fn handle_notification(&self, session: &Session, request: &JsonRpcRequest) {
        match request.method.as_str() {
            methods::NOTIFICATION_CANCELLED => self.handle_cancelled_notification(session, request).await,
            methods::NOTIFICATION_INITIALIZED => {
                debug!(session.id = %session.id(), "Client initialized");
            }
            other => debug!(session.id = %session.id(), method = other, "Ignoring notification"),
        }
    }

    async fn handle_cancelled_notification(&self, session: &Session, request: &JsonRpcRequest) {
        let Some(request_id) = request.param("requestId") else {
            warn!(session.id = %session.id(), "Cancelled notification missing requestId");
            return;
        };
        let reason = request
            .param("reason")
            .and_then(Value::as_str)
            .map(str::to_owned);

        self.resources
            .cancellation
            .cancel(session, request_id, reason)
            .await;
    }
}
