// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Protocol strings, header names, JSON-RPC error codes, and configuration defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.

/// JSON-RPC and MCP protocol constants
pub mod protocol {
    /// JSON-RPC version string
    pub const JSONRPC_VERSION: &str = "2.0";

    /// MCP protocol version advertised by `initialize`
    pub const MCP_PROTOCOL_VERSION: &str = "2025-06-18";

    /// Server name advertised by `initialize`
    pub const SERVER_NAME: &str = "resumable-mcp-server";
}

/// Method names routed by the request processor
pub mod methods {
    /// Handshake
    pub const INITIALIZE: &str = "initialize";
    /// Liveness probe
    pub const PING: &str = "ping";
    /// Tool discovery
    pub const TOOLS_LIST: &str = "tools/list";
    /// Long-running tool invocation
    pub const TOOLS_CALL: &str = "tools/call";
    /// Client acknowledgement after `initialize`
    pub const NOTIFICATION_INITIALIZED: &str = "notifications/initialized";
    /// Cancel an in-flight request
    pub const NOTIFICATION_CANCELLED: &str = "notifications/cancelled";
    /// Progress update emitted by a running handler
    pub const NOTIFICATION_PROGRESS: &str = "notifications/progress";
    /// Prefix shared by all notifications
    pub const NOTIFICATION_PREFIX: &str = "notifications/";
}

/// HTTP header names
pub mod headers {
    /// Session identifier echoed by the client on every call
    pub const MCP_SESSION_ID: &str = "mcp-session-id";
    /// SSE resume cursor
    pub const LAST_EVENT_ID: &str = "last-event-id";
}

/// HTTP routes
pub mod routes {
    /// Single MCP endpoint (POST ingress, GET stream, DELETE close)
    pub const MCP: &str = "/mcp";
    /// Health endpoint
    pub const HEALTH: &str = "/health";
}

/// JSON-RPC error codes
pub mod error_codes {
    /// Parse error - Invalid JSON
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid Request - Invalid JSON-RPC
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error
    pub const INTERNAL_ERROR: i32 = -32603;
    /// Server error - tool execution failed
    pub const TOOL_EXECUTION: i32 = -32000;
    /// Server error - operation cancelled
    pub const OPERATION_CANCELLED: i32 = -32006;
}

/// Terminal failure kinds carried in `error.data.kind`
pub mod failure_kinds {
    /// The request was cancelled before completing
    pub const CANCELLED: &str = "cancelled";
    /// The handler returned or raised an error
    pub const HANDLER_FAILURE: &str = "handler_failure";
}

/// SSE framing constants
pub mod sse {
    /// Comment text used for keepalive frames
    pub const KEEPALIVE_COMMENT: &str = "keepalive";
}

/// Configuration defaults
pub mod defaults {
    /// Default bind host
    pub const HTTP_HOST: &str = "127.0.0.1";
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 8081;
    /// Events retained per session for replay
    pub const REPLAY_CAPACITY: usize = 10;
    /// Inactivity after which a session is swept
    pub const SESSION_TIMEOUT_SECS: u64 = 180;
    /// Period of the expiry sweep
    pub const SWEEP_INTERVAL_SECS: u64 = 60;
    /// Idle time before a keepalive frame is written
    pub const KEEPALIVE_INTERVAL_SECS: u64 = 15;
    /// Bounded live queue size per attached stream
    pub const LIVE_QUEUE_CAPACITY: usize = 256;
}

/// Service names for structured logging
pub mod service_names {
    /// Main server service name
    pub const RESUMABLE_MCP_SERVER: &str = "resumable-mcp-server";
}
