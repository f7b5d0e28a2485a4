// ABOUTME: JSON-RPC 2.0 message types shared by ingress, replies, and stream events
// ABOUTME: Parses ingress payloads and builds terminal success/failure/cancelled messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # JSON-RPC 2.0 Foundation
//!
//! Every payload that crosses the session layer is JSON-RPC shaped: ingress
//! requests and notifications, direct replies, and the events written to a
//! session's replay buffer.
//!
//! ## Usage
//!
//! ```rust
//! use resumable_mcp_server::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
//! # use serde_json::json;
//!
//! let request = JsonRpcRequest::parse(br#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#).unwrap();
//! assert!(!request.is_notification());
//!
//! let response = JsonRpcResponse::success(request.id.clone(), json!({}));
//! assert!(response.is_success());
//! ```

use crate::constants::{error_codes, failure_kinds, protocol::JSONRPC_VERSION};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// JSON-RPC 2.0 Request or notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Method name to invoke
    pub method: String,

    /// Optional parameters for the method
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub params: Option<Value>,

    /// Request identifier; absent for notifications
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 Response
///
/// Exactly one of `result` or `error` must be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Result of the method call (mutually exclusive with error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error information (mutually exclusive with result)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,

    /// Request identifier for correlation
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 Error Object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,

    /// Human-readable error message
    pub message: String,

    /// Additional error information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcRequest {
    /// Create a new request with a specific ID
    #[must_use]
    pub fn with_id(method: impl Into<String>, params: Option<Value>, id: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            method: method.into(),
            params,
            id: Some(id),
        }
    }

    /// Create a notification (no ID, no response expected)
    #[must_use]
    pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            method: method.into(),
            params,
            id: None,
        }
    }

    /// Parse and validate an ingress payload
    ///
    /// # Errors
    ///
    /// Returns a parse error (`-32700`) for invalid JSON and an invalid-request
    /// error (`-32600`) when the JSON is not a JSON-RPC 2.0 request/notification.
    pub fn parse(body: &[u8]) -> Result<Self, JsonRpcError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| JsonRpcError::new(error_codes::PARSE_ERROR, format!("Parse error: {e}")))?;

        // serde folds an explicit `"id": null` into `None`; it must not read as a notification
        if value.get("id").is_some_and(Value::is_null) {
            return Err(JsonRpcError::new(
                error_codes::INVALID_REQUEST,
                "Request id must be a string or number, got null",
            ));
        }

        let request: Self = serde_json::from_value(value).map_err(|e| {
            JsonRpcError::new(
                error_codes::INVALID_REQUEST,
                format!("Invalid Request: {e}"),
            )
        })?;

        request.validate()?;
        Ok(request)
    }

    fn validate(&self) -> Result<(), JsonRpcError> {
        if self.jsonrpc != JSONRPC_VERSION {
            return Err(JsonRpcError::new(
                error_codes::INVALID_REQUEST,
                format!(
                    "Invalid JSON-RPC version: got '{}', expected '{JSONRPC_VERSION}'",
                    self.jsonrpc
                ),
            ));
        }

        if self.method.is_empty() {
            return Err(JsonRpcError::new(
                error_codes::INVALID_REQUEST,
                "Missing method",
            ));
        }

        match &self.id {
            None | Some(Value::String(_) | Value::Number(_)) => {}
            Some(other) => {
                return Err(JsonRpcError::new(
                    error_codes::INVALID_REQUEST,
                    format!("Request id must be a string or number, got {other}"),
                ));
            }
        }

        if let Some(params) = &self.params {
            if !params.is_object() && !params.is_array() {
                return Err(JsonRpcError::new(
                    error_codes::INVALID_REQUEST,
                    "params must be an object or array",
                ));
            }
        }

        Ok(())
    }

    /// A message without an id expects no reply
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Look up a named parameter
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.as_ref().and_then(|params| params.get(name))
    }
}

impl JsonRpcResponse {
    /// Create a success response
    #[must_use]
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response
    #[must_use]
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self::from_error(id, JsonRpcError::new(code, message))
    }

    /// Create an error response with additional data
    #[must_use]
    pub fn error_with_data(
        id: Option<Value>,
        code: i32,
        message: impl Into<String>,
        data: Value,
    ) -> Self {
        Self::from_error(id, JsonRpcError::with_data(code, message, data))
    }

    /// Wrap an existing error object
    #[must_use]
    pub fn from_error(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            result: None,
            error: Some(error),
            id,
        }
    }

    /// Terminal message for a request that was cancelled before completing
    #[must_use]
    pub fn cancelled(id: Value, reason: Option<&str>) -> Self {
        Self::error_with_data(
            Some(id),
            error_codes::OPERATION_CANCELLED,
            "Request cancelled",
            json!({
                "kind": failure_kinds::CANCELLED,
                "reason": reason,
            }),
        )
    }

    /// Terminal message for a request whose handler failed
    #[must_use]
    pub fn handler_failure(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self::error_with_data(
            Some(id),
            code,
            message,
            json!({ "kind": failure_kinds::HANDLER_FAILURE }),
        )
    }

    /// Check if this is a success response
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none() && self.result.is_some()
    }

    /// Check if this is an error response
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Convert into a JSON value suitable for an event payload
    #[must_use]
    pub fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            json!({
                "jsonrpc": JSONRPC_VERSION,
                "id": null,
                "error": {"code": error_codes::INTERNAL_ERROR, "message": e.to_string()},
            })
        })
    }
}

impl JsonRpcError {
    /// Create a new error
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create an error with data
    #[must_use]
    pub fn with_data(code: i32, message: impl Into<String>, data: Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }
}

/// Stable text key for a JSON-RPC id, used to correlate cancellations
///
/// Integral numbers share one key whatever their spelling, so `1` and `1.0`
/// correlate.
#[must_use]
pub fn request_key(id: &Value) -> String {
    match id {
        Value::String(s) => format!("s:{s}"),
        Value::Number(n) => n
            .as_i64()
            .map(|i| i.to_string())
            .or_else(|| n.as_u64().map(|u| u.to_string()))
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract().abs() < f64::EPSILON && f.abs() < 9.0e15)
                    .map(|f| (f as i64).to_string())
            })
            .map_or_else(|| format!("n:{n}"), |integral| format!("n:{integral}")),
        other => format!("n:{other}"),
    }
}
