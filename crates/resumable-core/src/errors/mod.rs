// ABOUTME: Unified error taxonomy for session, stream, and protocol failures
// ABOUTME: Maps error codes to HTTP statuses and JSON error response bodies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Standard error codes, a single `AppError` type, and the JSON body returned
//! to HTTP callers. Errors local to one request (handler failure, cancellation)
//! are not represented here: they travel as terminal events on the session
//! stream. `AppError` covers transport-level rejections only.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    #[serde(rename = "MISSING_REQUIRED_FIELD")]
    MissingRequiredField = 3001,
    #[serde(rename = "MALFORMED_MESSAGE")]
    MalformedMessage = 3002,

    // Session & stream state (4000-4999)
    #[serde(rename = "SESSION_NOT_FOUND")]
    SessionNotFound = 4000,
    #[serde(rename = "STREAM_ALREADY_ATTACHED")]
    StreamAlreadyAttached = 4001,
    #[serde(rename = "REQUEST_ALREADY_PENDING")]
    RequestAlreadyPending = 4002,
    #[serde(rename = "REPLAY_GAP_UNRECOVERABLE")]
    ReplayGapUnrecoverable = 4003,

    // Configuration (6000-6999)
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6001,

    // Internal Errors (9000-9999)
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9001,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput | Self::MissingRequiredField | Self::MalformedMessage => 400,
            Self::SessionNotFound => 404,
            Self::StreamAlreadyAttached | Self::RequestAlreadyPending => 409,
            Self::ReplayGapUnrecoverable => 410,
            Self::ConfigError
            | Self::ConfigInvalid
            | Self::InternalError
            | Self::SerializationError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing from the request",
            Self::MalformedMessage => "The message could not be parsed as JSON-RPC 2.0",
            Self::SessionNotFound => "The session does not exist or has expired",
            Self::StreamAlreadyAttached => "A stream is already attached to this session",
            Self::RequestAlreadyPending => "A request with this id is already in flight",
            Self::ReplayGapUnrecoverable => {
                "Events after the resume cursor were evicted and cannot be replayed"
            }
            Self::ConfigError => "Configuration error encountered",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal server error occurred",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }
}

/// Additional context that can be attached to errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Session the error relates to, if any
    pub session_id: Option<String>,
    /// JSON-RPC request id, rendered as text
    pub request_id: Option<String>,
    /// Additional key-value context
    pub details: serde_json::Value,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            session_id: None,
            request_id: None,
            details: serde_json::Value::Null,
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    pub context: ErrorContext,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add a session ID to the error context
    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.context.session_id = Some(session_id.into());
        self
    }

    /// Add a request ID to the error context
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.context.request_id = Some(request_id.into());
        self
    }

    /// Add details to the error context
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.context.details = details;
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorResponseDetails,
}

/// Body of an [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Machine-readable code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Session the error relates to
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub session_id: Option<String>,
    /// Extra structured detail
    #[serde(skip_serializing_if = "serde_json::Value::is_null", default)]
    pub details: serde_json::Value,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message: error.message,
                session_id: error.context.session_id,
                details: error.context.details,
            },
        }
    }
}

/// Convenience functions for creating common errors
impl AppError {
    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Required field or header missing
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("Missing required field: {}", field.into()),
        )
    }

    /// Unparseable or schema-invalid ingress payload
    pub fn malformed_message(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedMessage, message)
    }

    /// Unknown or expired session
    pub fn session_not_found(session_id: impl Into<String>) -> Self {
        let session_id = session_id.into();
        Self::new(
            ErrorCode::SessionNotFound,
            format!("Session {session_id} not found"),
        )
        .with_session_id(session_id)
    }

    /// Second stream attach rejected by policy
    pub fn stream_already_attached(session_id: impl Into<String>) -> Self {
        let session_id = session_id.into();
        Self::new(
            ErrorCode::StreamAlreadyAttached,
            format!("Session {session_id} already has a live stream"),
        )
        .with_session_id(session_id)
    }

    /// Duplicate in-flight request id
    pub fn request_already_pending(request_id: impl Into<String>) -> Self {
        let request_id = request_id.into();
        Self::new(
            ErrorCode::RequestAlreadyPending,
            format!("Request {request_id} is already in flight"),
        )
        .with_request_id(request_id)
    }

    /// Resume cursor predates the oldest retained event
    pub fn replay_gap(cursor: u64, oldest_retained: Option<u64>) -> Self {
        Self::new(
            ErrorCode::ReplayGapUnrecoverable,
            format!("Cannot resume after event {cursor}"),
        )
        .with_details(serde_json::json!({
            "last_event_id": cursor,
            "oldest_retained_id": oldest_retained,
        }))
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, error.to_string()).with_source(error)
    }
}

#[cfg(feature = "http-response")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = http::StatusCode::from_u16(self.http_status())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error.code = ?self.code, "{}", self);
        } else {
            tracing::debug!(error.code = ?self.code, "{}", self);
        }

        (status, axum::Json(ErrorResponse::from(self))).into_response()
    }
}
