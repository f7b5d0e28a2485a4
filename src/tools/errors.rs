// ABOUTME: Outcome errors a tool handler can finish with
// ABOUTME: Mapped onto terminal JSON-RPC error events by the cancellation tracker
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::error_codes;
use thiserror::Error;

/// Why a handler did not produce a result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The handler observed its cancellation token and unwound
    #[error("request cancelled")]
    Cancelled,
    /// Arguments did not match the tool's input schema
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// The handler failed (including panics caught by the executor)
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    /// Convenience constructor for failures
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Convenience constructor for argument errors
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }

    /// JSON-RPC error code for the terminal event
    #[must_use]
    pub const fn json_rpc_code(&self) -> i32 {
        match self {
            Self::Cancelled => error_codes::OPERATION_CANCELLED,
            Self::InvalidArguments(_) => error_codes::INVALID_PARAMS,
            Self::Failed(_) => error_codes::TOOL_EXECUTION,
        }
    }
}
