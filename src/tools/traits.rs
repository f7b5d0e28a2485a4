// ABOUTME: Defines the ToolHandler trait implemented by every callable tool
// ABOUTME: Handlers run on spawned tasks and report a result or a HandlerError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Tool Handler Trait
//!
//! The session layer treats tool business logic as an external collaborator.
//! A tool only needs to describe itself for `tools/list` and implement `call`.
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use resumable_mcp_server::tools::{HandlerContext, HandlerError, ToolHandler};
//! use serde_json::{json, Value};
//!
//! struct Clock;
//!
//! #[async_trait]
//! impl ToolHandler for Clock {
//!     fn name(&self) -> &'static str {
//!         "clock"
//!     }
//!
//!     fn description(&self) -> &'static str {
//!         "Returns the current time"
//!     }
//!
//!     fn input_schema(&self) -> Value {
//!         json!({"type": "object"})
//!     }
//!
//!     async fn call(&self, ctx: &HandlerContext, _args: Value) -> Result<Value, HandlerError> {
//!         ctx.checkpoint()?;
//!         Ok(json!({"now": chrono::Utc::now().to_rfc3339()}))
//!     }
//! }
//! ```

use super::context::HandlerContext;
use super::errors::HandlerError;
use async_trait::async_trait;
use serde_json::{json, Value};

/// A tool callable through `tools/call`
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Unique tool name used for lookup and `tools/call`
    fn name(&self) -> &'static str;

    /// Human-readable description for `tools/list`
    fn description(&self) -> &'static str;

    /// JSON Schema for the `arguments` object
    fn input_schema(&self) -> Value;

    /// Run the tool
    ///
    /// Long-running handlers should call `ctx.checkpoint()` or
    /// `ctx.suspend(..)` regularly so cancellation can take effect.
    ///
    /// # Errors
    ///
    /// Returns a `HandlerError` describing why no result was produced
    async fn call(&self, ctx: &HandlerContext, arguments: Value) -> Result<Value, HandlerError>;

    /// Descriptor advertised by `tools/list`
    fn descriptor(&self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "inputSchema": self.input_schema(),
        })
    }
}
