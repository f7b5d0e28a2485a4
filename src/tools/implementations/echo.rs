// ABOUTME: Echo tool that returns its message argument immediately
// ABOUTME: Used for round-trip checks of tools/call without any waiting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::text_content;
use crate::tools::{HandlerContext, HandlerError, ToolHandler};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Returns `arguments.message` unchanged
pub struct EchoTool;

#[async_trait]
impl ToolHandler for EchoTool {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn description(&self) -> &'static str {
        "Echo a message back to the caller"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "message": {"type": "string", "description": "Text to echo"}
            },
            "required": ["message"]
        })
    }

    async fn call(&self, ctx: &HandlerContext, arguments: Value) -> Result<Value, HandlerError> {
        ctx.checkpoint()?;

        let message = arguments
            .get("message")
            .and_then(Value::as_str)
            .ok_or_else(|| HandlerError::invalid_arguments("'message' must be a string"))?;

        Ok(text_content(message))
    }
}
