// ABOUTME: Multi-step tool that waits between steps and reports progress after each one
// ABOUTME: Suspends cooperatively so notifications/cancelled stops it between steps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::text_content;
use crate::tools::{HandlerContext, HandlerError, ToolHandler};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const DEFAULT_STEPS: u64 = 3;
const MAX_STEPS: u64 = 100;
const DEFAULT_INTERVAL_MS: u64 = 1_000;
const MAX_INTERVAL_MS: u64 = 60_000;

/// Runs `steps` steps of `interval_ms` each, emitting progress per step
pub struct LongRunningTool;

impl LongRunningTool {
    fn bounded_arg(arguments: &Value, name: &str, default: u64, max: u64) -> Result<u64, HandlerError> {
        match arguments.get(name) {
            None | Some(Value::Null) => Ok(default),
            Some(value) => value
                .as_u64()
                .map(|n| n.min(max))
                .ok_or_else(|| {
                    HandlerError::invalid_arguments(format!("'{name}' must be a non-negative integer"))
                }),
        }
    }
}

#[async_trait]
impl ToolHandler for LongRunningTool {
    fn name(&self) -> &'static str {
        "long_running"
    }

    fn description(&self) -> &'static str {
        "Simulate a long-running operation with progress notifications"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "steps": {
                    "type": "integer",
                    "minimum": 0,
                    "maximum": MAX_STEPS,
                    "default": DEFAULT_STEPS
                },
                "interval_ms": {
                    "type": "integer",
                    "minimum": 0,
                    "maximum": MAX_INTERVAL_MS,
                    "default": DEFAULT_INTERVAL_MS
                }
            }
        })
    }

    async fn call(&self, ctx: &HandlerContext, arguments: Value) -> Result<Value, HandlerError> {
        let steps = Self::bounded_arg(&arguments, "steps", DEFAULT_STEPS, MAX_STEPS)?;
        let interval = Duration::from_millis(Self::bounded_arg(
            &arguments,
            "interval_ms",
            DEFAULT_INTERVAL_MS,
            MAX_INTERVAL_MS,
        )?);

        for step in 1..=steps {
            ctx.suspend(interval).await?;
            let message = format!("step {step} of {steps}");
            ctx.progress(step, Some(steps), Some(&message)).await;
            debug!(session.id = %ctx.session_id(), request.id = %ctx.request_id(), step, "Long-running step done");
        }

        Ok(text_content(format!("completed {steps} steps")))
    }
}
