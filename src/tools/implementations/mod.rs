// ABOUTME: Built-in tools registered by default
// ABOUTME: An immediate echo tool and a cancellable multi-step tool with progress
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

mod echo;
mod long_running;

pub use echo::EchoTool;
pub use long_running::LongRunningTool;

use serde_json::{json, Value};

/// Wrap text as an MCP tool result
fn text_content(text: impl Into<String>) -> Value {
    json!({
        "content": [{"type": "text", "text": text.into()}],
        "isError": false,
    })
}
