// ABOUTME: Model Context Protocol (MCP) server over the resumable session layer
// ABOUTME: Request routing, tool execution, shared resources, and server lifecycle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Method routing for parsed JSON-RPC messages
pub mod mcp_request_processor;
/// Dependency injection container
pub mod resources;
/// Bind, serve and shutdown
pub mod server_lifecycle;
/// Background tool execution
pub mod tool_executor;

pub use mcp_request_processor::{McpReply, McpRequestProcessor};
pub use resources::ServerResources;
pub use server_lifecycle::ServerLifecycle;
