// ABOUTME: Route module organization for the resumable MCP server HTTP endpoints
// ABOUTME: Each domain module exposes a Routes type building an axum Router over shared resources
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module
//!
//! Route definitions and thin handlers that delegate to the session layer and
//! the request processor.

/// Health check and system status routes
pub mod health;
/// Model Context Protocol (MCP) endpoint routes
pub mod mcp;

pub use health::HealthRoutes;
pub use mcp::McpRoutes;
