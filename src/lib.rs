// ABOUTME: Main library entry point for the resumable MCP server
// ABOUTME: Session-scoped event streaming with replay, live delivery, and cooperative cancellation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Resumable MCP Server
//!
//! A JSON-RPC/MCP server whose responses travel over a session-scoped event
//! stream that survives reconnects.
//!
//! ## Features
//!
//! - **Sessions**: each client is identified by the `Mcp-Session-Id` header
//! - **Replay**: a bounded per-session buffer replays events after `Last-Event-ID`
//! - **Live delivery**: one attached SSE stream per session, replay first then live
//! - **Cancellation**: `notifications/cancelled` interrupts in-flight tool calls
//! - **Expiry**: idle sessions without a stream are swept in the background
//!
//! ## Architecture
//!
//! - **Session**: registry, replay buffer, and the expiry sweeper
//! - **SSE**: attach/replay/live multiplexing and wire framing
//! - **Cancellation**: per-request tokens and exactly-once terminal responses
//! - **Tools**: the handler trait, its context, and the built-in tools
//! - **MCP**: request routing, tool execution, and server lifecycle
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use resumable_mcp_server::config::environment::ServerConfig;
//! use resumable_mcp_server::errors::AppResult;
//! use resumable_mcp_server::mcp::{ServerLifecycle, ServerResources};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     let resources = Arc::new(ServerResources::new(config));
//!
//!     ServerLifecycle::new(resources)
//!         .run(async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await
//! }
//! ```

/// Request cancellation tracking and terminal response emission
pub mod cancellation;

/// Configuration loaded from the environment
pub mod config;

/// Protocol, header, and default constants
pub mod constants;

/// Unified error handling
pub mod errors;

/// JSON-RPC 2.0 message types
pub mod jsonrpc;

/// Structured logging setup
pub mod logging;

/// MCP request processing and server lifecycle
pub mod mcp;

/// HTTP routes
pub mod routes;

/// Sessions, replay buffers, and expiry
pub mod session;

/// Stream multiplexing and SSE framing
pub mod sse;

/// Tool handler trait and built-in tools
pub mod tools;
