// ABOUTME: Centralized resource container for dependency injection in the MCP server
// ABOUTME: Owns the session registry, stream multiplexer, cancellation tracker and tool registry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server Resources
//!
//! Created once at startup and shared with every axum handler through `State`.
//! There is no process-global state: tests build their own `ServerResources`.

use crate::cancellation::CancellationTracker;
use crate::config::ServerConfig;
use crate::session::SessionRegistry;
use crate::sse::{StreamConfig, StreamMultiplexer};
use crate::tools::ToolRegistry;
use std::sync::Arc;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Live sessions
    pub sessions: Arc<SessionRegistry>,
    /// Stream attach/replay
    pub multiplexer: Arc<StreamMultiplexer>,
    /// In-flight request correlation
    pub cancellation: CancellationTracker,
    /// Tool dispatch table
    pub tools: Arc<ToolRegistry>,
}

impl ServerResources {
    /// Build resources with the built-in tools registered
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self::with_tools(config, ToolRegistry::with_builtin_tools())
    }

    /// Build resources with a caller-supplied tool registry
    #[must_use]
    pub fn with_tools(config: ServerConfig, tools: ToolRegistry) -> Self {
        let sessions = Arc::new(SessionRegistry::new(config.session.replay_capacity));
        let multiplexer = Arc::new(StreamMultiplexer::new(StreamConfig::from(&config.session)));

        Self {
            config: Arc::new(config),
            sessions,
            multiplexer,
            cancellation: CancellationTracker::new(),
            tools: Arc::new(tools),
        }
    }
}
