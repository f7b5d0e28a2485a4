// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Groups environment loading and session/stream tuning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! - **Environment**: bind address and top-level server configuration
//! - **Session**: replay capacity, expiry, keepalive, attach and replay policies

/// Environment and server configuration
pub mod environment;
/// Session and stream tuning
pub mod session;

pub use environment::ServerConfig;
pub use session::{AttachPolicy, ReplayPolicy, SessionConfig};
