// ABOUTME: Pluggable tool architecture: handler trait, execution context, and registry
// ABOUTME: Tools are external collaborators; the session layer only schedules and observes them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Tools
//!
//! - [`ToolHandler`]: the trait every tool implements
//! - [`HandlerContext`]: cancellation checkpoints plus event and progress emission
//! - [`ToolRegistry`]: name to handler dispatch table built at startup
//! - [`implementations`]: built-in `echo` and `long_running` tools

/// Per-invocation handler context
pub mod context;
/// Handler outcome errors
pub mod errors;
/// Built-in tools
pub mod implementations;
/// Name to handler dispatch table
pub mod registry;
/// Tool handler trait
pub mod traits;

pub use context::HandlerContext;
pub use errors::HandlerError;
pub use registry::ToolRegistry;
pub use traits::ToolHandler;
