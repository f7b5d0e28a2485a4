// ABOUTME: Core types and constants for the resumable MCP session server
// ABOUTME: Foundation crate with error handling and protocol constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Resumable Core
//!
//! Foundation crate providing the error taxonomy and constants shared by the
//! session server. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Protocol, header, and default-value constants

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;
