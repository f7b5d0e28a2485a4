// ABOUTME: Re-exports protocol and configuration constants from resumable-core
// ABOUTME: Single import point for header names, method names, and defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use resumable_core::constants::*;
