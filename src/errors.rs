// ABOUTME: Re-exports the unified error taxonomy from resumable-core
// ABOUTME: Keeps crate::errors paths stable for server modules and tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use resumable_core::errors::*;
