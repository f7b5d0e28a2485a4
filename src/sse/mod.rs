// ABOUTME: Server-Sent Events delivery for session event streams
// ABOUTME: Frame encoding plus the replay-then-live stream multiplexer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Wire frames for `text/event-stream`
pub mod frame;
/// Replay-then-live stream attachment
pub mod multiplexer;

pub use frame::StreamFrame;
pub use multiplexer::{LiveStream, StreamConfig, StreamMultiplexer};
