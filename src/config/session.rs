// ABOUTME: Session and stream tuning: replay capacity, timeouts, keepalive, attach and replay policies
// ABOUTME: Parsed from environment variables and validated before the server starts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::defaults;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// What happens when a second stream attaches to a session that already has one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachPolicy {
    /// Close the existing stream and attach the new one
    #[default]
    Replace,
    /// Refuse the new stream with `409 Conflict`
    Reject,
}

/// What happens when a resume cursor predates the oldest retained event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayPolicy {
    /// Replay whatever is still retained and log the gap
    #[default]
    BestEffort,
    /// Refuse the stream with `410 Gone`
    Strict,
}

impl FromStr for AttachPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "reject" => Ok(Self::Reject),
            other => Err(AppError::invalid_input(format!(
                "Invalid SESSION_ATTACH_POLICY '{other}', expected 'replace' or 'reject'"
            ))),
        }
    }
}

impl FromStr for ReplayPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "best_effort" | "best-effort" => Ok(Self::BestEffort),
            "strict" => Ok(Self::Strict),
            other => Err(AppError::invalid_input(format!(
                "Invalid SESSION_REPLAY_POLICY '{other}', expected 'best_effort' or 'strict'"
            ))),
        }
    }
}

impl fmt::Display for AttachPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

impl fmt::Display for ReplayPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BestEffort => write!(f, "best_effort"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

/// Per-session limits and stream behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Events retained per session for replay
    pub replay_capacity: usize,
    /// Inactivity after which a session is swept
    pub timeout_secs: u64,
    /// Period of the expiry sweep
    pub sweep_interval_secs: u64,
    /// Idle time before a keepalive frame is written
    pub keepalive_interval_secs: u64,
    /// Bounded live queue size per attached stream
    pub live_queue_capacity: usize,
    /// Second attach behavior
    pub attach_policy: AttachPolicy,
    /// Stale cursor behavior
    pub replay_policy: ReplayPolicy,
    /// Unknown session ids are rejected with 404 instead of starting a new session
    pub strict_sessions: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            replay_capacity: defaults::REPLAY_CAPACITY,
            timeout_secs: defaults::SESSION_TIMEOUT_SECS,
            sweep_interval_secs: defaults::SWEEP_INTERVAL_SECS,
            keepalive_interval_secs: defaults::KEEPALIVE_INTERVAL_SECS,
            live_queue_capacity: defaults::LIVE_QUEUE_CAPACITY,
            attach_policy: AttachPolicy::default(),
            replay_policy: ReplayPolicy::default(),
            strict_sessions: false,
        }
    }
}

impl SessionConfig {
    /// Reject values the session layer cannot operate with
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` when a capacity or interval is zero
    pub fn validate(&self) -> AppResult<()> {
        let checks = [
            ("SESSION_REPLAY_CAPACITY", self.replay_capacity == 0),
            ("SSE_LIVE_QUEUE_CAPACITY", self.live_queue_capacity == 0),
            ("SESSION_TIMEOUT_SECS", self.timeout_secs == 0),
            ("SESSION_SWEEP_INTERVAL_SECS", self.sweep_interval_secs == 0),
            ("SSE_KEEPALIVE_INTERVAL_SECS", self.keepalive_interval_secs == 0),
        ];

        for (name, is_zero) in checks {
            if is_zero {
                return Err(AppError::new(
                    crate::errors::ErrorCode::ConfigInvalid,
                    format!("{name} must be greater than zero"),
                ));
            }
        }

        Ok(())
    }

    /// Inactivity timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Sweep period
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Keepalive period
    #[must_use]
    pub const fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs)
    }
}
