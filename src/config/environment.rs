// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Reads bind address and session tuning from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management

use super::session::SessionConfig;
use crate::constants::defaults;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Session layer tuning
    pub session: SessionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::HTTP_HOST.to_owned(),
            http_port: defaults::HTTP_PORT,
            session: SessionConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed, or if
    /// the resulting session configuration is invalid
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            host: env_var_or("HTTP_HOST", defaults::HTTP_HOST),
            http_port: parse_env("HTTP_PORT", defaults::HTTP_PORT)?,
            session: SessionConfig {
                replay_capacity: parse_env("SESSION_REPLAY_CAPACITY", defaults::REPLAY_CAPACITY)?,
                timeout_secs: parse_env("SESSION_TIMEOUT_SECS", defaults::SESSION_TIMEOUT_SECS)?,
                sweep_interval_secs: parse_env(
                    "SESSION_SWEEP_INTERVAL_SECS",
                    defaults::SWEEP_INTERVAL_SECS,
                )?,
                keepalive_interval_secs: parse_env(
                    "SSE_KEEPALIVE_INTERVAL_SECS",
                    defaults::KEEPALIVE_INTERVAL_SECS,
                )?,
                live_queue_capacity: parse_env(
                    "SSE_LIVE_QUEUE_CAPACITY",
                    defaults::LIVE_QUEUE_CAPACITY,
                )?,
                attach_policy: env_var_or("SESSION_ATTACH_POLICY", "replace").parse()?,
                replay_policy: env_var_or("SESSION_REPLAY_POLICY", "best_effort").parse()?,
                strict_sessions: parse_bool("SESSION_STRICT", false)?,
            },
        };

        config.session.validate()?;
        Ok(config)
    }

    /// Get a summary of the configuration for logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Resumable MCP Server Configuration:\n\
             - Bind: {}:{}\n\
             - Replay Capacity: {}\n\
             - Session Timeout: {}s (sweep every {}s)\n\
             - Keepalive: {}s\n\
             - Live Queue Capacity: {}\n\
             - Attach Policy: {}\n\
             - Replay Policy: {}\n\
             - Strict Sessions: {}",
            self.host,
            self.http_port,
            self.session.replay_capacity,
            self.session.timeout_secs,
            self.session.sweep_interval_secs,
            self.session.keepalive_interval_secs,
            self.session.live_queue_capacity,
            self.session.attach_policy,
            self.session.replay_policy,
            self.session.strict_sessions,
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::invalid_input(format!("Invalid {key} value '{raw}': {e}"))),
        Err(_) => Ok(default),
    }
}

fn parse_bool(key: &str, default: bool) -> AppResult<bool> {
    match env::var(key).as_deref().map(str::trim) {
        Ok("1" | "true" | "TRUE" | "yes") => Ok(true),
        Ok("0" | "false" | "FALSE" | "no" | "") => Ok(false),
        Ok(other) => Err(AppError::invalid_input(format!(
            "Invalid {key} value '{other}', expected true or false"
        ))),
        Err(_) => Ok(default),
    }
}
