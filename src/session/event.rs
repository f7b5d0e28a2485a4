// ABOUTME: Immutable server-to-client event with a per-session monotonically increasing id
// ABOUTME: Shared between the replay buffer and the live queue as Arc<Event>
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// One unit of server-to-client data tied to a session
///
/// Ids come from the owning session's counter and are never reused.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    id: u64,
    session_id: String,
    payload: Value,
    emitted_at: DateTime<Utc>,
}

impl Event {
    /// Create an event; only the owning session assigns ids
    pub(crate) fn new(id: u64, session_id: impl Into<String>, payload: Value) -> Self {
        Self {
            id,
            session_id: session_id.into(),
            payload,
            emitted_at: Utc::now(),
        }
    }

    /// Event id, strictly increasing within a session
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Owning session
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// JSON-RPC shaped payload
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Emission time
    #[must_use]
    pub const fn emitted_at(&self) -> DateTime<Utc> {
        self.emitted_at
    }
}
