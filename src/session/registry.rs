// ABOUTME: Concurrent session map: creation on first contact, lookup, removal and expiry sweep
// ABOUTME: Map shard locks are held only for insert/remove, never across session state access
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Session;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Owns every live session in the process
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<Session>>,
    replay_capacity: usize,
}

impl SessionRegistry {
    /// Create an empty registry whose sessions retain `replay_capacity` events
    #[must_use]
    pub fn new(replay_capacity: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            replay_capacity,
        }
    }

    fn generate_id() -> String {
        format!("session_{}", Uuid::new_v4())
    }

    /// Resolve a session id, starting a new session when it is absent or unknown
    ///
    /// Unknown ids are never adopted: the new session always gets a fresh id,
    /// which the caller must echo back to the client.
    pub fn get_or_create(&self, requested: Option<&str>) -> Arc<Session> {
        if let Some(id) = requested {
            if let Some(session) = self.sessions.get(id) {
                return Arc::clone(session.value());
            }
            debug!(session.id = %id, "Unknown session id, starting a new session");
        }

        self.create()
    }

    /// Start a new session
    pub fn create(&self) -> Arc<Session> {
        let session = Arc::new(Session::new(Self::generate_id(), self.replay_capacity));
        self.sessions
            .insert(session.id().to_owned(), Arc::clone(&session));

        info!(session.id = %session.id(), "Session created");
        session
    }

    /// Look up an existing session
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` if the id is unknown or the session expired
    pub fn get(&self, id: &str) -> AppResult<Arc<Session>> {
        self.sessions
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| AppError::session_not_found(id))
    }

    /// Remove and close a session; returns `None` if it was not registered
    pub async fn remove(&self, id: &str) -> Option<Arc<Session>> {
        let (_, session) = self.sessions.remove(id)?;
        session.close().await;

        info!(session.id = %id, "Session removed");
        Some(session)
    }

    /// Remove every session idle longer than `timeout` with no stream attached
    ///
    /// Returns the ids that were removed.
    pub async fn sweep_expired(&self, now: DateTime<Utc>, timeout: Duration) -> Vec<String> {
        let snapshot: Vec<Arc<Session>> = self
            .sessions
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut removed = Vec::new();

        for session in snapshot {
            let sweepable = session.lock().await.is_sweepable(now, timeout);
            if !sweepable {
                continue;
            }

            // A request may have touched the session since the check above; a
            // session whose lock is busy is left for the next sweep.
            let evicted = self.sessions.remove_if(session.id(), |_, current| {
                Arc::ptr_eq(current, &session)
                    && session
                        .try_lock()
                        .is_some_and(|state| state.is_sweepable(now, timeout))
            });

            if evicted.is_some() {
                session.close().await;
                info!(session.id = %session.id(), "Session expired");
                removed.push(session.id().to_owned());
            }
        }

        removed
    }

    /// Number of registered sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True when no session is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Number of sessions with an attached stream
    pub async fn live_stream_count(&self) -> usize {
        let snapshot: Vec<Arc<Session>> = self
            .sessions
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut count = 0;
        for session in snapshot {
            if session.has_live_stream().await {
                count += 1;
            }
        }
        count
    }

    /// Remove and close every session
    pub async fn close_all(&self) {
        let ids: Vec<String> = self.sessions.iter().map(|entry| entry.key().clone()).collect();
        for id in ids {
            self.remove(&id).await;
        }
    }
}
