// ABOUTME: Session identity and per-session state shared by requests and streams
// ABOUTME: Serializes id assignment, buffering, live delivery and pending requests under one lock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Sessions
//!
//! A [`Session`] ties together the requests a client sends on `POST /mcp` and the
//! stream it reads on `GET /mcp`. All mutable state lives in [`SessionState`]
//! behind a single `tokio::sync::Mutex`, so id assignment, replay-buffer append,
//! live-queue attach/detach and pending-request bookkeeping are serialized per
//! session. Different sessions never share a lock.
//!
//! The lock is only ever held for short, non-blocking sections. Handlers and
//! stream delivery run outside of it.

/// Immutable event type
pub mod event;
/// Session map and expiry sweep
pub mod registry;
/// Bounded replay log
pub mod replay;
/// Background expiry task
pub mod sweeper;

pub use event::Event;
pub use registry::SessionRegistry;
pub use replay::{ReplayBuffer, ReplayTail};
pub use sweeper::SessionSweeper;

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Sending half of the queue feeding the currently attached stream
#[derive(Debug)]
pub(crate) struct LiveQueue {
    pub(crate) listener_id: u64,
    pub(crate) sender: mpsc::Sender<Arc<Event>>,
}

/// Bookkeeping for one in-flight request
#[derive(Debug)]
pub(crate) struct PendingEntry {
    pub(crate) token: CancellationToken,
    pub(crate) reason: Option<String>,
}

/// Mutable session state, guarded by the session lock
#[derive(Debug)]
pub struct SessionState {
    pub(crate) last_active_at: DateTime<Utc>,
    pub(crate) event_counter: u64,
    pub(crate) buffer: ReplayBuffer,
    pub(crate) live: Option<LiveQueue>,
    pub(crate) next_listener_id: u64,
    pub(crate) pending: HashMap<String, PendingEntry>,
}

impl SessionState {
    fn new(replay_capacity: usize) -> Self {
        Self {
            last_active_at: Utc::now(),
            event_counter: 0,
            buffer: ReplayBuffer::new(replay_capacity),
            live: None,
            next_listener_id: 0,
            pending: HashMap::new(),
        }
    }

    pub(crate) fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }

    /// Assign the next id, buffer the event and hand it to the live queue
    pub(crate) fn emit(&mut self, session_id: &str, payload: Value) -> Arc<Event> {
        self.event_counter += 1;
        let event = Arc::new(Event::new(self.event_counter, session_id, payload));

        self.buffer.push(Arc::clone(&event));
        self.touch();
        self.deliver(&event);

        event
    }

    fn deliver(&mut self, event: &Arc<Event>) {
        let Some(live) = self.live.as_ref() else {
            return;
        };
        let listener_id = live.listener_id;

        match live.sender.try_send(Arc::clone(event)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(
                    session.id = %event.session_id(),
                    event.id = event.id(),
                    listener.id = listener_id,
                    "Live queue full, closing stream; client must resume from its cursor"
                );
                self.live = None;
            }
            Err(TrySendError::Closed(_)) => {
                debug!(
                    session.id = %event.session_id(),
                    listener.id = listener_id,
                    "Live queue receiver gone, detaching"
                );
                self.live = None;
            }
        }
    }

    /// True while an attached stream is still reading
    pub(crate) fn has_live_stream(&self) -> bool {
        self.live
            .as_ref()
            .is_some_and(|live| !live.sender.is_closed())
    }

    fn is_idle_longer_than(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        (now - self.last_active_at)
            .to_std()
            .is_ok_and(|idle| idle > timeout)
    }

    /// Expired and nobody listening
    pub(crate) fn is_sweepable(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        !self.has_live_stream() && self.is_idle_longer_than(now, timeout)
    }
}

/// A client session
#[derive(Debug)]
pub struct Session {
    id: String,
    created_at: DateTime<Utc>,
    state: Mutex<SessionState>,
}

impl Session {
    /// Create a session retaining at most `replay_capacity` events
    #[must_use]
    pub fn new(id: impl Into<String>, replay_capacity: usize) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            state: Mutex::new(SessionState::new(replay_capacity)),
        }
    }

    /// Session id, as carried in the `Mcp-Session-Id` header
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Creation time
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    pub(crate) fn try_lock(&self) -> Option<MutexGuard<'_, SessionState>> {
        self.state.try_lock().ok()
    }

    /// Record activity
    pub async fn touch(&self) {
        self.lock().await.touch();
    }

    /// Last request or event time
    pub async fn last_active_at(&self) -> DateTime<Utc> {
        self.lock().await.last_active_at
    }

    /// Append an event and deliver it to the attached stream, if any
    pub async fn emit(&self, payload: Value) -> Arc<Event> {
        self.lock().await.emit(&self.id, payload)
    }

    /// Id of the most recently emitted event (0 before the first)
    pub async fn last_event_id(&self) -> u64 {
        self.lock().await.event_counter
    }

    /// Retained events after `since`
    pub async fn replay_tail(&self, since: u64) -> ReplayTail {
        self.lock().await.buffer.tail_checked(since)
    }

    /// Whether a stream is currently attached
    pub async fn has_live_stream(&self) -> bool {
        self.lock().await.has_live_stream()
    }

    /// Number of requests still in flight
    pub async fn pending_count(&self) -> usize {
        self.lock().await.pending.len()
    }

    /// Detach the live stream and cancel every pending request
    pub async fn close(&self) {
        let mut state = self.lock().await;

        if let Some(live) = state.live.take() {
            debug!(session.id = %self.id, listener.id = live.listener_id, "Closing live stream");
        }

        for (request_key, entry) in &mut state.pending {
            if !entry.token.is_cancelled() {
                entry.reason.get_or_insert_with(|| "session closed".to_owned());
                entry.token.cancel();
                debug!(session.id = %self.id, request.id = %request_key, "Cancelled pending request on close");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_ids_strictly_increase_from_one() {
        let session = Session::new("s", 10);

        let mut previous = 0;
        for n in 0..25 {
            let event = session.emit(json!({ "n": n })).await;
            assert_eq!(event.id(), previous + 1);
            assert_eq!(event.session_id(), "s");
            previous = event.id();
        }

        let retained: Vec<u64> = session
            .replay_tail(0)
            .await
            .events
            .iter()
            .map(|event| event.id())
            .collect();
        assert_eq!(retained, (16..=25).collect::<Vec<_>>());
        assert_eq!(session.last_event_id().await, 25);
    }

    #[tokio::test]
    async fn test_emit_delivers_to_live_queue() {
        let session = Session::new("s", 10);
        let (sender, mut receiver) = mpsc::channel(4);
        session.lock().await.live = Some(LiveQueue {
            listener_id: 1,
            sender,
        });

        session.emit(json!("a")).await;
        session.emit(json!("b")).await;

        assert_eq!(receiver.recv().await.unwrap().id(), 1);
        assert_eq!(receiver.recv().await.unwrap().id(), 2);
        assert!(session.has_live_stream().await);
    }

    #[tokio::test]
    async fn test_full_live_queue_detaches_but_keeps_history() {
        let session = Session::new("s", 10);
        let (sender, receiver) = mpsc::channel(1);
        session.lock().await.live = Some(LiveQueue {
            listener_id: 1,
            sender,
        });

        session.emit(json!(1)).await;
        session.emit(json!(2)).await;

        assert!(!session.has_live_stream().await);
        assert_eq!(session.replay_tail(0).await.events.len(), 2);
        drop(receiver);
    }

    #[tokio::test]
    async fn test_closed_receiver_is_not_a_live_stream() {
        let session = Session::new("s", 10);
        let (sender, receiver) = mpsc::channel(4);
        session.lock().await.live = Some(LiveQueue {
            listener_id: 1,
            sender,
        });
        drop(receiver);

        assert!(!session.has_live_stream().await);
    }

    #[tokio::test]
    async fn test_close_cancels_pending_requests() {
        let session = Session::new("s", 10);
        let token = CancellationToken::new();
        session.lock().await.pending.insert(
            "n:1".to_owned(),
            PendingEntry {
                token: token.clone(),
                reason: None,
            },
        );

        session.close().await;

        assert!(token.is_cancelled());
    }

    #[test]
    fn test_sweepable_requires_idle_and_detached() {
        let mut state = SessionState::new(4);
        let timeout = Duration::from_secs(60);
        let now = Utc::now();

        assert!(!state.is_sweepable(now, timeout));

        state.last_active_at = now - chrono::Duration::seconds(61);
        assert!(state.is_sweepable(now, timeout));

        let (sender, _receiver) = mpsc::channel(1);
        state.live = Some(LiveQueue {
            listener_id: 1,
            sender,
        });
        assert!(!state.is_sweepable(now, timeout));
    }
}
