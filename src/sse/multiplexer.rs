// ABOUTME: Attaches streams to sessions: replays the buffered tail then forwards live events
// ABOUTME: Enforces one live stream per session, keepalive on idle, and detach on disconnect
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Stream Multiplexer
//!
//! `attach` takes the session lock once. Inside that critical section it
//! snapshots the replay tail after the client's cursor and installs the new live
//! queue sender, so any event emitted afterwards lands in the live queue and
//! nothing can fall between replay and live delivery.
//!
//! A [`LiveStream`] yields the replayed events first, then live ones, and never
//! yields an id lower than or equal to one it already delivered. When the live
//! queue is idle for the keepalive interval it yields [`StreamFrame::Keepalive`].
//! Dropping the stream detaches its live queue if it is still the current
//! listener; buffered history stays for the next attach.

use super::frame::StreamFrame;
use crate::config::{AttachPolicy, ReplayPolicy, SessionConfig};
use crate::errors::{AppError, AppResult};
use crate::session::{Event, LiveQueue, Session, SessionState};
use futures_util::Stream;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Stream behavior
#[derive(Debug, Clone, Copy)]
pub struct StreamConfig {
    /// Idle time before a keepalive frame
    pub keepalive: Duration,
    /// Bounded live queue size
    pub live_queue_capacity: usize,
    /// Second attach behavior
    pub attach_policy: AttachPolicy,
    /// Stale cursor behavior
    pub replay_policy: ReplayPolicy,
}

impl From<&SessionConfig> for StreamConfig {
    fn from(config: &SessionConfig) -> Self {
        Self {
            keepalive: config.keepalive_interval(),
            live_queue_capacity: config.live_queue_capacity.max(1),
            attach_policy: config.attach_policy,
            replay_policy: config.replay_policy,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

/// Connects session event logs to client streams
pub struct StreamMultiplexer {
    config: StreamConfig,
}

impl StreamMultiplexer {
    /// Create a multiplexer
    #[must_use]
    pub const fn new(config: StreamConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Emit an event on a session
    pub async fn push(&self, session: &Session, payload: Value) -> Arc<Event> {
        let event = session.emit(payload).await;
        debug!(session.id = %session.id(), event.id = event.id(), "Event pushed");
        event
    }

    /// Attach a stream, replaying events after `cursor` when one is supplied
    ///
    /// # Errors
    ///
    /// Returns `StreamAlreadyAttached` when a stream is attached and the attach
    /// policy is `Reject`, and `ReplayGapUnrecoverable` when events after the
    /// cursor were evicted and the replay policy is `Strict`.
    pub async fn attach(&self, session: &Arc<Session>, cursor: Option<u64>) -> AppResult<LiveStream> {
        let mut state = session.lock().await;

        if state.has_live_stream() {
            match self.config.attach_policy {
                AttachPolicy::Reject => {
                    return Err(AppError::stream_already_attached(session.id()));
                }
                AttachPolicy::Replace => {
                    if let Some(previous) = state.live.take() {
                        info!(
                            session.id = %session.id(),
                            listener.id = previous.listener_id,
                            "Replacing attached stream"
                        );
                    }
                }
            }
        }

        let (replay, last_delivered) = match cursor {
            Some(cursor) => {
                let tail = state.buffer.tail_checked(cursor);
                if tail.gap {
                    let oldest = state.buffer.oldest_id();
                    match self.config.replay_policy {
                        ReplayPolicy::Strict => {
                            return Err(
                                AppError::replay_gap(cursor, oldest).with_session_id(session.id())
                            );
                        }
                        ReplayPolicy::BestEffort => {
                            warn!(
                                session.id = %session.id(),
                                last_event_id = cursor,
                                oldest_retained_id = ?oldest,
                                "Resume cursor predates retained history, replaying partial tail"
                            );
                        }
                    }
                }
                if cursor > state.event_counter {
                    debug!(
                        session.id = %session.id(),
                        last_event_id = cursor,
                        newest_id = state.event_counter,
                        "Resume cursor is ahead of the session, ignoring it"
                    );
                }
                (tail.events, cursor.min(state.event_counter))
            }
            None => (Vec::new(), state.event_counter),
        };

        state.next_listener_id += 1;
        let listener_id = state.next_listener_id;
        let (sender, receiver) = mpsc::channel(self.config.live_queue_capacity);
        state.live = Some(LiveQueue {
            listener_id,
            sender,
        });
        state.touch();
        drop(state);

        info!(
            session.id = %session.id(),
            listener.id = listener_id,
            replayed = replay.len(),
            "Stream attached"
        );

        Ok(LiveStream {
            session: Arc::clone(session),
            listener_id,
            replay: replay.into(),
            receiver,
            keepalive: self.config.keepalive,
            last_delivered,
        })
    }

    /// Detach `listener_id` if it is still the session's current stream
    pub async fn detach(session: &Session, listener_id: u64) -> bool {
        let mut state = session.lock().await;
        detach_locked(&mut state, session.id(), listener_id)
    }
}

fn detach_locked(state: &mut SessionState, session_id: &str, listener_id: u64) -> bool {
    let is_current = state
        .live
        .as_ref()
        .is_some_and(|live| live.listener_id == listener_id);

    if is_current {
        state.live = None;
        info!(session.id = %session_id, listener.id = listener_id, "Stream detached");
    }
    is_current
}

/// The receiving side of one attached stream
pub struct LiveStream {
    session: Arc<Session>,
    listener_id: u64,
    replay: VecDeque<Arc<Event>>,
    receiver: mpsc::Receiver<Arc<Event>>,
    keepalive: Duration,
    last_delivered: u64,
}

impl LiveStream {
    /// Generation of this attach within its session
    #[must_use]
    pub const fn listener_id(&self) -> u64 {
        self.listener_id
    }

    /// Session this stream reads from
    #[must_use]
    pub fn session_id(&self) -> &str {
        self.session.id()
    }

    /// Next frame, or `None` once the live queue was closed or replaced
    pub async fn next_frame(&mut self) -> Option<StreamFrame> {
        while let Some(event) = self.replay.pop_front() {
            if self.admit(&event) {
                self.session.touch().await;
                return Some(StreamFrame::Event(event));
            }
        }

        loop {
            match tokio::time::timeout(self.keepalive, self.receiver.recv()).await {
                Ok(Some(event)) => {
                    if self.admit(&event) {
                        self.session.touch().await;
                        return Some(StreamFrame::Event(event));
                    }
                }
                Ok(None) => {
                    debug!(
                        session.id = %self.session.id(),
                        listener.id = self.listener_id,
                        "Live queue closed, ending stream"
                    );
                    return None;
                }
                Err(_) => return Some(StreamFrame::Keepalive),
            }
        }
    }

    fn admit(&mut self, event: &Event) -> bool {
        if event.id() <= self.last_delivered {
            return false;
        }
        self.last_delivered = event.id();
        true
    }

    /// Adapt into a `Stream` of frames; dropping it detaches the stream
    pub fn into_stream(self) -> impl Stream<Item = StreamFrame> + Send {
        let mut live = self;
        async_stream::stream! {
            while let Some(frame) = live.next_frame().await {
                yield frame;
            }
        }
    }
}

impl Drop for LiveStream {
    fn drop(&mut self) {
        let listener_id = self.listener_id;
        let detached_inline = match self.session.try_lock() {
            Some(mut state) => {
                detach_locked(&mut state, self.session.id(), listener_id);
                true
            }
            None => false,
        };
        if detached_inline {
            return;
        }

        let session = Arc::clone(&self.session);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    StreamMultiplexer::detach(&session, listener_id).await;
                });
            }
            // The closed receiver already marks the stream as gone for liveness checks
            Err(_) => debug!(
                session.id = %session.id(),
                listener.id = listener_id,
                "No runtime available to detach stream"
            ),
        }
    }
}
