// ABOUTME: Bounded per-session log of recent events with FIFO eviction
// ABOUTME: Answers "everything after id X" for stream resumption and reports eviction gaps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Replay buffer
//!
//! The buffer keeps the most recent `capacity` events sorted by id. It does no
//! locking of its own: the owning session appends under its state lock, which is
//! also where ids are assigned.

use super::event::Event;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::warn;

/// Result of a resume lookup
#[derive(Debug, Clone, Default)]
pub struct ReplayTail {
    /// Retained events with id greater than the cursor, ascending
    pub events: Vec<Arc<Event>>,
    /// True when events after the cursor were already evicted
    pub gap: bool,
}

/// Bounded, ordered event log
#[derive(Debug)]
pub struct ReplayBuffer {
    events: VecDeque<Arc<Event>>,
    capacity: usize,
    /// Highest id evicted so far (0 before the first eviction)
    evicted_through: u64,
}

impl ReplayBuffer {
    /// Create a buffer holding at most `capacity` events (minimum one)
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            evicted_through: 0,
        }
    }

    /// Append an event, evicting the oldest when full
    ///
    /// Returns `false` and leaves the buffer untouched if the id does not
    /// increase past the newest retained id.
    pub fn push(&mut self, event: Arc<Event>) -> bool {
        if let Some(newest) = self.newest_id() {
            if event.id() <= newest {
                warn!(
                    session.id = %event.session_id(),
                    event.id = event.id(),
                    newest_id = newest,
                    "Rejected out-of-order event append"
                );
                return false;
            }
        }

        while self.events.len() >= self.capacity {
            if let Some(evicted) = self.events.pop_front() {
                self.evicted_through = evicted.id();
            }
        }

        self.events.push_back(event);
        true
    }

    /// Retained events with id greater than `since`
    #[must_use]
    pub fn tail(&self, since: u64) -> Vec<Arc<Event>> {
        let start = self.events.partition_point(|event| event.id() <= since);
        self.events.range(start..).cloned().collect()
    }

    /// Like [`Self::tail`], also reporting whether the cursor fell behind eviction
    #[must_use]
    pub fn tail_checked(&self, since: u64) -> ReplayTail {
        ReplayTail {
            events: self.tail(since),
            gap: since < self.evicted_through,
        }
    }

    /// Number of retained events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing is retained
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Maximum retained events
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Id of the oldest retained event
    #[must_use]
    pub fn oldest_id(&self) -> Option<u64> {
        self.events.front().map(|event| event.id())
    }

    /// Id of the newest retained event
    #[must_use]
    pub fn newest_id(&self) -> Option<u64> {
        self.events.back().map(|event| event.id())
    }
}
