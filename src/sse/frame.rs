// ABOUTME: Wire framing for session streams: id-tagged data frames and keepalive comments
// ABOUTME: Converts frames into axum SSE events and into raw text/event-stream bytes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::sse::KEEPALIVE_COMMENT;
use crate::session::Event;
use axum::response::sse::Event as SseEvent;
use std::sync::Arc;

/// One item yielded by a live stream
#[derive(Debug, Clone)]
pub enum StreamFrame {
    /// A session event, carrying its id
    Event(Arc<Event>),
    /// Idle marker; carries no id and is never buffered
    Keepalive,
}

impl StreamFrame {
    /// Event id, if this frame carries one
    #[must_use]
    pub fn event_id(&self) -> Option<u64> {
        match self {
            Self::Event(event) => Some(event.id()),
            Self::Keepalive => None,
        }
    }

    /// Render as `text/event-stream` text
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Event(event) => format!("id: {}\ndata: {}\n\n", event.id(), event.payload()),
            Self::Keepalive => format!(": {KEEPALIVE_COMMENT}\n\n"),
        }
    }

    /// Convert into an axum SSE event
    #[must_use]
    pub fn into_sse_event(self) -> SseEvent {
        match self {
            Self::Event(event) => SseEvent::default()
                .id(event.id().to_string())
                .data(event.payload().to_string()),
            Self::Keepalive => SseEvent::default().comment(KEEPALIVE_COMMENT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_frame_encoding() {
        let event = Arc::new(Event::new(
            7,
            "s",
            json!({"jsonrpc": "2.0", "method": "notifications/progress"}),
        ));
        let frame = StreamFrame::Event(event);

        assert_eq!(frame.event_id(), Some(7));
        assert_eq!(
            frame.encode(),
            "id: 7\ndata: {\"jsonrpc\":\"2.0\",\"method\":\"notifications/progress\"}\n\n"
        );
    }

    #[test]
    fn test_keepalive_frame_encoding() {
        assert_eq!(StreamFrame::Keepalive.encode(), ": keepalive\n\n");
        assert_eq!(StreamFrame::Keepalive.event_id(), None);
    }
}
