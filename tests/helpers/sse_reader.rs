// ABOUTME: Incremental reader for text/event-stream response bodies
// ABOUTME: Splits chunks into frames and exposes id, data, and comment fields

use axum::body::{Body, BodyDataStream};
use futures_util::StreamExt;
use serde_json::Value;
use std::time::Duration;

/// One parsed SSE frame
#[derive(Debug, Clone, Default)]
pub struct SseFrame {
    /// `id:` field
    pub id: Option<u64>,
    /// `data:` field
    pub data: Option<String>,
    /// Comment line text, e.g. keepalive
    pub comment: Option<String>,
    /// Frame exactly as received, including the blank-line terminator
    pub raw: String,
}

impl SseFrame {
    /// Parse the data field as JSON
    pub fn json(&self) -> Value {
        serde_json::from_str(self.data.as_deref().expect("frame has no data"))
            .expect("frame data is not JSON")
    }

    /// Whether this frame is a keepalive comment
    pub fn is_keepalive(&self) -> bool {
        self.id.is_none() && self.data.is_none() && self.comment.is_some()
    }
}

/// Reads frames from a streaming response body
pub struct SseReader {
    body: BodyDataStream,
    buffer: String,
}

impl SseReader {
    /// Wrap a response body
    pub fn new(body: Body) -> Self {
        Self {
            body: body.into_data_stream(),
            buffer: String::new(),
        }
    }

    /// Next frame, or `None` if the stream ended or `wait` elapsed
    pub async fn next_frame(&mut self, wait: Duration) -> Option<SseFrame> {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let raw: String = self.buffer.drain(..end + 2).collect();
                return Some(parse_frame(&raw));
            }

            let chunk = tokio::time::timeout(wait, self.body.next()).await.ok()??;
            let bytes = chunk.expect("stream body error");
            self.buffer.push_str(std::str::from_utf8(&bytes).expect("non UTF-8 frame"));
        }
    }

    /// Next frame that carries an event id, skipping keepalives
    pub async fn next_event(&mut self, wait: Duration) -> Option<SseFrame> {
        loop {
            let frame = self.next_frame(wait).await?;
            if !frame.is_keepalive() {
                return Some(frame);
            }
        }
    }
}

fn parse_frame(raw: &str) -> SseFrame {
    let mut frame = SseFrame {
        raw: raw.to_owned(),
        ..SseFrame::default()
    };
    for line in raw.lines() {
        if let Some(comment) = line.strip_prefix(':') {
            frame.comment = Some(comment.trim().to_owned());
        } else if let Some(id) = line.strip_prefix("id:") {
            frame.id = id.trim().parse().ok();
        } else if let Some(data) = line.strip_prefix("data:") {
            frame.data = Some(data.trim_start().to_owned());
        }
    }
    frame
}
