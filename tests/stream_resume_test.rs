// ABOUTME: End-to-end tests for the session event stream over HTTP
// ABOUTME: Covers live delivery, progress ordering, Last-Event-ID resume, reattach, and cancellation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use helpers::axum_test::AxumTestRequest;
use resumable_mcp_server::{config::SessionConfig, mcp::ServerResources, sse::StreamFrame};
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};

const WAIT: Duration = Duration::from_secs(5);

async fn call_echo(resources: &Arc<ServerResources>, session_id: &str, id: u64, message: &str) {
    let response = AxumTestRequest::post("/mcp")
        .session(session_id)
        .json(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": {"name": "echo", "arguments": {"message": message}}
        }))
        .send(common::create_test_router(resources))
        .await;
    assert_eq!(response.status(), 202);
}

async fn post(resources: &Arc<ServerResources>, session_id: &str, message: Value) -> u16 {
    AxumTestRequest::post("/mcp")
        .session(session_id)
        .json(&message)
        .send(common::create_test_router(resources))
        .await
        .status()
}

#[tokio::test]
async fn test_live_stream_receives_tool_result() {
    let resources = common::create_test_resources();
    let session = resources.sessions.create();

    let (status, headers, mut reader) = AxumTestRequest::get("/mcp")
        .session(session.id())
        .open_stream(common::create_test_router(&resources))
        .await;
    assert_eq!(status, 200);
    assert_eq!(
        headers.get("content-type").unwrap().to_str().unwrap(),
        "text/event-stream"
    );
    assert_eq!(
        headers.get("mcp-session-id").unwrap().to_str().unwrap(),
        session.id()
    );

    call_echo(&resources, session.id(), 7, "over the wire").await;

    let frame = reader.next_event(WAIT).await.expect("result frame");
    assert_eq!(frame.id, Some(1));
    let payload = frame.json();
    assert_eq!(payload["id"], 7);
    assert_eq!(payload["result"]["content"][0]["text"], "over the wire");
}

#[tokio::test]
async fn test_wire_frames_match_stream_frame_encoding() {
    let resources = common::create_test_resources_with(SessionConfig {
        keepalive_interval_secs: 1,
        ..SessionConfig::default()
    });
    let session = resources.sessions.create();

    let (_status, _headers, mut reader) = AxumTestRequest::get("/mcp")
        .session(session.id())
        .open_stream(common::create_test_router(&resources))
        .await;

    call_echo(&resources, session.id(), 1, "framed").await;
    let frame = reader.next_frame(WAIT).await.expect("event frame");

    let buffered = session.replay_tail(0).await.events;
    let expected = StreamFrame::Event(Arc::clone(&buffered[0])).encode();
    assert_eq!(frame.raw, expected);

    let keepalive = reader.next_frame(WAIT).await.expect("keepalive frame");
    assert!(keepalive.is_keepalive());
    assert_eq!(keepalive.raw, StreamFrame::Keepalive.encode());
}

#[tokio::test]
async fn test_progress_then_result_in_order() {
    let resources = common::create_test_resources();
    let session = resources.sessions.create();

    let (_status, _headers, mut reader) = AxumTestRequest::get("/mcp")
        .session(session.id())
        .open_stream(common::create_test_router(&resources))
        .await;

    let status = post(
        &resources,
        session.id(),
        json!({
            "jsonrpc": "2.0",
            "id": "job",
            "method": "tools/call",
            "params": {
                "name": "long_running",
                "arguments": {"steps": 3, "interval_ms": 5},
                "_meta": {"progressToken": "tok-1"}
            }
        }),
    )
    .await;
    assert_eq!(status, 202);

    for step in 1..=3u64 {
        let frame = reader.next_event(WAIT).await.expect("progress frame");
        assert_eq!(frame.id, Some(step));
        let payload = frame.json();
        assert_eq!(payload["method"], "notifications/progress");
        assert_eq!(payload["params"]["progressToken"], "tok-1");
        assert_eq!(payload["params"]["progress"], step);
        assert_eq!(payload["params"]["total"], 3);
    }

    let result = reader.next_event(WAIT).await.expect("result frame");
    assert_eq!(result.id, Some(4));
    assert_eq!(result.json()["id"], "job");
    assert!(result.json()["result"].is_object());
}

#[tokio::test]
async fn test_resume_replays_tail_then_goes_live() {
    let resources = common::create_test_resources();
    let session = resources.sessions.create();

    for (id, message) in [(1, "a"), (2, "b"), (3, "c")] {
        call_echo(&resources, session.id(), id, message).await;
        common::wait_for_event_id(&session, id).await;
    }

    let (status, _headers, mut reader) = AxumTestRequest::get("/mcp")
        .session(session.id())
        .header("last-event-id", "1")
        .open_stream(common::create_test_router(&resources))
        .await;
    assert_eq!(status, 200);

    let second = reader.next_event(WAIT).await.unwrap();
    let third = reader.next_event(WAIT).await.unwrap();
    assert_eq!(second.id, Some(2));
    assert_eq!(second.json()["result"]["content"][0]["text"], "b");
    assert_eq!(third.id, Some(3));

    call_echo(&resources, session.id(), 4, "d").await;
    let live = reader.next_event(WAIT).await.unwrap();
    assert_eq!(live.id, Some(4));
    assert_eq!(live.json()["result"]["content"][0]["text"], "d");
}

#[tokio::test]
async fn test_resume_after_disconnect_misses_nothing() {
    let resources = common::create_test_resources();
    let session = resources.sessions.create();

    let (_status, _headers, mut first) = AxumTestRequest::get("/mcp")
        .session(session.id())
        .open_stream(common::create_test_router(&resources))
        .await;
    call_echo(&resources, session.id(), 1, "one").await;
    let seen = first.next_event(WAIT).await.unwrap();
    assert_eq!(seen.id, Some(1));

    drop(first);
    common::wait_for_live_stream(&session, false).await;

    call_echo(&resources, session.id(), 2, "two").await;
    call_echo(&resources, session.id(), 3, "three").await;
    common::wait_for_event_id(&session, 3).await;

    let (_status, _headers, mut second) = AxumTestRequest::get("/mcp")
        .session(session.id())
        .header("last-event-id", "1")
        .open_stream(common::create_test_router(&resources))
        .await;

    let ids = [
        second.next_event(WAIT).await.unwrap().id,
        second.next_event(WAIT).await.unwrap().id,
    ];
    assert_eq!(ids, [Some(2), Some(3)]);
}

#[tokio::test]
async fn test_attach_without_cursor_skips_history() {
    let resources = common::create_test_resources();
    let session = resources.sessions.create();

    call_echo(&resources, session.id(), 1, "old").await;
    common::wait_for_event_id(&session, 1).await;

    let (_status, _headers, mut reader) = AxumTestRequest::get("/mcp")
        .session(session.id())
        .open_stream(common::create_test_router(&resources))
        .await;

    call_echo(&resources, session.id(), 2, "new").await;
    let frame = reader.next_event(WAIT).await.unwrap();
    assert_eq!(frame.id, Some(2));
}

#[tokio::test]
async fn test_second_attach_replaces_first() {
    let resources = common::create_test_resources();
    let session = resources.sessions.create();

    let (_status, _headers, mut first) = AxumTestRequest::get("/mcp")
        .session(session.id())
        .open_stream(common::create_test_router(&resources))
        .await;
    let (_status, _headers, mut second) = AxumTestRequest::get("/mcp")
        .session(session.id())
        .open_stream(common::create_test_router(&resources))
        .await;

    assert!(first.next_event(WAIT).await.is_none());

    call_echo(&resources, session.id(), 1, "to second").await;
    assert_eq!(second.next_event(WAIT).await.unwrap().id, Some(1));
}

#[tokio::test]
async fn test_second_attach_rejected_under_reject_policy() {
    let resources = common::create_test_resources_with(SessionConfig {
        attach_policy: resumable_mcp_server::config::AttachPolicy::Reject,
        ..SessionConfig::default()
    });
    let session = resources.sessions.create();

    let (_status, _headers, _first) = AxumTestRequest::get("/mcp")
        .session(session.id())
        .open_stream(common::create_test_router(&resources))
        .await;

    let second = AxumTestRequest::get("/mcp")
        .session(session.id())
        .send(common::create_test_router(&resources))
        .await;
    assert_eq!(second.status(), 409);
}

#[tokio::test]
async fn test_evicted_cursor_under_strict_replay_is_gone() {
    let resources = common::create_test_resources_with(SessionConfig {
        replay_capacity: 2,
        replay_policy: resumable_mcp_server::config::ReplayPolicy::Strict,
        ..SessionConfig::default()
    });
    let session = resources.sessions.create();

    for id in 1..=5 {
        call_echo(&resources, session.id(), id, "x").await;
        common::wait_for_event_id(&session, id).await;
    }

    let response = AxumTestRequest::get("/mcp")
        .session(session.id())
        .header("last-event-id", "1")
        .send(common::create_test_router(&resources))
        .await;
    assert_eq!(response.status(), 410);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "REPLAY_GAP_UNRECOVERABLE");
}

#[tokio::test]
async fn test_cancel_delivers_single_cancelled_response() {
    let resources = common::create_test_resources();
    let session = resources.sessions.create();

    let (_status, _headers, mut reader) = AxumTestRequest::get("/mcp")
        .session(session.id())
        .open_stream(common::create_test_router(&resources))
        .await;

    let status = post(
        &resources,
        session.id(),
        json!({
            "jsonrpc": "2.0",
            "id": 42,
            "method": "tools/call",
            "params": {"name": "long_running", "arguments": {"steps": 10, "interval_ms": 60000}}
        }),
    )
    .await;
    assert_eq!(status, 202);

    let status = post(
        &resources,
        session.id(),
        json!({
            "jsonrpc": "2.0",
            "method": "notifications/cancelled",
            "params": {"requestId": 42, "reason": "user requested"}
        }),
    )
    .await;
    assert_eq!(status, 202);

    let frame = reader.next_event(WAIT).await.expect("cancelled frame");
    let payload = frame.json();
    assert_eq!(payload["id"], 42);
    assert_eq!(payload["error"]["code"], -32006);
    assert_eq!(payload["error"]["data"]["kind"], "cancelled");
    assert_eq!(payload["error"]["data"]["reason"], "user requested");

    assert!(reader.next_event(Duration::from_millis(200)).await.is_none());
    assert_eq!(session.pending_count().await, 0);
}

#[tokio::test]
async fn test_delete_ends_open_stream_and_cancels_work() {
    let resources = common::create_test_resources();
    let session = resources.sessions.create();

    let (_status, _headers, mut reader) = AxumTestRequest::get("/mcp")
        .session(session.id())
        .open_stream(common::create_test_router(&resources))
        .await;

    post(
        &resources,
        session.id(),
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "long_running", "arguments": {"steps": 10, "interval_ms": 60000}}
        }),
    )
    .await;

    let response = AxumTestRequest::delete("/mcp")
        .session(session.id())
        .send(common::create_test_router(&resources))
        .await;
    assert_eq!(response.status(), 204);

    assert!(reader.next_event(WAIT).await.is_none());
    common::wait_for_event_id(&session, 1).await;
    assert_eq!(session.pending_count().await, 0);
}
