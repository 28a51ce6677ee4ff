//! Completion-stream fixture for `stream-feed-chat` integration tests.
//!
//! Builds SSE bodies in the shape completion endpoints send them and serves them from a local
//! axum server with controllable chunking and pacing.

#![allow(dead_code)]

use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use bytes::Bytes;

use super::setup;

pub struct SseFixture {
    body: String,
    chunk_len: usize,
    pace: Duration,
}

impl SseFixture {
    /// A response streaming `fragments` and then finishing with `finish_reason`.
    pub fn completion(fragments: &[&str], finish_reason: &str) -> Self {
        Self {
            body: completion_body(fragments, finish_reason),
            chunk_len: 7,
            pace: Duration::ZERO,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_chunk_len(mut self, chunk_len: usize) -> Self {
        self.chunk_len = chunk_len;
        self
    }

    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn chunks(&self) -> Vec<Bytes> {
        setup::split(self.body.as_bytes(), self.chunk_len)
    }

    /// Routes:
    /// - `GET /v1/chat/completions`: the configured body;
    /// - `GET /hang`: the first half of the body, then nothing, forever;
    /// - `GET /unavailable`: HTTP 503.
    pub fn router(&self) -> Router {
        let chunks = self.chunks();
        let pace = self.pace;
        let half = chunks[..chunks.len() / 2].to_vec();

        Router::new()
            .route(
                "/v1/chat/completions",
                get(move || {
                    let chunks = chunks.clone();
                    async move { setup::paced_body(chunks, pace) }
                }),
            )
            .route(
                "/hang",
                get(move || {
                    let half = half.clone();
                    async move { setup::hanging_body(half) }
                }),
            )
            .route(
                "/unavailable",
                get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "try later") }),
            )
    }

    /// Start the server and return its base URL.
    pub async fn start(&self) -> reqwest::Url {
        setup::serve(self.router()).await
    }
}

/// One `data:` frame carrying a content delta.
pub fn content_frame(content: &str) -> String {
    format!(
        "data: {{\"id\":\"chatcmpl-1\",\"object\":\"chat.completion.chunk\",\"choices\":[{{\"index\":0,\"delta\":{{\"content\":{}}},\"finish_reason\":null}}]}}\n\n",
        json_string(content)
    )
}

/// One `data:` frame ending the message.
pub fn finish_frame(reason: &str) -> String {
    format!(
        "data: {{\"id\":\"chatcmpl-1\",\"object\":\"chat.completion.chunk\",\"choices\":[{{\"index\":0,\"delta\":{{}},\"finish_reason\":{}}}]}}\n\n",
        json_string(reason)
    )
}

pub fn completion_body(fragments: &[&str], finish_reason: &str) -> String {
    let mut body = String::new();
    for f in fragments {
        body.push_str(&content_frame(f));
    }
    body.push_str(&finish_frame(finish_reason));
    body.push_str("data: [DONE]\n\n");
    body
}

fn json_string(s: &str) -> String {
    serde_json::to_string(s).expect("strings always serialize")
}
