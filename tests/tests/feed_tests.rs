//! Transport-level integration tests for `stream-feed`.
//!
//! These tests stop at the byte level: a recording sink captures exactly what the feed task
//! delivered and how the feed ended, for both in-memory and real HTTP sources.


use std::io;
use std::time::Duration;

use bytes::Bytes;
use rstest::rstest;

use stream_feed::{
    ChunkSink, ChunkSource, EndReason, FeedSettings, FeedTask, HttpChunkSource, MemoryChunkSource,
    MemoryTail,
};

use fixtures::setup;
use fixtures::sse::SseFixture;

#[derive(Debug, Default)]
struct Recorder {
    chunks: Vec<Bytes>,
    ends: Vec<EndReason>,
}

impl Recorder {
    fn concat(&self) -> Vec<u8> {
        self.chunks.iter().flat_map(|c| c.iter().copied()).collect()
    }
}

impl ChunkSink for Recorder {
    fn on_chunk(&mut self, chunk: &Bytes) {
        self.chunks.push(chunk.clone());
    }

    fn on_end(&mut self, reason: &EndReason) {
        self.ends.push(reason.clone());
    }
}

fn spawn(source: impl ChunkSource, settings: FeedSettings) -> FeedTask<Recorder> {
    FeedTask::spawn(Box::new(source), Recorder::default(), settings)
}

#[rstest]
#[case(1)]
#[case(5)]
#[case(64)]
#[tokio::test]
async fn memory_source_delivers_every_chunk_in_order(#[case] chunk_len: usize) {
    setup::init_tracing();
    let data: Vec<u8> = (0..200u8).collect();

    let task = spawn(
        MemoryChunkSource::chunked(data.clone(), chunk_len),
        FeedSettings::default(),
    );
    let (sink, report) = task.join().await.unwrap();

    assert_eq!(sink.concat(), data);
    assert!(sink.chunks.iter().all(|c| c.len() <= chunk_len));
    assert_eq!(sink.ends, vec![EndReason::Completed]);
    assert_eq!(report.chunks, sink.chunks.len() as u64);
    assert_eq!(report.bytes, 200);
    assert_eq!(report.end, EndReason::Completed);
}

#[tokio::test]
async fn source_failure_ends_with_transport_error_after_delivered_chunks() {
    setup::init_tracing();
    let source = MemoryChunkSource::new(vec![Bytes::from_static(b"ab"), Bytes::from_static(b"cd")])
        .with_tail(MemoryTail::Fail(io::ErrorKind::ConnectionReset));

    let (sink, report) = spawn(source, FeedSettings::default())
        .join()
        .await
        .unwrap();

    assert_eq!(sink.concat(), b"abcd");
    assert_eq!(sink.ends.len(), 1);
    assert!(matches!(sink.ends[0], EndReason::TransportError(_)));
    assert_eq!(report.end, sink.ends[0]);
}

#[tokio::test]
async fn cancel_ends_a_held_open_stream() {
    setup::init_tracing();
    let source = MemoryChunkSource::new(vec![Bytes::from_static(b"partial")])
        .with_tail(MemoryTail::HoldOpen);
    let task = spawn(source, FeedSettings::default());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!task.is_finished());
    task.cancel();

    let (sink, report) = task.join().await.unwrap();
    assert_eq!(sink.concat(), b"partial");
    assert_eq!(sink.ends, vec![EndReason::Cancelled]);
    assert_eq!(report.end, EndReason::Cancelled);
}

#[tokio::test]
async fn idle_timeout_ends_a_stalled_stream() {
    setup::init_tracing();
    let source = MemoryChunkSource::new(vec![Bytes::from_static(b"x")])
        .with_tail(MemoryTail::HoldOpen);
    let settings = FeedSettings::default().with_idle_timeout(Duration::from_millis(50));

    let (sink, report) = tokio::time::timeout(Duration::from_secs(5), spawn(source, settings).join())
        .await
        .expect("idle timeout did not fire")
        .unwrap();

    assert_eq!(sink.concat(), b"x");
    assert!(matches!(report.end, EndReason::TransportError(_)));
}

#[tokio::test]
async fn http_source_streams_response_body() {
    setup::init_tracing();
    let fixture = SseFixture::completion(&["Hello", ", ", "world"], "stop");
    let base = fixture.start().await;

    let source = HttpChunkSource::get(base.join("v1/chat/completions").unwrap());
    assert_eq!(source.name(), "http");
    assert!(source.url().is_some());

    let (sink, report) = spawn(source, FeedSettings::default())
        .join()
        .await
        .unwrap();

    assert_eq!(sink.concat(), fixture.body().as_bytes());
    assert_eq!(report.end, EndReason::Completed);
}

#[tokio::test]
async fn http_error_status_ends_before_any_chunk() {
    setup::init_tracing();
    let base = SseFixture::completion(&["unused"], "stop").start().await;

    let source = HttpChunkSource::get(base.join("unavailable").unwrap());
    let (sink, report) = spawn(source, FeedSettings::default())
        .join()
        .await
        .unwrap();

    assert!(sink.chunks.is_empty());
    assert_eq!(report.chunks, 0);
    match &report.end {
        EndReason::TransportError(msg) => assert!(msg.contains("503"), "unexpected error: {msg}"),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn dropping_the_handle_stops_the_feed() {
    setup::init_tracing();
    let base = SseFixture::completion(&["a", "b", "c", "d"], "stop").start().await;

    let task = spawn(
        HttpChunkSource::get(base.join("hang").unwrap()),
        FeedSettings::default(),
    );
    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(task);

    // The server keeps serving: a fresh request still completes.
    let (sink, _) = spawn(
        HttpChunkSource::get(base.join("v1/chat/completions").unwrap()),
        FeedSettings::default(),
    )
    .join()
    .await
    .unwrap();
    assert_eq!(sink.ends, vec![EndReason::Completed]);
}
