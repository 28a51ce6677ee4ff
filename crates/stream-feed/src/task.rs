//! Supervised feed task.
//!
//! [`FeedTask`] owns the single background task that pulls chunks from a [`ChunkSource`] and
//! pushes them into a [`ChunkSink`]. It replaces fire-and-forget threads: the owner can cancel
//! it, join it to get the sink back, and dropping the handle cancels and aborts the task so no
//! sink state is touched after its owner is gone.
//!
//! Shutdown contract:
//! - Whatever ends the feed (source EOF, source error, idle timeout, cancellation), the sink's
//!   `on_end` is called exactly once before the task returns.
//! - Aborting via `Drop` skips `on_end`; the sink is dropped with the task in that case.

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::source::{BoxChunkSource, ChunkStream};
use crate::{ChunkSink, EndReason, FeedError, FeedResult, FeedSettings};

/// Summary of a finished feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedReport {
    /// Number of chunks delivered to the sink.
    pub chunks: u64,
    /// Number of bytes delivered to the sink.
    pub bytes: u64,
    /// Why the feed ended.
    pub end: EndReason,
}

/// Handle to a running feed.
pub struct FeedTask<S> {
    cancel: CancellationToken,
    task: Option<JoinHandle<(S, FeedReport)>>,
}

impl<S> Drop for FeedTask<S> {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<S: ChunkSink + 'static> FeedTask<S> {
    /// Spawn the feed on the current Tokio runtime.
    pub fn spawn(source: BoxChunkSource, sink: S, settings: FeedSettings) -> Self {
        let cancel = CancellationToken::new();
        let cancel_bg = cancel.clone();
        let name = source.name();

        let task = tokio::spawn(async move {
            let mut sink = sink;
            let mut stream = source.into_stream();
            let mut report = FeedReport {
                chunks: 0,
                bytes: 0,
                end: EndReason::Completed,
            };

            report.end = loop {
                let next = tokio::select! {
                    biased;
                    _ = cancel_bg.cancelled() => break EndReason::Cancelled,
                    next = next_chunk(&mut stream, &settings) => next,
                };

                match next {
                    Ok(Some(chunk)) => {
                        report.chunks += 1;
                        report.bytes += chunk.len() as u64;
                        sink.on_chunk(&chunk);
                    }
                    Ok(None) => break EndReason::Completed,
                    Err(e) => {
                        warn!(source = name, "feed ended by transport error: {}", e);
                        break EndReason::TransportError(e.to_string());
                    }
                }
            };

            debug!(
                source = name,
                chunks = report.chunks,
                bytes = report.bytes,
                "feed ended: {}",
                report.end
            );
            sink.on_end(&report.end);
            (sink, report)
        });

        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Request cancellation. The sink still observes `on_end(Cancelled)`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the background task has finished.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the feed to end and take the sink back.
    pub async fn join(mut self) -> FeedResult<(S, FeedReport)> {
        let task = self
            .task
            .take()
            .ok_or_else(|| FeedError::msg("feed task already joined"))?;
        task.await
            .map_err(|e| FeedError::msg(format!("feed task failed: {e}")))
    }
}

async fn next_chunk(stream: &mut ChunkStream, settings: &FeedSettings) -> FeedResult<Option<Bytes>> {
    let item = match settings.idle_timeout {
        Some(limit) => tokio::time::timeout(limit, stream.next())
            .await
            .map_err(|_| FeedError::Timeout(limit))?,
        None => stream.next().await,
    };
    item.transpose().map_err(FeedError::from)
}
