//! The consuming side of a feed.
//!
//! A [`ChunkSink`] is what the network-feed thread writes into: the text assembler's message or
//! the audio session. Sinks are driven by exactly one feed task at a time and must not block on
//! anything but their own short critical sections.

use std::fmt;

use bytes::Bytes;

/// Why a feed ended.
///
/// Every way a transport can stop is collapsed into one of these; sinks treat all of them as
/// "stream ended" and tear down their per-stream state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// The source signalled end-of-stream.
    Completed,
    /// The source failed; the message is informational only.
    TransportError(String),
    /// The owner cancelled the feed.
    Cancelled,
}

impl EndReason {
    pub fn is_completed(&self) -> bool {
        matches!(self, EndReason::Completed)
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::Completed => f.write_str("completed"),
            EndReason::TransportError(msg) => write!(f, "transport error: {msg}"),
            EndReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Receiver of ordered byte chunks.
pub trait ChunkSink: Send {
    /// Called once per chunk, in arrival order.
    fn on_chunk(&mut self, chunk: &Bytes);

    /// Called exactly once when the feed ends, whatever the reason.
    fn on_end(&mut self, reason: &EndReason);
}

impl<S: ChunkSink + ?Sized> ChunkSink for Box<S> {
    fn on_chunk(&mut self, chunk: &Bytes) {
        (**self).on_chunk(chunk)
    }

    fn on_end(&mut self, reason: &EndReason) {
        (**self).on_end(reason)
    }
}
