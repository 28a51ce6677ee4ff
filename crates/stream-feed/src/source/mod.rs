//! Source abstraction for `stream-feed`.
//!
//! A chunk source is the transport collaborator of the stream processors: it delivers ordered
//! byte chunks of arbitrary size until the stream ends or fails. Everything about how the bytes
//! are fetched (request construction, authentication, retries) stays inside the source.
//!
//! Contract:
//! - Chunks are yielded in arrival order and are never re-ordered or merged by the feed task.
//! - Stream termination (`None`) is the end-of-stream signal.
//! - An `Err` item ends the stream as well; the feed task does not poll the source again.
//!
//! Concrete sources live in submodules:
//! - `http`
//! - `memory`

use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;
use url::Url;

/// Ordered byte stream produced by a [`ChunkSource`].
pub type ChunkStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Convenience type for boxed sources.
pub type BoxChunkSource = Box<dyn ChunkSource>;

/// A source that yields ordered byte chunks.
///
/// This trait is object-safe so the feed task can hold `Box<dyn ChunkSource>`.
pub trait ChunkSource: Send + 'static {
    /// A human-readable name, used for diagnostics/logging.
    fn name(&self) -> &'static str;

    /// Nominal origin URL for this source, if it has one.
    fn url(&self) -> Option<&Url> {
        None
    }

    /// Create the ordered chunk stream.
    ///
    /// Cancellation is handled by dropping the returned stream.
    fn into_stream(self: Box<Self>) -> ChunkStream;
}

pub mod http;
pub mod memory;
