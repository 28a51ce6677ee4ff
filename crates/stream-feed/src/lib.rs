//! Ordered chunk delivery for incrementally streamed network responses.
//!
//! This crate is the transport side of the `stream-feed` workspace. It knows nothing about
//! what the bytes mean; it only guarantees that a [`ChunkSink`] sees every chunk of a
//! [`ChunkSource`] in order, followed by exactly one end signal.
//!
//! Modules:
//! - `source`: the `ChunkSource` trait plus HTTP and in-memory implementations.
//! - `sink`: the `ChunkSink` trait and `EndReason`.
//! - `task`: `FeedTask`, the supervised background task connecting the two.
//! - `settings`, `error`: configuration and the crate error type.

mod error;
mod settings;
mod sink;
pub mod source;
mod task;

pub use crate::error::{FeedError, FeedResult};
pub use crate::settings::FeedSettings;
pub use crate::sink::{ChunkSink, EndReason};
pub use crate::source::http::HttpChunkSource;
pub use crate::source::memory::{MemoryChunkSource, MemoryTail};
pub use crate::source::{BoxChunkSource, ChunkSource, ChunkStream};
pub use crate::task::{FeedReport, FeedTask};
