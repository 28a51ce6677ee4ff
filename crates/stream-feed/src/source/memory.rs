//! In-memory `ChunkSource`.
//!
//! Replays a fixed list of chunks, optionally paced and optionally ending in an error or never
//! ending at all. Used for tests, demos and for feeding prerecorded responses through the same
//! pipeline as live ones.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream;

use super::{ChunkSource, ChunkStream};

/// How a [`MemoryChunkSource`] behaves after its last chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryTail {
    /// End the stream normally.
    End,
    /// Yield an I/O error of the given kind.
    Fail(io::ErrorKind),
    /// Never end; the stream stays pending until dropped.
    HoldOpen,
}

/// Prerecorded chunk source.
#[derive(Debug, Clone)]
pub struct MemoryChunkSource {
    chunks: VecDeque<Bytes>,
    pace: Option<Duration>,
    tail: MemoryTail,
}

impl MemoryChunkSource {
    pub fn new<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            pace: None,
            tail: MemoryTail::End,
        }
    }

    /// Split `data` into chunks of at most `chunk_len` bytes.
    pub fn chunked(data: impl Into<Bytes>, chunk_len: usize) -> Self {
        let data: Bytes = data.into();
        let chunk_len = chunk_len.max(1);
        let mut chunks = Vec::with_capacity(data.len().div_ceil(chunk_len));
        let mut off = 0;
        while off < data.len() {
            let end = (off + chunk_len).min(data.len());
            chunks.push(data.slice(off..end));
            off = end;
        }
        Self::new(chunks)
    }

    /// Sleep this long before yielding each chunk.
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = Some(pace);
        self
    }

    /// Set what happens after the last chunk.
    pub fn with_tail(mut self, tail: MemoryTail) -> Self {
        self.tail = tail;
        self
    }
}

impl ChunkSource for MemoryChunkSource {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn into_stream(self: Box<Self>) -> ChunkStream {
        let Self {
            chunks,
            pace,
            tail,
        } = *self;

        let s = stream::unfold(Some(chunks), move |state| async move {
            let mut chunks = state?;
            if let Some(pace) = pace {
                tokio::time::sleep(pace).await;
            }
            match chunks.pop_front() {
                Some(chunk) => Some((Ok(chunk), Some(chunks))),
                None => match tail {
                    MemoryTail::End => None,
                    MemoryTail::Fail(kind) => Some((
                        Err(io::Error::new(kind, "memory source failure")),
                        None,
                    )),
                    MemoryTail::HoldOpen => {
                        std::future::pending::<()>().await;
                        None
                    }
                },
            }
        });

        Box::pin(s)
    }
}
