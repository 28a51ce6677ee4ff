//! Event-frame extraction over an arbitrarily split byte stream.
//!
//! A frame starts at the marker and ends at the first terminator after it. Anything before a
//! marker is noise and is dropped as soon as it can no longer be the start of a marker.

use bytes::{Buf, Bytes, BytesMut};

/// Result of one extraction step.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Frame {
    /// Payload between marker and terminator.
    Payload(Bytes),
    /// An unterminated frame grew past the pending bound and was discarded.
    Overflow,
}

#[derive(Debug)]
pub(crate) struct SseFramer {
    buf: BytesMut,
    marker: Vec<u8>,
    terminator: Vec<u8>,
    max_pending: usize,
    /// Offset up to which the current frame has already been searched for a terminator.
    scanned: usize,
}

impl SseFramer {
    pub fn new(marker: &str, terminator: &str, max_pending: usize) -> Self {
        let marker = if marker.is_empty() { "data: " } else { marker };
        let terminator = if terminator.is_empty() { "\n\n" } else { terminator };
        Self {
            buf: BytesMut::new(),
            marker: marker.as_bytes().to_vec(),
            terminator: terminator.as_bytes().to_vec(),
            max_pending,
            scanned: 0,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Buffered bytes not yet returned as a frame.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.scanned = 0;
    }

    pub fn next_frame(&mut self) -> Option<Frame> {
        if !self.buf.starts_with(&self.marker) {
            match find(&self.buf, &self.marker) {
                Some(pos) => self.buf.advance(pos),
                None => {
                    // Keep only what could still grow into a marker.
                    let keep = (self.marker.len() - 1).min(self.buf.len());
                    let drop = self.buf.len() - keep;
                    self.buf.advance(drop);
                    self.scanned = 0;
                    return None;
                }
            }
            self.scanned = 0;
        }

        let body_start = self.marker.len();
        let from = self.scanned.max(body_start);
        if let Some(rel) = find(&self.buf[from..], &self.terminator) {
            let end = from + rel;
            let frame = self.buf.split_to(end).freeze().slice(body_start..);
            self.buf.advance(self.terminator.len());
            self.scanned = 0;
            return Some(Frame::Payload(frame));
        }

        if self.buf.len() - body_start > self.max_pending {
            self.clear();
            return Some(Frame::Overflow);
        }

        // A terminator may straddle the next chunk boundary.
        self.scanned = self
            .buf
            .len()
            .saturating_sub(self.terminator.len() - 1)
            .max(body_start);
        None
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
