//! Incremental text assembly from a completion event stream.
//!
//! `TextDeltaAssembler` accepts byte chunks in whatever sizes the transport delivers them and
//! produces [`DeltaEvent`]s as soon as a complete event frame is available. The output is
//! independent of how the input was split.
//!
//! Nothing here is fatal. A frame that fails to parse is counted and dropped; the frames around it
//! are unaffected. After a finish signal the assembler ignores further input.

use tracing::{debug, warn};

use crate::settings::ChatSettings;
use crate::sse::{Frame, SseFramer};
use crate::wire::ChunkPayload;

/// One increment produced by [`TextDeltaAssembler::feed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaEvent {
    /// Text to append.
    Content(String),
    /// The stream signalled completion. Nothing follows this event.
    Finished {
        /// Reported finish reason, e.g. `"stop"`.
        reason: String,
    },
}

/// Counters describing what the assembler has seen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerStats {
    /// Complete frames extracted.
    pub frames: u64,
    /// Frames dropped because they did not parse or overflowed the pending bound.
    pub malformed: u64,
    /// Non-empty content fragments emitted.
    pub fragments: u64,
    /// Bytes fed in total.
    pub bytes: u64,
}

#[derive(Debug)]
pub struct TextDeltaAssembler {
    framer: SseFramer,
    finished: bool,
    stats: AssemblerStats,
}

impl TextDeltaAssembler {
    pub fn new(settings: &ChatSettings) -> Self {
        Self {
            framer: SseFramer::new(
                &settings.frame_marker,
                &settings.frame_terminator,
                settings.max_pending_bytes,
            ),
            finished: false,
            stats: AssemblerStats::default(),
        }
    }

    /// Feed one chunk and return the increments it completed, in stream order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<DeltaEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }
        self.stats.bytes += chunk.len() as u64;
        self.framer.push(chunk);

        while let Some(frame) = self.framer.next_frame() {
            let payload = match frame {
                Frame::Payload(p) => p,
                Frame::Overflow => {
                    self.stats.malformed += 1;
                    warn!("discarding unterminated event frame over the pending bound");
                    continue;
                }
            };
            self.stats.frames += 1;

            let parsed: ChunkPayload = match serde_json::from_slice(&payload) {
                Ok(p) => p,
                Err(e) => {
                    self.stats.malformed += 1;
                    if payload.trim_ascii() == b"[DONE]" {
                        debug!("end-of-stream sentinel frame");
                    } else {
                        debug!(error = %e, len = payload.len(), "dropping unparsable event frame");
                    }
                    continue;
                }
            };

            // Every choice of the finishing frame still contributes its content.
            let mut finish = None;
            for choice in parsed.choices {
                if let Some(text) = choice.delta.as_ref().and_then(|d| d.content.as_deref()) {
                    if !text.is_empty() {
                        self.stats.fragments += 1;
                        events.push(DeltaEvent::Content(text.to_owned()));
                    }
                }
                if finish.is_none() {
                    finish = choice.finish();
                }
            }

            if let Some(reason) = finish {
                debug!(%reason, "completion stream finished");
                events.push(DeltaEvent::Finished { reason });
                self.finished = true;
                // Whatever is still buffered belongs to a finished message.
                self.framer.clear();
                return events;
            }
        }

        events
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Bytes buffered in an incomplete frame.
    pub fn pending_bytes(&self) -> usize {
        self.framer.pending()
    }

    pub fn stats(&self) -> AssemblerStats {
        self.stats
    }
}
