//! A single message of an exchange, possibly still being streamed.
//!
//! A generated message has one writer (the feed task driving [`Message::feed`]) and any number of
//! readers. Readers either poll [`Message::snapshot`] or await the progress channel from
//! [`Message::updates`]. Text only ever grows, and once `in_progress` reads `false` the text is
//! final.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use stream_feed::{BoxChunkSource, ChunkSink, EndReason, FeedSettings, FeedTask};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::assembler::{AssemblerStats, DeltaEvent, TextDeltaAssembler};
use crate::error::{ChatError, ChatResult};
use crate::kind::MessageKind;
use crate::settings::ChatSettings;

/// Point-in-time view of a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSnapshot {
    pub kind: MessageKind,
    pub text: String,
    pub in_progress: bool,
    pub last_updated: Instant,
}

/// Value carried by the progress channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageProgress {
    /// Length of the text in bytes.
    pub len: usize,
    pub in_progress: bool,
}

#[derive(Debug)]
struct TextState {
    text: String,
    last_updated: Instant,
}

#[derive(Debug)]
pub struct Message {
    kind: MessageKind,
    text: RwLock<TextState>,
    in_progress: AtomicBool,
    /// Present only for generated responses.
    assembler: Option<Mutex<TextDeltaAssembler>>,
    progress: watch::Sender<MessageProgress>,
}

impl Message {
    /// An empty generated response, ready to be fed.
    pub fn generated(settings: &ChatSettings) -> Arc<Self> {
        Self::build(
            MessageKind::GeneratedResponse,
            String::new(),
            Some(TextDeltaAssembler::new(settings)),
        )
    }

    /// A message that is complete on construction: cached responses, user-side events, or a
    /// generated response replayed from a record.
    pub fn completed(kind: MessageKind, text: impl Into<String>) -> Arc<Self> {
        Self::build(kind, text.into(), None)
    }

    fn build(kind: MessageKind, text: String, assembler: Option<TextDeltaAssembler>) -> Arc<Self> {
        let in_progress = assembler.is_some();
        Arc::new(Self {
            kind,
            progress: watch::Sender::new(MessageProgress {
                len: text.len(),
                in_progress,
            }),
            text: RwLock::new(TextState {
                text,
                last_updated: Instant::now(),
            }),
            in_progress: AtomicBool::new(in_progress),
            assembler: assembler.map(Mutex::new),
        })
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Feed raw stream bytes.
    ///
    /// A no-op for kinds other than [`MessageKind::GeneratedResponse`] and for messages that are
    /// already complete.
    pub fn feed(&self, chunk: &[u8]) {
        let Some(assembler) = &self.assembler else {
            return;
        };
        if !self.is_in_progress() {
            return;
        }

        let mut assembler = assembler.lock();
        // `finish` may have run while we waited for the lock.
        if !self.is_in_progress() {
            return;
        }
        let events = assembler.feed(chunk);
        if events.is_empty() {
            return;
        }

        let mut finished = false;
        {
            let mut state = self.text.write();
            for event in events {
                match event {
                    DeltaEvent::Content(fragment) => state.text.push_str(&fragment),
                    DeltaEvent::Finished { .. } => finished = true,
                }
            }
            state.last_updated = Instant::now();
        }
        if finished {
            self.in_progress.store(false, Ordering::Release);
        }
        self.publish();
    }

    /// Mark the message complete.
    ///
    /// Called when the transport ends, whether or not a finish signal was seen. Idempotent.
    pub fn finish(&self) {
        let _writer = self.assembler.as_ref().map(|a| a.lock());
        if !self.in_progress.swap(false, Ordering::AcqRel) {
            return;
        }
        self.text.write().last_updated = Instant::now();
        debug!(kind = %self.kind, "message finished without a finish signal");
        self.publish();
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Current text.
    pub fn text(&self) -> String {
        self.text.read().text.clone()
    }

    pub fn snapshot(&self) -> MessageSnapshot {
        // Read the flag first: if it is already false, the text read after it is final.
        let in_progress = self.is_in_progress();
        let state = self.text.read();
        MessageSnapshot {
            kind: self.kind,
            text: state.text.clone(),
            in_progress,
            last_updated: state.last_updated,
        }
    }

    /// Subscribe to progress notifications.
    pub fn updates(&self) -> watch::Receiver<MessageProgress> {
        self.progress.subscribe()
    }

    /// Assembler counters, if this message is streamed.
    pub fn assembler_stats(&self) -> Option<AssemblerStats> {
        self.assembler.as_ref().map(|a| a.lock().stats())
    }

    /// Spawn a feed task streaming `source` into this message.
    pub fn stream_from(
        self: &Arc<Self>,
        source: BoxChunkSource,
        settings: FeedSettings,
    ) -> ChatResult<FeedTask<MessageSink>> {
        if self.assembler.is_none() || !self.is_in_progress() {
            return Err(ChatError::NotGenerated(self.kind));
        }
        info!(source = source.name(), "streaming generated response");
        Ok(FeedTask::spawn(source, MessageSink::new(Arc::clone(self)), settings))
    }

    fn publish(&self) {
        let len = self.text.read().text.len();
        self.progress.send_replace(MessageProgress {
            len,
            in_progress: self.is_in_progress(),
        });
    }
}

/// Feed-side handle of a generated [`Message`].
///
/// This is what a [`FeedTask`] writes into; readers keep their own `Arc<Message>`.
#[derive(Debug, Clone)]
pub struct MessageSink(Arc<Message>);

impl MessageSink {
    pub fn new(message: Arc<Message>) -> Self {
        Self(message)
    }

    pub fn message(&self) -> &Arc<Message> {
        &self.0
    }

    pub fn into_message(self) -> Arc<Message> {
        self.0
    }
}

impl ChunkSink for MessageSink {
    fn on_chunk(&mut self, chunk: &Bytes) {
        self.0.feed(chunk);
    }

    fn on_end(&mut self, reason: &EndReason) {
        if !reason.is_completed() {
            warn!(%reason, "response stream ended early");
        }
        self.0.finish();
    }
}
