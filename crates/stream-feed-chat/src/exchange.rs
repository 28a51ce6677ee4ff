//! Ordered log of the messages in one conversation.

use std::sync::Arc;

use tracing::debug;

use crate::error::{ChatError, ChatResult};
use crate::kind::MessageKind;
use crate::message::Message;
use crate::settings::ChatSettings;

/// Append-only sequence of messages that enforces [`MessageKind::may_follow`].
#[derive(Debug, Default)]
pub struct Exchange {
    settings: ChatSettings,
    messages: Vec<Arc<Message>>,
}

impl Exchange {
    pub fn new(settings: ChatSettings) -> Self {
        Self {
            settings,
            messages: Vec::new(),
        }
    }

    /// Append a message that is complete on arrival.
    pub fn push_completed(
        &mut self,
        kind: MessageKind,
        text: impl Into<String>,
    ) -> ChatResult<Arc<Message>> {
        self.check(kind)?;
        let msg = Message::completed(kind, text);
        self.messages.push(Arc::clone(&msg));
        Ok(msg)
    }

    /// Append an empty generated response to be streamed into.
    pub fn begin_generated(&mut self) -> ChatResult<Arc<Message>> {
        self.check(MessageKind::GeneratedResponse)?;
        let msg = Message::generated(&self.settings);
        self.messages.push(Arc::clone(&msg));
        Ok(msg)
    }

    pub fn last(&self) -> Option<&Arc<Message>> {
        self.messages.last()
    }

    pub fn messages(&self) -> &[Arc<Message>] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn check(&self, next: MessageKind) -> ChatResult<()> {
        let previous = self.messages.last().map(|m| m.kind());
        if next.may_follow(previous) {
            Ok(())
        } else {
            debug!(?previous, %next, "rejecting out-of-order message");
            Err(ChatError::OutOfOrder { previous, next })
        }
    }
}
