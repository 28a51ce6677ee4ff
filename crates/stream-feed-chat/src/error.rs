//! Crate-level error type.
//!
//! Stream content never produces an error here: malformed frames are dropped inside the
//! assembler. These variants cover misuse of the message model only.

use crate::MessageKind;

/// Result type used by this crate.
pub type ChatResult<T> = Result<T, ChatError>;

/// Unified error type for the `stream-feed-chat` crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// A message kind was appended where the exchange ordering does not allow it.
    #[error("{next} cannot follow {}", .previous.map_or("the start of an exchange", MessageKind::as_str))]
    OutOfOrder {
        /// Kind of the last message in the exchange, if any.
        previous: Option<MessageKind>,
        /// Kind that was rejected.
        next: MessageKind,
    },

    /// A streaming operation was requested on a message that is not a generated response.
    #[error("{0} messages are not streamed")]
    NotGenerated(MessageKind),
}
