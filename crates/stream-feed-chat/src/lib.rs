//! Text side of the `stream-feed` workspace.
//!
//! Turns a server-sent-event completion stream into a [`Message`] whose text grows as frames
//! arrive. Frames may be split anywhere by the transport; the assembled text does not depend on
//! where.
//!
//! Pieces:
//! - [`TextDeltaAssembler`]: bytes in, [`DeltaEvent`]s out. Pure and synchronous.
//! - [`Message`]: shared, single-writer/many-reader text with an in-progress flag.
//!   [`Message::stream_from`] drives it from a [`stream_feed::FeedTask`] through a
//!   [`MessageSink`].
//! - [`Exchange`]: ordered log of messages enforcing the [`MessageKind`] ordering rules.
//!
//! Example (not compiled):
//! ```ignore
//! let mut exchange = Exchange::new(ChatSettings::default());
//! exchange.push_completed(MessageKind::UserTranscription, "what now?")?;
//! let reply = exchange.begin_generated()?;
//! let task = reply.stream_from(Box::new(HttpChunkSource::new(client, request)), FeedSettings::default())?;
//! while reply.is_in_progress() {
//!     println!("{}", reply.text());
//! }
//! ```

mod assembler;
mod error;
mod exchange;
mod kind;
mod message;
mod settings;
mod sse;
mod wire;

pub use crate::assembler::{AssemblerStats, DeltaEvent, TextDeltaAssembler};
pub use crate::error::{ChatError, ChatResult};
pub use crate::exchange::Exchange;
pub use crate::kind::MessageKind;
pub use crate::message::{Message, MessageProgress, MessageSink, MessageSnapshot};
pub use crate::settings::ChatSettings;
