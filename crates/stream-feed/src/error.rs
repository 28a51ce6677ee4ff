//! Crate-level error type.
//!
//! Consumers of a feed never see these as message-specific failures: the feed task maps every
//! transport error to "stream ended" (see [`crate::EndReason`]). The error is still kept
//! structured so the report can say *why* a stream ended.

use std::io;
use std::time::Duration;

/// Result type used by this crate.
pub type FeedResult<T> = Result<T, FeedError>;

/// Unified error type for the `stream-feed` crate.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// A generic error with a message.
    #[error("{0}")]
    Message(String),

    /// I/O error surfaced by a chunk source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// HTTP request failed with a non-success status.
    #[error("HTTP error: {status} for {url}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// URL that failed.
        url: String,
    },

    /// No chunk arrived within the configured idle timeout.
    #[error("no data received for {0:?}")]
    Timeout(Duration),
}

impl FeedError {
    /// Convenience helper to construct a simple message error.
    pub fn msg(msg: impl Into<String>) -> Self {
        FeedError::Message(msg.into())
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        match (e.status(), e.url()) {
            (Some(status), Some(url)) => FeedError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            },
            _ => FeedError::Message(e.to_string()),
        }
    }
}
