//! Settings for `stream-feed`.

use std::time::Duration;

/// Settings for a [`crate::FeedTask`].
#[derive(Debug, Clone, Default)]
pub struct FeedSettings {
    /// Maximum time to wait for the next chunk before the feed ends with a timeout.
    /// `None` waits forever.
    /// Default: `None`.
    pub idle_timeout: Option<Duration>,
}

impl FeedSettings {
    /// Create default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the idle timeout.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }
}
