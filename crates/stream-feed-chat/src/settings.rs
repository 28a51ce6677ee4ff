//! Settings for `stream-feed-chat`.

/// Settings for the SSE text assembler.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// Token that opens an event frame.
    /// Default: `"data: "`.
    pub frame_marker: String,

    /// Token that closes an event frame.
    /// Default: `"\n\n"`.
    pub frame_terminator: String,

    /// Upper bound on buffered bytes of a single unterminated frame.
    /// A frame growing past this is discarded as malformed.
    /// Default: 1 MiB.
    pub max_pending_bytes: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            frame_marker: "data: ".to_owned(),
            frame_terminator: "\n\n".to_owned(),
            max_pending_bytes: 1024 * 1024,
        }
    }
}

impl ChatSettings {
    /// Create default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frame marker.
    pub fn with_frame_marker(mut self, marker: impl Into<String>) -> Self {
        self.frame_marker = marker.into();
        self
    }

    /// Set the frame terminator.
    pub fn with_frame_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.frame_terminator = terminator.into();
        self
    }

    /// Set the pending-frame bound.
    pub fn with_max_pending_bytes(mut self, max: usize) -> Self {
        self.max_pending_bytes = max;
        self
    }
}
