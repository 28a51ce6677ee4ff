//! Error types for the audio path.
//!
//! Only [`AudioError`] ever reaches a caller: it is returned when a session cannot be built.
//! [`CodecError`] and [`PageError`] describe per-packet and per-page failures; the session and
//! demuxer log them and carry on.

/// Result type used by this crate.
pub type AudioResult<T> = Result<T, AudioError>;

/// Session construction failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioError {
    /// The codec library refused to create a decoder.
    #[error("codec initialization failed: {0}")]
    CodecInit(String),

    /// Output format the decoder cannot produce.
    #[error("unsupported output format: {sample_rate} Hz, {channels} channel(s)")]
    UnsupportedFormat {
        /// Requested sample rate.
        sample_rate: u32,
        /// Requested channel count.
        channels: u16,
    },

    /// Settings that cannot describe a playable stream.
    #[error("invalid settings: {0}")]
    InvalidSettings(&'static str),
}

/// Failure to decode one codec packet. The packet's samples are dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A stream header packet was present but malformed.
    #[error("malformed stream header: {0}")]
    Header(&'static str),

    /// The codec rejected the packet.
    #[error("opus decode failed: {0}")]
    Opus(String),

    /// Zero-length packet.
    #[error("empty packet")]
    Empty,
}

/// Failure to accept a container page. The demuxer resynchronizes past it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("unsupported page version {0}")]
    BadVersion(u8),

    #[error("page checksum mismatch: header says {expected:#010x}, computed {actual:#010x}")]
    Checksum { expected: u32, actual: u32 },

    #[error("malformed page: {0}")]
    Malformed(String),
}

impl From<ogg::OggReadError> for PageError {
    fn from(e: ogg::OggReadError) -> Self {
        match e {
            ogg::OggReadError::InvalidStreamStructVer(version) => Self::BadVersion(version),
            ogg::OggReadError::HashMismatch(expected, actual) => Self::Checksum { expected, actual },
            other => Self::Malformed(other.to_string()),
        }
    }
}
