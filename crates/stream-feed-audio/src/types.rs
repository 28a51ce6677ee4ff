//! Small public types shared by the session, render callback and adapters.

use crate::container::DemuxStats;
use crate::ring::RingStats;

/// PCM format of emitted samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    pub sample_rate: u32,
    pub channels: u16,
}

/// What one render period produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The whole period came from decoded audio.
    Full,
    /// Only the first `filled` samples were audio; the rest is silence.
    Underrun { filled: usize },
    /// Nothing was ready; the period is silence.
    Silent,
}

/// Render-side counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackStats {
    /// Render periods served.
    pub periods: u64,
    /// Periods that ran out of samples part-way.
    pub underruns: u64,
    /// Periods rendered while the readiness flag was down.
    pub silent: u64,
}

/// Snapshot of everything an [`crate::AudioSession`] counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub demux: DemuxStats,
    /// Packets handed to the decoder without error, headers included.
    pub decoded_packets: u64,
    /// Packets the decoder rejected.
    pub decode_errors: u64,
    /// Samples (all channels) written to the ring.
    pub decoded_samples: u64,
    pub ring: RingStats,
    pub playback: PlaybackStats,
}
