//! Settings for `stream-feed-audio`.
//!
//! `AudioSettings` fixes the output format the decoder produces and the render callback
//! consumes, plus how much decoded audio may be buffered between them.

use std::time::Duration;

use crate::error::{AudioError, AudioResult};
use crate::ring::OverrunPolicy;
use crate::types::AudioSpec;

/// Settings for one audio session.
#[derive(Debug, Clone)]
pub struct AudioSettings {
    // ----------------------------
    // Output audio format
    // ----------------------------
    /// Output sample rate (Hz). The decoder decodes straight to this rate.
    /// Default: 24000 Hz.
    pub sample_rate: u32,

    /// Output channels (1 = mono, 2 = stereo).
    /// Default: 1.
    pub channels: u16,

    // ----------------------------
    // Render cadence
    // ----------------------------
    /// Frames requested by the audio device per callback.
    /// Default: 256 (~10.7ms @ 24kHz).
    pub frames_per_period: usize,

    // ----------------------------
    // Buffer configuration
    // ----------------------------
    /// How much decoded audio the ring holds.
    /// Synthesis arrives faster than real time, so this should cover a whole utterance.
    /// Default: 10 s.
    pub ring_capacity: Duration,

    /// What to do when the ring is full.
    /// Default: `DropOldest`.
    pub overrun_policy: OverrunPolicy,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: 24_000,
            channels: 1,
            frames_per_period: 256,
            ring_capacity: Duration::from_secs(10),
            overrun_policy: OverrunPolicy::DropOldest,
        }
    }
}

impl AudioSettings {
    /// Create default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set output sample rate.
    pub fn with_sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate;
        self
    }

    /// Set output channels.
    pub fn with_channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    /// Set frames per render period.
    pub fn with_frames_per_period(mut self, frames: usize) -> Self {
        self.frames_per_period = frames;
        self
    }

    /// Set ring capacity as a duration of audio.
    pub fn with_ring_capacity(mut self, capacity: Duration) -> Self {
        self.ring_capacity = capacity;
        self
    }

    /// Set the overrun policy.
    pub fn with_overrun_policy(mut self, policy: OverrunPolicy) -> Self {
        self.overrun_policy = policy;
        self
    }

    pub fn spec(&self) -> AudioSpec {
        AudioSpec {
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// Samples (across all channels) in one render period.
    pub fn period_samples(&self) -> usize {
        self.frames_per_period * self.channels as usize
    }

    /// Ring capacity in interleaved samples.
    ///
    /// Always a whole number of frames and never less than one period.
    pub fn ring_capacity_samples(&self) -> usize {
        let frames = (self.ring_capacity.as_secs_f64() * self.sample_rate as f64).ceil() as usize;
        frames.max(self.frames_per_period) * self.channels as usize
    }

    pub fn validate(&self) -> AudioResult<()> {
        if self.sample_rate == 0 {
            return Err(AudioError::InvalidSettings("sample_rate must be non-zero"));
        }
        if self.channels == 0 {
            return Err(AudioError::InvalidSettings("channels must be non-zero"));
        }
        if self.frames_per_period == 0 {
            return Err(AudioError::InvalidSettings(
                "frames_per_period must be non-zero",
            ));
        }
        if self.ring_capacity.is_zero() {
            return Err(AudioError::InvalidSettings("ring_capacity must be non-zero"));
        }
        Ok(())
    }
}
