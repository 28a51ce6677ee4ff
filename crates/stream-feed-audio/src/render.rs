//! Real-time side of a session.
//!
//! [`RenderCallback::render`] is what an audio device callback calls once per period. It never
//! blocks beyond the ring's copy lock, never allocates, never logs and always fills the whole
//! output buffer: whatever the ring cannot supply becomes silence.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::session::Playback;
use crate::settings::AudioSettings;
use crate::types::{AudioSpec, PlaybackStats, RenderOutcome};

/// Pulls fixed-size periods of PCM from an [`crate::AudioSession`].
///
/// Cheap to create; any number may exist, but one consumer at a time is expected.
#[derive(Debug, Clone)]
pub struct RenderCallback {
    playback: Arc<Playback>,
    spec: AudioSpec,
    frames_per_period: usize,
}

impl RenderCallback {
    pub(crate) fn new(playback: Arc<Playback>, settings: &AudioSettings) -> Self {
        Self {
            playback,
            spec: settings.spec(),
            frames_per_period: settings.frames_per_period,
        }
    }

    pub fn spec(&self) -> AudioSpec {
        self.spec
    }

    pub fn frames_per_period(&self) -> usize {
        self.frames_per_period
    }

    /// Interleaved samples in one period.
    pub fn period_samples(&self) -> usize {
        self.frames_per_period * self.spec.channels as usize
    }

    /// Fill `out` with the next samples, padding with silence.
    ///
    /// `out` is normally [`period_samples`](Self::period_samples) long, but any length works.
    pub fn render(&mut self, out: &mut [f32]) -> RenderOutcome {
        let pb = &self.playback;
        pb.periods.fetch_add(1, Ordering::Relaxed);

        if !pb.has_audio.load(Ordering::Acquire) {
            out.fill(0.0);
            pb.silent.fetch_add(1, Ordering::Relaxed);
            return RenderOutcome::Silent;
        }

        let filled = pb.ring.pull(out);
        if filled == out.len() {
            return RenderOutcome::Full;
        }

        out[filled..].fill(0.0);
        pb.underruns.fetch_add(1, Ordering::Relaxed);
        pb.has_audio.store(false, Ordering::Release);
        // The feed side may have pushed between the pull and the store above.
        if !pb.ring.is_empty() {
            pb.has_audio.store(true, Ordering::Release);
        }
        RenderOutcome::Underrun { filled }
    }

    /// Whether the next period is expected to carry audio.
    pub fn is_ready(&self) -> bool {
        self.playback.has_audio.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> PlaybackStats {
        self.playback.stats()
    }
}
