use std::time::Duration;

use rodio::Source;

use crate::render::RenderCallback;
use crate::types::AudioSpec;

/// Rodio adapter that implements `rodio::Source<Item = f32>` on top of a [`RenderCallback`].
///
/// Notes:
/// - Rodio expects a stable sample rate and channel count during the lifetime of a `Source`.
///   The session's output spec never changes, so it is captured at construction.
/// - Samples are rendered one period at a time into a buffer allocated once. When the session
///   has nothing ready the period is silence, so the audio clock keeps advancing.
/// - The source never ends; drop it (or stop the sink) when the session is done.
///
/// Usage:
/// ```ignore
/// let session = AudioSession::new(AudioSettings::default())?;
/// sink.append(RodioSourceAdapter::new(session.render_callback()));
/// let task = FeedTask::spawn(Box::new(HttpChunkSource::new(client, request)), session, FeedSettings::default());
/// ```
pub struct RodioSourceAdapter {
    callback: RenderCallback,
    spec: AudioSpec,
    period: Vec<f32>,
    cursor: usize,
}

impl RodioSourceAdapter {
    pub fn new(callback: RenderCallback) -> Self {
        let spec = callback.spec();
        let period = vec![0.0; callback.period_samples()];
        let cursor = period.len();
        Self {
            callback,
            spec,
            period,
            cursor,
        }
    }
}

impl Iterator for RodioSourceAdapter {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.period.len() {
            self.callback.render(&mut self.period);
            self.cursor = 0;
        }
        let s = self.period[self.cursor];
        self.cursor += 1;
        Some(s)
    }
}

impl Source for RodioSourceAdapter {
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.spec.channels
    }

    fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
