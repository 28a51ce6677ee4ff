//! One playback session for one synthesis stream.
//!
//! `AudioSession` is the sink the feed thread writes into. Per chunk it runs
//! demux → decode → ring push synchronously, then raises the readiness flag. The render thread
//! only ever sees the shared playback half (ring, flag, counters) through a
//! [`RenderCallback`]; it never touches the demuxer or decoder.
//!
//! Failures inside the stream are contained here: bad pages are skipped by the demuxer, packets
//! the decoder rejects are logged and dropped, and playback carries on with whatever decoded.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use stream_feed::{ChunkSink, EndReason};
use tracing::{debug, info, warn};

use crate::codec::{OpusPacketDecoder, PacketDecoder};
use crate::container::{CodecPacket, OggDemuxer};
use crate::error::{AudioError, AudioResult};
use crate::render::RenderCallback;
use crate::ring::RingBuffer;
use crate::settings::AudioSettings;
use crate::types::{PlaybackStats, SessionStats};

/// State shared between the feed side and the render side.
#[derive(Debug)]
pub(crate) struct Playback {
    pub ring: RingBuffer,
    pub has_audio: AtomicBool,
    pub periods: AtomicU64,
    pub underruns: AtomicU64,
    pub silent: AtomicU64,
}

impl Playback {
    fn new(settings: &AudioSettings) -> Self {
        Self {
            ring: RingBuffer::new(settings.ring_capacity_samples(), settings.overrun_policy),
            has_audio: AtomicBool::new(false),
            periods: AtomicU64::new(0),
            underruns: AtomicU64::new(0),
            silent: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> PlaybackStats {
        PlaybackStats {
            periods: self.periods.load(Ordering::Relaxed),
            underruns: self.underruns.load(Ordering::Relaxed),
            silent: self.silent.load(Ordering::Relaxed),
        }
    }
}

pub struct AudioSession {
    settings: AudioSettings,
    demuxer: OggDemuxer,
    decoder: Box<dyn PacketDecoder>,
    playback: Arc<Playback>,
    decoded_packets: u64,
    decode_errors: u64,
    decoded_samples: u64,
    finished: bool,
}

impl std::fmt::Debug for AudioSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSession")
            .field("settings", &self.settings)
            .field("serial", &self.demuxer.serial())
            .field("buffered_samples", &self.playback.ring.len())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl AudioSession {
    /// Create a session decoding Ogg/Opus to the format in `settings`.
    ///
    /// Fails if the settings are invalid or libopus cannot produce that format.
    pub fn new(settings: AudioSettings) -> AudioResult<Self> {
        settings.validate()?;
        let decoder = OpusPacketDecoder::new(settings.spec())?;
        Self::with_decoder(settings, Box::new(decoder))
    }

    /// Create a session around a caller-supplied decoder.
    pub fn with_decoder(
        settings: AudioSettings,
        decoder: Box<dyn PacketDecoder>,
    ) -> AudioResult<Self> {
        settings.validate()?;
        if decoder.spec() != settings.spec() {
            return Err(AudioError::InvalidSettings(
                "decoder output format does not match settings",
            ));
        }
        let playback = Arc::new(Playback::new(&settings));
        debug!(
            sample_rate = settings.sample_rate,
            channels = settings.channels,
            ring_samples = playback.ring.capacity(),
            "audio session created"
        );
        Ok(Self {
            settings,
            demuxer: OggDemuxer::new(),
            decoder,
            playback,
            decoded_packets: 0,
            decode_errors: 0,
            decoded_samples: 0,
            finished: false,
        })
    }

    /// Feed raw container bytes. Every packet they complete is decoded into the ring.
    pub fn push(&mut self, bytes: &[u8]) {
        if self.finished {
            debug!(len = bytes.len(), "ignoring bytes after session finished");
            return;
        }
        self.demuxer.push(bytes);
        while let Some(packet) = self.demuxer.next_packet() {
            self.decode_packet(packet);
        }
    }

    fn decode_packet(&mut self, packet: CodecPacket) {
        if packet.starts_stream {
            self.decoder.reset();
        }
        match self.decoder.decode(&packet.data) {
            Ok(pcm) => {
                self.decoded_packets += 1;
                if !pcm.is_empty() {
                    self.decoded_samples += pcm.len() as u64;
                    self.playback.ring.push(pcm);
                    self.playback.has_audio.store(true, Ordering::Release);
                }
            }
            Err(e) => {
                self.decode_errors += 1;
                warn!(
                    serial = packet.serial,
                    len = packet.data.len(),
                    error = %e,
                    "skipping undecodable packet"
                );
            }
        }
    }

    /// End of stream: tear down framing and decoder state. Buffered samples keep playing.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.demuxer.reset();
        self.decoder.reset();
        if !self.playback.ring.is_empty() {
            // An underrun may have lowered the flag; the tail must still play.
            self.playback.has_audio.store(true, Ordering::Release);
        }
        info!(
            packets = self.decoded_packets,
            errors = self.decode_errors,
            samples = self.decoded_samples,
            "audio session finished"
        );
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// A render callback pulling from this session's ring.
    pub fn render_callback(&self) -> RenderCallback {
        RenderCallback::new(Arc::clone(&self.playback), &self.settings)
    }

    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    /// Whether the render side should expect audio.
    pub fn has_audio(&self) -> bool {
        self.playback.has_audio.load(Ordering::Acquire)
    }

    /// Decoded samples waiting to be rendered.
    pub fn buffered_samples(&self) -> usize {
        self.playback.ring.len()
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            demux: self.demuxer.stats(),
            decoded_packets: self.decoded_packets,
            decode_errors: self.decode_errors,
            decoded_samples: self.decoded_samples,
            ring: self.playback.ring.stats(),
            playback: self.playback.stats(),
        }
    }
}

impl ChunkSink for AudioSession {
    fn on_chunk(&mut self, chunk: &Bytes) {
        self.push(chunk);
    }

    fn on_end(&mut self, reason: &EndReason) {
        if !reason.is_completed() {
            warn!(%reason, "synthesis stream ended early");
        }
        self.finish();
    }
}
