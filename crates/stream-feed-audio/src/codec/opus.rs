//! Opus packet decoder backed by libopus through `audiopus`.
//!
//! Opus in Ogg starts every logical stream with two header packets, `OpusHead` and `OpusTags`.
//! Both are recognised by their magic signature and decode to nothing. `OpusHead` carries the
//! pre-skip: decoder priming samples (in 48 kHz units) that must be dropped from the start of
//! the decoded audio.
//!
//! libopus decodes directly to any of its supported rates, so the output spec is fixed at
//! construction and never changes. The libopus handle lives for the whole session; [`reset`]
//! clears its internal state along with the header state, so nothing of one logical stream
//! leaks into the next.
//!
//! [`reset`]: crate::PacketDecoder::reset

use audiopus::coder::{Decoder, GenericCtl};
use audiopus::{packet::Packet, Channels, MutSignals, SampleRate};
use tracing::{debug, warn};

use super::PacketDecoder;
use crate::error::{AudioError, AudioResult, CodecError};
use crate::types::AudioSpec;

const OPUS_HEAD: &[u8] = b"OpusHead";
const OPUS_TAGS: &[u8] = b"OpusTags";
const OPUS_HEAD_LEN: usize = 19;

/// Largest Opus packet duration.
const MAX_PACKET_MS: usize = 120;

/// Fields of an `OpusHead` packet that matter for playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpusHead {
    pub channels: u8,
    /// In 48 kHz samples.
    pub pre_skip: u16,
    pub input_sample_rate: u32,
    pub output_gain: i16,
    pub mapping_family: u8,
}

impl OpusHead {
    pub fn parse(packet: &[u8]) -> Result<Self, CodecError> {
        if packet.len() < OPUS_HEAD_LEN || !packet.starts_with(OPUS_HEAD) {
            return Err(CodecError::Header("OpusHead too short"));
        }
        // Major version must be 0; the minor nibble may grow compatibly.
        if packet[8] >> 4 != 0 {
            return Err(CodecError::Header("unsupported OpusHead version"));
        }
        let channels = packet[9];
        if channels == 0 {
            return Err(CodecError::Header("OpusHead declares zero channels"));
        }
        Ok(Self {
            channels,
            pre_skip: u16::from_le_bytes([packet[10], packet[11]]),
            input_sample_rate: u32::from_le_bytes([
                packet[12], packet[13], packet[14], packet[15],
            ]),
            output_gain: i16::from_le_bytes([packet[16], packet[17]]),
            mapping_family: packet[18],
        })
    }
}

pub struct OpusPacketDecoder {
    decoder: Decoder,
    spec: AudioSpec,
    /// Frames still to drop from the start of the stream, at the output rate.
    pre_skip: usize,
    head: Option<OpusHead>,
    /// Scratch output, large enough for the longest packet.
    pcm: Vec<f32>,
}

impl std::fmt::Debug for OpusPacketDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpusPacketDecoder")
            .field("spec", &self.spec)
            .field("pre_skip", &self.pre_skip)
            .field("head", &self.head)
            .finish_non_exhaustive()
    }
}

impl OpusPacketDecoder {
    /// Create a decoder producing `spec`.
    ///
    /// Supported: 8, 12, 16, 24 or 48 kHz; 1 or 2 channels.
    pub fn new(spec: AudioSpec) -> AudioResult<Self> {
        let unsupported = AudioError::UnsupportedFormat {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        };
        let rate = match spec.sample_rate {
            8000 => SampleRate::Hz8000,
            12000 => SampleRate::Hz12000,
            16000 => SampleRate::Hz16000,
            24000 => SampleRate::Hz24000,
            48000 => SampleRate::Hz48000,
            _ => return Err(unsupported),
        };
        let channels = match spec.channels {
            1 => Channels::Mono,
            2 => Channels::Stereo,
            _ => return Err(unsupported),
        };

        let decoder =
            Decoder::new(rate, channels).map_err(|e| AudioError::CodecInit(e.to_string()))?;

        let max_samples = spec.sample_rate as usize * MAX_PACKET_MS / 1000 * spec.channels as usize;
        debug!(
            sample_rate = spec.sample_rate,
            channels = spec.channels,
            "opus decoder created"
        );
        Ok(Self {
            decoder,
            spec,
            pre_skip: 0,
            head: None,
            pcm: vec![0.0; max_samples],
        })
    }

    /// Header of the current logical stream, once seen.
    pub fn head(&self) -> Option<&OpusHead> {
        self.head.as_ref()
    }

    fn on_head(&mut self, packet: &[u8]) -> Result<(), CodecError> {
        let head = OpusHead::parse(packet)?;
        if u16::from(head.channels) != self.spec.channels {
            warn!(
                stream = head.channels,
                output = self.spec.channels,
                "stream channel count differs from output; libopus will remix"
            );
        }
        self.pre_skip = head.pre_skip as usize * self.spec.sample_rate as usize / 48_000;
        debug!(
            pre_skip = head.pre_skip,
            input_rate = head.input_sample_rate,
            "OpusHead"
        );
        self.head = Some(head);
        Ok(())
    }
}

impl PacketDecoder for OpusPacketDecoder {
    fn spec(&self) -> AudioSpec {
        self.spec
    }

    fn decode(&mut self, packet: &[u8]) -> Result<&[f32], CodecError> {
        if packet.is_empty() {
            return Err(CodecError::Empty);
        }
        if packet.starts_with(OPUS_HEAD) {
            self.on_head(packet)?;
            return Ok(&[]);
        }
        if packet.starts_with(OPUS_TAGS) {
            return Ok(&[]);
        }

        let input = Packet::try_from(packet).map_err(|e| CodecError::Opus(e.to_string()))?;
        let output = MutSignals::try_from(&mut self.pcm[..])
            .map_err(|e| CodecError::Opus(e.to_string()))?;
        let frames = self
            .decoder
            .decode_float(Some(input), output, false)
            .map_err(|e| CodecError::Opus(e.to_string()))?;

        let skip = frames.min(self.pre_skip);
        self.pre_skip -= skip;

        let channels = self.spec.channels as usize;
        Ok(&self.pcm[skip * channels..frames * channels])
    }

    fn reset(&mut self) {
        if let Err(e) = self.decoder.reset_state() {
            warn!(error = %e, "failed to reset opus decoder state");
        }
        self.pre_skip = 0;
        self.head = None;
    }
}
