//! Test fixtures for stream-feed-audio integration tests.
//!
//! Provides REAL Ogg/Opus data: PCM is encoded with libopus (`audiopus`) and containerized with
//! the independent `ogg` crate, so the demuxer and decoder under test never read bytes produced
//! by their own code.

#![allow(dead_code)]

use std::time::Duration;

use audiopus::coder::Encoder;
use audiopus::{Application, Channels, SampleRate};
use axum::routing::get;
use axum::Router;
use bytes::Bytes;
use ogg::writing::{PacketWriteEndInfo, PacketWriter};

use super::setup;

/// Output rate used by every fixture stream (and by `AudioSettings::default()`).
pub const RATE: u32 = 24_000;
/// One 20 ms packet at [`RATE`], mono.
pub const FRAMES_PER_PACKET: usize = 480;
/// Pre-skip written into fixture `OpusHead`s, in 48 kHz units.
pub const PRE_SKIP_48K: u16 = 312;
/// The same pre-skip at [`RATE`].
pub const PRE_SKIP: usize = PRE_SKIP_48K as usize * RATE as usize / 48_000;

/// A packet libopus always rejects: code-3 TOC claiming 63 frames of 20 ms.
pub const INVALID_PACKET: [u8; 2] = [0xff, 0xff];

/// Helper for building Ogg/Opus test streams.
pub struct OpusFixture;

impl OpusFixture {
    /// Encode `packets` 20 ms packets of a sine tone at 24 kHz mono.
    pub fn tone_packets(freq_hz: f32, packets: usize) -> Vec<Vec<u8>> {
        let encoder = Encoder::new(SampleRate::Hz24000, Channels::Mono, Application::Voip)
            .expect("failed to create opus encoder");
        let mut out = Vec::with_capacity(packets);
        for p in 0..packets {
            let pcm: Vec<i16> = (0..FRAMES_PER_PACKET)
                .map(|i| {
                    let t = (p * FRAMES_PER_PACKET + i) as f32 / RATE as f32;
                    let s = (2.0 * std::f32::consts::PI * freq_hz * t).sin() * 0.5;
                    (s * i16::MAX as f32) as i16
                })
                .collect();
            let mut buf = vec![0u8; 4000];
            let n = encoder.encode(&pcm, &mut buf).expect("opus encode failed");
            buf.truncate(n);
            out.push(buf);
        }
        out
    }

    /// 19-byte `OpusHead` for a mono stream.
    pub fn opus_head(pre_skip: u16) -> Vec<u8> {
        let mut head = b"OpusHead".to_vec();
        head.push(1); // version
        head.push(1); // channels
        head.extend_from_slice(&pre_skip.to_le_bytes());
        head.extend_from_slice(&RATE.to_le_bytes());
        head.extend_from_slice(&0i16.to_le_bytes()); // output gain
        head.push(0); // mapping family
        head
    }

    pub fn opus_tags() -> Vec<u8> {
        let vendor = b"stream-feed-tests";
        let mut tags = b"OpusTags".to_vec();
        tags.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
        tags.extend_from_slice(vendor);
        tags.extend_from_slice(&0u32.to_le_bytes());
        tags
    }

    /// Containerize `packets` as one logical stream.
    ///
    /// With `headers`, the stream starts with `OpusHead` and `OpusTags` on their own pages, as
    /// real encoders write it. Audio packets are grouped `per_page` to a page.
    pub fn ogg_stream(serial: u32, packets: &[Vec<u8>], headers: bool, per_page: usize) -> Vec<u8> {
        let mut writer = PacketWriter::new(Vec::new());
        if headers {
            writer
                .write_packet(Self::opus_head(PRE_SKIP_48K), serial, PacketWriteEndInfo::EndPage, 0)
                .expect("write OpusHead");
            writer
                .write_packet(Self::opus_tags(), serial, PacketWriteEndInfo::EndPage, 0)
                .expect("write OpusTags");
        }

        let per_page = per_page.max(1);
        for (i, packet) in packets.iter().enumerate() {
            let granule = ((i + 1) * FRAMES_PER_PACKET * 2) as u64; // 48 kHz units
            let end = if i + 1 == packets.len() {
                PacketWriteEndInfo::EndStream
            } else if (i + 1) % per_page == 0 {
                PacketWriteEndInfo::EndPage
            } else {
                PacketWriteEndInfo::NormalPacket
            };
            writer
                .write_packet(packet.clone(), serial, end, granule)
                .expect("write audio packet");
        }
        writer.into_inner()
    }

    /// A complete speech-like stream: headers plus `packets` tone packets.
    pub fn speech(serial: u32, packets: usize) -> Vec<u8> {
        Self::ogg_stream(serial, &Self::tone_packets(440.0, packets), true, 5)
    }

    /// Samples a session should buffer for `Self::speech(_, packets)`.
    pub fn expected_samples(packets: usize) -> usize {
        packets * FRAMES_PER_PACKET - PRE_SKIP
    }

    /// Verify that PCM samples are not silence.
    ///
    /// At least 10% of samples should be above a small threshold.
    pub fn verify_samples_not_silence(samples: &[f32]) -> bool {
        if samples.is_empty() {
            return false;
        }
        let threshold = 0.01;
        let loud = samples.iter().filter(|&&s| s.abs() > threshold).count();
        loud * 10 >= samples.len()
    }
}

/// Serves a synthesized stream at `/v1/audio/speech` in paced chunks.
pub struct SpeechServer {
    chunks: Vec<Bytes>,
    pace: Duration,
}

impl SpeechServer {
    pub fn new(data: &[u8], chunk_len: usize, pace: Duration) -> Self {
        Self {
            chunks: setup::split(data, chunk_len),
            pace,
        }
    }

    pub fn router(&self) -> Router {
        let chunks = self.chunks.clone();
        let pace = self.pace;
        Router::new().route(
            "/v1/audio/speech",
            get(move || {
                let chunks = chunks.clone();
                async move { setup::paced_body(chunks, pace) }
            }),
        )
    }

    pub async fn start(&self) -> reqwest::Url {
        let base = setup::serve(self.router()).await;
        base.join("v1/audio/speech").expect("valid speech url")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ogg_stream_starts_with_capture_pattern() {
        let data = OpusFixture::speech(1, 3);
        assert_eq!(&data[..4], b"OggS");
        // BOS flag on the first page.
        assert_eq!(data[5] & 0x02, 0x02);
    }

    #[test]
    fn silence_detector() {
        assert!(!OpusFixture::verify_samples_not_silence(&[]));
        assert!(!OpusFixture::verify_samples_not_silence(&[0.0; 100]));
        assert!(OpusFixture::verify_samples_not_silence(&[0.5; 100]));
    }
}
