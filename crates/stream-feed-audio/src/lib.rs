//! Real-time playback of streamed Ogg/Opus speech.
//!
//! This crate is the audio side of the `stream-feed` workspace. Synthesized speech arrives as
//! an Ogg/Opus byte stream in arbitrary network chunks; the audio device wants a fixed number of
//! PCM frames on every callback, on its own clock. Between the two:
//!
//! ```text
//! feed task ──bytes──▶ OggDemuxer ──packets──▶ PacketDecoder ──PCM──▶ RingBuffer
//!                                                                        │
//!                               audio device ◀──period── RenderCallback ◀┘
//! ```
//!
//! Design notes:
//! - The feed side ([`AudioSession`]) and the render side ([`RenderCallback`]) share only the ring,
//!   a readiness flag and counters. Decoding happens entirely on the feed side.
//! - Nothing inside the stream is fatal. Bad pages are resynchronized past, undecodable packets
//!   are dropped, and when the ring runs dry the render side plays silence.
//! - Construction is the only fallible step ([`AudioError`]).
//!
//! Optional features:
//! - `rodio`: [`RodioSourceAdapter`], a `rodio::Source` rendering one period at a time.

mod codec;
mod container;
mod error;
mod render;
mod ring;
mod session;
mod settings;
mod types;

#[cfg(feature = "rodio")]
mod rodio;

pub use crate::codec::{OpusHead, OpusPacketDecoder, PacketDecoder};
pub use crate::container::{CodecPacket, DemuxStats, OggDemuxer};
pub use crate::error::{AudioError, AudioResult, CodecError, PageError};
pub use crate::render::RenderCallback;
pub use crate::ring::{OverrunPolicy, RingBuffer, RingStats};
pub use crate::session::AudioSession;
pub use crate::settings::AudioSettings;
pub use crate::types::{AudioSpec, PlaybackStats, RenderOutcome, SessionStats};

#[cfg(feature = "rodio")]
pub use crate::rodio::RodioSourceAdapter;
