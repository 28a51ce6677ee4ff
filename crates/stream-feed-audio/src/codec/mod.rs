//! Packet decoders.
//!
//! A [`PacketDecoder`] turns one compressed packet into interleaved `f32` PCM at a fixed output
//! spec. It is created once per session and runs on the feed thread; the render thread never
//! touches it.

mod opus;

pub use opus::{OpusHead, OpusPacketDecoder};

use crate::error::CodecError;
use crate::types::AudioSpec;

pub trait PacketDecoder: Send {
    /// Output format of every decoded slice.
    fn spec(&self) -> AudioSpec;

    /// Decode one packet.
    ///
    /// The returned slice borrows the decoder's scratch buffer and is valid until the next call.
    /// Stream header packets decode to an empty slice.
    fn decode(&mut self, packet: &[u8]) -> Result<&[f32], CodecError>;

    /// Forget per-stream state before a new logical stream starts.
    fn reset(&mut self);
}

impl<D: PacketDecoder + ?Sized> PacketDecoder for Box<D> {
    fn spec(&self) -> AudioSpec {
        (**self).spec()
    }

    fn decode(&mut self, packet: &[u8]) -> Result<&[f32], CodecError> {
        (**self).decode(packet)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
