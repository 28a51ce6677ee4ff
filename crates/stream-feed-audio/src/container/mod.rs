//! Ogg container layer: page framing and the packet demuxer.

mod demux;
mod page;


pub use demux::{CodecPacket, DemuxStats, OggDemuxer};
