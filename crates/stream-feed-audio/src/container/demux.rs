//! Incremental Ogg demuxer for a single logical stream.
//!
//! Bytes go in through [`OggDemuxer::push`] in arbitrary chunks; complete codec packets come out
//! of [`OggDemuxer::next_packet`] in stream order. Pages are verified by `ogg`'s page parser and
//! reassembled into packets by its [`BasePacketReader`]. The demuxer tracks exactly one logical
//! stream at a time: a page with a different serial replaces it.
//!
//! Recovery rules:
//! - Garbage and pages that fail to parse are skipped by scanning for the next capture pattern.
//! - A continued page with nothing pending (joining mid-stream, or after a lost page) drops its
//!   leading fragment, since the start of that packet is gone.
//! - A page-sequence gap drops the pending partial packet.
//! - An end-of-stream page clears the logical stream.

use std::collections::VecDeque;
use std::fmt;

use bytes::{Buf, Bytes, BytesMut};
use ogg::reading::{BasePacketReader, OggPage};
use tracing::{debug, info, warn};

use super::page::{self, PageHeader, Parsed, CAPTURE};

/// One complete codec packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecPacket {
    pub data: Bytes,
    /// Serial of the logical stream the packet belongs to.
    pub serial: u32,
    /// Granule position of the page, on the last packet completed by that page.
    pub granule: Option<u64>,
    /// First packet produced for this logical stream.
    pub starts_stream: bool,
}

/// Demuxer counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DemuxStats {
    /// Pages accepted.
    pub pages: u64,
    /// Packets emitted.
    pub packets: u64,
    /// Bytes discarded while searching for a capture pattern.
    pub skipped_bytes: u64,
    /// Pages rejected by version, checksum or structure.
    pub bad_pages: u64,
    /// Times a new serial replaced the tracked logical stream.
    pub stream_resets: u64,
}

#[derive(Debug)]
struct LogicalStream {
    serial: u32,
    next_sequence: u32,
    /// The last accepted page ended inside a packet.
    open: bool,
    /// No packet has been emitted for this stream yet.
    fresh: bool,
}

impl LogicalStream {
    fn new(header: &PageHeader) -> Self {
        Self {
            serial: header.serial,
            next_sequence: header.sequence,
            open: false,
            fresh: true,
        }
    }
}

pub struct OggDemuxer {
    sync: BytesMut,
    stream: Option<LogicalStream>,
    reader: BasePacketReader,
    ready: VecDeque<CodecPacket>,
    stats: DemuxStats,
}

impl fmt::Debug for OggDemuxer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OggDemuxer")
            .field("buffered", &self.sync.len())
            .field("stream", &self.stream)
            .field("ready", &self.ready.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Default for OggDemuxer {
    fn default() -> Self {
        Self {
            sync: BytesMut::new(),
            stream: None,
            reader: BasePacketReader::new(),
            ready: VecDeque::new(),
            stats: DemuxStats::default(),
        }
    }
}

impl OggDemuxer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw container bytes and extract every page they complete.
    pub fn push(&mut self, data: &[u8]) {
        self.sync.extend_from_slice(data);

        loop {
            if !self.resync() {
                return;
            }
            match page::parse(&self.sync) {
                Parsed::Incomplete => return,
                Parsed::Invalid(e) => {
                    self.stats.bad_pages += 1;
                    warn!(error = %e, "dropping invalid page, resynchronizing");
                    // Step past this capture pattern and search again.
                    self.sync.advance(1);
                    self.stats.skipped_bytes += 1;
                }
                Parsed::Page { header, page, len } => {
                    self.sync.advance(len);
                    self.accept(header, page);
                }
            }
        }
    }

    /// Pop the next complete packet.
    pub fn next_packet(&mut self) -> Option<CodecPacket> {
        self.ready.pop_front()
    }

    /// Serial of the tracked logical stream.
    pub fn serial(&self) -> Option<u32> {
        self.stream.as_ref().map(|s| s.serial)
    }

    /// Bytes held waiting for a complete page.
    pub fn buffered(&self) -> usize {
        self.sync.len()
    }

    pub fn stats(&self) -> DemuxStats {
        self.stats
    }

    /// Forget all framing state. Counters are kept.
    pub fn reset(&mut self) {
        self.sync.clear();
        self.stream = None;
        self.reader = BasePacketReader::new();
        self.ready.clear();
    }

    /// Align `sync` to a capture pattern. Returns `false` if none is buffered.
    fn resync(&mut self) -> bool {
        if self.sync.starts_with(CAPTURE) {
            return true;
        }
        let found = self
            .sync
            .windows(CAPTURE.len())
            .position(|w| w == CAPTURE);
        let skip = match found {
            Some(pos) => pos,
            // Keep a possible partial capture pattern at the end.
            None => self.sync.len().saturating_sub(CAPTURE.len() - 1),
        };
        if skip > 0 {
            debug!(bytes = skip, "skipping bytes outside any page");
            self.sync.advance(skip);
            self.stats.skipped_bytes += skip as u64;
        }
        found.is_some()
    }

    fn accept(&mut self, header: PageHeader, page: OggPage) {
        self.stats.pages += 1;

        let (stream, in_order) = match &mut self.stream {
            Some(s) if s.serial == header.serial => {
                let in_order = if header.sequence != s.next_sequence {
                    warn!(
                        serial = s.serial,
                        expected = s.next_sequence,
                        got = header.sequence,
                        "page sequence gap"
                    );
                    false
                } else if header.is_continued() != s.open {
                    debug!(
                        continued = header.is_continued(),
                        pending = s.open,
                        "page does not continue the pending packet"
                    );
                    false
                } else {
                    !header.is_bos()
                };
                (s, in_order)
            }
            tracked => {
                if let Some(old) = tracked.as_ref() {
                    self.stats.stream_resets += 1;
                    info!(
                        old = old.serial,
                        new = header.serial,
                        "logical stream replaced"
                    );
                } else {
                    info!(
                        serial = header.serial,
                        bos = header.is_bos(),
                        "logical stream started"
                    );
                }
                self.reader = BasePacketReader::new();
                let in_order = header.is_bos() && !header.is_continued();
                (tracked.insert(LogicalStream::new(&header)), in_order)
            }
        };
        stream.next_sequence = header.sequence.wrapping_add(1);
        stream.open = header.ends_open;

        if !in_order {
            // Drops any pending partial packet; the page's leading fragment goes with it.
            self.reader.update_after_seek();
        }
        if let Err(e) = self.reader.push_page(page) {
            self.stats.bad_pages += 1;
            warn!(error = %e, "page rejected by packet reader");
            self.reader.update_after_seek();
            return;
        }

        while let Some(packet) = self.reader.read_packet() {
            if packet.data.is_empty() {
                continue;
            }
            let granule = packet
                .last_in_page()
                .then(|| packet.absgp_page())
                // -1 means no packet finishes on the page.
                .filter(|&g| i64::try_from(g).is_ok());
            self.ready.push_back(CodecPacket {
                serial: packet.stream_serial(),
                granule,
                starts_stream: std::mem::take(&mut stream.fresh),
                data: Bytes::from(packet.data),
            });
            self.stats.packets += 1;
        }

        if header.is_eos() {
            if header.ends_open {
                debug!("dropping unterminated packet at end of stream");
            }
            info!(serial = header.serial, "logical stream ended");
            self.stream = None;
            self.reader = BasePacketReader::new();
        }
    }
}
