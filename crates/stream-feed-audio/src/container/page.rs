//! Page framing on top of `ogg`'s [`PageParser`].
//!
//! [`parse`] decides whether a buffered page is complete and hands it to the parser, which
//! splits the lacing and verifies the checksum. The handful of header fields the demuxer bases
//! its recovery policy on are peeked here:
//!
//! ```text
//!  0  capture pattern "OggS"
//!  4  version (0)
//!  5  header type flags
//! 14  bitstream serial (u32 LE)
//! 18  page sequence (u32 LE)
//! 26  segment count
//! 27  lacing table, then body
//! ```

use std::fmt;

use ogg::reading::{OggPage, PageParser};

use crate::error::PageError;

pub(crate) const CAPTURE: &[u8; 4] = b"OggS";
pub(crate) const HEADER_LEN: usize = 27;

const FLAG_CONTINUED: u8 = 0x01;
const FLAG_BOS: u8 = 0x02;
const FLAG_EOS: u8 = 0x04;

/// Header fields the demuxer makes decisions on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageHeader {
    pub flags: u8,
    pub serial: u32,
    pub sequence: u32,
    /// The last packet on this page continues on the next one.
    pub ends_open: bool,
}

impl PageHeader {
    pub fn is_continued(&self) -> bool {
        self.flags & FLAG_CONTINUED != 0
    }

    pub fn is_bos(&self) -> bool {
        self.flags & FLAG_BOS != 0
    }

    pub fn is_eos(&self) -> bool {
        self.flags & FLAG_EOS != 0
    }
}

/// Outcome of trying to parse a page at the start of a buffer.
pub(crate) enum Parsed {
    /// Not enough bytes yet.
    Incomplete,
    /// Starts with a capture pattern but is not a valid page.
    Invalid(PageError),
    /// A complete, verified page of `len` bytes.
    Page {
        header: PageHeader,
        page: OggPage,
        len: usize,
    },
}

impl fmt::Debug for Parsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incomplete => f.write_str("Incomplete"),
            Self::Invalid(e) => f.debug_tuple("Invalid").field(e).finish(),
            Self::Page { header, len, .. } => f
                .debug_struct("Page")
                .field("header", header)
                .field("len", len)
                .finish_non_exhaustive(),
        }
    }
}

/// Parse the page at the start of `buf`, which must begin with [`CAPTURE`].
pub(crate) fn parse(buf: &[u8]) -> Parsed {
    debug_assert!(buf.starts_with(CAPTURE));
    let Some(head) = buf.get(..HEADER_LEN) else {
        return Parsed::Incomplete;
    };
    let mut header_buf = [0u8; HEADER_LEN];
    header_buf.copy_from_slice(head);

    let (mut parser, segments) = match PageParser::new(header_buf) {
        Ok(parsed) => parsed,
        Err(e) => return Parsed::Invalid(e.into()),
    };
    let Some(lacing) = buf.get(HEADER_LEN..HEADER_LEN + segments) else {
        return Parsed::Incomplete;
    };

    let header = PageHeader {
        flags: header_buf[5],
        serial: le_u32(&header_buf, 14),
        sequence: le_u32(&header_buf, 18),
        ends_open: lacing.last() == Some(&255),
    };
    // The packet reader assumes a continued page carries at least its fragment.
    if header.is_continued() && lacing.is_empty() {
        return Parsed::Invalid(PageError::Malformed(
            "continued page without segments".into(),
        ));
    }

    let body_start = HEADER_LEN + segments;
    let len = body_start + parser.parse_segments(lacing.to_vec());
    let Some(body) = buf.get(body_start..len) else {
        return Parsed::Incomplete;
    };

    match parser.parse_packet_data(body.to_vec()) {
        Ok(page) => Parsed::Page { header, page, len },
        Err(e) => Parsed::Invalid(e.into()),
    }
}

fn le_u32(header: &[u8; HEADER_LEN], at: usize) -> u32 {
    u32::from_le_bytes([header[at], header[at + 1], header[at + 2], header[at + 3]])
}
