//! Frame scanner: a validated header plus its derived extent.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::buffer::is_seq;
use crate::header::{Bitrate, FrameHeader};
use crate::xing::{INFO_MARKER, XING_MARKER};

/// A single MPEG audio frame located in a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub header: FrameHeader,
    /// Offset of the frame's first octet.
    pub offset: usize,
    /// Total length of the frame in octets, header included.
    pub byte_length: usize,
    /// Samples per channel carried by this frame.
    pub sample_length: u32,
    /// Offset at which the following frame is expected to start.
    pub next_frame_offset: usize,
}

impl Frame {
    /// Read the frame located at `offset` of `buf`.
    ///
    /// Rejects free-format frames (their length cannot be derived from the
    /// header) and Xing/Info pseudo frames. When `require_next` is set, a valid
    /// header must also start where this frame ends.
    pub fn read(buf: &[u8], offset: usize, require_next: bool) -> Option<Self> {
        let header = FrameHeader::read(buf, offset)?;

        if header.bitrate == Bitrate::Free {
            trace!(offset, "Skipping free-format frame");
            return None;
        }

        let byte_length = header.frame_byte_length();
        let next_frame_offset = offset + byte_length;

        let marker_offset = offset + header.xing_offset();
        if is_seq(XING_MARKER, buf, marker_offset) || is_seq(INFO_MARKER, buf, marker_offset) {
            trace!(offset, "Frame is a Xing/Info tag");
            return None;
        }

        if require_next && FrameHeader::read(buf, next_frame_offset).is_none() {
            trace!(offset, next_frame_offset, "No valid header follows frame");
            return None;
        }

        Some(Self {
            sample_length: header.sample_length(),
            header,
            offset,
            byte_length,
            next_frame_offset,
        })
    }

    /// Search backwards from `from` (default: the last octet) for the last
    /// readable frame.
    ///
    /// Only offsets holding `0xFF` are tried. With `require_next` the result
    /// is the next-to-last frame of a well-formed stream.
    pub fn read_last(buf: &[u8], from: Option<usize>, require_next: bool) -> Option<Self> {
        let last = buf.len().checked_sub(1)?;
        let start = from.map_or(last, |from| from.min(last));

        (0..=start)
            .rev()
            .filter(|&offset| buf[offset] == 0xFF)
            .find_map(|offset| Self::read(buf, offset, require_next))
    }

    /// Channel count implied by the header's channel mode.
    pub fn channel_count(&self) -> u16 {
        self.header.channel_mode.channel_count()
    }
}
