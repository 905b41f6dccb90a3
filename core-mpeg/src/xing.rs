//! Xing / Info (LAME) pseudo frames.
//!
//! A Xing tag is laid out exactly like an audio frame but carries encoder
//! metadata instead of audio. It is recognised by a `"Xing"` (VBR) or `"Info"`
//! (CBR) marker sitting right after the side information, whose position
//! depends on the MPEG version and channel mode.

use serde::{Deserialize, Serialize};

use crate::buffer::is_seq;
use crate::header::FrameHeader;

pub(crate) const XING_MARKER: &[u8] = b"Xing";
pub(crate) const INFO_MARKER: &[u8] = b"Info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum XingIdentifier {
    Xing,
    Info,
}

impl XingIdentifier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Xing => "Xing",
            Self::Info => "Info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XingTag {
    pub header: FrameHeader,
    pub identifier: XingIdentifier,
    pub offset: usize,
    pub byte_length: usize,
}

impl XingTag {
    /// Read the Xing/Info tag located at `offset` of `buf`.
    pub fn read(buf: &[u8], offset: usize) -> Option<Self> {
        let header = FrameHeader::read(buf, offset)?;
        let marker_offset = offset + header.xing_offset();

        if buf.len() < marker_offset + XING_MARKER.len() {
            return None;
        }

        let identifier = if is_seq(XING_MARKER, buf, marker_offset) {
            XingIdentifier::Xing
        } else if is_seq(INFO_MARKER, buf, marker_offset) {
            XingIdentifier::Info
        } else {
            return None;
        };

        let byte_length = header.frame_byte_length();

        Some(Self {
            header,
            identifier,
            offset,
            byte_length,
        })
    }

    pub fn next_frame_offset(&self) -> usize {
        self.offset + self.byte_length
    }
}
