//! # ID3v2 Tags
//!
//! Reads the ID3v2 tag that usually opens an MP3 file. The tag header is 10
//! octets laid out as `IIIVVFSSSS`:
//!
//! - `III`: the literal `"ID3"`
//! - `VV`: major version and revision
//! - `F`: flags (`abc00000`: unsynchronisation, extended header, experimental)
//! - `SSSS`: tag size as a synchsafe integer, excluding the header
//!
//! Tag frames are only parsed for major version 3. Other versions yield the
//! tag header with an empty frame list, which is all the section locator needs
//! to skip the tag.

mod content;
mod names;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::buffer::{is_seq, read_str, read_u32_be, TextEncoding};

pub use content::FrameContent;
pub use names::frame_name;

const ID3_MARKER: &[u8] = b"ID3";

/// Length of both the tag header and each tag-frame header.
pub const HEADER_LEN: usize = 10;

/// Decode a synchsafe integer: 7 significant bits per octet, big-endian.
pub fn unsynchsafe(value: u32) -> u32 {
    let mut out = 0;
    let mut mask: u32 = 0x7F00_0000;
    while mask != 0 {
        out >>= 1;
        out |= value & mask;
        mask >>= 8;
    }
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Id3v2Flags {
    pub unsynchronisation: bool,
    pub extended_header: bool,
    pub experimental: bool,
}

impl Id3v2Flags {
    pub fn from_octet(octet: u8) -> Self {
        Self {
            unsynchronisation: octet & 0x80 != 0,
            extended_header: octet & 0x40 != 0,
            experimental: octet & 0x20 != 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Id3v2Tag {
    pub offset: usize,
    pub major_version: u8,
    pub minor_revision: u8,
    pub flags: Id3v2Flags,
    /// Declared tag size, header excluded.
    pub size: u32,
    pub frames: Vec<TagFrame>,
}

impl Id3v2Tag {
    /// Read the ID3v2 tag located at `offset` of `buf`.
    ///
    /// Frame parsing stops at the first zeroed frame id (padding) or at the
    /// first frame that does not fit inside the tag.
    pub fn read(buf: &[u8], offset: usize) -> Option<Self> {
        if buf.len().checked_sub(offset)? < HEADER_LEN {
            return None;
        }
        if !is_seq(ID3_MARKER, buf, offset) {
            return None;
        }

        let mut tag = Self {
            offset,
            major_version: buf[offset + 3],
            minor_revision: buf[offset + 4],
            flags: Id3v2Flags::from_octet(buf[offset + 5]),
            size: unsynchsafe(read_u32_be(buf, offset + 6)?),
            frames: Vec::new(),
        };

        if tag.major_version != 3 {
            trace!(offset, version = tag.major_version, "Skipping frames of unsupported ID3v2 version");
            return Some(tag);
        }

        // Frames never extend past the declared end of the tag.
        let tag_end = tag.next_section_offset().min(buf.len());
        let view = &buf[..tag_end];
        let mut cursor = offset + HEADER_LEN;

        while cursor < tag_end {
            if read_u32_be(view, cursor).map_or(true, |id| id == 0) {
                break;
            }
            let Some(frame) = read_tag_frame(view, cursor) else {
                trace!(cursor, "Unparseable tag frame");
                break;
            };
            cursor += frame.total_length();
            tag.frames.push(frame);
        }

        Some(tag)
    }

    /// Total tag length in octets, header included.
    pub fn byte_length(&self) -> usize {
        self.size as usize + HEADER_LEN
    }

    pub fn next_section_offset(&self) -> usize {
        self.offset + self.byte_length()
    }

    /// First frame with the given id, if any.
    pub fn frame(&self, id: &str) -> Option<&TagFrame> {
        self.frames.iter().find(|frame| frame.id == id)
    }
}

/// A single frame inside an ID3v2.3 tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFrame {
    /// Four-character frame id.
    pub id: String,
    /// Body size, excluding the 10-octet frame header.
    pub size: u32,
    pub flags: [u8; 2],
    /// `None` for an empty body.
    pub content: Option<FrameContent>,
}

impl TagFrame {
    pub fn name(&self) -> Option<&'static str> {
        frame_name(&self.id)
    }

    pub fn total_length(&self) -> usize {
        self.size as usize + HEADER_LEN
    }
}

/// Read the tag frame at `offset` of `buf`. The whole frame must fit in `buf`.
pub(crate) fn read_tag_frame(buf: &[u8], offset: usize) -> Option<TagFrame> {
    let header = buf.get(offset..offset.checked_add(HEADER_LEN)?)?;
    let size = read_u32_be(header, 4)?;

    let body_start = offset + HEADER_LEN;
    let body_end = body_start.checked_add(size as usize)?;
    let body = buf.get(body_start..body_end)?;

    let id = read_str(TextEncoding::Latin1, &header[..4]);
    let content = FrameContent::read(&id, body);

    Some(TagFrame {
        id,
        size,
        flags: [header[8], header[9]],
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synchsafe(value: u32) -> [u8; 4] {
        [
            ((value >> 21) & 0x7F) as u8,
            ((value >> 14) & 0x7F) as u8,
            ((value >> 7) & 0x7F) as u8,
            (value & 0x7F) as u8,
        ]
    }

    fn tag_frame(id: &str, body: &[u8]) -> Vec<u8> {
        let mut out = id.as_bytes().to_vec();
        out.extend((body.len() as u32).to_be_bytes());
        out.extend([0, 0]);
        out.extend(body);
        out
    }

    fn tag(major: u8, flags: u8, frames: &[u8], padding: usize) -> Vec<u8> {
        let size = (frames.len() + padding) as u32;
        let mut out = b"ID3".to_vec();
        out.extend([major, 0, flags]);
        out.extend(synchsafe(size));
        out.extend(frames);
        out.extend(std::iter::repeat(0).take(padding));
        out
    }

    #[test]
    fn test_unsynchsafe() {
        assert_eq!(unsynchsafe(u32::from_be_bytes([0x00, 0x00, 0x02, 0x01])), 257);
        assert_eq!(unsynchsafe(u32::from_be_bytes([0x7F, 0x7F, 0x7F, 0x7F])), 0x0FFF_FFFF);
        assert_eq!(unsynchsafe(u32::from_be_bytes(synchsafe(20))), 20);
    }

    #[test]
    fn test_read_v23_tag() {
        let mut frames = tag_frame("TIT2", b"\0Song");
        frames.extend(tag_frame("TPE1", b"\0Band"));
        let buf = tag(3, 0, &frames, 16);

        let tag = Id3v2Tag::read(&buf, 0).unwrap();
        assert_eq!(tag.major_version, 3);
        assert_eq!(tag.byte_length(), buf.len());
        assert_eq!(tag.frames.len(), 2);

        let title = tag.frame("TIT2").unwrap();
        assert_eq!(title.name(), Some("Title/songname/content description"));
        assert_eq!(title.size, 5);
        assert_eq!(
            title.content,
            Some(FrameContent::Text {
                encoding: TextEncoding::Latin1,
                value: "Song".into()
            })
        );
    }

    #[test]
    fn test_flags() {
        let buf = tag(3, 0b1010_0000, &[], 0);
        let tag = Id3v2Tag::read(&buf, 0).unwrap();
        assert!(tag.flags.unsynchronisation);
        assert!(!tag.flags.extended_header);
        assert!(tag.flags.experimental);
    }

    #[test]
    fn test_other_versions_skip_frames() {
        let frames = tag_frame("TIT2", b"\0Song");
        let buf = tag(4, 0, &frames, 0);

        let tag = Id3v2Tag::read(&buf, 0).unwrap();
        assert_eq!(tag.major_version, 4);
        assert!(tag.frames.is_empty());
        assert_eq!(tag.byte_length(), buf.len());
    }

    #[test]
    fn test_requires_header() {
        assert!(Id3v2Tag::read(b"ID3\x03\x00\x00\x00\x00\x00", 0).is_none());
        assert!(Id3v2Tag::read(b"ID4\x03\x00\x00\x00\x00\x00\x00", 0).is_none());
        assert!(Id3v2Tag::read(b"ID3", 10).is_none());
    }

    #[test]
    fn test_frame_overrunning_tag_stops_parsing() {
        let mut frames = tag_frame("TIT2", b"\0Song");
        // Declares 100 body octets but the tag ends first
        frames.extend(b"TPE1\x00\x00\x00\x64\x00\x00\x00Band");
        let buf = tag(3, 0, &frames, 0);

        let tag = Id3v2Tag::read(&buf, 0).unwrap();
        assert_eq!(tag.frames.len(), 1);
    }

    #[test]
    fn test_empty_frame_has_no_content() {
        let frames = tag_frame("TIT2", b"");
        let buf = tag(3, 0, &frames, 4);

        let tag = Id3v2Tag::read(&buf, 0).unwrap();
        assert_eq!(tag.frames.len(), 1);
        assert_eq!(tag.frames[0].content, None);
    }
}
