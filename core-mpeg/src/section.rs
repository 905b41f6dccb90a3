//! Leading-section locator.
//!
//! Walks a buffer from its start and records every ID3v2 tag and Xing/Info
//! tag up to and including the first real audio frame. Offsets where nothing
//! parses are skipped one octet at a time, so leading garbage is tolerated at
//! the cost of a brute-force sync search.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::frame::Frame;
use crate::id3v2::Id3v2Tag;
use crate::xing::XingTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    Id3v2,
    Xing,
    Frame,
}

/// A structural section located in an MP3 buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    Id3v2(Id3v2Tag),
    Xing(XingTag),
    Frame(Frame),
}

impl Section {
    /// Try each reader in turn at `offset`: ID3v2 tag, Xing tag, frame.
    pub fn read(buf: &[u8], offset: usize) -> Option<Self> {
        Id3v2Tag::read(buf, offset)
            .map(Self::Id3v2)
            .or_else(|| XingTag::read(buf, offset).map(Self::Xing))
            .or_else(|| Frame::read(buf, offset, false).map(Self::Frame))
    }

    pub fn kind(&self) -> SectionKind {
        match self {
            Self::Id3v2(_) => SectionKind::Id3v2,
            Self::Xing(_) => SectionKind::Xing,
            Self::Frame(_) => SectionKind::Frame,
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            Self::Id3v2(tag) => tag.offset,
            Self::Xing(tag) => tag.offset,
            Self::Frame(frame) => frame.offset,
        }
    }

    pub fn byte_length(&self) -> usize {
        match self {
            Self::Id3v2(tag) => tag.byte_length(),
            Self::Xing(tag) => tag.byte_length,
            Self::Frame(frame) => frame.byte_length,
        }
    }

    pub fn as_frame(&self) -> Option<&Frame> {
        match self {
            Self::Frame(frame) => Some(frame),
            _ => None,
        }
    }
}

/// Locate every leading tag and the first audio frame of `buf`.
///
/// The returned sections are in buffer order. If a frame was found it is the
/// last element; otherwise the whole buffer was scanned without finding one.
pub fn read_leading_sections(buf: &[u8]) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut offset = 0;

    while offset < buf.len() {
        let Some(section) = Section::read(buf, offset) else {
            offset += 1;
            continue;
        };

        debug!(
            kind = ?section.kind(),
            offset,
            byte_length = section.byte_length(),
            "Located section"
        );

        // Zero-length sections would otherwise be re-read forever.
        offset += section.byte_length().max(1);

        let is_frame = section.kind() == SectionKind::Frame;
        sections.push(section);
        if is_frame {
            return sections;
        }
    }

    trace!(len = buf.len(), "No audio frame found");
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];

    fn frame() -> Vec<u8> {
        let mut frame = vec![0u8; 417];
        frame[..4].copy_from_slice(&FRAME_HEADER);
        frame
    }

    fn xing_frame() -> Vec<u8> {
        let mut frame = frame();
        frame[36..40].copy_from_slice(b"Info");
        frame
    }

    fn id3_tag(size: u8) -> Vec<u8> {
        let mut tag = b"ID3\x03\x00\x00\x00\x00\x00".to_vec();
        tag.push(size);
        tag.extend(std::iter::repeat(0).take(size as usize));
        tag
    }

    #[test]
    fn test_frame_at_start() {
        let mut buf = frame();
        buf.extend(frame());

        let sections = read_leading_sections(&buf);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].kind(), SectionKind::Frame);
        assert_eq!(sections[0].offset(), 0);
    }

    #[test]
    fn test_tags_then_frame() {
        let mut buf = id3_tag(20);
        buf.extend(xing_frame());
        buf.extend(frame());
        buf.extend(frame());

        let sections = read_leading_sections(&buf);
        let kinds: Vec<_> = sections.iter().map(Section::kind).collect();
        assert_eq!(kinds, [SectionKind::Id3v2, SectionKind::Xing, SectionKind::Frame]);
        assert_eq!(sections[1].offset(), 30);
        assert_eq!(sections[2].offset(), 30 + 417);
        assert_eq!(sections[2].as_frame().map(|f| f.byte_length), Some(417));
    }

    #[test]
    fn test_skips_leading_garbage() {
        let mut buf = vec![0x12, 0xFF, 0x00, 0x34, 0x56];
        buf.extend(frame());
        buf.extend(frame());

        let sections = read_leading_sections(&buf);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].offset(), 5);
    }

    #[test]
    fn test_no_frame_found() {
        let mut buf = id3_tag(4);
        buf.extend([0u8; 64]);

        let sections = read_leading_sections(&buf);
        assert_eq!(sections.len(), 1);
        assert!(sections.iter().find_map(Section::as_frame).is_none());
    }

    #[test]
    fn test_empty_buffer() {
        assert!(read_leading_sections(&[]).is_empty());
    }
}
