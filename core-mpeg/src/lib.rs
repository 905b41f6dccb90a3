//! # MPEG Audio Container Parser
//!
//! Byte-level readers for the structural sections of an MP3 stream:
//!
//! - [`FrameHeader`]: the 4-octet MPEG audio frame header
//! - [`Frame`]: a header plus its derived byte length and sample count
//! - [`Id3v2Tag`]: a leading ID3v2 tag, including v2.3 tag frames
//! - [`XingTag`]: a Xing/Info (LAME) pseudo frame carrying encoder metadata
//! - [`read_leading_sections`]: every tag up to and including the first audio frame
//!
//! ## Probing Model
//!
//! Every reader takes the whole buffer plus an offset and returns `Option<_>`.
//! `None` means "no such section here" and is routine: the section locator
//! simply retries at the next offset. Nothing in this crate panics on
//! malformed or truncated input.
//!
//! ```rust
//! use core_mpeg::{read_leading_sections, Section};
//!
//! let data: Vec<u8> = Vec::new();
//! let sections = read_leading_sections(&data);
//! let first_frame = sections.iter().find_map(Section::as_frame);
//! assert!(first_frame.is_none());
//! ```

mod buffer;
pub mod frame;
pub mod header;
pub mod id3v2;
pub mod section;
pub mod xing;

pub use buffer::TextEncoding;
pub use frame::Frame;
pub use header::{Bitrate, ChannelMode, FrameHeader, Layer, MpegVersion};
pub use id3v2::{FrameContent, Id3v2Flags, Id3v2Tag, TagFrame};
pub use section::{read_leading_sections, Section, SectionKind};
pub use xing::{XingIdentifier, XingTag};
