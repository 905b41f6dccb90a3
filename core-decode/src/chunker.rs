//! Chunk partitioner.
//!
//! Groups consecutive whole frames into chunks bounded by a byte budget. Every
//! chunk is prefixed with the bytes preceding the first audio frame (ID3v2 and
//! Xing tags) so the decode primitive can handle it on its own.

use bytes::{BufMut, Bytes, BytesMut};
use core_mpeg::Frame;
use serde::Serialize;
use tracing::debug;

/// An independently decodable slice of the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Position of this chunk in stream order.
    pub index: usize,
    /// Leading tag bytes followed by the chunk's frames.
    #[serde(skip)]
    pub bytes: Bytes,
    /// Length of the leading tag prefix within `bytes`.
    pub header_len: usize,
    /// Number of whole frames in the chunk.
    pub frame_count: usize,
    /// Offset of the chunk's first frame in the source buffer.
    pub source_offset: usize,
}

impl Chunk {
    /// Frame bytes only, without the tag prefix.
    pub fn frame_bytes(&self) -> &[u8] {
        &self.bytes[self.header_len..]
    }

    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }
}

/// Run of frames being accumulated into the next chunk.
#[derive(Debug, Default)]
struct PendingChunk {
    start: usize,
    end: usize,
    frame_count: usize,
}

impl PendingChunk {
    fn frame_bytes(&self) -> usize {
        self.end - self.start
    }

    fn push(&mut self, frame: &Frame, buf_len: usize) {
        if self.frame_count == 0 {
            self.start = frame.offset;
        }
        self.end = frame.next_frame_offset.min(buf_len);
        self.frame_count += 1;
    }
}

/// Partition `buf` into chunks, starting at `first_frame`.
///
/// Frames are walked without next-frame validation, as the stream is assumed
/// contiguous once the first frame is found. A chunk is sealed before adding a
/// frame that would bring its frame bytes to `max_bytes` or more; a chunk
/// always holds at least one frame, so a single oversized frame still forms
/// its own chunk. The walk ends at the first offset that does not hold a
/// frame header. A trailing frame cut short by the end of the buffer keeps
/// the octets that are present.
pub fn partition(buf: &[u8], first_frame: &Frame, max_bytes: usize) -> Vec<Chunk> {
    let header = &buf[..first_frame.offset.min(buf.len())];
    let mut chunks = Vec::new();
    let mut pending = PendingChunk::default();
    let mut next = Some(first_frame.clone());

    while let Some(frame) = next.take() {
        if pending.frame_count > 0 && pending.frame_bytes() + frame.byte_length >= max_bytes {
            chunks.push(seal(header, buf, &pending, chunks.len()));
            pending = PendingChunk::default();
        }
        pending.push(&frame, buf.len());

        if frame.next_frame_offset >= buf.len() {
            if frame.next_frame_offset > buf.len() {
                debug!(
                    offset = frame.offset,
                    missing = frame.next_frame_offset - buf.len(),
                    "Trailing frame is truncated"
                );
            }
            break;
        }

        next = Frame::read(buf, frame.next_frame_offset, false);
    }

    if pending.frame_count > 0 {
        chunks.push(seal(header, buf, &pending, chunks.len()));
    }

    chunks
}

fn seal(header: &[u8], buf: &[u8], pending: &PendingChunk, index: usize) -> Chunk {
    let frames = &buf[pending.start..pending.end];
    let mut bytes = BytesMut::with_capacity(header.len() + frames.len());
    bytes.put_slice(header);
    bytes.put_slice(frames);

    debug!(
        index,
        frames = pending.frame_count,
        bytes = bytes.len(),
        "Sealed chunk"
    );

    Chunk {
        index,
        bytes: bytes.freeze(),
        header_len: header.len(),
        frame_count: pending.frame_count,
        source_offset: pending.start,
    }
}
