//! Bounds-checked octet helpers shared by the section readers.

use serde::{Deserialize, Serialize};

/// Text encoding declared by the first octet of most ID3v2 text-bearing frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEncoding {
    /// `0x00`: ISO/IEC 8859-1, single-octet characters, one zero octet terminates.
    Latin1,
    /// Any other value: UCS-2 with optional BOM, two zero octets terminate.
    Ucs2,
}

impl TextEncoding {
    pub fn from_octet(octet: u8) -> Self {
        if octet == 0 {
            Self::Latin1
        } else {
            Self::Ucs2
        }
    }

    /// Width of the string terminator in octets.
    pub fn terminator_len(self) -> usize {
        match self {
            Self::Latin1 => 1,
            Self::Ucs2 => 2,
        }
    }
}

/// Returns `true` if `buf` holds exactly `seq` at `offset`. Out-of-range is a mismatch.
pub(crate) fn is_seq(seq: &[u8], buf: &[u8], offset: usize) -> bool {
    offset
        .checked_add(seq.len())
        .and_then(|end| buf.get(offset..end))
        .is_some_and(|window| window == seq)
}

pub(crate) fn read_u32_be(buf: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    let bytes: [u8; 4] = buf.get(offset..end)?.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

/// Index (relative to `data`) of the first string terminator for `encoding`.
///
/// A UCS-2 terminator found at an odd distance is moved forward one octet so
/// that it stays aligned to the character grid.
pub(crate) fn locate_terminator(encoding: TextEncoding, data: &[u8]) -> Option<usize> {
    match encoding {
        TextEncoding::Latin1 => data.iter().position(|&b| b == 0),
        TextEncoding::Ucs2 => {
            let found = data.windows(2).position(|w| w == [0, 0])?;
            Some(if found % 2 == 0 { found } else { found + 1 })
        }
    }
}

pub(crate) fn read_str(encoding: TextEncoding, data: &[u8]) -> String {
    match encoding {
        TextEncoding::Latin1 => data.iter().map(|&b| char::from(b)).collect(),
        TextEncoding::Ucs2 => {
            let (body, big_endian) = match data {
                [0xFE, 0xFF, rest @ ..] => (rest, true),
                [0xFF, 0xFE, rest @ ..] => (rest, false),
                _ => (data, false),
            };
            let units: Vec<u16> = body
                .chunks_exact(2)
                .map(|pair| {
                    if big_endian {
                        u16::from_be_bytes([pair[0], pair[1]])
                    } else {
                        u16::from_le_bytes([pair[0], pair[1]])
                    }
                })
                .collect();
            String::from_utf16_lossy(&units)
        }
    }
}

/// Like [`read_str`] but stops at the first terminator, if any.
pub(crate) fn read_terminated_str(encoding: TextEncoding, data: &[u8]) -> String {
    match locate_terminator(encoding, data) {
        Some(end) => read_str(encoding, &data[..end.min(data.len())]),
        None => read_str(encoding, data),
    }
}
