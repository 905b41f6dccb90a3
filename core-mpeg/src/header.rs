//! # MPEG Audio Frame Header
//!
//! Decodes the 4-octet header that precedes every MPEG audio frame:
//!
//! ```text
//! AAAAAAAA AAABBCCD EEEEFFGH IIJJKLMM
//! A: frame sync (11 bits, all set)     B: version         C: layer
//! D: protection bit                    E: bitrate index   F: sample-rate index
//! G: padding                           H: private         I: channel mode
//! J: mode extension                    K: copyright       L: original
//! M: emphasis
//! ```
//!
//! Bitrate, sample-rate and samples-per-frame values come from fixed lookup
//! tables keyed by the raw bit patterns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of the frame header in octets.
pub const HEADER_LEN: usize = 4;

// Bitrate tables in kbps, indexed by the 4-bit bitrate index. Index 0 is
// "free" and index 15 is "bad"; both are stored as 0 and handled by the caller.
const V1_L1_BITRATES: [u16; 16] = [
    0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448, 0,
];
const V1_L2_BITRATES: [u16; 16] = [
    0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384, 0,
];
const V1_L3_BITRATES: [u16; 16] = [
    0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0,
];
const V2_L1_BITRATES: [u16; 16] = [
    0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256, 0,
];
const V2_L2_L3_BITRATES: [u16; 16] = [
    0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160, 0,
];

const FREE_BITRATE_INDEX: u8 = 0b0000;
const BAD_BITRATE_INDEX: u8 = 0b1111;

// Sample rates in Hz, indexed by the 2-bit sample-rate index (11 = reserved).
const V1_SAMPLE_RATES: [u32; 3] = [44100, 48000, 32000];
const V2_SAMPLE_RATES: [u32; 3] = [22050, 24000, 16000];
const V25_SAMPLE_RATES: [u32; 3] = [11025, 12000, 8000];

/// MPEG audio version. The reserved pattern `01` never produces a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MpegVersion {
    /// `00`: MPEG Version 2.5 (unofficial)
    Mpeg25,
    /// `10`: MPEG Version 2 (ISO/IEC 13818-3)
    Mpeg2,
    /// `11`: MPEG Version 1 (ISO/IEC 11172-3)
    Mpeg1,
}

impl MpegVersion {
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0b11 {
            0b00 => Some(Self::Mpeg25),
            0b10 => Some(Self::Mpeg2),
            0b11 => Some(Self::Mpeg1),
            _ => None,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Mpeg25 => 0b00,
            Self::Mpeg2 => 0b10,
            Self::Mpeg1 => 0b11,
        }
    }

    fn sample_rates(self) -> &'static [u32; 3] {
        match self {
            Self::Mpeg1 => &V1_SAMPLE_RATES,
            Self::Mpeg2 => &V2_SAMPLE_RATES,
            Self::Mpeg25 => &V25_SAMPLE_RATES,
        }
    }
}

impl fmt::Display for MpegVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mpeg25 => "MPEG Version 2.5 (unofficial)",
            Self::Mpeg2 => "MPEG Version 2 (ISO/IEC 13818-3)",
            Self::Mpeg1 => "MPEG Version 1 (ISO/IEC 11172-3)",
        })
    }
}

/// MPEG audio layer. The reserved pattern `00` never produces a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// `01`
    LayerIII,
    /// `10`
    LayerII,
    /// `11`
    LayerI,
}

impl Layer {
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0b11 {
            0b01 => Some(Self::LayerIII),
            0b10 => Some(Self::LayerII),
            0b11 => Some(Self::LayerI),
            _ => None,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::LayerIII => 0b01,
            Self::LayerII => 0b10,
            Self::LayerI => 0b11,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LayerIII => "Layer III",
            Self::LayerII => "Layer II",
            Self::LayerI => "Layer I",
        })
    }
}

/// Decoded bitrate. The "bad" index is rejected during header decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bitrate {
    /// Free-format stream; the frame length cannot be derived from the header.
    Free,
    /// Bitrate in kilobits per second.
    Kbps(u16),
}

impl Bitrate {
    fn lookup(version: MpegVersion, layer: Layer, index: u8) -> Option<Self> {
        match index {
            FREE_BITRATE_INDEX => Some(Self::Free),
            BAD_BITRATE_INDEX => None,
            _ => {
                let table = match (version, layer) {
                    (MpegVersion::Mpeg1, Layer::LayerI) => &V1_L1_BITRATES,
                    (MpegVersion::Mpeg1, Layer::LayerII) => &V1_L2_BITRATES,
                    (MpegVersion::Mpeg1, Layer::LayerIII) => &V1_L3_BITRATES,
                    (_, Layer::LayerI) => &V2_L1_BITRATES,
                    (_, Layer::LayerII | Layer::LayerIII) => &V2_L2_L3_BITRATES,
                };
                table.get(usize::from(index)).copied().map(Self::Kbps)
            }
        }
    }

    /// Kilobits per second, `0` for free format.
    pub fn kbps(self) -> u32 {
        match self {
            Self::Free => 0,
            Self::Kbps(kbps) => u32::from(kbps),
        }
    }
}

/// Channel configuration of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelMode {
    /// `00`
    Stereo,
    /// `01`
    JointStereo,
    /// `10`
    DualChannel,
    /// `11`
    Mono,
}

impl ChannelMode {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::Stereo,
            0b01 => Self::JointStereo,
            0b10 => Self::DualChannel,
            _ => Self::Mono,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Stereo => 0b00,
            Self::JointStereo => 0b01,
            Self::DualChannel => 0b10,
            Self::Mono => 0b11,
        }
    }

    pub fn channel_count(self) -> u16 {
        match self {
            Self::Mono => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stereo => "Stereo",
            Self::JointStereo => "Joint stereo (Stereo)",
            Self::DualChannel => "Dual channel (Stereo)",
            Self::Mono => "Single channel (Mono)",
        })
    }
}

/// A decoded MPEG audio frame header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameHeader {
    /// Buffer offset of the first sync octet.
    pub offset: usize,
    pub version: MpegVersion,
    pub layer: Layer,
    /// Raw protection bit. A set bit means the frame carries no CRC.
    pub protection_bit: bool,
    pub bitrate: Bitrate,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    pub padded: bool,
    pub private_bit: bool,
    pub channel_mode: ChannelMode,
    pub mode_extension: u8,
    pub copyright: bool,
    pub original: bool,
    pub emphasis: u8,
}

impl FrameHeader {
    /// Decode the frame header located at `offset` of `buf`.
    ///
    /// Returns `None` unless more than 4 octets remain, the sync pattern is
    /// present, and version, layer, bitrate and sample rate all decode to
    /// non-reserved values.
    pub fn read(buf: &[u8], offset: usize) -> Option<Self> {
        if buf.len().checked_sub(offset)? <= HEADER_LEN {
            return None;
        }

        // 11111111
        let b1 = buf[offset];
        if b1 != 0xFF {
            return None;
        }

        // 111BBCCD
        let b2 = buf[offset + 1];
        if b2 < 0xE0 {
            return None;
        }
        let version = MpegVersion::from_bits(b2 >> 3)?;
        let layer = Layer::from_bits(b2 >> 1)?;
        let protection_bit = b2 & 0b1 == 1;

        // EEEEFFGH
        let b3 = buf[offset + 2];
        let bitrate = Bitrate::lookup(version, layer, b3 >> 4)?;
        let sample_rate = *version
            .sample_rates()
            .get(usize::from((b3 >> 2) & 0b11))?;
        let padded = (b3 >> 1) & 0b1 == 1;
        let private_bit = b3 & 0b1 == 1;

        // IIJJKLMM
        let b4 = buf[offset + 3];

        Some(Self {
            offset,
            version,
            layer,
            protection_bit,
            bitrate,
            sample_rate,
            padded,
            private_bit,
            channel_mode: ChannelMode::from_bits(b4 >> 6),
            mode_extension: (b4 >> 4) & 0b11,
            copyright: (b4 >> 3) & 0b1 == 1,
            original: (b4 >> 2) & 0b1 == 1,
            emphasis: b4 & 0b11,
        })
    }

    /// Returns `true` if a 16-bit CRC follows the header.
    pub fn has_crc(&self) -> bool {
        !self.protection_bit
    }

    /// Number of samples per channel carried by one frame.
    pub fn sample_length(&self) -> u32 {
        match (self.version, self.layer) {
            (_, Layer::LayerI) => 384,
            (_, Layer::LayerII) => 1152,
            (MpegVersion::Mpeg1, Layer::LayerIII) => 1152,
            (_, Layer::LayerIII) => 576,
        }
    }

    /// Padding slot size in octets: 4 for Layer I, 1 otherwise, 0 if unpadded.
    pub fn padding_size(&self) -> usize {
        match (self.padded, self.layer) {
            (false, _) => 0,
            (true, Layer::LayerI) => 4,
            (true, _) => 1,
        }
    }

    /// Frame length in octets, header included.
    ///
    /// `floor(sample_length * bitrate * 1000 / 8 / sample_rate) + padding`.
    /// Free-format frames yield only the padding size.
    pub fn frame_byte_length(&self) -> usize {
        let byte_rate = u64::from(self.bitrate.kbps()) * 125;
        let body = u64::from(self.sample_length()) * byte_rate / u64::from(self.sample_rate);
        body as usize + self.padding_size()
    }

    /// Distance from the header start to where a "Xing"/"Info" marker would sit.
    pub fn xing_offset(&self) -> usize {
        let mono = self.channel_mode == ChannelMode::Mono;
        match (self.version, mono) {
            (MpegVersion::Mpeg1, true) => 21,
            (MpegVersion::Mpeg1, false) => 36,
            (_, true) => 13,
            (_, false) => 21,
        }
    }
}
