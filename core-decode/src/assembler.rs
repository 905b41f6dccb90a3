//! Buffer assembler.
//!
//! Concatenates per-chunk decoded buffers, in order, into one buffer spanning
//! the whole stream. Channel count and sample rate come from the first chunk.

use crate::error::{DecodeError, Result};
use crate::traits::DecodedBuffer;
use tracing::debug;

/// Concatenate `buffers` channel by channel.
///
/// # Errors
///
/// - [`DecodeError::EmptyInput`] if `buffers` is empty.
/// - [`DecodeError::InconsistentChunks`] if any buffer's channel count or
///   sample rate differs from the first buffer's. Mixed layouts cannot be
///   concatenated without misaligning channel data.
pub fn assemble(buffers: &[DecodedBuffer]) -> Result<DecodedBuffer> {
    let first = buffers
        .first()
        .ok_or_else(|| DecodeError::EmptyInput("no decoded chunks to assemble".to_string()))?;

    let channel_count = first.channel_count();
    let sample_rate = first.sample_rate;

    for (index, buffer) in buffers.iter().enumerate().skip(1) {
        if buffer.channel_count() != channel_count || buffer.sample_rate != sample_rate {
            return Err(DecodeError::InconsistentChunks {
                index,
                channels: buffer.channel_count(),
                sample_rate: buffer.sample_rate,
                expected_channels: channel_count,
                expected_sample_rate: sample_rate,
            });
        }
    }

    let length: usize = buffers.iter().map(DecodedBuffer::length).sum();

    let channels = (0..channel_count)
        .map(|channel| {
            let mut data = Vec::with_capacity(length);
            for buffer in buffers {
                data.extend_from_slice(&buffer.channels[channel]);
            }
            data
        })
        .collect();

    debug!(
        chunks = buffers.len(),
        channel_count, sample_rate, length, "Assembled decoded chunks"
    );

    Ok(DecodedBuffer::new(sample_rate, channels))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(sample_rate: u32, channels: usize, length: usize, start: f32) -> DecodedBuffer {
        let data = (0..channels)
            .map(|c| {
                (0..length)
                    .map(|i| start + i as f32 + c as f32 * 1000.0)
                    .collect()
            })
            .collect();
        DecodedBuffer::new(sample_rate, data)
    }

    #[test]
    fn test_concatenates_in_order() {
        let first = ramp(44100, 2, 100, 0.0);
        let second = ramp(44100, 2, 50, 100.0);

        let assembled = assemble(&[first.clone(), second.clone()]).unwrap();

        assert_eq!(assembled.channel_count(), 2);
        assert_eq!(assembled.sample_rate, 44100);
        assert_eq!(assembled.length(), 150);
        for channel in 0..2 {
            assert_eq!(&assembled.channels[channel][..100], &first.channels[channel][..]);
            assert_eq!(&assembled.channels[channel][100..], &second.channels[channel][..]);
        }
    }

    #[test]
    fn test_single_buffer_is_unchanged() {
        let only = ramp(22050, 1, 10, 0.0);
        assert_eq!(assemble(std::slice::from_ref(&only)).unwrap(), only);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(assemble(&[]), Err(DecodeError::EmptyInput(_))));
    }

    #[test]
    fn test_rejects_layout_change() {
        let err = assemble(&[ramp(44100, 2, 10, 0.0), ramp(44100, 1, 10, 0.0)]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InconsistentChunks {
                index: 1,
                channels: 1,
                expected_channels: 2,
                ..
            }
        ));

        let err = assemble(&[ramp(44100, 2, 10, 0.0), ramp(48000, 2, 10, 0.0)]).unwrap_err();
        assert!(err.is_fallback_eligible());
    }
}
