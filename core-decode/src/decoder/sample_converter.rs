//! # Sample Format Converter
//!
//! Normalizes symphonia audio buffers to planar `f32` samples.

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::conv::IntoSample;
use symphonia::core::sample::Sample;

/// Appends decoded packets to per-channel `f32` vectors.
///
/// Symphonia outputs samples as i8 through f64, signed or unsigned. Every
/// format is converted to `f32` in `[-1.0, 1.0]` and kept planar, one vector
/// per channel.
pub struct SampleConverter;

impl SampleConverter {
    /// Append every channel of `buffer` to `channels`.
    ///
    /// `channels` grows to the buffer's channel count if it holds fewer
    /// vectors. Returns the number of frames appended.
    pub fn append_planar_f32(buffer: &AudioBufferRef<'_>, channels: &mut Vec<Vec<f32>>) -> usize {
        match buffer {
            AudioBufferRef::F32(buf) => Self::append_planes(buf, channels, |sample: f32| sample),
            AudioBufferRef::F64(buf) => {
                Self::append_planes(buf, channels, |sample: f64| sample.into_sample())
            }
            AudioBufferRef::S32(buf) => {
                Self::append_planes(buf, channels, |sample: i32| sample.into_sample())
            }
            AudioBufferRef::S24(buf) => {
                Self::append_planes(buf, channels, |sample| IntoSample::into_sample(sample))
            }
            AudioBufferRef::S16(buf) => {
                Self::append_planes(buf, channels, |sample: i16| sample.into_sample())
            }
            AudioBufferRef::S8(buf) => {
                Self::append_planes(buf, channels, |sample: i8| sample.into_sample())
            }
            AudioBufferRef::U32(buf) => {
                Self::append_planes(buf, channels, |sample: u32| sample.into_sample())
            }
            AudioBufferRef::U24(buf) => {
                Self::append_planes(buf, channels, |sample| IntoSample::into_sample(sample))
            }
            AudioBufferRef::U16(buf) => {
                Self::append_planes(buf, channels, |sample: u16| sample.into_sample())
            }
            AudioBufferRef::U8(buf) => {
                Self::append_planes(buf, channels, |sample: u8| sample.into_sample())
            }
        }
    }

    fn append_planes<T>(
        buf: &AudioBuffer<T>,
        channels: &mut Vec<Vec<f32>>,
        convert: fn(T) -> f32,
    ) -> usize
    where
        T: Sample + Copy,
    {
        let channel_count = buf.spec().channels.count();
        if channels.len() < channel_count {
            channels.resize_with(channel_count, Vec::new);
        }

        for (index, plane) in channels.iter_mut().enumerate().take(channel_count) {
            plane.extend(buf.chan(index).iter().map(|&sample| convert(sample)));
        }

        buf.frames()
    }
}
