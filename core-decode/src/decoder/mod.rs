//! Decode primitives.
//!
//! [`SymphoniaChunkDecoder`] implements [`ChunkDecoder`](crate::ChunkDecoder)
//! on top of symphonia's MPEG audio decoder. Other primitives only need to
//! implement the trait.

#[cfg(feature = "core-decoder")]
mod sample_converter;
#[cfg(feature = "core-decoder")]
mod symphonia;

#[cfg(feature = "core-decoder")]
pub use sample_converter::SampleConverter;
#[cfg(feature = "core-decoder")]
pub use self::symphonia::SymphoniaChunkDecoder;
