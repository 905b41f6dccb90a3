//! # Chunked MP3 Decoding
//!
//! Splits an MP3 byte buffer into independently decodable chunks, decodes them
//! concurrently and stitches the results back into one sample buffer.
//!
//! ## Overview
//!
//! ```text
//! bytes → leading sections → Chunk partitioner → worker pool → assembler → DecodedBuffer
//!                                                    │
//!                                              ChunkDecoder (symphonia, mock, ...)
//! ```
//!
//! - [`partition`]: walks every frame from the first audio frame and groups
//!   whole frames into chunks bounded by a byte budget. Each chunk is prefixed
//!   with the leading tag bytes so it decodes on its own.
//! - [`decode_chunks`]: a bounded pool of workers claims chunks from a shared
//!   queue and decodes them through a [`ChunkDecoder`], keeping results in
//!   chunk order.
//! - [`assemble`]: concatenates per-chunk channel data into one buffer.
//! - [`ChunkedDecoder`]: the whole pipeline, with a one-shot whole-buffer
//!   fallback when the chunked path fails.
//!
//! The decode primitive itself is a black box behind [`ChunkDecoder`]. With the
//! `core-decoder` feature (on by default) [`SymphoniaChunkDecoder`] provides
//! one backed by symphonia.

pub mod assembler;
pub mod chunker;
pub mod config;
pub mod decoder;
pub mod error;
pub mod pipeline;
pub mod pool;
pub mod traits;

pub use assembler::assemble;
pub use chunker::{partition, Chunk};
pub use config::DecodeConfig;
pub use error::{DecodeError, Result};
pub use pipeline::{ChunkPlan, ChunkedDecoder};
pub use pool::decode_chunks;
pub use traits::{ChunkDecoder, DecodedBuffer, FileSource, MemorySource, SourceProvider};

#[cfg(feature = "core-decoder")]
pub use decoder::SymphoniaChunkDecoder;
