//! # Decode Pipeline
//!
//! [`ChunkedDecoder`] runs the fast path (locate sections, partition, decode
//! concurrently, assemble) and falls back to one whole-buffer decode when the
//! fast path fails.
//!
//! ## Failure Handling
//!
//! - No audio frame in the buffer: terminal, nothing is decoded.
//! - Any decode or assembly failure on the fast path: logged, then the
//!   original buffer is handed to the decode primitive once, unchunked.
//! - Fallback failure: surfaced as [`DecodeError::FallbackFailed`] carrying
//!   both errors. There is no further retry.

use crate::assembler::assemble;
use crate::chunker::{partition, Chunk};
use crate::config::DecodeConfig;
use crate::error::{DecodeError, Result};
use crate::pool::decode_chunks;
use crate::traits::{ChunkDecoder, DecodedBuffer, SourceProvider};
use bytes::Bytes;
use core_mpeg::{read_leading_sections, Frame, Section};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Result of locating sections and partitioning a buffer, before decoding.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    /// Leading tags followed by the first audio frame.
    pub sections: Vec<Section>,
    pub first_frame: Frame,
    pub chunks: Vec<Chunk>,
}

impl ChunkPlan {
    /// Length of the tag prefix carried by every chunk.
    pub fn header_len(&self) -> usize {
        self.first_frame.offset
    }

    pub fn frame_count(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.frame_count).sum()
    }
}

/// Chunked MP3 decoder with whole-buffer fallback.
#[derive(Clone)]
pub struct ChunkedDecoder {
    decoder: Arc<dyn ChunkDecoder>,
    config: DecodeConfig,
}

impl ChunkedDecoder {
    /// Create a pipeline with the default configuration.
    pub fn new(decoder: Arc<dyn ChunkDecoder>) -> Self {
        Self {
            decoder,
            config: DecodeConfig::default(),
        }
    }

    /// Create a pipeline with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidConfig`] if `config` fails validation.
    pub fn with_config(decoder: Arc<dyn ChunkDecoder>, config: DecodeConfig) -> Result<Self> {
        config.validate().map_err(DecodeError::InvalidConfig)?;
        Ok(Self { decoder, config })
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Locate the first audio frame and partition `bytes` into chunks.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::NoAudioFrame`] if the whole buffer was scanned
    /// without finding a frame.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub fn plan(&self, bytes: &[u8]) -> Result<ChunkPlan> {
        let mut sections = read_leading_sections(bytes);

        let first_frame = match sections.last() {
            Some(Section::Frame(frame)) => frame.clone(),
            _ => return Err(DecodeError::NoAudioFrame(bytes.len())),
        };

        debug!(
            offset = first_frame.offset,
            tags = sections.len() - 1,
            "Located first audio frame"
        );

        let chunks = partition(bytes, &first_frame, self.config.chunk_max_bytes);
        sections.shrink_to_fit();

        Ok(ChunkPlan {
            sections,
            first_frame,
            chunks,
        })
    }

    /// Decode through the chunked fast path only.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn decode_chunked(&self, bytes: Bytes) -> Result<DecodedBuffer> {
        let plan = self.plan(&bytes)?;
        let chunk_count = plan.chunks.len();
        if chunk_count == 0 {
            return Err(DecodeError::Internal(format!(
                "frame at offset {} produced no chunk",
                plan.first_frame.offset
            )));
        }
        let concurrency = self.config.resolve_concurrency();

        info!(
            chunks = chunk_count,
            frames = plan.frame_count(),
            concurrency,
            "Decoding chunks"
        );

        let decoded = decode_chunks(plan.chunks, Arc::clone(&self.decoder), concurrency).await?;
        assemble(&decoded)
    }

    /// Decode the unmodified buffer with a single call to the decode primitive.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn decode_whole(&self, bytes: Bytes) -> Result<DecodedBuffer> {
        info!("Decoding whole buffer");
        self.decoder.decode(bytes).await
    }

    /// Decode `bytes`, falling back to a whole-buffer decode once if the
    /// chunked path fails.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn decode(&self, bytes: Bytes) -> Result<DecodedBuffer> {
        if self.config.whole_buffer_only {
            return self.decode_whole(bytes).await;
        }

        let fast = match self.decode_chunked(bytes.clone()).await {
            Ok(buffer) => return Ok(buffer),
            Err(err) => err,
        };

        if !self.config.fallback_enabled || !fast.is_fallback_eligible() {
            error!(error = %fast, "Chunked decode failed");
            return Err(fast);
        }

        warn!(error = %fast, "Chunked decode failed, falling back to whole-buffer decode");

        self.decode_whole(bytes).await.map_err(|fallback| {
            error!(error = %fallback, "Whole-buffer fallback failed");
            DecodeError::FallbackFailed {
                fast: Box::new(fast),
                fallback: Box::new(fallback),
            }
        })
    }

    /// Fetch the source bytes and [`decode`](Self::decode) them.
    #[instrument(skip(self, source), fields(source = %source.describe()))]
    pub async fn decode_source(&self, source: &dyn SourceProvider) -> Result<DecodedBuffer> {
        let bytes = source.fetch().await?;
        self.decode(bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MemorySource;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    const FRAME_LEN: usize = 417;

    fn stream(frames: usize) -> Vec<u8> {
        let mut buf = Vec::new();
        for _ in 0..frames {
            let mut frame = vec![0u8; FRAME_LEN];
            frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
            buf.extend(frame);
        }
        buf
    }

    /// Records every call and yields one 1152-sample stereo frame per 417 bytes.
    #[derive(Default)]
    struct RecordingDecoder {
        calls: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl ChunkDecoder for RecordingDecoder {
        async fn decode(&self, bytes: Bytes) -> Result<DecodedBuffer> {
            self.calls.lock().push(bytes.len());
            Ok(DecodedBuffer::silent(44100, 2, bytes.len() / FRAME_LEN * 1152))
        }
    }

    #[test]
    fn test_plan() {
        let decoder = ChunkedDecoder::with_config(
            Arc::new(RecordingDecoder::default()),
            DecodeConfig::default().with_chunk_max_bytes(1000),
        )
        .unwrap();

        let plan = decoder.plan(&stream(5)).unwrap();
        assert_eq!(plan.header_len(), 0);
        assert_eq!(plan.chunks.len(), 3);
        assert_eq!(plan.frame_count(), 5);
    }

    #[test]
    fn test_plan_without_frames() {
        let decoder = ChunkedDecoder::new(Arc::new(RecordingDecoder::default()));
        let err = decoder.plan(&[0u8; 128]).unwrap_err();
        assert!(matches!(err, DecodeError::NoAudioFrame(128)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = ChunkedDecoder::with_config(
            Arc::new(RecordingDecoder::default()),
            DecodeConfig::default().with_chunk_max_bytes(0),
        );
        assert!(matches!(result, Err(DecodeError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_whole_buffer_only_skips_chunking() {
        let recorder = Arc::new(RecordingDecoder::default());
        let decoder =
            ChunkedDecoder::with_config(recorder.clone(), DecodeConfig::whole_buffer()).unwrap();

        let bytes = Bytes::from(stream(3));
        let decoded = decoder.decode(bytes.clone()).await.unwrap();

        assert_eq!(decoded.length(), 3 * 1152);
        assert_eq!(*recorder.calls.lock(), vec![bytes.len()]);
    }

    #[tokio::test]
    async fn test_decode_source() {
        let recorder = Arc::new(RecordingDecoder::default());
        let decoder = ChunkedDecoder::new(recorder);

        let source = MemorySource::new(stream(4));
        let decoded = decoder.decode_source(&source).await.unwrap();
        assert_eq!(decoded.length(), 4 * 1152);
    }
}
