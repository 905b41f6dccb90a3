//! # Symphonia Decode Primitive
//!
//! Decodes a complete in-memory MP3 byte range with symphonia. Decoding is
//! CPU bound, so every call runs on tokio's blocking pool and several chunks
//! can decode in parallel.

use crate::decoder::sample_converter::SampleConverter;
use crate::error::{DecodeError, Result};
use crate::traits::{ChunkDecoder, DecodedBuffer};
use async_trait::async_trait;
use bytes::Bytes;
use std::io::Cursor;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, error, instrument, trace, warn};

const MAX_CONSECUTIVE_ERRORS: usize = 10;

/// [`ChunkDecoder`] backed by symphonia.
///
/// Packets that fail to decode are skipped, as a chunk's first frames may
/// reference bit reservoir data from the previous chunk. Ten consecutive
/// failures fail the decode.
#[derive(Debug, Clone, Default)]
pub struct SymphoniaChunkDecoder {
    verify: bool,
}

impl SymphoniaChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask symphonia to verify decoded audio against stream checksums.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Decode `bytes` on the current thread.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()), level = "debug")]
    pub fn decode_blocking(&self, bytes: Bytes) -> Result<DecodedBuffer> {
        let media_source = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

        let mut hint = Hint::new();
        hint.with_extension("mp3");

        let detected = symphonia::default::get_probe()
            .format(
                &hint,
                media_source,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                debug!("Format detection failed: {}", e);
                DecodeError::InvalidFormat(format!("Failed to detect format: {}", e))
            })?;

        let mut format_reader = detected.format;

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| DecodeError::InvalidFormat("No audio track".to_string()))?;

        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate;

        let options = DecoderOptions {
            verify: self.verify,
        };
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &options)
            .map_err(|e| {
                error!("Failed to create decoder: {}", e);
                DecodeError::DecodingError(format!("Failed to create codec decoder: {}", e))
            })?;

        let mut channels: Vec<Vec<f32>> = Vec::new();
        let mut frames = 0usize;
        let mut consecutive_errors = 0usize;

        loop {
            let packet = match format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    trace!(frames, "Reached end of stream");
                    break;
                }
                Err(SymphoniaError::ResetRequired) => {
                    return Err(DecodeError::DecodingError(
                        "Track list changed, reset required".to_string(),
                    ));
                }
                Err(e) => {
                    return Err(DecodeError::DecodingError(format!(
                        "Failed to read packet: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    consecutive_errors = 0;
                    sample_rate.get_or_insert(decoded.spec().rate);
                    frames += SampleConverter::append_planar_f32(&decoded, &mut channels);
                }
                Err(e @ (SymphoniaError::DecodeError(_) | SymphoniaError::IoError(_)))
                    if consecutive_errors + 1 < MAX_CONSECUTIVE_ERRORS =>
                {
                    consecutive_errors += 1;
                    trace!(consecutive_errors, "Skipping undecodable packet: {}", e);
                }
                Err(e) => {
                    warn!("Decode failed after {} skipped packets: {}", consecutive_errors, e);
                    return Err(DecodeError::DecodingError(format!(
                        "Failed to decode packet: {}",
                        e
                    )));
                }
            }
        }

        let sample_rate = sample_rate
            .ok_or_else(|| DecodeError::InvalidFormat("Missing sample rate".to_string()))?;

        if frames == 0 {
            return Err(DecodeError::DecodingError("No audio decoded".to_string()));
        }

        debug!(frames, channels = channels.len(), sample_rate, "Decoded buffer");
        Ok(DecodedBuffer::new(sample_rate, channels))
    }
}

#[async_trait]
impl ChunkDecoder for SymphoniaChunkDecoder {
    async fn decode(&self, bytes: Bytes) -> Result<DecodedBuffer> {
        let decoder = self.clone();
        tokio::task::spawn_blocking(move || decoder.decode_blocking(bytes))
            .await
            .map_err(|e| DecodeError::WorkerFailed(e.to_string()))?
    }
}
