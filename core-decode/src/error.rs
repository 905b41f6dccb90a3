//! # Decode Error Types
//!
//! Errors raised by the chunked decode pipeline. Parsing never fails with an
//! error: section readers in `core-mpeg` return `Option` and the locator
//! retries at the next offset. Everything here is a decode-layer failure.

use thiserror::Error;

/// Errors that can occur while decoding an MP3 buffer.
#[derive(Error, Debug)]
pub enum DecodeError {
    // ========================================================================
    // Input Errors
    // ========================================================================
    /// The buffer holds no readable audio frame.
    #[error("No audio frame found in {0} byte buffer")]
    NoAudioFrame(usize),

    /// There was nothing to decode or assemble.
    #[error("Nothing to decode: {0}")]
    EmptyInput(String),

    /// Failed to read the source bytes.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    // ========================================================================
    // Decode Primitive Errors
    // ========================================================================
    /// Audio format is not recognized.
    #[error("Unsupported or invalid audio format: {0}")]
    InvalidFormat(String),

    /// The decode primitive failed.
    #[error("Decoding error: {0}")]
    DecodingError(String),

    /// A chunk failed to decode.
    #[error("Chunk {index} failed to decode: {source}")]
    ChunkFailed {
        index: usize,
        #[source]
        source: Box<DecodeError>,
    },

    /// A decode worker panicked or was cancelled.
    #[error("Decode worker failed: {0}")]
    WorkerFailed(String),

    // ========================================================================
    // Assembly Errors
    // ========================================================================
    /// A chunk's layout disagrees with the first chunk's.
    #[error(
        "Chunk {index} decoded as {channels} channel(s) at {sample_rate} Hz, \
         expected {expected_channels} channel(s) at {expected_sample_rate} Hz"
    )]
    InconsistentChunks {
        index: usize,
        channels: usize,
        sample_rate: u32,
        expected_channels: usize,
        expected_sample_rate: u32,
    },

    // ========================================================================
    // Pipeline Errors
    // ========================================================================
    /// Both the chunked path and the whole-buffer fallback failed.
    #[error("Fallback decode failed: {fallback} (chunked decode: {fast})")]
    FallbackFailed {
        fast: Box<DecodeError>,
        fallback: Box<DecodeError>,
    },

    /// Configuration values are invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DecodeError {
    /// Returns `true` if the input itself is unusable and no decode was attempted.
    pub fn is_terminal_input(&self) -> bool {
        matches!(
            self,
            DecodeError::NoAudioFrame(_) | DecodeError::EmptyInput(_) | DecodeError::IoError(_)
        )
    }

    /// Returns `true` if a failed chunked decode may be retried as one
    /// whole-buffer decode.
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(
            self,
            DecodeError::InvalidFormat(_)
                | DecodeError::DecodingError(_)
                | DecodeError::ChunkFailed { .. }
                | DecodeError::WorkerFailed(_)
                | DecodeError::InconsistentChunks { .. }
                | DecodeError::Internal(_)
        )
    }

    /// Returns `true` if this error came out of the decode primitive.
    pub fn is_decode_error(&self) -> bool {
        match self {
            DecodeError::InvalidFormat(_) | DecodeError::DecodingError(_) => true,
            DecodeError::ChunkFailed { source, .. } => source.is_decode_error(),
            _ => false,
        }
    }
}

/// Result type for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(DecodeError::NoAudioFrame(10).is_terminal_input());
        assert!(!DecodeError::NoAudioFrame(10).is_fallback_eligible());

        let chunk = DecodeError::ChunkFailed {
            index: 3,
            source: Box::new(DecodeError::DecodingError("bad packet".into())),
        };
        assert!(chunk.is_fallback_eligible());
        assert!(chunk.is_decode_error());
        assert!(!chunk.is_terminal_input());

        assert!(!DecodeError::InvalidConfig("x".into()).is_fallback_eligible());
    }

    #[test]
    fn test_messages() {
        let err = DecodeError::ChunkFailed {
            index: 2,
            source: Box::new(DecodeError::DecodingError("boom".into())),
        };
        assert_eq!(
            err.to_string(),
            "Chunk 2 failed to decode: Decoding error: boom"
        );

        let err = DecodeError::FallbackFailed {
            fast: Box::new(DecodeError::WorkerFailed("panic".into())),
            fallback: Box::new(DecodeError::InvalidFormat("not mp3".into())),
        };
        assert!(err.to_string().contains("not mp3"));
        assert!(err.to_string().contains("panic"));
    }
}
