//! # Decode Configuration
//!
//! Configuration for the chunked decode pipeline.

use serde::{Deserialize, Serialize};

/// Worker count used when hardware parallelism is unknown or too small.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Decode pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Byte budget for the frame data of one chunk.
    ///
    /// A chunk is sealed before a frame that would bring its frame bytes to
    /// this value or beyond. Leading tag bytes are not counted.
    ///
    /// Default: 1,000,000 bytes.
    #[serde(default = "default_chunk_max_bytes")]
    pub chunk_max_bytes: usize,

    /// Explicit worker pool size.
    ///
    /// When unset, the hardware parallelism is used if it is greater than 2,
    /// otherwise [`DEFAULT_CONCURRENCY`]. The pool never exceeds the number of
    /// chunks.
    ///
    /// Default: `None`.
    #[serde(default)]
    pub concurrency: Option<usize>,

    /// Retry a failed chunked decode once as a single whole-buffer decode.
    ///
    /// Default: true.
    #[serde(default = "default_fallback_enabled")]
    pub fallback_enabled: bool,

    /// Skip chunking and always decode the whole buffer at once.
    ///
    /// Default: false.
    #[serde(default)]
    pub whole_buffer_only: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            chunk_max_bytes: default_chunk_max_bytes(),
            concurrency: None,
            fallback_enabled: default_fallback_enabled(),
            whole_buffer_only: false,
        }
    }
}

impl DecodeConfig {
    /// One worker, chunks decoded strictly in order.
    pub fn sequential() -> Self {
        Self {
            concurrency: Some(1),
            ..Default::default()
        }
    }

    /// No chunking: the decode primitive sees the original buffer.
    pub fn whole_buffer() -> Self {
        Self {
            whole_buffer_only: true,
            ..Default::default()
        }
    }

    pub fn with_chunk_max_bytes(mut self, bytes: usize) -> Self {
        self.chunk_max_bytes = bytes;
        self
    }

    pub fn with_concurrency(mut self, workers: usize) -> Self {
        self.concurrency = Some(workers);
        self
    }

    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_enabled = enabled;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_max_bytes == 0 {
            return Err("chunk_max_bytes must be > 0".to_string());
        }

        if self.concurrency == Some(0) {
            return Err("concurrency must be > 0 when set".to_string());
        }

        Ok(())
    }

    /// Worker count before clamping to the number of chunks.
    pub fn resolve_concurrency(&self) -> usize {
        self.concurrency.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .ok()
                .filter(|&workers| workers > 2)
                .unwrap_or(DEFAULT_CONCURRENCY)
        })
    }
}

fn default_chunk_max_bytes() -> usize {
    1_000_000
}

fn default_fallback_enabled() -> bool {
    true
}
