//! # Decode Pipeline Traits
//!
//! The two collaborators the pipeline consumes:
//!
//! - [`SourceProvider`] supplies the complete encoded byte buffer.
//! - [`ChunkDecoder`] is the decode primitive: encoded bytes in, planar
//!   samples plus sample rate out. The pipeline treats it as a black box and
//!   calls it once per chunk, or once for the whole buffer on fallback.
//!
//! Both are shared across tasks as `Arc<dyn Trait>`.

use crate::error::{DecodeError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use core_runtime::logging::strip_path;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, instrument};

// ============================================================================
// Decoded Audio
// ============================================================================

/// Planar `f32` samples produced by a decode primitive.
///
/// Every channel holds the same number of samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodedBuffer {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// One sample vector per channel.
    pub channels: Vec<Vec<f32>>,
}

impl DecodedBuffer {
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Buffer of `length` zeroed samples on each of `channel_count` channels.
    pub fn silent(sample_rate: u32, channel_count: usize, length: usize) -> Self {
        Self::new(sample_rate, vec![vec![0.0; length]; channel_count])
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn length(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.length() as f64 / self.sample_rate as f64)
    }
}

// ============================================================================
// Decode Primitive
// ============================================================================

/// Decodes a self-contained MP3 byte range into planar samples.
#[async_trait]
pub trait ChunkDecoder: Send + Sync {
    /// Decode `bytes` in full.
    ///
    /// # Errors
    ///
    /// Any error fails the current decode attempt. The pipeline does not retry
    /// individual chunks.
    async fn decode(&self, bytes: Bytes) -> Result<DecodedBuffer>;
}

// ============================================================================
// Source Bytes
// ============================================================================

/// Supplies the complete encoded buffer of an audio file.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch(&self) -> Result<Bytes>;

    /// Short, log-safe description of the source.
    fn describe(&self) -> String;
}

/// Source backed by bytes already in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Bytes,
}

impl MemorySource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

#[async_trait]
impl SourceProvider for MemorySource {
    async fn fetch(&self) -> Result<Bytes> {
        Ok(self.data.clone())
    }

    fn describe(&self) -> String {
        format!("memory buffer ({} bytes)", self.data.len())
    }
}

/// Source read from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SourceProvider for FileSource {
    #[instrument(skip(self), fields(file = %self.describe()))]
    async fn fetch(&self) -> Result<Bytes> {
        let data = tokio::fs::read(&self.path).await.map_err(DecodeError::from)?;
        debug!(bytes = data.len(), "Read source file");
        Ok(Bytes::from(data))
    }

    fn describe(&self) -> String {
        let path = self.path.to_string_lossy();
        strip_path(&path).to_string()
    }
}
