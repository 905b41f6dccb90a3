//! Concurrent chunk decoder.
//!
//! A bounded pool of workers drains one shared FIFO queue of chunks. Each
//! chunk is claimed by exactly one worker (`pop_front` under the lock) and its
//! result is stored at the chunk's position in the input, so the output order
//! never depends on completion order.

use crate::chunker::Chunk;
use crate::error::{DecodeError, Result};
use crate::traits::{ChunkDecoder, DecodedBuffer};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, debug_span, instrument, trace, Instrument};

type WorkQueue = Arc<Mutex<VecDeque<(usize, Chunk)>>>;

/// Decode `chunks` with at most `concurrency` workers.
///
/// The pool size is `concurrency` clamped to `1..=chunks.len()`. Results are
/// returned in input order.
///
/// # Errors
///
/// The first failing chunk fails the whole call with
/// [`DecodeError::ChunkFailed`]; workers still running are aborted and
/// no partial result is returned. A panicking worker yields
/// [`DecodeError::WorkerFailed`].
#[instrument(skip(chunks, decoder), fields(chunks = chunks.len()))]
pub async fn decode_chunks(
    chunks: Vec<Chunk>,
    decoder: Arc<dyn ChunkDecoder>,
    concurrency: usize,
) -> Result<Vec<DecodedBuffer>> {
    let total = chunks.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let workers = concurrency.clamp(1, total);
    debug!(workers, "Starting decode workers");

    let queue: WorkQueue = Arc::new(Mutex::new(chunks.into_iter().enumerate().collect()));
    let mut pool = JoinSet::new();

    for worker in 0..workers {
        let queue = Arc::clone(&queue);
        let decoder = Arc::clone(&decoder);
        pool.spawn(run_worker(queue, decoder).instrument(debug_span!("decode_worker", worker)));
    }

    let mut slots: Vec<Option<DecodedBuffer>> = vec![None; total];

    while let Some(joined) = pool.join_next().await {
        let decoded = joined.map_err(|e| DecodeError::WorkerFailed(e.to_string()))??;
        for (position, buffer) in decoded {
            slots[position] = Some(buffer);
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(position, slot)| {
            slot.ok_or_else(|| DecodeError::Internal(format!("chunk {position} was never decoded")))
        })
        .collect()
}

/// Claim and decode chunks until the queue is empty.
async fn run_worker(
    queue: WorkQueue,
    decoder: Arc<dyn ChunkDecoder>,
) -> Result<Vec<(usize, DecodedBuffer)>> {
    let mut decoded = Vec::new();

    loop {
        let claimed = queue.lock().pop_front();
        let Some((position, chunk)) = claimed else {
            break;
        };

        trace!(position, bytes = chunk.byte_length(), "Decoding chunk");

        let buffer = decoder
            .decode(chunk.bytes)
            .await
            .map_err(|source| DecodeError::ChunkFailed {
                index: position,
                source: Box::new(source),
            })?;

        decoded.push((position, buffer));
    }

    trace!(decoded = decoded.len(), "Worker drained queue");
    Ok(decoded)
}
