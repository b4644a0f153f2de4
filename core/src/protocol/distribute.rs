// ## 📂 File: `src/protocol/distribute.rs`
// ## Length broadcast + scatter of contiguous ranges

use bytes::Bytes;
use tracing::debug;

use crate::constants::COORDINATOR_RANK;
use crate::partition::{partition, range_for, scatter, Range};
use crate::telemetry::{Stage, TelemetryCounters, TelemetryTimer};
use crate::transport::{Communicator, Message, Tag, TransportError};
use crate::types::RunError;

/// What one rank holds after distribution.
#[derive(Debug, Clone)]
pub struct LocalChunk {
    pub range: Range,
    pub total_len: usize,
    pub bytes: Bytes,
}

/// Run the distribution phase on one rank.
///
/// The coordinator passes `Some(input)`, peers pass `None`.
/// - Coordinator: broadcast the total length, then send rank `i` its range (ascending
///   rank order). Its own range stays local.
/// - Peer: receive the total, recompute its range, and receive exactly that many bytes.
///
/// Empty ranges are never sent; both sides know them from the total.
pub fn distribute<C: Communicator + ?Sized>(
    comm: &C,
    input: Option<Bytes>,
    counters: &mut TelemetryCounters,
    timer: &mut TelemetryTimer,
) -> Result<LocalChunk, RunError> {
    let rank = comm.rank();
    let workers = comm.size();

    if comm.is_coordinator() {
        let input = input.ok_or_else(|| {
            RunError::Usage("coordinator started without an input buffer".into())
        })?;
        let total = input.len();

        timer.time(Stage::Broadcast, || comm.broadcast_total(Some(total as u64)))?;
        let announce_len = Message::TotalLength(total as u64).payload_len();
        for _ in 1..workers {
            counters.add_sent(announce_len);
        }

        let ranges = partition(total, workers)?;
        let chunks = scatter(&input, &ranges)?;

        timer.time(Stage::Distribute, || -> Result<(), RunError> {
            for (range, chunk) in ranges.iter().zip(&chunks).skip(1) {
                if range.is_empty() {
                    continue;
                }
                let message = Message::Chunk(chunk.clone());
                counters.add_sent(message.payload_len());
                comm.send(range.rank, message)?;
            }
            Ok(())
        })?;

        debug!(rank, total, workers, "chunks distributed");
        Ok(LocalChunk {
            range: ranges[COORDINATOR_RANK],
            total_len: total,
            bytes: chunks[COORDINATOR_RANK].clone(),
        })
    } else {
        let total = timer.time(Stage::Broadcast, || comm.broadcast_total(None))?;
        counters.add_received(Message::TotalLength(total).payload_len());
        let total = usize::try_from(total).map_err(|_| {
            TransportError::InvalidWorld(format!("total length {total} does not fit in memory"))
        })?;

        let range = range_for(rank, total, workers)?;
        let bytes = if range.is_empty() {
            Bytes::new()
        } else {
            timer.time(Stage::Distribute, || -> Result<Bytes, RunError> {
                let message = comm.recv(COORDINATOR_RANK, Tag::Chunk)?;
                counters.add_received(message.payload_len());
                Ok(message.into_bytes(COORDINATOR_RANK)?)
            })?
        };

        if bytes.len() != range.len {
            return Err(RunError::ShortTransfer { rank, expected: range.len, actual: bytes.len() });
        }

        debug!(rank, offset = range.offset, len = range.len, "chunk received");
        Ok(LocalChunk { range, total_len: total, bytes })
    }
}
