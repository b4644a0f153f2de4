// ## 📂 File: `src/protocol/collect.rs`
// ## Length-prefixed gather + rank-ordered reassembly

use std::collections::BTreeMap;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, trace};

use crate::constants::COORDINATOR_RANK;
use crate::telemetry::TelemetryCounters;
use crate::transport::{Communicator, Message, Tag, TransportError};
use crate::types::RunError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("rank {rank} outside worker set of {workers}")]
    UnknownRank { rank: usize, workers: usize },

    #[error("rank {rank} delivered twice")]
    DuplicateRank { rank: usize },

    #[error("rank {rank} never delivered")]
    MissingRank { rank: usize },
}

/// Concatenates transformed chunks in ascending rank order, whatever order they arrive in.
///
/// Chunks that arrive early wait in `pending` until every lower rank has been appended.
#[derive(Debug)]
pub struct RankOrderedAssembler {
    workers: usize,
    next: usize,
    pending: BTreeMap<usize, Bytes>,
    out: Vec<u8>,
}

impl RankOrderedAssembler {
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            next: 0,
            pending: BTreeMap::new(),
            out: Vec::new(),
        }
    }

    pub fn push(&mut self, rank: usize, chunk: Bytes) -> Result<(), AssemblyError> {
        if rank >= self.workers {
            return Err(AssemblyError::UnknownRank { rank, workers: self.workers });
        }
        if rank < self.next || self.pending.contains_key(&rank) {
            return Err(AssemblyError::DuplicateRank { rank });
        }

        self.pending.insert(rank, chunk);
        self.flush_ready();
        Ok(())
    }

    /// Ranks appended so far (a contiguous prefix `0..next`).
    pub fn appended(&self) -> usize {
        self.next
    }

    pub fn finish(mut self) -> Result<Vec<u8>, AssemblyError> {
        self.flush_ready();
        if self.next != self.workers {
            return Err(AssemblyError::MissingRank { rank: self.next });
        }
        Ok(self.out)
    }

    fn flush_ready(&mut self) {
        while let Some(chunk) = self.pending.remove(&self.next) {
            trace!(rank = self.next, len = chunk.len(), "appending chunk");
            self.out.extend_from_slice(&chunk);
            self.next += 1;
        }
    }
}

/// Reassemble `(rank, chunk)` pairs delivered in any order.
pub fn gather<I>(chunks: I, workers: usize) -> Result<Vec<u8>, AssemblyError>
where
    I: IntoIterator<Item = (usize, Bytes)>,
{
    let mut assembler = RankOrderedAssembler::new(workers);
    for (rank, chunk) in chunks {
        assembler.push(rank, chunk)?;
    }
    assembler.finish()
}

/// Run the collection phase on one rank.
///
/// - Peer: send the transformed length, then the bytes (skipped when empty).
///   Returns `None`.
/// - Coordinator: append its own chunk, then for each peer in ascending rank order
///   receive the length and exactly that many bytes. Returns the assembled output.
pub fn collect<C: Communicator + ?Sized>(
    comm: &C,
    transformed: Bytes,
    counters: &mut TelemetryCounters,
) -> Result<Option<Vec<u8>>, RunError> {
    let rank = comm.rank();

    if !comm.is_coordinator() {
        let len = transformed.len();
        let announce = Message::ChunkLength(len as u64);
        counters.add_sent(announce.payload_len());
        comm.send(COORDINATOR_RANK, announce)?;
        if len > 0 {
            let message = Message::Transformed(transformed);
            counters.add_sent(message.payload_len());
            comm.send(COORDINATOR_RANK, message)?;
        }
        debug!(rank, len, "transformed chunk sent");
        return Ok(None);
    }

    let workers = comm.size();
    let mut assembler = RankOrderedAssembler::new(workers);
    assembler.push(COORDINATOR_RANK, transformed)?;

    for peer in 1..workers {
        let announce = comm.recv(peer, Tag::ChunkLength)?;
        counters.add_received(announce.payload_len());
        let announced = announce.into_length(peer)?;
        let expected = usize::try_from(announced).map_err(|_| {
            TransportError::InvalidWorld(format!(
                "rank {peer} announced {announced} bytes, which does not fit in memory"
            ))
        })?;

        let bytes = if expected == 0 {
            Bytes::new()
        } else {
            let message = comm.recv(peer, Tag::Transformed)?;
            counters.add_received(message.payload_len());
            message.into_bytes(peer)?
        };

        if bytes.len() != expected {
            return Err(RunError::ShortTransfer { rank: peer, expected, actual: bytes.len() });
        }
        assembler.push(peer, bytes)?;
    }

    let out = assembler.finish()?;
    debug!(workers, len = out.len(), "output assembled");
    Ok(Some(out))
}
