use std::fmt;

use bytes::Bytes;
use thiserror::Error;

use crate::constants::COORDINATOR_RANK;

/// Message kind, used to match a receive against what the protocol expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    TotalLength,
    Chunk,
    ChunkLength,
    Transformed,
    BarrierArrive,
    BarrierRelease,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tag::TotalLength    => "total-length",
            Tag::Chunk          => "chunk",
            Tag::ChunkLength    => "chunk-length",
            Tag::Transformed    => "transformed",
            Tag::BarrierArrive  => "barrier-arrive",
            Tag::BarrierRelease => "barrier-release",
        };
        f.write_str(name)
    }
}

/// Everything that travels between ranks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Coordinator → all: input length in bytes.
    TotalLength(u64),
    /// Coordinator → rank i: that rank's input range.
    Chunk(Bytes),
    /// Rank i → coordinator: length of the transformed chunk that follows.
    ChunkLength(u64),
    /// Rank i → coordinator: the transformed chunk.
    Transformed(Bytes),
    BarrierArrive,
    BarrierRelease,
}

impl Message {
    pub fn tag(&self) -> Tag {
        match self {
            Message::TotalLength(_) => Tag::TotalLength,
            Message::Chunk(_)       => Tag::Chunk,
            Message::ChunkLength(_) => Tag::ChunkLength,
            Message::Transformed(_) => Tag::Transformed,
            Message::BarrierArrive  => Tag::BarrierArrive,
            Message::BarrierRelease => Tag::BarrierRelease,
        }
    }

    /// Bytes carried by the message body (8 for length messages, 0 for barrier markers).
    pub fn payload_len(&self) -> usize {
        match self {
            Message::TotalLength(_) | Message::ChunkLength(_) => 8,
            Message::Chunk(b) | Message::Transformed(b) => b.len(),
            Message::BarrierArrive | Message::BarrierRelease => 0,
        }
    }

    /// Length carried by a `TotalLength` / `ChunkLength` message.
    pub fn into_length(self, from: usize) -> Result<u64, TransportError> {
        match self {
            Message::TotalLength(n) | Message::ChunkLength(n) => Ok(n),
            other => Err(TransportError::UnexpectedMessage {
                from,
                expected: Tag::ChunkLength,
                got: other.tag(),
            }),
        }
    }

    /// Bytes carried by a `Chunk` / `Transformed` message.
    pub fn into_bytes(self, from: usize) -> Result<Bytes, TransportError> {
        match self {
            Message::Chunk(b) | Message::Transformed(b) => Ok(b),
            other => Err(TransportError::UnexpectedMessage {
                from,
                expected: Tag::Chunk,
                got: other.tag(),
            }),
        }
    }
}

/// A message plus its sender's rank.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub from: usize,
    pub message: Message,
}

/// Why and by whom the run was aborted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortSignal {
    pub from: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("run aborted by rank {by}: {reason}")]
    Aborted { by: usize, reason: String },

    #[error("peer rank {peer} disconnected")]
    Disconnected { peer: usize },

    #[error("unexpected message from rank {from}: expected {expected}, got {got}")]
    UnexpectedMessage { from: usize, expected: Tag, got: Tag },

    #[error("rank {rank} outside worker set of size {size}")]
    InvalidRank { rank: usize, size: usize },

    #[error("invalid worker set: {0}")]
    InvalidWorld(String),
}

impl TransportError {
    pub fn is_aborted(&self) -> bool {
        matches!(self, TransportError::Aborted { .. })
    }
}

impl From<AbortSignal> for TransportError {
    fn from(sig: AbortSignal) -> Self {
        TransportError::Aborted { by: sig.from, reason: sig.reason }
    }
}

/// Point-to-point, blocking, per-pair FIFO channel between the ranks of a fixed worker set.
///
/// Every receive names its source rank and the tag it expects; a mismatch is an error,
/// never a reorder. There is no timeout: an unresponsive peer stalls the caller until
/// some rank calls [`Communicator::abort`].
pub trait Communicator {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    fn send(&self, dest: usize, message: Message) -> Result<(), TransportError>;
    fn recv(&self, src: usize, expected: Tag) -> Result<Message, TransportError>;

    /// Wake every rank with [`TransportError::Aborted`]. First caller's reason wins.
    fn abort(&self, reason: &str);

    fn is_coordinator(&self) -> bool {
        self.rank() == COORDINATOR_RANK
    }

    /// No rank returns until every rank has arrived.
    fn barrier(&self) -> Result<(), TransportError> {
        if self.size() == 1 {
            return Ok(());
        }
        if self.is_coordinator() {
            for peer in 1..self.size() {
                self.recv(peer, Tag::BarrierArrive)?;
            }
            for peer in 1..self.size() {
                self.send(peer, Message::BarrierRelease)?;
            }
        } else {
            self.send(COORDINATOR_RANK, Message::BarrierArrive)?;
            self.recv(COORDINATOR_RANK, Tag::BarrierRelease)?;
        }
        Ok(())
    }

    /// One-to-all broadcast of the input length, followed by a barrier.
    ///
    /// The coordinator passes `Some(total)`; peers pass `None`.
    fn broadcast_total(&self, total: Option<u64>) -> Result<u64, TransportError> {
        let value = if self.is_coordinator() {
            let value = total.ok_or_else(|| {
                TransportError::InvalidWorld("coordinator must supply the total length".into())
            })?;
            for peer in 1..self.size() {
                self.send(peer, Message::TotalLength(value))?;
            }
            value
        } else {
            self.recv(COORDINATOR_RANK, Tag::TotalLength)?
                .into_length(COORDINATOR_RANK)?
        };

        self.barrier()?;
        Ok(value)
    }
}
