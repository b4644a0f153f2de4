// ## 📂 File: `src/partition.rs`

//! Range partitioner.
//!
//! Closed-form split of `total` bytes over `workers` ranks:
//! - `chunk = total / workers`, `remainder = total % workers`
//! - rank `i < workers - 1` → `(i * chunk, chunk)`
//! - rank `workers - 1`     → `((workers - 1) * chunk, chunk + remainder)`
//!
//! Any rank can recompute any other rank's range from `(total, workers)` alone,
//! which is why peers never receive an explicit range message.

use std::ops;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    #[error("worker set must contain at least one worker")]
    NoWorkers,

    #[error("rank {rank} out of range for {workers} workers")]
    RankOutOfRange { rank: usize, workers: usize },

    #[error("range {offset}..{end} exceeds buffer of {len} bytes")]
    OutOfBounds { offset: usize, end: usize, len: usize },
}

/// One worker's contiguous slice of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub rank: usize,
    pub offset: usize,
    pub len: usize,
}

impl Range {
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bounds(&self) -> ops::Range<usize> {
        self.offset..self.end()
    }
}

/// Range owned by `rank`.
pub fn range_for(rank: usize, total: usize, workers: usize) -> Result<Range, PartitionError> {
    if workers == 0 {
        return Err(PartitionError::NoWorkers);
    }
    if rank >= workers {
        return Err(PartitionError::RankOutOfRange { rank, workers });
    }

    let chunk = total / workers;
    let remainder = total % workers;
    let len = if rank == workers - 1 { chunk + remainder } else { chunk };

    Ok(Range {
        rank,
        offset: rank * chunk,
        len,
    })
}

/// Ranges for every rank, ordered by rank.
pub fn partition(total: usize, workers: usize) -> Result<Vec<Range>, PartitionError> {
    (0..workers.max(1))
        .map(|rank| range_for(rank, total, workers))
        .collect()
}

/// Slice `buffer` into one zero-copy chunk per range, in range order.
pub fn scatter(buffer: &Bytes, ranges: &[Range]) -> Result<Vec<Bytes>, PartitionError> {
    ranges
        .iter()
        .map(|r| {
            if r.end() > buffer.len() {
                return Err(PartitionError::OutOfBounds {
                    offset: r.offset,
                    end: r.end(),
                    len: buffer.len(),
                });
            }
            Ok(buffer.slice(r.bounds()))
        })
        .collect()
}
