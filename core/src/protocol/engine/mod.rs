//! Per-worker transform engine.
//!
//! A worker hands its chunk to the engine once. The engine:
//! - runs the chained mode sequentially over the whole chunk
//! - splits the block-independent mode into whole blocks (fanned out over
//!   execution units) plus one padded final segment
//! - keeps no state between calls

pub mod types;
pub mod chained;
pub mod independent;

pub use types::{EngineError, TransformedChunk};
pub use independent::{check_share, plan_split, transform_blocks_parallel, SplitPlan};

use crate::crypto::{CipherAdapter, CipherMode, Direction};
use crate::protocol::parallelism::ParallelismProfile;
use crate::telemetry::TelemetryCounters;

#[derive(Debug, Clone)]
pub struct TransformEngine {
    cipher: CipherAdapter,
    direction: Direction,
    mode: CipherMode,
    profile: ParallelismProfile,
    rank: usize,
    is_last_rank: bool,
}

impl TransformEngine {
    pub fn new(
        cipher: CipherAdapter,
        direction: Direction,
        mode: CipherMode,
        profile: ParallelismProfile,
        rank: usize,
        is_last_rank: bool,
    ) -> Self {
        Self { cipher, direction, mode, profile, rank, is_last_rank }
    }

    /// Transform one chunk and charge it to `counters`.
    pub fn transform(
        &self,
        chunk: &[u8],
        counters: &mut TelemetryCounters,
    ) -> Result<TransformedChunk, EngineError> {
        let out = match self.mode {
            CipherMode::Chained => {
                chained::transform_chained(&self.cipher, chunk, self.direction, self.rank)?
            }
            CipherMode::BlockIndependent => independent::transform_independent(
                &self.cipher,
                chunk,
                self.direction,
                self.rank,
                self.is_last_rank,
                self.profile.execution_units,
            )?,
        };

        counters.add_transform(chunk.len(), out.len(), out.blocks_parallel, out.tail_len);
        Ok(out)
    }
}
