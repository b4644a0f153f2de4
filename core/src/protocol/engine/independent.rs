// ## 📂 File: `src/protocol/engine/independent.rs`
// ## Block-independent transform: parallel whole blocks + one padded final segment

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use tracing::trace;

use crate::constants::BLOCK_SIZE;
use crate::crypto::{CipherAdapter, CipherError, Direction};
use crate::protocol::engine::types::{EngineError, TransformedChunk};

/// Where a chunk splits between the parallel block loop and the padded path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitPlan {
    /// Bytes handled block by block, always a multiple of `BLOCK_SIZE`.
    pub parallel_len: usize,
    /// Whether the bytes after `parallel_len` go through the padded path.
    pub padded_final: bool,
}

/// Decide the split for a non-empty chunk.
///
/// Forward: every whole block is parallel. The leftover tail is padded when it is
/// non-empty, and the last rank pads even an empty tail so the stream always ends
/// in a padding block.
///
/// Inverse: an unaligned chunk keeps its tail on the padded path (which rejects it).
/// On an aligned chunk the last rank routes its final block through the padded path
/// to strip the padding; other ranks stay fully parallel.
pub fn plan_split(len: usize, direction: Direction, is_last_rank: bool) -> SplitPlan {
    let blocks = len / BLOCK_SIZE;
    let tail = len % BLOCK_SIZE;

    match direction {
        Direction::Encrypt => SplitPlan {
            parallel_len: blocks * BLOCK_SIZE,
            padded_final: tail > 0 || is_last_rank,
        },
        Direction::Decrypt if tail > 0 => SplitPlan {
            parallel_len: blocks * BLOCK_SIZE,
            padded_final: true,
        },
        Direction::Decrypt if is_last_rank && blocks > 0 => SplitPlan {
            parallel_len: (blocks - 1) * BLOCK_SIZE,
            padded_final: true,
        },
        Direction::Decrypt => SplitPlan {
            parallel_len: len,
            padded_final: false,
        },
    }
}

/// Reject a multi-worker split whose per-worker share is not whole blocks.
///
/// Every rank except the last holds exactly `total / workers` bytes. Such a
/// chunk would be padded on the way in, and nothing on the way back could tell
/// that padding from data, so the run must stop before any rank transforms.
pub fn check_share(total: usize, workers: usize) -> Result<(), EngineError> {
    if workers <= 1 {
        return Ok(());
    }
    let share = total / workers;
    if share % BLOCK_SIZE != 0 {
        return Err(EngineError::UnalignedShare { total, workers, share });
    }
    Ok(())
}

pub fn transform_independent(
    cipher: &CipherAdapter,
    chunk: &[u8],
    direction: Direction,
    rank: usize,
    is_last_rank: bool,
    execution_units: usize,
) -> Result<TransformedChunk, EngineError> {
    if chunk.is_empty() {
        return Ok(TransformedChunk::empty());
    }

    let plan = plan_split(chunk.len(), direction, is_last_rank);
    let (body, rest) = chunk.split_at(plan.parallel_len);

    let mut out = vec![0u8; plan.parallel_len];
    let written = transform_blocks_parallel(cipher, body, &mut out, direction, execution_units);
    if written != plan.parallel_len {
        return Err(EngineError::LengthMismatch { expected: plan.parallel_len, actual: written });
    }

    let mut tail_len = 0;
    if plan.padded_final {
        let segment = cipher
            .transform_tail(rest, direction)
            .map_err(|e| padding_error(e, direction, rank, chunk.len()))?;
        tail_len = rest.len();
        out.extend_from_slice(&segment);
    }

    if !direction.is_forward() && out.is_empty() {
        return Err(EngineError::Padding {
            rank,
            input_len: chunk.len(),
            reason: "inverse transform produced no bytes".into(),
        });
    }

    trace!(rank, blocks = body.len() / BLOCK_SIZE, tail_len, out_len = out.len(), "block-independent pass");
    Ok(TransformedChunk {
        bytes: out,
        blocks_parallel: body.len() / BLOCK_SIZE,
        tail_len,
    })
}

/// Spread whole blocks over at most `units` scoped threads.
///
/// Each unit owns a disjoint output range and adds its byte count once to a
/// shared atomic total. Returns that total.
pub fn transform_blocks_parallel(
    cipher: &CipherAdapter,
    input: &[u8],
    output: &mut [u8],
    direction: Direction,
    units: usize,
) -> usize {
    let blocks = input.len() / BLOCK_SIZE;
    if blocks == 0 {
        return 0;
    }

    let units = units.clamp(1, blocks);
    if units == 1 {
        return cipher.transform_blocks(input, output, direction);
    }

    let span = blocks.div_ceil(units) * BLOCK_SIZE;
    let written = AtomicUsize::new(0);

    thread::scope(|scope| {
        for (src, dst) in input.chunks(span).zip(output.chunks_mut(span)) {
            let written = &written;
            scope.spawn(move || {
                let n = cipher.transform_blocks(src, dst, direction);
                written.fetch_add(n, Ordering::Relaxed);
            });
        }
    });

    written.into_inner()
}

fn padding_error(e: CipherError, direction: Direction, rank: usize, input_len: usize) -> EngineError {
    match (direction, e) {
        (Direction::Decrypt, CipherError::Finalize { reason }) => {
            EngineError::Padding { rank, input_len, reason }
        }
        (_, e) => EngineError::Cipher(e),
    }
}
