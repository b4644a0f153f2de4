// ## 📂 File: `src/protocol/engine/chained.rs`

use tracing::trace;

use crate::constants::FIXED_IV;
use crate::crypto::{CipherAdapter, CipherError, Direction};
use crate::protocol::engine::types::{EngineError, TransformedChunk};

/// Chained transform of a whole chunk, sequential inside the chunk.
///
/// Every chunk starts from the fixed IV with fresh chaining state, so only a
/// single-worker run produces one continuous chain over the input.
pub fn transform_chained(
    cipher: &CipherAdapter,
    chunk: &[u8],
    direction: Direction,
    rank: usize,
) -> Result<TransformedChunk, EngineError> {
    if chunk.is_empty() {
        return Ok(TransformedChunk::empty());
    }

    let bytes = cipher
        .transform_buffer(chunk, &FIXED_IV, direction)
        .map_err(|e| match (direction, e) {
            (Direction::Decrypt, CipherError::Finalize { reason }) => EngineError::Padding {
                rank,
                input_len: chunk.len(),
                reason,
            },
            (_, e) => EngineError::Cipher(e),
        })?;

    if !direction.is_forward() && bytes.is_empty() {
        return Err(EngineError::Padding {
            rank,
            input_len: chunk.len(),
            reason: "inverse transform produced no bytes".into(),
        });
    }

    trace!(rank, in_len = chunk.len(), out_len = bytes.len(), "chained pass");
    Ok(TransformedChunk { bytes, blocks_parallel: 0, tail_len: chunk.len() })
}
