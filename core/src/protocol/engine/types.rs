use thiserror::Error;

use crate::crypto::CipherError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),

    #[error("padding check failed on rank {rank} ({input_len} byte chunk): {reason}")]
    Padding { rank: usize, input_len: usize, reason: String },

    #[error(
        "block-independent mode over {workers} workers needs a share that is a whole number of \
         blocks, but {total} bytes give {share} bytes per worker; rerun with 1 worker"
    )]
    UnalignedShare { total: usize, workers: usize, share: usize },

    #[error("execution units produced {actual} bytes, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Output of one engine pass over a rank's chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformedChunk {
    pub bytes: Vec<u8>,
    /// Whole blocks handled by the execution units.
    pub blocks_parallel: usize,
    /// Bytes fed through the serial padded path.
    pub tail_len: usize,
}

impl TransformedChunk {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
