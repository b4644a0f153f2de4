use std::io;

use thiserror::Error;

use crate::{
    crypto::CipherError,
    partition::PartitionError,
    protocol::{collect::AssemblyError, engine::EngineError},
    transport::TransportError,
};

/// Unified run error covering usage, I/O, transfer, cipher, padding, and transport failures.
/// - `From<T>` impls let `?` carry layer errors up to the driver.
/// - Every variant is fatal for the whole worker set; none is retried.
#[derive(Debug, Error)]
pub enum RunError {
    /// Bad arguments; raised before any worker is brought up.
    #[error("usage error: {0}")]
    Usage(String),

    /// Input unreadable or output unwritable.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A distribution or collection receive carried a different byte count than announced.
    #[error("short transfer from rank {rank}: expected {expected} bytes, got {actual}")]
    ShortTransfer { rank: usize, expected: usize, actual: usize },

    /// The cipher primitive rejected the key or failed to complete.
    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),

    /// Inverse-direction padding validation failed.
    #[error("padding error on rank {rank}: {reason}")]
    Padding { rank: usize, reason: String },

    #[error("partition error: {0}")]
    Partition(#[from] PartitionError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("engine error: {0}")]
    Engine(EngineError),

    #[error("worker rank {rank} panicked")]
    WorkerPanicked { rank: usize },
}

impl RunError {
    /// True when this rank only failed because another rank aborted the run.
    pub fn is_aborted(&self) -> bool {
        matches!(self, RunError::Transport(e) if e.is_aborted())
    }
}

impl From<EngineError> for RunError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Cipher(c) => RunError::Cipher(c),
            EngineError::Padding { rank, input_len, reason } => RunError::Padding {
                rank,
                reason: format!("{reason} ({input_len} byte chunk)"),
            },
            other => RunError::Engine(other),
        }
    }
}
