//! shardcrypt-core
//!
//! Partition–transform–reassemble engine for AES-128 file encryption.
//! Pure Rust; the CLI is a thin adapter on top.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

pub mod crypto;
pub mod partition;
pub mod telemetry;
pub mod transport;

// Protocol layers
pub mod protocol;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::crypto::{CipherAdapter, CipherMode, Direction};
    pub use crate::protocol::{
        run_file, run_local, transform_bytes, ApiConfig, InputSource, OutputSink, RunConfig,
        RunReport,
    };
    pub use crate::types::RunError;
}
