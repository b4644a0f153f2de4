// ### `src/telemetry/counters.rs`

//! telemetry/counters.rs
//! Mutable counters kept by each worker during a run.
//!
//! Summary: byte, block, and message counts for one rank.
//! Converted into an immutable TelemetrySnapshot when the rank finishes.
use serde::{Deserialize, Serialize};

/// Deterministic counters collected by one rank.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    /// Bytes of LocalChunk handed to the transform engine.
    pub bytes_in: u64,
    /// Bytes of TransformedChunk produced.
    pub bytes_out: u64,
    /// Full blocks transformed on the parallel path.
    pub blocks_parallel: u64,
    /// Bytes pushed through the serial padded path (tail or final block).
    pub bytes_tail: u64,
    /// Padding bytes added (forward) or stripped (inverse).
    pub bytes_padding: u64,

    pub messages_sent: u64,
    pub messages_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

impl TelemetryCounters {
    /// Record one outgoing message carrying `payload_len` bytes.
    pub fn add_sent(&mut self, payload_len: usize) {
        self.messages_sent += 1;
        self.bytes_sent += payload_len as u64;
    }

    /// Record one incoming message carrying `payload_len` bytes.
    pub fn add_received(&mut self, payload_len: usize) {
        self.messages_received += 1;
        self.bytes_received += payload_len as u64;
    }

    /// Record one engine pass.
    ///
    /// - `input_len`: LocalChunk length
    /// - `output_len`: TransformedChunk length
    /// - `blocks`: full blocks handled by execution units
    /// - `tail_len`: bytes fed to the serial padded path
    pub fn add_transform(&mut self, input_len: usize, output_len: usize, blocks: usize, tail_len: usize) {
        self.bytes_in += input_len as u64;
        self.bytes_out += output_len as u64;
        self.blocks_parallel += blocks as u64;
        self.bytes_tail += tail_len as u64;
        self.bytes_padding += input_len.abs_diff(output_len) as u64;
    }

    pub fn merge(&mut self, other: &TelemetryCounters) {
        self.bytes_in += other.bytes_in;
        self.bytes_out += other.bytes_out;
        self.blocks_parallel += other.blocks_parallel;
        self.bytes_tail += other.bytes_tail;
        self.bytes_padding += other.bytes_padding;

        self.messages_sent += other.messages_sent;
        self.messages_received += other.messages_received;
        self.bytes_sent += other.bytes_sent;
        self.bytes_received += other.bytes_received;
    }
}
