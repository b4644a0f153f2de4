//! telemetry/mod.rs
//! Per-worker telemetry: counters, stage timers, and immutable snapshots.
//!
//! Each rank owns its own counters and timer (no sharing across ranks);
//! snapshots are merged only after the run, at the driver.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
