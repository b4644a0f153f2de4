// ## src/telemetry/snapshot.rs

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::BLOCK_SIZE;
use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};

/// Immutable per-rank telemetry, taken when the rank finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub rank: usize,
    pub counters: TelemetryCounters,
    pub throughput_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(rank: usize, counters: &TelemetryCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();
        let transform = timer.stage_times.get(Stage::Transform).as_secs_f64();

        // throughput of the local transform only, not the messaging around it
        let throughput = if transform > 0.0 {
            counters.bytes_in as f64 / transform
        } else {
            0.0
        };

        Self {
            rank,
            counters: counters.clone(),
            throughput_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    pub fn has_all_stages(&self, expected: &[Stage]) -> bool {
        expected.iter().all(|s| self.stage_times.contains(*s))
    }

    /// Internal invariants: stage times fit inside elapsed, and one engine pass
    /// adds or strips at most one block of padding.
    pub fn sanity_check(&self) -> bool {
        self.total_stage_time() <= self.elapsed
            && self.counters.bytes_padding <= BLOCK_SIZE as u64
    }
}
