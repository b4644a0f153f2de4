// ## 📂 File: `src/protocol/parallelism.rs`

use serde::{Deserialize, Serialize};
use tracing::debug;

/// How many execution units each worker splits its block-independent chunk across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelismProfile {
    pub execution_units: usize,
}

impl Default for ParallelismProfile {
    fn default() -> Self {
        Self::single_threaded()
    }
}

impl ParallelismProfile {
    pub fn single_threaded() -> Self {
        Self { execution_units: 1 }
    }

    pub fn fixed(execution_units: usize) -> Self {
        Self { execution_units: execution_units.max(1) }
    }

    /// Share the machine's cores evenly between `workers` ranks, at least one unit each.
    pub fn dynamic(workers: usize) -> Self {
        let cores = num_cpus::get();
        let execution_units = (cores / workers.max(1)).max(1);
        debug!(cores, workers, execution_units, "parallelism profile");

        Self { execution_units }
    }
}
