// ## 1️⃣ `mod.rs`: public façade + re-exports

//! protocol: partition, distribute, transform, collect.
//!
//! Layering, bottom-up:
//! - `engine`: one rank's local transform (no messaging)
//! - `distribute` / `collect`: the two message phases over a [`Communicator`]
//! - `core`: per-rank driver and the in-process run API
//!
//! [`Communicator`]: crate::transport::Communicator

pub mod parallelism;
pub mod io;
pub mod engine;
pub mod distribute;
pub mod collect;
pub mod core;

pub use io::{InputSource, OutputSink};
pub use parallelism::ParallelismProfile;
pub use distribute::{distribute, LocalChunk};
pub use collect::{collect, gather, AssemblyError, RankOrderedAssembler};
pub use engine::{EngineError, TransformEngine, TransformedChunk};

pub use self::core::{
    run_file,
    run_local,
    run_worker,
    transform_bytes,
    validate_run_config,
    ApiConfig,
    RunConfig,
    RunReport,
    WorkerContext,
    WorkerOutcome,
};
