// ## 2️⃣ `core.rs`: run driver API

use std::fmt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    constants::{COORDINATOR_RANK, KEY_LEN_16, MAX_WORKERS},
    crypto::{CipherAdapter, CipherMode, Direction},
    protocol::{
        collect::collect,
        distribute::distribute,
        engine::{check_share, TransformEngine},
        io::{persist_output, read_input, InputSource, OutputSink},
        parallelism::ParallelismProfile,
    },
    telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer},
    transport::{Communicator, LocalWorld},
    types::RunError,
    utils::{derive_output_path, key_array},
};

/// Validated arguments for one run.
#[derive(Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub input: PathBuf,
    pub direction: Direction,
    pub mode: CipherMode,
    #[serde(skip)]
    pub key: [u8; KEY_LEN_16],
    pub workers: usize,
    /// Execution units per worker; `None` shares the machine's cores across workers.
    pub execution_units: Option<usize>,
    /// Overrides the path derived from `input`.
    pub output: Option<PathBuf>,
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("input", &self.input)
            .field("direction", &self.direction)
            .field("mode", &self.mode)
            .field("workers", &self.workers)
            .field("execution_units", &self.execution_units)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

impl RunConfig {
    pub fn new(
        input: impl Into<PathBuf>,
        direction: Direction,
        mode: CipherMode,
        key: &[u8],
        workers: usize,
    ) -> Result<Self, RunError> {
        let key = key_array(key)?;
        validate_workers(workers)?;

        Ok(Self {
            input: input.into(),
            direction,
            mode,
            key,
            workers,
            execution_units: None,
            output: None,
        })
    }

    pub fn with_execution_units(mut self, units: usize) -> Self {
        self.execution_units = Some(units);
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| derive_output_path(&self.input, self.direction))
    }

    pub fn profile(&self) -> ParallelismProfile {
        match self.execution_units {
            Some(units) => ParallelismProfile::fixed(units),
            None => ParallelismProfile::dynamic(self.workers),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Whether to capture the output buffer in the report.
    /// - `None` or `Some(false)` → no capture (production default).
    /// - `Some(true)` → capture for tests/benchmarks.
    pub with_buf: Option<bool>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { with_buf: Some(false) }
    }
}

impl ApiConfig {
    pub fn new(with_buf: Option<bool>) -> Self {
        Self { with_buf: with_buf.or(Some(false)) }
    }

    pub fn with_buf_enabled() -> Self {
        Self { with_buf: Some(true) }
    }

    fn captures(&self) -> bool {
        self.with_buf == Some(true)
    }
}

/// Check the raw run arguments in the order the command line presents them.
///
/// Returns the parsed direction and mode; every failure is a usage error raised
/// before any worker exists.
pub fn validate_run_config(
    direction_token: &str,
    mode_token: &str,
    key: &[u8],
    workers: usize,
) -> Result<(Direction, CipherMode), RunError> {
    let direction: Direction = direction_token.parse().map_err(RunError::Usage)?;
    let mode: CipherMode = mode_token.parse().map_err(RunError::Usage)?;
    key_array(key)?;
    validate_workers(workers)?;
    Ok((direction, mode))
}

fn validate_workers(workers: usize) -> Result<(), RunError> {
    if workers == 0 || workers > MAX_WORKERS {
        return Err(RunError::Usage(format!(
            "worker count must be within 1..={MAX_WORKERS}, got {workers}"
        )));
    }
    Ok(())
}

/// Everything one rank owns for the run. Nothing here is shared with other ranks.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    pub rank: usize,
    pub workers: usize,
    pub direction: Direction,
    pub mode: CipherMode,
    pub cipher: CipherAdapter,
    pub profile: ParallelismProfile,
    /// Coordinator only: keep the assembled output for the report.
    pub capture_output: bool,
}

impl WorkerContext {
    pub fn is_last_rank(&self) -> bool {
        self.rank + 1 == self.workers
    }

    fn engine(&self) -> TransformEngine {
        TransformEngine::new(
            self.cipher.clone(),
            self.direction,
            self.mode,
            self.profile,
            self.rank,
            self.is_last_rank(),
        )
    }
}

/// What a rank hands back when it finishes cleanly.
#[derive(Debug)]
pub struct WorkerOutcome {
    pub rank: usize,
    /// Assembled output length (coordinator only).
    pub output_len: Option<usize>,
    /// Assembled output, when capture was requested (coordinator only).
    pub output: Option<Vec<u8>>,
    pub telemetry: TelemetrySnapshot,
}

/// Run the whole protocol on one rank.
///
/// The coordinator must be given `input` and `output`; peers get `None` for both.
/// On any failure the rank aborts the worker set before returning, so no other
/// rank stays blocked on it.
pub fn run_worker<C: Communicator + ?Sized>(
    comm: &C,
    ctx: &WorkerContext,
    input: Option<InputSource>,
    output: Option<OutputSink>,
) -> Result<WorkerOutcome, RunError> {
    let result = run_worker_inner(comm, ctx, input, output);
    if let Err(e) = &result {
        if !e.is_aborted() {
            error!(rank = ctx.rank, error = %e, "worker failed");
            comm.abort(&e.to_string());
        }
    }
    result
}

fn run_worker_inner<C: Communicator + ?Sized>(
    comm: &C,
    ctx: &WorkerContext,
    input: Option<InputSource>,
    output: Option<OutputSink>,
) -> Result<WorkerOutcome, RunError> {
    let mut timer = TelemetryTimer::new();
    let mut counters = TelemetryCounters::default();

    // ---- Read (coordinator) ----
    let buffer: Option<Bytes> = if comm.is_coordinator() {
        let src = input.ok_or_else(|| RunError::Usage("coordinator requires an input source".into()))?;
        Some(timer.time(Stage::Read, || read_input(src))?)
    } else {
        None
    };

    // ---- Broadcast + distribute ----
    let local = distribute(comm, buffer, &mut counters, &mut timer)?;

    // ---- Local transform ----
    if ctx.mode == CipherMode::BlockIndependent {
        check_share(local.total_len, ctx.workers)?;
    }
    let engine = ctx.engine();
    let transformed = timer.time(Stage::Transform, || engine.transform(&local.bytes, &mut counters))?;
    debug!(
        rank = ctx.rank,
        in_len = local.bytes.len(),
        out_len = transformed.len(),
        "chunk transformed"
    );

    // ---- Collect ----
    let assembled = timer.time(Stage::Collect, || {
        collect(comm, Bytes::from(transformed.bytes), &mut counters)
    })?;

    // ---- Write (coordinator) ----
    let mut output_len = None;
    let mut captured = None;
    if let Some(out) = assembled {
        let sink = output.ok_or_else(|| RunError::Usage("coordinator requires an output sink".into()))?;
        timer.time(Stage::Write, || persist_output(sink, &out))?;
        output_len = Some(out.len());
        if ctx.capture_output {
            captured = Some(out);
        }
    }

    timer.finish();
    Ok(WorkerOutcome {
        rank: ctx.rank,
        output_len,
        output: captured,
        telemetry: TelemetrySnapshot::from(ctx.rank, &counters, &timer),
    })
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub direction: Direction,
    pub mode: CipherMode,
    pub workers: usize,
    pub execution_units: usize,
    pub output_path: Option<PathBuf>,
    pub output_len: usize,
    pub elapsed: Duration,
    /// Per-rank snapshots, ordered by rank.
    pub ranks: Vec<TelemetrySnapshot>,
    pub totals: TelemetryCounters,
    #[serde(skip)]
    pub output: Option<Vec<u8>>,
}

impl RunReport {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Bring up an in-process worker set, run every rank on its own thread, and
/// tear it down.
///
/// The key is checked before any worker starts. Output is persisted by the
/// coordinator only after every chunk was collected.
pub fn run_local(
    config: &RunConfig,
    input: InputSource,
    output: OutputSink,
    api: ApiConfig,
) -> Result<RunReport, RunError> {
    let cipher = CipherAdapter::new(&config.key)?;
    validate_workers(config.workers)?;

    let profile = config.profile();
    let output_path = output.path().map(Path::to_path_buf);
    let endpoints = LocalWorld::create(config.workers)?;

    info!(
        direction = %config.direction,
        mode = %config.mode,
        workers = config.workers,
        execution_units = profile.execution_units,
        "starting run"
    );
    let start = Instant::now();

    let mut input = Some(input);
    let mut output = Some(output);

    let results: Vec<(usize, Result<WorkerOutcome, RunError>)> = thread::scope(|scope| {
        let handles: Vec<_> = endpoints
            .into_iter()
            .map(|endpoint| {
                let rank = endpoint.rank();
                let ctx = WorkerContext {
                    rank,
                    workers: config.workers,
                    direction: config.direction,
                    mode: config.mode,
                    cipher: cipher.clone(),
                    profile,
                    capture_output: api.captures(),
                };
                let (src, sink) = if rank == COORDINATOR_RANK {
                    (input.take(), output.take())
                } else {
                    (None, None)
                };
                let handle = scope.spawn(move || run_worker(&endpoint, &ctx, src, sink));
                (rank, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(rank, handle)| {
                let result = handle
                    .join()
                    .unwrap_or_else(|_| Err(RunError::WorkerPanicked { rank }));
                (rank, result)
            })
            .collect()
    });

    let mut outcomes = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (rank, result) in results {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => failures.push((rank, e)),
        }
    }
    if let Some(e) = root_cause(failures) {
        return Err(e);
    }

    let elapsed = start.elapsed();
    outcomes.sort_by_key(|o| o.rank);

    let mut totals = TelemetryCounters::default();
    for o in &outcomes {
        totals.merge(&o.telemetry.counters);
    }

    let coordinator = outcomes
        .iter_mut()
        .find(|o| o.rank == COORDINATOR_RANK)
        .ok_or(RunError::WorkerPanicked { rank: COORDINATOR_RANK })?;
    let output_len = coordinator.output_len.unwrap_or(0);
    let captured = coordinator.output.take();

    info!(output_len, ?elapsed, "run complete");

    Ok(RunReport {
        direction: config.direction,
        mode: config.mode,
        workers: config.workers,
        execution_units: profile.execution_units,
        output_path,
        output_len,
        elapsed,
        ranks: outcomes.into_iter().map(|o| o.telemetry).collect(),
        totals,
        output: captured,
    })
}

/// File-to-file run: reads `config.input`, writes `config.output_path()`.
pub fn run_file(config: &RunConfig) -> Result<RunReport, RunError> {
    run_local(
        config,
        InputSource::File(config.input.clone()),
        OutputSink::File(config.output_path()),
        ApiConfig::default(),
    )
}

/// In-memory run returning the transformed bytes.
pub fn transform_bytes(
    data: &[u8],
    key: &[u8],
    direction: Direction,
    mode: CipherMode,
    workers: usize,
) -> Result<Vec<u8>, RunError> {
    let config = RunConfig::new(PathBuf::new(), direction, mode, key, workers)?;
    let report = run_local(
        &config,
        InputSource::Memory(data.to_vec()),
        OutputSink::Memory,
        ApiConfig::with_buf_enabled(),
    )?;
    Ok(report.output.unwrap_or_default())
}

/// First real failure, preferring the coordinator's; `Aborted` only if nothing else.
fn root_cause(mut failures: Vec<(usize, RunError)>) -> Option<RunError> {
    if failures.is_empty() {
        return None;
    }
    failures.sort_by_key(|(rank, _)| *rank);

    let idx = failures
        .iter()
        .position(|(_, e)| !e.is_aborted())
        .unwrap_or(0);
    Some(failures.swap_remove(idx).1)
}
