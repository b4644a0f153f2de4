//! shardcrypt CLI
//!
//! Splits a file across an in-process worker set, transforms every chunk with
//! AES-128, and writes the reassembled result next to the input.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shardcrypt_core::constants::DEFAULT_WORKERS;
use shardcrypt_core::protocol::{run_file, validate_run_config, RunConfig, RunReport};
use shardcrypt_core::utils::{human_bytes, parse_key};

/// Parallel AES-128 file encryption over a fixed worker set
#[derive(Parser, Debug)]
#[command(name = "shardcrypt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File to transform
    input: PathBuf,

    /// `encrypt` or `decrypt`
    operation: String,

    /// `block-chained-128` (alias `aes-128-cbc`) or `block-independent-128` (alias `aes-128-ecb`)
    mode: String,

    /// 16-byte key, taken as raw bytes unless --key-hex is set
    key: String,

    /// Number of workers (ranks)
    #[arg(short = 'n', long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Execution units per worker for the block-independent mode (default: cores / workers)
    #[arg(long)]
    threads: Option<usize>,

    /// Output file (default: derived from the input name)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Interpret the key argument as hex
    #[arg(long)]
    key_hex: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let json = cli.json;
    let report = run(cli)?;
    if json {
        println!("{}", report.to_json_pretty()?);
    }

    Ok(())
}

/// Validate the arguments, run the transform, and log the outcome.
fn run(cli: Cli) -> anyhow::Result<RunReport> {
    let key = parse_key(&cli.key, cli.key_hex)?;
    let (direction, mode) = validate_run_config(&cli.operation, &cli.mode, &key, cli.workers)?;

    let mut config = RunConfig::new(&cli.input, direction, mode, &key, cli.workers)?;
    if let Some(threads) = cli.threads {
        config = config.with_execution_units(threads);
    }
    if let Some(output) = cli.output {
        config = config.with_output(output);
    }

    let output_path = config.output_path();
    let report = run_file(&config)
        .with_context(|| format!("{direction} of {} failed", cli.input.display()))?;

    info!(
        output = %output_path.display(),
        size = %human_bytes(report.output_len as u64),
        elapsed = ?report.elapsed,
        "{direction} complete"
    );

    Ok(report)
}
