//! Tracevis CLI
//!
//! Turns instruction traces into a timeline JSON with one event per
//! retired instruction.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use std::path::PathBuf;

use tracevis::commands::{execute_convert, validate_args, ConvertArgs, LineRange};
use tracevis::parser::TimeUnit;
use tracevis::utils::config::{ADDR2LINE_ENV, DEFAULT_BATCH_SIZE, DEFAULT_OUTPUT};

/// Tracevis - instruction traces to Chrome trace-event JSON
#[derive(Parser, Debug)]
#[command(name = "tracevis")]
#[command(version, about, long_about = None)]
struct Cli {
    /// The binary executed to generate the traces
    #[arg(value_name = "ELF")]
    elf: PathBuf,

    /// Traces to visualize, one per hart
    #[arg(value_name = "TRACE", required = true)]
    traces: Vec<PathBuf>,

    /// Output JSON file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Use the traces' time instead of cycles
    #[arg(short, long)]
    time: bool,

    /// First line to parse (zero-based)
    #[arg(short, long, default_value_t = 0)]
    start: usize,

    /// Line to stop before (default: end of file)
    #[arg(short, long)]
    end: Option<usize>,

    /// Lines buffered before each symbol lookup
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Resolve symbols with this external addr2line program
    #[arg(long, env = ADDR2LINE_ENV)]
    addr2line: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let args = ConvertArgs {
        elf: cli.elf,
        traces: cli.traces,
        output: cli.output,
        unit: if cli.time {
            TimeUnit::Time
        } else {
            TimeUnit::Cycle
        },
        range: LineRange::new(cli.start, cli.end),
        batch_size: cli.batch_size,
        addr2line: cli.addr2line,
    };

    // Validate args first
    validate_args(&args)?;

    execute_convert(args)?;

    Ok(())
}
