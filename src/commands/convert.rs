//! Convert command implementation.
//!
//! The convert command:
//! 1. Validates the executable, traces and output path
//! 2. Opens the symbol resolver for the executable
//! 3. Streams every trace file through parse, buffer, resolve and assemble
//! 4. Writes the trace-event JSON document

use crate::aggregator::{EventContext, LineBuffer, TraceEvent};
use crate::output::{file_size, validate_output_path, EventWriter};
use crate::parser::{parse_line, HartIdAllocator, TimeUnit, Timestamp};
use crate::symbols::{Addr2LineTool, DwarfResolver, SymbolResolver};
use crate::utils::config::{DEFAULT_BATCH_SIZE, DEFAULT_OUTPUT, PROGRESS_INTERVAL};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the convert command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ConvertArgs {
    /// Executable whose debug info resolves program counters
    pub elf: PathBuf,

    /// Trace files, one per hart
    pub traces: Vec<PathBuf>,

    /// Output path for the trace-event JSON
    pub output: PathBuf,

    /// Unit for event start and duration
    pub unit: TimeUnit,

    /// Lines of each trace to parse
    pub range: LineRange,

    /// Flush threshold of the line buffer
    pub batch_size: usize,

    /// External addr2line program (None = built-in DWARF resolver)
    pub addr2line: Option<PathBuf>,
}

impl Default for ConvertArgs {
    fn default() -> Self {
        Self {
            elf: PathBuf::new(),
            traces: Vec::new(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            unit: TimeUnit::Cycle,
            range: LineRange::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            addr2line: None,
        }
    }
}

/// Zero-based `[start, end)` slice of each trace file's lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineRange {
    pub start: usize,
    /// None = end of file
    pub end: Option<usize>,
}

impl LineRange {
    pub fn new(start: usize, end: Option<usize>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && !self.is_past(index)
    }

    /// True once `index` is at or beyond the end bound
    pub fn is_past(&self, index: usize) -> bool {
        self.end.is_some_and(|end| index >= end)
    }
}

/// Line counts for one processed trace file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStats {
    pub path: PathBuf,
    pub hart_id: u32,
    /// Lines inside the selected range
    pub lines: usize,
    /// Lines that matched a grammar
    pub parsed: usize,
    pub events: usize,
}

impl FileStats {
    pub fn failed(&self) -> usize {
        self.lines - self.parsed
    }

    pub fn summary(&self) -> String {
        format!(" parsed {} of {} lines", self.parsed, self.lines)
    }
}

/// Execute the convert command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Missing or unreadable executable or trace files
/// * Symbol resolution failures
/// * File write errors
pub fn execute_convert(args: ConvertArgs) -> Result<Vec<FileStats>> {
    let start_time = Instant::now();

    info!("elf {}", args.elf.display());
    info!(
        "traces {:?}",
        args.traces.iter().map(|t| t.display().to_string()).collect::<Vec<_>>()
    );
    info!("output {}", args.output.display());

    let mut resolver: Box<dyn SymbolResolver> = match &args.addr2line {
        Some(tool) => {
            info!("Resolving symbols with {}", tool.display());
            Box::new(Addr2LineTool::new(tool, &args.elf))
        }
        None => Box::new(
            DwarfResolver::new(&args.elf)
                .with_context(|| format!("Failed to load symbols from {}", args.elf.display()))?,
        ),
    };

    let stats = convert_traces(&args, resolver.as_mut())?;

    info!(
        "Wrote {} events to {} ({} bytes) in {:.2}s",
        stats.iter().map(|s| s.events).sum::<usize>(),
        args.output.display(),
        file_size(&args.output),
        start_time.elapsed().as_secs_f64()
    );

    Ok(stats)
}

/// Convert every trace file with the given resolver into one output document
///
/// **Public** - lets callers supply their own resolver
pub fn convert_traces(
    args: &ConvertArgs,
    resolver: &mut dyn SymbolResolver,
) -> Result<Vec<FileStats>> {
    let mut writer = EventWriter::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let mut harts = HartIdAllocator::new();
    let mut stats = Vec::with_capacity(args.traces.len());

    for path in &args.traces {
        let hart_id = harts.next_id(path);
        info!("parsing hartid {} with trace {}", hart_id, path.display());

        let file = File::open(path)
            .with_context(|| format!("Failed to open trace {}", path.display()))?;

        let ctx = EventContext::new(&args.elf, hart_id, args.unit);
        let (lines, parsed, events) = process_trace(
            BufReader::new(file),
            &ctx,
            args.range,
            args.batch_size,
            resolver,
            &mut writer,
        )
        .with_context(|| format!("Failed to process trace {}", path.display()))?;

        let file_stats = FileStats {
            path: path.clone(),
            hart_id,
            lines,
            parsed,
            events,
        };
        info!("{}", file_stats.summary());
        if file_stats.failed() > 0 {
            debug!("{} lines in {} matched no grammar", file_stats.failed(), path.display());
        }
        stats.push(file_stats);
    }

    writer.finish().context("Failed to finish output JSON")?;

    Ok(stats)
}

/// Stream one trace through the parse/buffer/resolve/write pipeline
///
/// Returns `(lines, parsed, events)` for the selected range.
pub fn process_trace<R: BufRead, W: Write>(
    reader: R,
    ctx: &EventContext,
    range: LineRange,
    batch_size: usize,
    resolver: &mut dyn SymbolResolver,
    writer: &mut EventWriter<W>,
) -> Result<(usize, usize, usize)> {
    let mut buffer = LineBuffer::new(batch_size);
    let mut last = Timestamp::default();
    let mut seen_full = false;
    let mut warned_orphan = false;
    let (mut lines, mut parsed, mut events) = (0, 0, 0);

    for (index, raw) in reader.split(b'\n').enumerate() {
        if range.is_past(index) {
            break;
        }
        let raw = raw.context("Failed to read trace line")?;
        if !range.contains(index) {
            continue;
        }

        lines += 1;
        if lines % PROGRESS_INTERVAL == 0 {
            debug!("{}: {} lines read", ctx.process_id, lines);
        }

        let text = String::from_utf8_lossy(strip_cr(&raw));
        let Some(line) = parse_line(&text, last) else {
            continue;
        };

        if line.inherited && !seen_full && !warned_orphan {
            warn!(
                "Line {} has no time/cycle and no earlier full record; using {}/{}",
                index, last.time, last.cycle
            );
            warned_orphan = true;
        }
        seen_full |= !line.inherited;

        parsed += 1;
        last = line.stamp;

        if buffer.push(line) {
            let batch = buffer.flush(resolver, ctx)?;
            events += write_all(writer, &batch)?;
        }
    }

    let batch = buffer.finish(resolver, ctx)?;
    events += write_all(writer, &batch)?;

    Ok((lines, parsed, events))
}

fn write_all<W: Write>(writer: &mut EventWriter<W>, events: &[TraceEvent]) -> Result<usize> {
    for event in events {
        writer.write_event(event)?;
    }
    Ok(events.len())
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Validate convert arguments
///
/// **Public** - can be called before execute_convert for early validation
pub fn validate_args(args: &ConvertArgs) -> Result<()> {
    if !args.elf.is_file() {
        anyhow::bail!("Executable not found: {}", args.elf.display());
    }

    if args.traces.is_empty() {
        anyhow::bail!("At least one trace file is required");
    }

    for trace in &args.traces {
        if !trace.is_file() {
            anyhow::bail!("Trace file not found: {}", trace.display());
        }
    }

    if args.batch_size == 0 {
        anyhow::bail!("batch size must be greater than 0");
    }

    validate_output_path(&args.output)?;

    if let Some(tool) = &args.addr2line {
        if tool.as_os_str().is_empty() {
            anyhow::bail!("addr2line tool path cannot be empty");
        }
    }

    Ok(())
}
