//! Configuration and constants for the CLI.

/// Default output path for the trace-event JSON
pub const DEFAULT_OUTPUT: &str = "chrome.json";

/// Number of buffered lines that triggers a symbol-resolution flush
/// (a flush happens once the buffer holds more than this many lines)
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Literal header opening the `traceEvents` array
pub const JSON_HEADER: &str = "{\"traceEvents\": [\n";

/// Literal footer; the empty object absorbs the trailing comma of the last event
pub const JSON_FOOTER: &str = "{}]}\n";

/// Emit a progress message every this many input lines
pub const PROGRESS_INTERVAL: usize = 100_000;

/// Environment variable naming an external addr2line program
pub const ADDR2LINE_ENV: &str = "TRACEVIS_ADDR2LINE";

/// Placeholder addr2line prints for unknown functions and files
pub const UNKNOWN_SYMBOL: &str = "??";

/// Prefix attached to every inlined-chain line in the emitted event
pub const INLINED_BY_PREFIX: &str = "(inlined by) ";
