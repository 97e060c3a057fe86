//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod convert;

// Re-export main command functions
pub use convert::{
    convert_traces, execute_convert, process_trace, validate_args, ConvertArgs, FileStats,
    LineRange,
};
