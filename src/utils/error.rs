//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while turning trace text into typed values
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid program counter: {0}")]
    InvalidPc(String),
}

/// Errors that can occur during symbol resolution
///
/// Every variant is fatal for the run: there is no per-PC fallback.
#[derive(Error, Debug)]
pub enum SymbolError {
    #[error("Failed to read executable {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse executable {path}: {reason}")]
    InvalidObject { path: String, reason: String },

    #[error("Failed to load debug info: {0}")]
    Dwarf(#[from] gimli::Error),

    #[error("Failed to run {tool}: {source}")]
    ToolSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Malformed resolver output: {0}")]
    MalformedOutput(String),

    #[error("Resolver returned {got} entries for {expected} addresses")]
    CountMismatch { expected: usize, got: usize },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
