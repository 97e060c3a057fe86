//! Tracevis
//!
//! Converts per-hart instruction retirement traces of a simulated
//! processor into the Chrome trace-event JSON format, annotated with
//! function names and source locations from the executable's debug info.
//!
//! This crate provides the core implementation for the
//! `tracevis` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! tracevis app.elf trace_hart_0.dasm trace_hart_1.dasm -o chrome.json
//! ```
//!
//! Load the resulting file in `about:tracing` or any viewer that reads
//! the trace-event format.

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod symbols;
pub mod utils;
