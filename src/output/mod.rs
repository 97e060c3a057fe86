//! Output writers for trace-event data.
//!
//! This module handles writing the viewer's JSON document to disk,
//! streaming events as they are assembled.

pub mod json;

// Re-export main functions
pub use json::{file_size, read_trace_events, validate_output_path, EventWriter};
