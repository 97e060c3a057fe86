//! Event assembly from parsed trace lines.
//!
//! This module handles:
//! - Buffering lines so symbols are resolved in batches
//! - Pairing each line with its successor for the duration
//! - Building the timeline event records

pub mod batch;
pub mod event;

// Re-export main types
pub use batch::LineBuffer;
pub use event::{assemble_event, process_id, EventArgs, EventContext, TraceEvent};
