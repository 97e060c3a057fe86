//! Trace line parsing and schema definitions.
//!
//! This module handles:
//! - Matching full and accelerator trace lines
//! - Typed line values (time, cycle, privilege, pc, instruction)
//! - Inferring hart ids from trace file names

pub mod hart;
pub mod line;
pub mod schema;

// Re-export main types
pub use hart::HartIdAllocator;
pub use line::parse_line;
pub use schema::{Privilege, TimeUnit, Timestamp, TraceLine};
