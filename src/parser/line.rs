//! Trace line grammars.
//!
//! A full record looks like
//!
//! ```text
//! 101000 82      M         0x00001000 csrr    a0, mhartid     #; comment
//! time   cycle   priv      pc         insn    args
//! ```
//!
//! Lines retired by the accelerator drop the leading time and cycle columns
//! and inherit them from the previous parsed line of the same file.

use super::schema::{Privilege, Timestamp, TraceLine};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Full record: time, cycle, privilege, pc, instruction, args up to the comment
static FULL_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *(\d+) +(\d+) +([3M1S0U]?) *(0x[0-9a-f]+) ([.\w]+) +(.+)#")
        .expect("Invalid full trace line regex")
});

/// Accelerator record: privilege, pc, instruction, args up to the comment
static ACC_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ +([3M1S0U]?) *(0x[0-9a-f]+) ([.\w]+) +(.+)#")
        .expect("Invalid accelerator trace line regex")
});

/// Parse one raw trace line
///
/// **Public** - main entry point for line parsing
///
/// # Arguments
/// * `line` - Raw line without its newline
/// * `last` - Time/cycle of the previous parsed line in this file
///
/// # Returns
/// The parsed line, or `None` if neither grammar matches. An unmatched
/// line is not an error; callers count and skip it.
pub fn parse_line(line: &str, last: Timestamp) -> Option<TraceLine> {
    if let Some(caps) = FULL_LINE_RE.captures(line) {
        // Digit runs too long for u64 are treated as unmatched
        let time = field(&caps, 1).parse().ok()?;
        let cycle = field(&caps, 2).parse().ok()?;
        return Some(TraceLine {
            stamp: Timestamp::new(time, cycle),
            privilege: Privilege::from_column(field(&caps, 3)),
            pc: field(&caps, 4).to_string(),
            instruction: field(&caps, 5).to_string(),
            args: field(&caps, 6).to_string(),
            inherited: false,
        });
    }

    let caps = ACC_LINE_RE.captures(line)?;
    Some(TraceLine {
        stamp: last,
        privilege: Privilege::from_column(field(&caps, 1)),
        pc: field(&caps, 2).to_string(),
        instruction: field(&caps, 3).to_string(),
        args: field(&caps, 4).to_string(),
        inherited: true,
    })
}

/// Trimmed capture group (empty if the group did not participate)
fn field<'a>(caps: &Captures<'a>, index: usize) -> &'a str {
    caps.get(index).map(|m| m.as_str().trim()).unwrap_or("")
}
