//! Trace-event records for the timeline viewer.
//!
//! One complete ("X" phase) event per retired instruction.

use crate::parser::schema::{TimeUnit, Timestamp, TraceLine};
use crate::symbols::SymbolInfo;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Phase of a complete event (start + duration)
pub const PHASE_COMPLETE: &str = "X";

/// One timeline event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Instruction mnemonic
    pub name: String,

    /// Category, also the instruction mnemonic
    pub cat: String,

    pub ph: String,

    /// Start in cycles or time units
    pub ts: u64,

    /// Distance to the next retirement in the same unit as `ts`
    pub dur: i64,

    /// `<elf>:hartid<N>`
    pub pid: String,

    /// Resolved function name
    pub tid: String,

    pub args: EventArgs,
}

/// Per-event details shown by the viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventArgs {
    /// Address echoed by the resolver
    pub pc: String,

    /// `<instruction> <args>`
    pub instr: String,

    /// Cycle count of the retirement, whatever the selected unit
    pub time: String,

    #[serde(rename = "Origin")]
    pub origin: String,

    pub inline: String,
}

/// Values shared by every event of one trace file
#[derive(Debug, Clone)]
pub struct EventContext {
    pub process_id: String,
    pub unit: TimeUnit,
}

impl EventContext {
    pub fn new(elf: &Path, hart_id: u32, unit: TimeUnit) -> Self {
        Self {
            process_id: process_id(elf, hart_id),
            unit,
        }
    }
}

/// Process id shown by the viewer for one hart
pub fn process_id(elf: &Path, hart_id: u32) -> String {
    format!("{}:hartid{}", elf.display(), hart_id)
}

/// Build the event for `line`, closed by the retirement at `next`
///
/// **Public** - used by the line buffer when flushing
pub fn assemble_event(
    line: &TraceLine,
    next: Timestamp,
    symbol: &SymbolInfo,
    ctx: &EventContext,
) -> TraceEvent {
    let start = line.stamp.value(ctx.unit);
    let end = next.value(ctx.unit);

    TraceEvent {
        name: line.instruction.clone(),
        cat: line.instruction.clone(),
        ph: PHASE_COMPLETE.to_string(),
        ts: start,
        // Out-of-order stamps give a negative duration; the viewer shows them as-is
        dur: end.wrapping_sub(start) as i64,
        pid: ctx.process_id.clone(),
        tid: symbol.function.clone(),
        args: EventArgs {
            pc: symbol.pc.clone(),
            instr: line.disasm(),
            time: line.stamp.cycle.to_string(),
            origin: symbol.location.clone(),
            inline: symbol.inline_text(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::schema::Privilege;
    use pretty_assertions::assert_eq;

    fn line(time: u64, cycle: u64) -> TraceLine {
        TraceLine {
            stamp: Timestamp::new(time, cycle),
            privilege: Privilege::Machine,
            pc: "0x00001000".to_string(),
            instruction: "csrr".to_string(),
            args: "a0, mhartid".to_string(),
            inherited: false,
        }
    }

    fn symbol() -> SymbolInfo {
        SymbolInfo {
            pc: "0x00001000".to_string(),
            function: "_start".to_string(),
            location: "crt0.S:10".to_string(),
            inlined_chain: Vec::new(),
        }
    }

    #[test]
    fn test_assemble_cycle_mode() {
        let ctx = EventContext::new(Path::new("app.elf"), 3, TimeUnit::Cycle);
        let event = assemble_event(&line(101000, 82), Timestamp::new(103000, 84), &symbol(), &ctx);

        assert_eq!(event.name, "csrr");
        assert_eq!(event.cat, "csrr");
        assert_eq!(event.ph, "X");
        assert_eq!(event.ts, 82);
        assert_eq!(event.dur, 2);
        assert_eq!(event.pid, "app.elf:hartid3");
        assert_eq!(event.tid, "_start");
        assert_eq!(event.args.instr, "csrr a0, mhartid");
        assert_eq!(event.args.time, "82");
        assert_eq!(event.args.origin, "crt0.S:10");
        assert_eq!(event.args.inline, "");
    }

    #[test]
    fn test_assemble_time_mode() {
        let ctx = EventContext::new(Path::new("app.elf"), 0, TimeUnit::Time);
        let event = assemble_event(&line(101000, 82), Timestamp::new(103000, 84), &symbol(), &ctx);

        assert_eq!(event.ts, 101000);
        assert_eq!(event.dur, 2000);
        // The args keep the cycle count
        assert_eq!(event.args.time, "82");
    }

    #[test]
    fn test_backwards_stamp_gives_negative_duration() {
        let ctx = EventContext::new(Path::new("app.elf"), 0, TimeUnit::Cycle);
        let event = assemble_event(&line(0, 10), Timestamp::new(0, 7), &symbol(), &ctx);
        assert_eq!(event.dur, -3);
    }

    #[test]
    fn test_serialized_keys() {
        let ctx = EventContext::new(Path::new("app.elf"), 1, TimeUnit::Cycle);
        let event = assemble_event(&line(1, 2), Timestamp::new(3, 4), &symbol(), &ctx);
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["ph"], "X");
        assert_eq!(value["dur"], 2);
        assert_eq!(value["args"]["Origin"], "crt0.S:10");
        assert!(value["args"].get("origin").is_none());
    }
}
