//! Typed values produced by the line parser.

/// Processor privilege level at retirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Privilege {
    Machine,
    Supervisor,
    User,
    /// Empty privilege column
    #[default]
    Unknown,
}

impl Privilege {
    /// Map the privilege column of a trace line; accepts both the numeric
    /// and the letter encodings
    pub fn from_column(column: &str) -> Self {
        match column {
            "3" | "M" => Privilege::Machine,
            "1" | "S" => Privilege::Supervisor,
            "0" | "U" => Privilege::User,
            _ => Privilege::Unknown,
        }
    }
}

/// The (time, cycle) pair of a retirement
///
/// Threaded explicitly through the per-file parse loop so abbreviated
/// lines can inherit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timestamp {
    pub time: u64,
    pub cycle: u64,
}

impl Timestamp {
    pub fn new(time: u64, cycle: u64) -> Self {
        Self { time, cycle }
    }

    /// Pick the field that drives `ts`/`dur` for the given unit
    pub fn value(&self, unit: TimeUnit) -> u64 {
        match unit {
            TimeUnit::Cycle => self.cycle,
            TimeUnit::Time => self.time,
        }
    }
}

/// Unit used for event start times and durations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeUnit {
    #[default]
    Cycle,
    Time,
}

/// One retired instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLine {
    pub stamp: Timestamp,
    pub privilege: Privilege,
    /// Program counter as printed in the trace (`0x`-prefixed hex)
    pub pc: String,
    pub instruction: String,
    pub args: String,
    /// True when the line had no time/cycle of its own
    pub inherited: bool,
}

impl TraceLine {
    /// Disassembly as shown in the event arguments
    pub fn disasm(&self) -> String {
        format!("{} {}", self.instruction, self.args)
    }
}
