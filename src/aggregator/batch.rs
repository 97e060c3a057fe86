//! Lookahead buffer that batches symbol resolution.
//!
//! Every event needs the timestamp of the following line, so a flush turns
//! all buffered lines but the newest into events and keeps the newest one
//! for the next flush. At end of file the remaining newest line has no
//! successor and is dropped: the last retirement of a file never produces
//! an event.

use super::event::{assemble_event, EventContext, TraceEvent};
use crate::parser::schema::TraceLine;
use crate::symbols::{check_count, SymbolResolver};
use crate::utils::error::SymbolError;
use log::debug;

/// Pending lines of one trace file
#[derive(Debug)]
pub struct LineBuffer {
    lines: Vec<TraceLine>,
    threshold: usize,
}

impl LineBuffer {
    /// Create a buffer that asks for a flush once it holds more than
    /// `threshold` lines
    pub fn new(threshold: usize) -> Self {
        Self {
            lines: Vec::with_capacity(threshold + 1),
            threshold,
        }
    }

    /// Append a parsed line; returns true when the buffer should be flushed
    pub fn push(&mut self, line: TraceLine) -> bool {
        self.lines.push(line);
        self.lines.len() > self.threshold
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Resolve and assemble every line that has a successor
    ///
    /// One resolver call per flush; symbols are paired with lines by position.
    pub fn flush(
        &mut self,
        resolver: &mut dyn SymbolResolver,
        ctx: &EventContext,
    ) -> Result<Vec<TraceEvent>, SymbolError> {
        if self.lines.len() < 2 {
            return Ok(Vec::new());
        }

        let ready = self.lines.len() - 1;
        let pcs: Vec<String> = self.lines[..ready].iter().map(|l| l.pc.clone()).collect();
        let symbols = resolver.resolve_batch(&pcs)?;
        check_count(pcs.len(), symbols.len())?;

        debug!("Flushing {} lines for {}", ready, ctx.process_id);

        let events = self
            .lines
            .windows(2)
            .zip(&symbols)
            .map(|(pair, symbol)| assemble_event(&pair[0], pair[1].stamp, symbol, ctx))
            .collect();
        self.lines.drain(..ready);

        Ok(events)
    }

    /// Final flush at end of file; the buffer is empty afterwards
    pub fn finish(
        &mut self,
        resolver: &mut dyn SymbolResolver,
        ctx: &EventContext,
    ) -> Result<Vec<TraceEvent>, SymbolError> {
        let events = self.flush(resolver, ctx)?;
        if let Some(last) = self.lines.pop() {
            debug!("Dropping final line at {} (no successor)", last.pc);
        }
        Ok(events)
    }
}
