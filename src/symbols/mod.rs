//! Symbol resolution: program counters to function names and source locations.
//!
//! Resolution is always batched. A resolver receives the PCs of one buffer
//! flush and must answer with exactly one entry per PC, in the same order.

pub mod addr2line_tool;
pub mod dwarf;

use crate::utils::config::INLINED_BY_PREFIX;
use crate::utils::error::{ParseError, SymbolError};

pub use addr2line_tool::{parse_addr2line_output, Addr2LineTool};
pub use dwarf::DwarfResolver;

/// Resolved symbol information for one program counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    /// Address as echoed by the resolver
    pub pc: String,
    pub function: String,
    /// `file:line`
    pub location: String,
    /// Function and location lines of the frames the address was inlined into
    pub inlined_chain: Vec<String>,
}

impl SymbolInfo {
    /// Inlining chain flattened into the single string stored in the event
    pub fn inline_text(&self) -> String {
        self.inlined_chain
            .iter()
            .map(|line| format!("{}{}", INLINED_BY_PREFIX, line))
            .collect()
    }
}

/// Batch address-to-symbol lookup
pub trait SymbolResolver {
    /// Resolve `pcs` in order; the result has the same length and order
    fn resolve_batch(&mut self, pcs: &[String]) -> Result<Vec<SymbolInfo>, SymbolError>;
}

/// Parse a `0x`-prefixed hex program counter
pub fn parse_pc(pc: &str) -> Result<u64, ParseError> {
    pc.strip_prefix("0x")
        .and_then(|hex| u64::from_str_radix(hex, 16).ok())
        .ok_or_else(|| ParseError::InvalidPc(pc.to_string()))
}

/// Fail unless the resolver answered once per requested address
pub(crate) fn check_count(expected: usize, got: usize) -> Result<(), SymbolError> {
    if expected != got {
        return Err(SymbolError::CountMismatch { expected, got });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pc() {
        assert_eq!(parse_pc("0x00001000").unwrap(), 0x1000);
        assert_eq!(parse_pc("0x80000010").unwrap(), 0x8000_0010);
        assert!(parse_pc("1000").is_err());
        assert!(parse_pc("0xzz").is_err());
    }

    #[test]
    fn test_inline_text() {
        let info = SymbolInfo {
            pc: "0x1000".to_string(),
            function: "leaf".to_string(),
            location: "a.c:3".to_string(),
            inlined_chain: vec!["main".to_string(), "main.c:10".to_string()],
        };
        assert_eq!(
            info.inline_text(),
            "(inlined by) main(inlined by) main.c:10"
        );
    }

    #[test]
    fn test_inline_text_empty_chain() {
        let info = SymbolInfo {
            pc: "0x1000".to_string(),
            function: "main".to_string(),
            location: "main.c:1".to_string(),
            inlined_chain: Vec::new(),
        };
        assert_eq!(info.inline_text(), "");
    }
}
