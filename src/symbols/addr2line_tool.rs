//! Symbolization through an external binutils-compatible `addr2line`.
//!
//! The tool runs once per batch as `addr2line -e <elf> -f -a -i <pc>...`.
//! Its output is one entry per address: the address echo, the function,
//! the location, then function/location lines for every inlining frame.

use super::{check_count, SymbolInfo, SymbolResolver};
use crate::utils::error::SymbolError;
use log::debug;
use std::path::PathBuf;
use std::process::Command;

/// Resolver that shells out to `addr2line`
#[derive(Debug, Clone)]
pub struct Addr2LineTool {
    tool: PathBuf,
    elf: PathBuf,
}

impl Addr2LineTool {
    pub fn new(tool: impl Into<PathBuf>, elf: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            elf: elf.into(),
        }
    }
}

impl SymbolResolver for Addr2LineTool {
    fn resolve_batch(&mut self, pcs: &[String]) -> Result<Vec<SymbolInfo>, SymbolError> {
        if pcs.is_empty() {
            return Ok(Vec::new());
        }

        let tool = self.tool.display().to_string();
        debug!("Running {} for {} addresses", tool, pcs.len());

        let output = Command::new(&self.tool)
            .arg("-e")
            .arg(&self.elf)
            .args(["-f", "-a", "-i"])
            .args(pcs)
            .output()
            .map_err(|source| SymbolError::ToolSpawn {
                tool: tool.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SymbolError::ToolFailed {
                tool,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let infos = parse_addr2line_output(&String::from_utf8_lossy(&output.stdout))?;
        check_count(pcs.len(), infos.len())?;
        Ok(infos)
    }
}

/// Split `addr2line -f -a -i` output into one entry per address
///
/// An entry starts at a line beginning with `0x`. Lines after the location
/// that do not start a new address belong to the entry's inlining chain.
///
/// # Errors
/// * `SymbolError::MalformedOutput` - output does not start with an address,
///   or an entry is missing its function or location line
pub fn parse_addr2line_output(text: &str) -> Result<Vec<SymbolInfo>, SymbolError> {
    let mut entries = Vec::new();
    let mut lines = text.lines().peekable();

    while let Some(pc) = lines.next() {
        if !pc.starts_with("0x") {
            return Err(SymbolError::MalformedOutput(format!(
                "expected an address, found {:?}",
                pc
            )));
        }

        let function = lines.next().ok_or_else(|| {
            SymbolError::MalformedOutput(format!("missing function for {}", pc))
        })?;
        let location = lines.next().ok_or_else(|| {
            SymbolError::MalformedOutput(format!("missing location for {}", pc))
        })?;

        let mut inlined_chain = Vec::new();
        while let Some(line) = lines.next_if(|l| !l.starts_with("0x")) {
            inlined_chain.push(line.to_string());
        }

        entries.push(SymbolInfo {
            pc: pc.to_string(),
            function: function.to_string(),
            location: location.to_string(),
            inlined_chain,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_plain_entries() {
        let text = "0x0000000080000000\n_start\ncrt0.S:12\n0x0000000080000004\nmain\nmain.c:7\n";
        let entries = parse_addr2line_output(text).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].pc, "0x0000000080000000");
        assert_eq!(entries[0].function, "_start");
        assert_eq!(entries[0].location, "crt0.S:12");
        assert!(entries[0].inlined_chain.is_empty());
        assert_eq!(entries[1].function, "main");
    }

    #[test]
    fn test_parse_inlined_entries() {
        let text = "\
0x00001000
mempool_barrier
synchronization.c:42
main
main.c:20
0x00001004
main
main.c:21
";
        let entries = parse_addr2line_output(text).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].inlined_chain,
            vec!["main".to_string(), "main.c:20".to_string()]
        );
        assert_eq!(entries[1].pc, "0x00001004");
        assert!(entries[1].inlined_chain.is_empty());
    }

    #[test]
    fn test_parse_unknown_symbol() {
        let entries = parse_addr2line_output("0x00000000\n??\n??:0\n").unwrap();
        assert_eq!(entries[0].function, "??");
        assert_eq!(entries[0].location, "??:0");
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_addr2line_output("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_truncated_entry() {
        let result = parse_addr2line_output("0x00001000\nmain\n");
        assert!(matches!(result, Err(SymbolError::MalformedOutput(_))));
    }

    #[test]
    fn test_parse_missing_address() {
        let result = parse_addr2line_output("main\nmain.c:1\n");
        assert!(matches!(result, Err(SymbolError::MalformedOutput(_))));
    }

    #[test]
    fn test_missing_tool_is_fatal() {
        let mut tool = Addr2LineTool::new("/nonexistent/addr2line", "firmware.elf");
        let result = tool.resolve_batch(&["0x1000".to_string()]);
        assert!(matches!(result, Err(SymbolError::ToolSpawn { .. })));
    }

    #[test]
    fn test_empty_batch_skips_tool() {
        let mut tool = Addr2LineTool::new("/nonexistent/addr2line", "firmware.elf");
        assert!(tool.resolve_batch(&[]).unwrap().is_empty());
    }

    fn system_addr2line() -> Option<&'static str> {
        Command::new("addr2line")
            .arg("--version")
            .output()
            .ok()
            .filter(|out| out.status.success())
            // Exit codes and output below are binutils behaviour
            .filter(|out| String::from_utf8_lossy(&out.stdout).contains("GNU"))
            .map(|_| "addr2line")
    }

    #[test]
    fn test_runs_real_tool_in_order() {
        let Some(tool) = system_addr2line() else {
            eprintln!("GNU addr2line not installed, skipping");
            return;
        };
        let exe = std::env::current_exe().unwrap();
        let mut resolver = Addr2LineTool::new(tool, exe);

        let pcs = ["0x10", "0x0", "0x20"].map(String::from);
        let infos = resolver.resolve_batch(&pcs).unwrap();

        let echoed: Vec<u64> = infos
            .iter()
            .map(|info| crate::symbols::parse_pc(&info.pc).unwrap())
            .collect();
        assert_eq!(echoed, vec![0x10, 0x0, 0x20]);
        assert!(infos.iter().all(|info| !info.function.is_empty()));
        assert!(infos.iter().all(|info| info.location.contains(':')));
    }

    #[test]
    fn test_tool_error_exit_is_fatal() {
        let Some(tool) = system_addr2line() else {
            eprintln!("GNU addr2line not installed, skipping");
            return;
        };
        let mut resolver = Addr2LineTool::new(tool, "/nonexistent/firmware.elf");

        let result = resolver.resolve_batch(&["0x1000".to_string()]);
        assert!(matches!(result, Err(SymbolError::ToolFailed { .. })));
    }
}
