//! Hardware-thread id inference from trace file names.

use log::debug;
use std::path::Path;

/// Assigns a hart id to each trace file in command-line order
///
/// The id is the last run of digits in the file name. Files without one
/// get the previously assigned id plus one.
#[derive(Debug, Default)]
pub struct HartIdAllocator {
    previous: u32,
}

impl HartIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hart id for the next trace file
    pub fn next_id(&mut self, path: &Path) -> u32 {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());

        let id = match last_digit_run(&name) {
            Some(id) => id,
            None => {
                let id = self.previous.saturating_add(1);
                debug!("No hart id in {}, using {}", name, id);
                id
            }
        };
        self.previous = id;
        id
    }
}

/// Last run of ASCII digits in `name`, if it fits a u32
pub fn last_digit_run(name: &str) -> Option<u32> {
    let bytes = name.as_bytes();
    let end = bytes.iter().rposition(u8::is_ascii_digit)? + 1;
    let start = bytes[..end]
        .iter()
        .rposition(|b| !b.is_ascii_digit())
        .map_or(0, |i| i + 1);
    name[start..end].parse().ok()
}
