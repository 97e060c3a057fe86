//! Streaming trace-event JSON writer.
//!
//! Events are written one per line as they are produced. The document is
//! bracketed by a fixed header and a footer whose empty object absorbs the
//! trailing comma of the last event.

use crate::aggregator::event::TraceEvent;
use crate::utils::config::{JSON_FOOTER, JSON_HEADER};
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writer for one trace-event document
pub struct EventWriter<W: Write> {
    writer: W,
    events: usize,
}

impl EventWriter<BufWriter<File>> {
    /// Create the output file (and missing parent directories) and write the header
    ///
    /// **Public** - main entry point for JSON output
    ///
    /// # Errors
    /// * `OutputError::InvalidPath` - Path is empty, a directory, or its parent cannot be created
    /// * `OutputError::WriteFailed` - I/O error during create or write
    pub fn create(output_path: impl AsRef<Path>) -> Result<Self, OutputError> {
        let output_path = output_path.as_ref();

        info!("Writing trace events to: {}", output_path.display());

        validate_output_path(output_path)?;

        // Create parent directories if needed
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating parent directories: {}", parent.display());
                std::fs::create_dir_all(parent).map_err(|e| {
                    OutputError::InvalidPath(format!(
                        "Cannot create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> EventWriter<W> {
    /// Wrap any writer and emit the document header
    pub fn new(mut writer: W) -> Result<Self, OutputError> {
        writer.write_all(JSON_HEADER.as_bytes())?;
        Ok(Self { writer, events: 0 })
    }

    /// Append one event followed by a comma
    pub fn write_event(&mut self, event: &TraceEvent) -> Result<(), OutputError> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b",\n")?;
        self.events += 1;
        Ok(())
    }

    /// Number of events written so far
    pub fn events_written(&self) -> usize {
        self.events
    }

    /// Write the footer, flush, and hand back the inner writer
    pub fn finish(mut self) -> Result<W, OutputError> {
        self.writer.write_all(JSON_FOOTER.as_bytes())?;
        self.writer.flush()?;
        debug!("Trace document closed after {} events", self.events);
        Ok(self.writer)
    }
}

/// Validate that output path is writable
///
/// **Public** - also used for early argument validation
pub fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    // Check if we're trying to overwrite a directory
    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Calculate file size in bytes
pub fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[derive(Deserialize)]
struct TraceDocument {
    #[serde(rename = "traceEvents")]
    trace_events: Vec<serde_json::Value>,
}

/// Read the events back from a written trace document
///
/// The empty placeholder object at the end of the array is skipped.
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - Not a trace-event document
pub fn read_trace_events(input_path: impl AsRef<Path>) -> Result<Vec<TraceEvent>, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading trace events from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let document: TraceDocument = serde_json::from_reader(std::io::BufReader::new(file))?;

    document
        .trace_events
        .into_iter()
        .filter(|value| value.as_object().is_some_and(|obj| !obj.is_empty()))
        .map(|value| serde_json::from_value(value).map_err(OutputError::SerializationFailed))
        .collect()
}
