//! Event Logger
//!
//! Append-only JSONL log of interaction results, progress and completion.

use opinion_events::{CompletionReport, InteractionResult, ProgressReport};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::warn;

use crate::observer::SimulationObserver;

/// One line of the log, tagged by `kind`.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogRecord<'a> {
    Interaction(&'a InteractionResult),
    Progress(&'a ProgressReport),
    Complete(&'a CompletionReport),
}

/// Observer writing every notification to a JSONL file
pub struct EventLogger {
    writer: Option<BufWriter<File>>,
    record_count: u64,
    write_failures: u64,
}

impl EventLogger {
    /// Create a new event logger writing to the specified path
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            record_count: 0,
            write_failures: 0,
        })
    }

    /// Create a logger that discards records (for testing)
    pub fn null() -> Self {
        Self {
            writer: None,
            record_count: 0,
            write_failures: 0,
        }
    }

    /// Records logged so far, including discarded ones
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Records that could not be written
    pub fn write_failures(&self) -> u64 {
        self.write_failures
    }

    /// Log one record
    pub fn log(&mut self, record: &LogRecord<'_>) -> std::io::Result<()> {
        self.record_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(record)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn log_or_warn(&mut self, record: LogRecord<'_>) {
        if let Err(e) = self.log(&record) {
            self.write_failures += 1;
            warn!("Failed to write event log record: {}", e);
        }
    }
}

impl SimulationObserver for EventLogger {
    fn on_interaction(&mut self, result: &InteractionResult) {
        self.log_or_warn(LogRecord::Interaction(result));
    }

    fn on_progress(&mut self, report: &ProgressReport) {
        self.log_or_warn(LogRecord::Progress(report));
    }

    fn on_complete(&mut self, report: &CompletionReport) {
        self.log_or_warn(LogRecord::Complete(report));
        if let Err(e) = self.flush() {
            warn!("Failed to flush event log: {}", e);
        }
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("Failed to flush event logger: {}", e);
        }
    }
}
