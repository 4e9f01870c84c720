//! Persistence bridge for finished trials.
//!
//! The host platform that stores student data is outside this workspace.
//! The simulation only needs a fire-and-forget `save(record)` capability:
//! sinks swallow their own failures and report them through `tracing`.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use photosim_types::{EndReason, SessionId, Trial};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::TrialError;

/// A finished trial as handed to the persistence bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialRecord {
    /// Session the trial belongs to.
    pub session_id: SessionId,
    /// Why the trial ended.
    pub end_reason: EndReason,
    /// The trial itself, including its event log and series.
    pub trial: Trial,
}

/// Destination for finished trial records.
pub trait TrialSink: Send + core::fmt::Debug {
    /// Persist one record. Must not fail the caller.
    fn save(&mut self, record: &TrialRecord);
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TrialSink for NullSink {
    fn save(&mut self, record: &TrialRecord) {
        debug!(trial = record.trial.index, "Trial record discarded");
    }
}

/// Keeps records in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<TrialRecord>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every record saved so far.
    pub fn records(&self) -> Vec<TrialRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TrialSink for MemorySink {
    fn save(&mut self, record: &TrialRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}

/// Appends one JSON document per line to a file.
#[derive(Debug)]
pub struct JsonLinesSink {
    /// Destination path, kept for log messages.
    path: PathBuf,
    /// Open append handle.
    file: File,
}

impl JsonLinesSink {
    /// Open (or create) `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns [`TrialError::Io`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, TrialError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// The file this sink writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TrialSink for JsonLinesSink {
    fn save(&mut self, record: &TrialRecord) {
        let line = match serde_json::to_string(record) {
            Ok(line) => line,
            Err(e) => {
                warn!(trial = record.trial.index, error = %e, "Failed to serialize trial record");
                return;
            }
        };
        if let Err(e) = writeln!(self.file, "{line}") {
            warn!(
                trial = record.trial.index,
                path = %self.path.display(),
                error = %e,
                "Failed to write trial record"
            );
            return;
        }
        debug!(trial = record.trial.index, path = %self.path.display(), "Trial record saved");
    }
}
