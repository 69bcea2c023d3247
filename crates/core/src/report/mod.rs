//! Append-only plain-text logs of executable, timed-out and risky calls.
//!
//! File names:
//! - `<function>_executable<tag>.csv`
//! - `<function>_timed_out<tag>.csv`
//! - `<risky-tag><tag>.csv`
//!
//! where `<tag>` is the per-run [`RunTag`] suffix. Each record is the bare
//! call text followed by a newline.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;

use crate::model::{CallRecord, RiskyTag};

/// Suffix appended to every output file name of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunTag {
    None,
    Timestamp(String),
}

impl RunTag {
    /// A UTC timestamp taken once, e.g. `2024-05-01T12:00:00.123456`.
    pub fn now() -> Self {
        RunTag::Timestamp(Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string())
    }

    pub fn suffix(&self) -> &str {
        match self {
            RunTag::None => "",
            RunTag::Timestamp(ts) => ts,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to open {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Writes call records for one target function into an output directory.
///
/// Handles are opened on first use and kept for the rest of the run.
pub struct ReportSink {
    dir: PathBuf,
    function: String,
    run_tag: RunTag,
    handles: HashMap<PathBuf, File>,
}

impl ReportSink {
    /// Create the output directory if needed and start a fresh executable log.
    pub fn create(dir: &Path, function: &str, run_tag: RunTag) -> Result<Self, ReportError> {
        fs::create_dir_all(dir)
            .map_err(|source| ReportError::CreateDir { path: dir.to_path_buf(), source })?;
        let mut sink = Self {
            dir: dir.to_path_buf(),
            function: function.to_string(),
            run_tag,
            handles: HashMap::new(),
        };
        let executable = sink.executable_path();
        let file = File::create(&executable)
            .map_err(|source| ReportError::Open { path: executable.clone(), source })?;
        sink.handles.insert(executable, file);
        Ok(sink)
    }

    pub fn run_tag(&self) -> &RunTag {
        &self.run_tag
    }

    pub fn executable_path(&self) -> PathBuf {
        self.dir.join(format!("{}_executable{}.csv", self.function, self.run_tag.suffix()))
    }

    pub fn timed_out_path(&self) -> PathBuf {
        self.dir.join(format!("{}_timed_out{}.csv", self.function, self.run_tag.suffix()))
    }

    pub fn tag_path(&self, tag: &RiskyTag) -> PathBuf {
        self.dir.join(format!("{}{}.csv", tag, self.run_tag.suffix()))
    }

    pub fn record_executable(&mut self, call: &CallRecord) -> Result<(), ReportError> {
        let path = self.executable_path();
        self.append(path, call)
    }

    pub fn record_timed_out(&mut self, call: &CallRecord) -> Result<(), ReportError> {
        let path = self.timed_out_path();
        self.append(path, call)
    }

    pub fn record_tag(&mut self, tag: &RiskyTag, call: &CallRecord) -> Result<(), ReportError> {
        let path = self.tag_path(tag);
        self.append(path, call)
    }

    fn append(&mut self, path: PathBuf, call: &CallRecord) -> Result<(), ReportError> {
        let file = match self.handles.entry(path.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .map_err(|source| ReportError::Open { path: path.clone(), source })?;
                entry.insert(file)
            }
        };
        writeln!(file, "{call}")
            .and_then(|_| file.flush())
            .map_err(|source| ReportError::Write { path, source })
    }
}
