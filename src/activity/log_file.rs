// src/activity/log_file.rs
// =============================================================================
// File-backed activity log.
//
// Format: one entry per line, `[YYYY-MM-DD HH:MM:SS] <json>`.
//
// Rotation is coarse: before appending, if the file has grown past
// MAX_LOG_FILE_SIZE it is deleted and the trail starts over.
//
// Writing never fails the caller. A log that cannot be written is reported
// through `tracing` and otherwise ignored.
// =============================================================================

use chrono::Local;
use serde::Serialize;
use std::fmt::Display;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Size in bytes past which the log file is truncated.
pub const MAX_LOG_FILE_SIZE: u64 = 500_000;

const LOG_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: Option<PathBuf>,
    enabled: bool,
}

impl ActivityLog {
    /// Log writing to `path`, gated by `enabled` (the `enable_logging` option).
    pub fn new(path: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            path: Some(path.into()),
            enabled,
        }
    }

    /// Log that only forwards to `tracing`.
    pub fn disabled() -> Self {
        Self {
            path: None,
            enabled: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.path.is_some()
    }

    /// Appends a message or structured payload.
    pub fn record<T: Serialize + ?Sized>(&self, message: &T) {
        let json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Could not encode activity log entry");
                return;
            }
        };

        debug!(entry = %json, "activity");

        let path = match (&self.path, self.enabled) {
            (Some(path), true) => path,
            _ => return,
        };

        if let Err(e) = append_line(path, &json) {
            warn!(path = %path.display(), error = %e, "Could not write activity log");
        }
    }

    /// Records an error's message and hands the error back, so raising and
    /// logging happen in one expression: `return Err(log.record_error(err))`.
    pub fn record_error<E: Display>(&self, err: E) -> E {
        warn!(error = %err, "indexnow error");
        self.record(&err.to_string());
        err
    }

    /// Full contents of the log file, or an empty string if there is none.
    pub fn show(&self) -> io::Result<String> {
        let Some(path) = &self.path else {
            return Ok(String::new());
        };

        match fs::read_to_string(path) {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    /// Deletes the log file. Returns whether a file was removed.
    pub fn clear(&self) -> io::Result<bool> {
        let Some(path) = &self.path else {
            return Ok(false);
        };

        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn append_line(path: &Path, json: &str) -> io::Result<()> {
    if let Ok(meta) = fs::metadata(path) {
        if meta.len() > MAX_LOG_FILE_SIZE {
            fs::remove_file(path)?;
        }
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let line = format!("[{}] {}\n", Local::now().format(LOG_DATE_FORMAT), json);

    // O_APPEND: each write lands at the current end of file.
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}
