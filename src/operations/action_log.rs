// Action Log
// Append-only, timestamped audit trail, mirrored live to the operator

use chrono::{Local, NaiveDateTime};
use std::fs::{File, OpenOptions};
use std::io::{self, Stdout, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Result, SyncError};

/// Timestamp layout of every log line
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Durable action log plus an optional live mirror
///
/// Every line reaches the durable writer and is flushed before `record`
/// returns. Mirror write failures are reported through `tracing` and do not
/// fail the call.
pub struct ActionLog<D: Write = File, M: Write = Stdout> {
    path: PathBuf,
    durable: D,
    mirror: Option<M>,
    clock: fn() -> NaiveDateTime,
}

impl ActionLog<File, Stdout> {
    /// Open (or create) the log file for appending
    ///
    /// # Errors
    /// Returns `SyncError::Log` if the file cannot be opened
    pub fn open(path: &Path, mirror_stdout: bool) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| SyncError::Log {
                path: path.to_path_buf(),
                source,
            })?;

        let mirror = mirror_stdout.then(io::stdout);
        Ok(Self::new(path, file, mirror))
    }
}

impl<D: Write, M: Write> ActionLog<D, M> {
    /// Wrap arbitrary writers; `path` only labels errors
    pub fn new(path: impl Into<PathBuf>, durable: D, mirror: Option<M>) -> Self {
        Self {
            path: path.into(),
            durable,
            mirror,
            clock: local_now,
        }
    }

    /// Replace the clock used for timestamps
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Append one timestamped entry
    ///
    /// # Errors
    /// Returns `SyncError::Log` if the durable write or flush fails
    pub fn record(&mut self, message: &str) -> Result<()> {
        let line = format!("[{}] {}\n", (self.clock)().format(TIMESTAMP_FORMAT), message);
        self.write_line(&line)
    }

    /// Write the blank line that closes a cycle
    pub fn separator(&mut self) -> Result<()> {
        self.write_line("\n")
    }

    /// Hand back the underlying writers
    pub fn into_parts(self) -> (D, Option<M>) {
        (self.durable, self.mirror)
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.durable
            .write_all(line.as_bytes())
            .and_then(|()| self.durable.flush())
            .map_err(|source| SyncError::Log {
                path: self.path.clone(),
                source,
            })?;

        if let Some(mirror) = self.mirror.as_mut() {
            if let Err(err) = mirror.write_all(line.as_bytes()).and_then(|()| mirror.flush()) {
                warn!(error = %err, "failed to mirror action log line");
            }
        }

        Ok(())
    }
}
