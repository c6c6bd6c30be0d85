// Error Types
// Typed failures raised while mirroring a tree

use std::io;
use std::path::{Path, PathBuf};

/// Result type for mirror operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// What a path turned out to be on disk, used to describe conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

impl EntryKind {
    /// Classify a path without following symbolic links
    pub fn of(path: &Path) -> Option<Self> {
        let metadata = std::fs::symlink_metadata(path).ok()?;
        let file_type = metadata.file_type();
        Some(if file_type.is_file() {
            Self::File
        } else if file_type.is_dir() {
            Self::Directory
        } else {
            Self::Other
        })
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Directory => f.write_str("directory"),
            Self::Other => f.write_str("special file"),
        }
    }
}

/// Errors that can occur while mirroring
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A file or directory could not be read, written, created or removed
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The same relative path is a different kind of entry on each side
    #[error("Type conflict at {}: source is a {source_kind}, replica is a {replica_kind}", relative.display())]
    Conflict {
        relative: PathBuf,
        source_kind: EntryKind,
        replica_kind: EntryKind,
    },

    /// Invalid settings
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The action log could not be written
    #[error("Failed to write action log {}: {source}", path.display())]
    Log {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SyncError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure concerns a single path and may be tallied
    /// instead of aborting the cycle
    pub fn is_path_local(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Conflict { .. })
    }
}

impl From<walkdir::Error> for SyncError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
        let source = match err.into_io_error() {
            Some(source) => source,
            None => io::Error::new(io::ErrorKind::Other, "filesystem loop detected"),
        };
        Self::Io { path, source }
    }
}
