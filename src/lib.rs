// Folder Mirror Library
// One-way mirroring of a source tree into a replica tree

// Core infrastructure - configuration
pub mod core;

// Errors shared by every layer
pub mod error;

// Operations - scanning, fingerprinting, reconciliation and the cycle loop
pub mod operations;

// Utilities - helper functions and tools
pub mod utilities;

// Re-export commonly used items for convenience
pub use self::core::{AppConfig, MirrorConfig, MirrorSettings};
pub use error::{EntryKind, Result, SyncError};
pub use operations::{
    scan, Action, ActionLog, CycleDriver, Fingerprint, Fingerprinter, ReconcileOptions,
    Reconciler, Snapshot, SyncReport,
};
