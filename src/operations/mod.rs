// Operations module
// Mirror logic: fingerprints, scans, reconciliation, logging and the cycle loop

pub mod action_log;
pub mod driver;
pub mod fingerprint;
pub mod reconcile;
pub mod scan;

pub use action_log::ActionLog;
pub use driver::CycleDriver;
pub use fingerprint::{Fingerprint, Fingerprinter};
pub use reconcile::{Action, PathFailure, ReconcileOptions, Reconciler, SyncReport};
pub use scan::{scan, Snapshot};
