// Reconciler
// Converges a replica tree onto a source tree and reports what it did

use filetime::FileTime;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::action_log::ActionLog;
use super::fingerprint::Fingerprinter;
use super::scan::{scan, Snapshot};
use crate::error::{EntryKind, Result, SyncError};
use crate::utilities::paths::relative_to;

/// One unit of change applied to the replica
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    DirectoryCreated(PathBuf),
    FileCopied { source: PathBuf, destination: PathBuf },
    FileRemoved(PathBuf),
    DirectoryRemoved(PathBuf),
}

impl Action {
    /// Copies and removals count as file changes
    pub fn is_file_change(&self) -> bool {
        matches!(self, Self::FileCopied { .. } | Self::FileRemoved(_))
    }

    /// Creations and removals count as directory changes
    pub fn is_directory_change(&self) -> bool {
        matches!(self, Self::DirectoryCreated(_) | Self::DirectoryRemoved(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectoryCreated(path) => write!(f, "Directory created: {}", path.display()),
            Self::FileCopied {
                source,
                destination,
            } => write!(
                f,
                "File copied: {} -> {}",
                source.display(),
                destination.display()
            ),
            Self::FileRemoved(path) => write!(f, "File removed: {}", path.display()),
            Self::DirectoryRemoved(path) => write!(f, "Directory removed: {}", path.display()),
        }
    }
}

/// Options for reconciliation
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Record per-path I/O and type-conflict failures and keep going,
    /// instead of aborting the cycle on the first one
    pub continue_on_error: bool,
}

/// A path that could not be reconciled when failures are isolated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of one reconciliation cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Files copied or removed
    pub files_changed: usize,
    /// Directories created or removed
    pub dirs_changed: usize,
    /// Nothing had to be done
    pub all_same: bool,
    /// Every action, in the order it was applied
    pub actions: Vec<Action>,
    /// Paths skipped because of an isolated failure
    pub failures: Vec<PathFailure>,
}

impl SyncReport {
    fn from_outcome(actions: Vec<Action>, failures: Vec<PathFailure>) -> Self {
        Self {
            files_changed: actions.iter().filter(|a| a.is_file_change()).count(),
            dirs_changed: actions.iter().filter(|a| a.is_directory_change()).count(),
            all_same: actions.is_empty() && failures.is_empty(),
            actions,
            failures,
        }
    }

    /// The one-line cycle summary written to the action log
    pub fn summary(&self) -> String {
        if self.all_same {
            "All files are identical. No changes needed.".to_string()
        } else {
            format!(
                "Synchronization complete. Files changed: {}, Directories changed: {}.",
                self.files_changed, self.dirs_changed
            )
        }
    }
}

/// Engine that mirrors a source tree into a replica tree
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    fingerprinter: Fingerprinter,
    options: ReconcileOptions,
}

impl Reconciler {
    /// Create a reconciler with the given fingerprinter and options
    pub fn new(fingerprinter: Fingerprinter, options: ReconcileOptions) -> Self {
        Self {
            fingerprinter,
            options,
        }
    }

    /// Run one reconciliation pass, logging every decision
    ///
    /// # Errors
    /// Scan and log failures always abort. Per-path `Io` and `Conflict`
    /// errors abort unless `continue_on_error` is set.
    pub fn reconcile<D: Write, M: Write>(
        &self,
        source_root: &Path,
        replica_root: &Path,
        log: &mut ActionLog<D, M>,
    ) -> Result<SyncReport> {
        let mut cycle = Cycle {
            reconciler: self,
            log,
            replica_root,
            actions: Vec::new(),
            failures: Vec::new(),
            conflicts: Vec::new(),
        };

        let source = scan(source_root)?;
        cycle.ensure_replica_root()?;

        for (relative, source_path) in source.iter() {
            let outcome = cycle.mirror_file(relative, source_path);
            cycle.absorb(relative, outcome)?;
        }

        cycle.prune(&source)?;

        Ok(SyncReport::from_outcome(cycle.actions, cycle.failures))
    }
}

/// Mutable state of a single pass
struct Cycle<'a, D: Write, M: Write> {
    reconciler: &'a Reconciler,
    log: &'a mut ActionLog<D, M>,
    replica_root: &'a Path,
    actions: Vec<Action>,
    failures: Vec<PathFailure>,
    /// Replica paths left alone after an isolated type conflict
    conflicts: Vec<PathBuf>,
}

impl<D: Write, M: Write> Cycle<'_, D, M> {
    fn emit(&mut self, action: Action) -> Result<()> {
        self.log.record(&action.to_string())?;
        self.actions.push(action);
        Ok(())
    }

    /// Turn an isolated per-path failure into a report entry, or propagate it
    fn absorb(&mut self, relative: &Path, outcome: Result<()>) -> Result<()> {
        match outcome {
            Ok(()) => Ok(()),
            Err(err) if self.reconciler.options.continue_on_error && err.is_path_local() => {
                warn!(path = %relative.display(), error = %err, "skipping path");
                self.log
                    .record(&format!("Failed: {}: {}", relative.display(), err))?;
                if let SyncError::Conflict { relative, .. } = &err {
                    self.conflicts.push(relative.clone());
                }
                self.failures.push(PathFailure {
                    path: relative.to_path_buf(),
                    message: err.to_string(),
                });
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn ensure_replica_root(&mut self) -> Result<()> {
        match EntryKind::of(self.replica_root) {
            Some(EntryKind::Directory) => Ok(()),
            None => {
                fs::create_dir_all(self.replica_root)
                    .map_err(|e| SyncError::io(self.replica_root, e))?;
                self.emit(Action::DirectoryCreated(self.replica_root.to_path_buf()))
            }
            Some(kind) => Err(SyncError::Conflict {
                relative: PathBuf::from("."),
                source_kind: EntryKind::Directory,
                replica_kind: kind,
            }),
        }
    }

    /// Bring one source file's replica counterpart up to date
    fn mirror_file(&mut self, relative: &Path, source_path: &Path) -> Result<()> {
        let replica_path = self.replica_root.join(relative);

        match EntryKind::of(&replica_path) {
            None => {
                self.ensure_parent(relative, &replica_path)?;
                self.copy(source_path, &replica_path)
            }
            Some(EntryKind::File) => {
                let fingerprinter = &self.reconciler.fingerprinter;
                let source_print = fingerprinter.fingerprint(source_path)?;
                let replica_print = fingerprinter.fingerprint(&replica_path)?;

                self.log.record(&format!(
                    "Comparing MD5: source ({}) = {}, replica ({}) = {}",
                    source_path.display(),
                    source_print,
                    replica_path.display(),
                    replica_print
                ))?;

                if source_print == replica_print {
                    debug!(path = %relative.display(), "unchanged");
                    Ok(())
                } else {
                    self.copy(source_path, &replica_path)
                }
            }
            Some(kind) => Err(SyncError::Conflict {
                relative: relative.to_path_buf(),
                source_kind: EntryKind::File,
                replica_kind: kind,
            }),
        }
    }

    /// Create the replica file's parent directory if it is missing
    ///
    /// Emits a single `DirectoryCreated` for the parent even when several
    /// levels had to be created.
    fn ensure_parent(&mut self, relative: &Path, replica_path: &Path) -> Result<()> {
        let Some(parent) = replica_path.parent() else {
            return Ok(());
        };

        // The nearest existing ancestor must be a directory
        for ancestor in parent.ancestors() {
            match EntryKind::of(ancestor) {
                None => continue,
                Some(EntryKind::Directory) if ancestor == parent => return Ok(()),
                Some(EntryKind::Directory) => break,
                Some(kind) => {
                    let conflicting = relative_to(self.replica_root, ancestor)
                        .unwrap_or_else(|_| relative.to_path_buf());
                    return Err(SyncError::Conflict {
                        relative: conflicting,
                        source_kind: EntryKind::Directory,
                        replica_kind: kind,
                    });
                }
            }
        }

        fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
        self.emit(Action::DirectoryCreated(parent.to_path_buf()))
    }

    /// Copy a file and carry over its access and modification times
    fn copy(&mut self, source_path: &Path, replica_path: &Path) -> Result<()> {
        fs::copy(source_path, replica_path).map_err(|e| SyncError::io(replica_path, e))?;

        let metadata = fs::metadata(source_path).map_err(|e| SyncError::io(source_path, e))?;
        filetime::set_file_times(
            replica_path,
            FileTime::from_last_access_time(&metadata),
            FileTime::from_last_modification_time(&metadata),
        )
        .map_err(|e| SyncError::io(replica_path, e))?;

        self.emit(Action::FileCopied {
            source: source_path.to_path_buf(),
            destination: replica_path.to_path_buf(),
        })
    }

    /// Remove replica entries missing from the source, then empty directories
    ///
    /// Entries come deepest first, so a directory is checked only after
    /// everything inside it has been handled. Entries at or under a
    /// conflicting path are kept.
    fn prune(&mut self, source: &Snapshot) -> Result<()> {
        let walker = WalkDir::new(self.replica_root)
            .min_depth(1)
            .follow_links(false)
            .contents_first(true);

        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            let relative = relative_to(self.replica_root, path)?;

            if self.conflicts.iter().any(|c| relative.starts_with(c)) {
                continue;
            }

            let outcome = if entry.file_type().is_dir() {
                self.remove_if_empty(path)
            } else if source.contains(&relative) {
                Ok(())
            } else {
                self.remove_file(path)
            };
            self.absorb(&relative, outcome)?;
        }

        Ok(())
    }

    fn remove_file(&mut self, path: &Path) -> Result<()> {
        fs::remove_file(path).map_err(|e| SyncError::io(path, e))?;
        self.emit(Action::FileRemoved(path.to_path_buf()))
    }

    fn remove_if_empty(&mut self, path: &Path) -> Result<()> {
        let mut entries = fs::read_dir(path).map_err(|e| SyncError::io(path, e))?;
        if entries.next().is_some() {
            return Ok(());
        }

        fs::remove_dir(path).map_err(|e| SyncError::io(path, e))?;
        self.emit(Action::DirectoryRemoved(path.to_path_buf()))
    }
}
