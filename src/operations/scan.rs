// Tree Scanner
// Walks a root directory and records every regular file under it

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::Result;
use crate::utilities::paths::relative_to;

/// Files found under a root, keyed by path relative to that root
///
/// Built fresh every cycle and dropped when the cycle ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    files: BTreeMap<PathBuf, PathBuf>,
}

impl Snapshot {
    /// Absolute location of a relative path, if it was seen
    pub fn get(&self, relative: &Path) -> Option<&Path> {
        self.files.get(relative).map(PathBuf::as_path)
    }

    pub fn contains(&self, relative: &Path) -> bool {
        self.files.contains_key(relative)
    }

    /// (relative, absolute) pairs in path order
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.files.iter().map(|(r, a)| (r.as_path(), a.as_path()))
    }

    /// Relative paths in path order
    pub fn relative_paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Scan `root` and return a snapshot of its regular files
///
/// Symbolic links are not followed and, like other special entries, are
/// left out of the snapshot.
///
/// # Errors
/// Returns `SyncError::Io` if the root is missing or any directory under it
/// cannot be read
pub fn scan(root: &Path) -> Result<Snapshot> {
    let mut files = BTreeMap::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = relative_to(root, entry.path())?;
        files.insert(relative, entry.into_path());
    }

    debug!(root = %root.display(), files = files.len(), "scanned tree");

    Ok(Snapshot { files })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_nested_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub/dir")).unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("root.txt"), "root").unwrap();
        fs::write(dir.path().join("sub/nested.txt"), "nested").unwrap();
        fs::write(dir.path().join("sub/dir/deep.txt"), "deep").unwrap();

        let snapshot = scan(dir.path()).unwrap();

        let paths: Vec<_> = snapshot.relative_paths().map(Path::to_path_buf).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("root.txt"),
                PathBuf::from("sub/dir/deep.txt"),
                PathBuf::from("sub/nested.txt"),
            ]
        );
        assert_eq!(
            snapshot.get(Path::new("sub/nested.txt")),
            Some(dir.path().join("sub/nested.txt").as_path())
        );
    }

    #[test]
    fn test_scan_missing_root_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = scan(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_unreadable_directory_is_io_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("hidden.txt"), "hidden").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores directory permissions
        let readable = fs::read_dir(&locked).is_ok();
        let result = scan(dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        if readable {
            return;
        }

        assert!(matches!(result, Err(SyncError::Io { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_symlinks() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("real.txt"), "real").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt"))
            .unwrap();

        let snapshot = scan(dir.path()).unwrap();

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains(Path::new("real.txt")));
    }
}
