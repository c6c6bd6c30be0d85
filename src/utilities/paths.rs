// Path Utilities
// Helper functions for path manipulation

use std::path::{Component, Path, PathBuf};

use crate::error::{Result, SyncError};

/// Normalize a path by resolving . and .. components
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                components.pop();
            }
            Component::CurDir => {}
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Check if a path is inside (or equal to) a directory
pub fn is_inside(path: &Path, directory: &Path) -> bool {
    let path = normalize_path(path);
    let directory = normalize_path(directory);

    path.starts_with(&directory)
}

/// Path of `path` relative to `root`, which must be one of its ancestors
pub fn relative_to(root: &Path, path: &Path) -> Result<PathBuf> {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .map_err(|_| {
            SyncError::io(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("path is not under {}", root.display()),
                ),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        let path = Path::new("a/b/../c/./d");
        assert_eq!(normalize_path(path), PathBuf::from("a/c/d"));
    }

    #[test]
    fn test_is_inside() {
        assert!(is_inside(Path::new("/data/src/sub"), Path::new("/data/src")));
        assert!(is_inside(Path::new("/data/src"), Path::new("/data/src")));
        assert!(!is_inside(Path::new("/data/srcs"), Path::new("/data/src")));
        assert!(is_inside(Path::new("/data/x/../src/a"), Path::new("/data/src")));
    }

    #[test]
    fn test_relative_to() {
        let rel = relative_to(Path::new("/data/src"), Path::new("/data/src/a/b.txt")).unwrap();
        assert_eq!(rel, PathBuf::from("a/b.txt"));
        assert!(relative_to(Path::new("/data/src"), Path::new("/other/b.txt")).is_err());
    }
}
