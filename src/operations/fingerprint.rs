// Fingerprinter
// Content digests used to decide whether two files hold the same bytes

use md5::{Digest, Md5};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Result, SyncError};

/// MD5 digest of a file's full content
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    /// Fingerprint an in-memory buffer
    pub fn of_bytes(data: &[u8]) -> Self {
        Self::from_digest(&Md5::digest(data))
    }

    fn from_digest(digest: &[u8]) -> Self {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(digest);
        Self(bytes)
    }

    /// Lowercase hex form, as written to the action log
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Streams files through the digest in fixed-size chunks
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    chunk_size: usize,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new(4096)
    }
}

impl Fingerprinter {
    /// Create a fingerprinter reading `chunk_size` bytes at a time
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Fingerprint a file by path
    ///
    /// # Errors
    /// Returns `SyncError::Io` if the file cannot be opened or a read fails
    pub fn fingerprint(&self, path: &Path) -> Result<Fingerprint> {
        let mut file = File::open(path).map_err(|e| SyncError::io(path, e))?;
        let mut hasher = Md5::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let bytes_read = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(SyncError::io(path, e)),
            };
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(Fingerprint::from_digest(&hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            Fingerprint::of_bytes(b"hello").to_hex(),
            "5d41402abc4b2a76b9719d911017c592"
        );
    }

    #[test]
    fn test_chunk_size_does_not_change_digest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.bin");
        let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &content).unwrap();

        let small = Fingerprinter::new(7).fingerprint(&path).unwrap();
        let large = Fingerprinter::new(64 * 1024).fingerprint(&path).unwrap();

        assert_eq!(small, large);
        assert_eq!(small, Fingerprint::of_bytes(&content));
    }

    #[test]
    fn test_one_byte_changes_digest() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "hello").unwrap();
        fs::write(&b, "hellp").unwrap();

        let fingerprinter = Fingerprinter::default();
        assert_ne!(
            fingerprinter.fingerprint(&a).unwrap(),
            fingerprinter.fingerprint(&b).unwrap()
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = Fingerprinter::default()
            .fingerprint(&dir.path().join("missing"))
            .unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }
}
