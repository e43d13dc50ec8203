//! The `L:` command's host-side file abstraction: an external
//! collaborator with a one-method contract. This module supplies that
//! trait plus the two implementations a complete crate needs in order for
//! the file-load path to be exercisable at all (an in-memory double for
//! tests, and a directory-backed store for the CLI).

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileLoadErrorKind {
    NotFound,
    ReadError,
}

pub trait FileStore {
    fn open_read(&self, name: &str) -> Result<Vec<u8>, FileLoadErrorKind>;
}

/// Backs the `L:` command from a directory on disk; any path that escapes
/// `root` or fails to read is reported as `ReadError` rather than letting
/// an `io::Error` cross the file-store boundary.
pub struct DirFileStore {
    root: PathBuf,
}

impl DirFileStore {
    pub fn new(root: impl Into<PathBuf>) -> DirFileStore {
        DirFileStore { root: root.into() }
    }
}

impl FileStore for DirFileStore {
    fn open_read(&self, name: &str) -> Result<Vec<u8>, FileLoadErrorKind> {
        let path = self.root.join(name);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FileLoadErrorKind::NotFound),
            Err(_) => Err(FileLoadErrorKind::ReadError),
        }
    }
}

/// A fixed name->bytes table, for tests and the `tests/util` scenario
/// harness.
#[derive(Default)]
pub struct InMemoryFileStore {
    files: HashMap<String, Vec<u8>>,
}

impl InMemoryFileStore {
    pub fn new() -> InMemoryFileStore {
        InMemoryFileStore::default()
    }

    pub fn with_file(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(name.into(), bytes.into());
        self
    }
}

impl FileStore for InMemoryFileStore {
    fn open_read(&self, name: &str) -> Result<Vec<u8>, FileLoadErrorKind> {
        self.files
            .get(name)
            .cloned()
            .ok_or(FileLoadErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_store_returns_registered_bytes() {
        let store = InMemoryFileStore::new().with_file("boot.bin", vec![1, 2, 3]);
        assert_eq!(store.open_read("boot.bin").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn in_memory_store_reports_not_found() {
        let store = InMemoryFileStore::new();
        assert_eq!(store.open_read("missing"), Err(FileLoadErrorKind::NotFound));
    }
}
