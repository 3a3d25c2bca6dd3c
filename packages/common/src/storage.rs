use crate::error::StorageError;
use crate::result::StorageResult;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Text storage abstraction for documents and testing.
///
/// A locator names one document. Backends decide what it means: a path
/// relative to a root directory, or a key in memory.
pub trait TextStorage {
    /// Read the full text. `Ok(None)` when nothing is stored at `locator`.
    fn read_text(&self, locator: &str) -> io::Result<Option<String>>;

    /// Replace the full text stored at `locator`
    fn write_text(&self, locator: &str, text: &str) -> io::Result<()>;
}

impl<T: TextStorage + ?Sized> TextStorage for &T {
    fn read_text(&self, locator: &str) -> io::Result<Option<String>> {
        (**self).read_text(locator)
    }

    fn write_text(&self, locator: &str, text: &str) -> io::Result<()> {
        (**self).write_text(locator, text)
    }
}

/// Read through `storage`, attaching the locator to any error
pub fn load<S: TextStorage + ?Sized>(storage: &S, locator: &str) -> StorageResult<Option<String>> {
    storage.read_text(locator).map_err(|source| StorageError::Read {
        locator: locator.to_string(),
        source,
    })
}

/// Write through `storage`, attaching the locator to any error
pub fn store<S: TextStorage + ?Sized>(storage: &S, locator: &str, text: &str) -> StorageResult<()> {
    tracing::debug!(locator, bytes = text.len(), "writing document");
    storage.write_text(locator, text).map_err(|source| StorageError::Write {
        locator: locator.to_string(),
        source,
    })
}

/// Real file system storage rooted at a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage resolving locators against the current directory
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, locator: &str) -> PathBuf {
        self.root.join(locator)
    }
}

impl TextStorage for FileStorage {
    fn read_text(&self, locator: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.path(locator)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write_text(&self, locator: &str, text: &str) -> io::Result<()> {
        let path = self.path(locator);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, text)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    files: HashMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
}

/// In-memory storage for testing.
///
/// Clones share the same contents, so a test can keep one handle to inspect
/// or modify what a session wrote through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, locator: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(locator, text);
        self
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store text directly, bypassing write accounting and failure injection
    pub fn insert(&self, locator: impl Into<String>, text: impl Into<String>) {
        self.state().files.insert(locator.into(), text.into());
    }

    pub fn get(&self, locator: &str) -> Option<String> {
        self.state().files.get(locator).cloned()
    }

    pub fn remove(&self, locator: &str) -> Option<String> {
        self.state().files.remove(locator)
    }

    /// Make every following read fail
    pub fn set_fail_reads(&self, fail: bool) {
        self.state().fail_reads = fail;
    }

    /// Make every following write fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.state().writes
    }
}

impl TextStorage for MemoryStorage {
    fn read_text(&self, locator: &str) -> io::Result<Option<String>> {
        let state = self.state();
        if state.fail_reads {
            return Err(io::Error::new(io::ErrorKind::Other, "injected read failure"));
        }
        Ok(state.files.get(locator).cloned())
    }

    fn write_text(&self, locator: &str, text: &str) -> io::Result<()> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(io::Error::new(io::ErrorKind::Other, "injected write failure"));
        }
        state.files.insert(locator.to_string(), text.to_string());
        state.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        assert_eq!(storage.read_text("openapi.yaml").unwrap(), None);
        storage.write_text("specs/openapi.yaml", "a: 1\n").unwrap();
        assert_eq!(
            storage.read_text("specs/openapi.yaml").unwrap().as_deref(),
            Some("a: 1\n")
        );
        assert!(dir.path().join("specs/openapi.yaml").exists());
    }

    #[test]
    fn test_memory_storage_handles_share_contents() {
        let storage = MemoryStorage::new().with_file("doc.yaml", "a: 1\n");
        let other = storage.clone();

        other.write_text("doc.yaml", "a: 2\n").unwrap();
        assert_eq!(storage.get("doc.yaml").as_deref(), Some("a: 2\n"));
        assert_eq!(storage.write_count(), 1);
    }

    #[test]
    fn test_memory_storage_failure_injection() {
        let storage = MemoryStorage::new();
        storage.set_fail_writes(true);
        let err = store(&storage, "doc.yaml", "a: 1\n").unwrap_err();
        assert_eq!(err.locator(), "doc.yaml");
        assert!(err.to_string().contains("injected write failure"));
        assert_eq!(storage.write_count(), 0);

        storage.set_fail_reads(true);
        assert!(matches!(load(&storage, "doc.yaml"), Err(StorageError::Read { .. })));
    }
}
