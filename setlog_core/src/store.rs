//! Key-value persistence port and its backends.
//!
//! The engine depends only on [`StoragePort`], a narrow get/set/remove
//! interface over JSON string blobs. Two backends ship here:
//! - [`FileStore`]: one locked JSON file per key, atomic replace on write
//! - [`MemoryStore`]: in-memory map for tests and degraded operation
//!
//! Store writes are fire-and-forget local I/O: failures are logged and
//! swallowed so the engine keeps running memory-only.

use fs2::FileExt;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Narrow storage interface the engine is written against
pub trait StoragePort {
    /// Read the blob stored under `key`, or None if absent/unreadable
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`, replacing any prior blob
    fn set(&mut self, key: &str, value: &str);

    /// Remove the blob under `key` if present
    fn remove(&mut self, key: &str);
}

// ============================================================================
// File-backed store
// ============================================================================

/// File-per-key store rooted at a data directory
///
/// Keys map to `<dir>/<key>.json`. Reads take a shared lock; writes go
/// through an exclusively-locked temp file and an atomic rename. If the data
/// directory cannot be created the store degrades to a no-op for the rest of
/// the process lifetime.
pub struct FileStore {
    dir: PathBuf,
    disabled: bool,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let disabled = match std::fs::create_dir_all(&dir) {
            Ok(()) => false,
            Err(e) => {
                tracing::warn!(
                    "Unable to create data dir {:?}: {}. Running memory-only.",
                    dir,
                    e
                );
                true
            }
        };
        Self { dir, disabled }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StoragePort for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        if self.disabled {
            return None;
        }

        let path = self.key_path(key);
        if !path.exists() {
            return None;
        }

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open {:?}: {}", path, e);
                return None;
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock {:?}: {}", path, e);
            return None;
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read = reader.read_to_string(&mut contents);
        let _ = file.unlock();

        match read {
            Ok(_) => Some(contents),
            Err(e) => {
                tracing::warn!("Failed to read {:?}: {}", path, e);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        if self.disabled {
            return;
        }

        let path = self.key_path(key);
        if let Err(e) = write_atomic(&path, value) {
            tracing::warn!("Failed to write {:?}: {}", path, e);
        } else {
            tracing::debug!("Persisted record {:?}", key);
        }
    }

    fn remove(&mut self, key: &str) {
        if self.disabled {
            return;
        }

        let path = self.key_path(key);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!("Failed to remove {:?}: {}", path, e);
            }
        }
    }
}

/// Write a blob via a locked temp file and atomic rename
fn write_atomic(path: &std::path::Path, value: &str) -> std::io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "path missing parent"))?;
    let temp = NamedTempFile::new_in(parent)?;

    temp.as_file().lock_exclusive()?;
    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        writer.write_all(value.as_bytes())?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ============================================================================
// In-memory store
// ============================================================================

/// HashMap-backed store for deterministic, storage-free unit tests
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoragePort for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.records.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.records.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.records.remove(key);
    }
}
