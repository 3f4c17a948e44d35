//! Local document store backing tasks, profiles, and chat transcripts.
//!
//! One JSON document per file, grouped by collection:
//!
//! ```text
//! <data>/store/
//!   todos/<id>.json        # task documents
//!   users/<uid>.json       # profile documents (exp counter)
//!   messages/<uid>.json    # chat transcript documents
//! ```
//!
//! Writes take a per-document lock (`<file>.lock`, flock) and then an
//! atomic temp-and-rename, so concurrent questlog processes never observe
//! a torn document. Reads go lock-free against the last atomic rename.
//! Per document the store is last-write-wins; there are no cross-document
//! transactions.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use serde::{de::DeserializeOwned, Serialize};
use ulid::Ulid;

use crate::error::{Error, Result};

/// Name of the store directory within the data directory
pub const STORE_DIR: &str = "store";

/// Collection holding task documents
pub const TODOS: &str = "todos";

/// Collection holding per-user profile documents
pub const USERS: &str = "users";

/// Collection holding per-user chat transcripts
pub const MESSAGES: &str = "messages";

/// Default retry interval when waiting for a lock
const LOCK_RETRY_INTERVAL_MS: u64 = 50;

/// Document store rooted in the questlog data directory
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
    lock_timeout_ms: u64,
}

impl Store {
    /// Open (and create if needed) the store under a data directory
    pub fn open(data_dir: &Path, lock_timeout_ms: u64) -> Result<Self> {
        let root = data_dir.join(STORE_DIR);
        let store = Self {
            root,
            lock_timeout_ms,
        };
        for collection in [TODOS, USERS, MESSAGES] {
            fs::create_dir_all(store.collection_dir(collection))?;
        }
        Ok(store)
    }

    /// Path to a collection directory
    pub fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    /// Path to a document file
    pub fn document_path(&self, collection: &str, id: &str) -> PathBuf {
        self.collection_dir(collection).join(format!("{id}.json"))
    }

    /// Generate a new document id
    pub fn generate_id() -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Read a document, `None` when it does not exist
    pub fn read<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<Option<T>> {
        let path = self.document_path(collection, id);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&data)?))
    }

    /// Create or replace a document
    pub fn write<T: Serialize>(&self, collection: &str, id: &str, document: &T) -> Result<()> {
        let path = self.document_path(collection, id);
        let data = serde_json::to_vec_pretty(document)?;
        let _lock = self.lock_for(&path)?;
        write_atomic(&path, &data)?;
        tracing::debug!(collection, id, "document written");
        Ok(())
    }

    /// Delete a document permanently; returns whether it existed
    pub fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let path = self.document_path(collection, id);
        let _lock = self.lock_for(&path)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        tracing::debug!(collection, id, "document deleted");
        Ok(true)
    }

    /// List document ids in a collection, ascending
    pub fn list_ids(&self, collection: &str) -> Result<Vec<String>> {
        let dir = self.collection_dir(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(id) = name.strip_suffix(".json") {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Materialize every document in a collection, in id order
    pub fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        let mut documents = Vec::new();
        for id in self.list_ids(collection)? {
            // A document deleted between the listing and the read is skipped.
            if let Some(document) = self.read(collection, &id)? {
                documents.push(document);
            }
        }
        Ok(documents)
    }

    /// Atomically add `delta` to a numeric field of a document, merging with
    /// whatever else the document holds. The document is created when absent
    /// and every other field is preserved. Returns the new field value.
    pub fn increment_merge(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: u64,
    ) -> Result<u64> {
        let path = self.document_path(collection, id);
        let _lock = self.lock_for(&path)?;

        let mut document = if path.exists() {
            let data = fs::read(&path)?;
            serde_json::from_slice::<serde_json::Value>(&data)?
        } else {
            serde_json::json!({})
        };

        let map = document.as_object_mut().ok_or_else(|| {
            Error::OperationFailed(format!("{collection}/{id} is not a JSON object"))
        })?;
        let current = map.get(field).and_then(|v| v.as_u64()).unwrap_or(0);
        let next = current + delta;
        map.insert(field.to_string(), serde_json::json!(next));

        write_atomic(&path, &serde_json::to_vec_pretty(&document)?)?;
        tracing::debug!(collection, id, field, next, "counter incremented");
        Ok(next)
    }

    fn lock_for(&self, path: &Path) -> Result<FileLock> {
        let lock_path = PathBuf::from(format!("{}.lock", path.display()));
        FileLock::acquire(&lock_path, self.lock_timeout_ms)
    }
}

fn is_lock_contended(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }

    // On Windows, fs2/libc can surface lock/sharing violations as "Other".
    #[cfg(windows)]
    {
        matches!(err.raw_os_error(), Some(32) | Some(33))
    }
    #[cfg(not(windows))]
    {
        false
    }
}

/// A file lock guard that releases the lock when dropped
struct FileLock {
    file: File,
}

impl FileLock {
    /// Acquire an exclusive lock on a file with timeout, creating it if needed
    fn acquire(path: &Path, timeout_ms: u64) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let start = Instant::now();
        let timeout = Duration::from_millis(timeout_ms);
        let retry_interval = Duration::from_millis(LOCK_RETRY_INTERVAL_MS);

        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(FileLock { file }),
                Err(e) if is_lock_contended(&e) => {
                    if start.elapsed() >= timeout {
                        return Err(Error::LockFailed(path.to_path_buf()));
                    }
                    std::thread::sleep(retry_interval);
                }
                Err(e) => return Err(Error::Io(e)),
            }
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock the file - ignore errors during drop
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

/// Atomically write data to a file: write a temp file in the same directory,
/// then rename it over the target.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension(format!("json.tmp.{}", std::process::id()));

    let mut temp_file = File::create(&temp_path)?;
    temp_file.write_all(data)?;
    temp_file.sync_all()?;
    drop(temp_file);

    fs::rename(&temp_path, path)?;
    Ok(())
}
