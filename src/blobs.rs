//! File-store collaborator: opaque blobs keyed by generated unique names.
//!
//! `put` stores the bytes under a fresh name and returns a durable
//! `file://` URL; the avatar path writes that URL into the account
//! profile.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::Result;

/// Name of the blob directory within the data directory
pub const BLOBS_DIR: &str = "blobs";

#[derive(Debug, Clone)]
pub struct BlobStore {
    dir: PathBuf,
}

impl BlobStore {
    pub fn open(data_dir: &Path) -> Result<Self> {
        let dir = data_dir.join(BLOBS_DIR);
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Store bytes under a generated unique name; returns the retrieval URL
    pub fn put(&self, bytes: &[u8]) -> Result<String> {
        let name = Uuid::new_v4().to_string();
        let path = self.dir.join(&name);
        fs::write(&path, bytes)?;
        Ok(file_url(&path))
    }

    /// Store the contents of an existing file
    pub fn put_file(&self, source: &Path) -> Result<String> {
        let bytes = fs::read(source)?;
        self.put(&bytes)
    }
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn put_returns_readable_url() {
        let dir = TempDir::new().unwrap();
        let blobs = BlobStore::open(dir.path()).unwrap();

        let url = blobs.put(b"portrait bytes").unwrap();
        let path = url.strip_prefix("file://").expect("file url");
        assert_eq!(fs::read(path).unwrap(), b"portrait bytes");
    }

    #[test]
    fn names_are_unique() {
        let dir = TempDir::new().unwrap();
        let blobs = BlobStore::open(dir.path()).unwrap();

        let first = blobs.put(b"same").unwrap();
        let second = blobs.put(b"same").unwrap();
        assert_ne!(first, second);
    }
}
