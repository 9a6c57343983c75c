//! File-based cache implementation.
//!
//! [`FileCache`] stores every entry as a single flat file in the cache root,
//! named by [`entry_key`]. The file holds the serialized value and nothing
//! else; its mtime is the entry's write time.
//!
//! Entries are only ever replaced, never removed. A cache that has to be
//! rebuilt is deleted by the operator.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::{Cache, CacheError, entry_key};

/// File-based [`Cache`] rooted at a directory on disk.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- 3f1c...e9a0        # entry for sha256(namespace ‖ id)
/// +-- ...
/// ```
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Open the cache at `root`, creating the directory if needed.
    ///
    /// Failure to create the directory is logged; `set` retries it.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        if let Err(e) = fs::create_dir_all(&root) {
            tracing::warn!(root = %root.display(), error = %e, "failed to create cache directory");
        }
        Self { root }
    }

    /// Path of the entry file for `(namespace, id)`.
    #[must_use]
    pub fn entry_path(&self, namespace: &str, id: &str) -> PathBuf {
        self.root.join(entry_key(namespace, id))
    }
}

impl Cache for FileCache {
    fn get(&self, namespace: &str, id: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(namespace, id);
        match fs::read(&path) {
            Ok(data) => Some(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(namespace, id, "cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(namespace, id, error = %e, "failed to read cache entry");
                None
            }
        }
    }

    fn set(&self, namespace: &str, id: &str, value: &[u8]) -> Result<(), CacheError> {
        let key = entry_key(namespace, id);
        fs::create_dir_all(&self.root)
            .and_then(|()| fs::write(self.root.join(&key), value))
            .map_err(|source| CacheError::Io { key, source })
    }

    fn modified(&self, namespace: &str, id: &str) -> Option<SystemTime> {
        fs::metadata(self.entry_path(namespace, id))
            .and_then(|meta| meta.modified())
            .ok()
    }
}
