//! Content-addressable cache for fetched page content.
//!
//! Entries are addressed by a `(namespace, id)` pair. The namespace is a
//! logical partition of the keyspace (e.g. `"content"`) and has no meaning
//! for the on-disk layout: every entry lives in a flat file named after the
//! hex SHA-256 digest of `namespace ‖ id`.
//!
//! Besides storage, the cache is the staleness oracle of the build: see
//! [`Cache::should_update`].
//!
//! # Implementations
//!
//! - [`FileCache`]: flat directory of entry files, mtime as write time
//! - [`NullCache`]: no-op implementation (always misses, always stale)
//!
//! # Example
//!
//! ```
//! use std::time::SystemTime;
//! use nb_cache::{Cache, NullCache};
//!
//! let cache = NullCache;
//! cache.set("content", "page-1", b"{}").unwrap();
//! assert_eq!(cache.get("content", "page-1"), None);
//! assert!(cache.should_update("content", "page-1", SystemTime::now()));
//! ```

mod ext;
mod file;

use std::time::SystemTime;

use sha2::{Digest, Sha256};

pub use ext::CacheExt;
pub use file::FileCache;

/// Error returned when a cache entry cannot be written.
///
/// Reads never fail: a missing or unreadable entry is a miss.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// I/O error while writing the entry file.
    #[error("failed to write cache entry {key}: {source}")]
    Io {
        /// Hex digest naming the entry.
        key: String,
        #[source]
        source: std::io::Error,
    },
    /// Value could not be serialized.
    #[error("failed to serialize cache entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable, namespaced key/value store with staleness comparison.
pub trait Cache: Send + Sync {
    /// Retrieve the raw bytes of an entry.
    ///
    /// Returns `None` if the entry does not exist or cannot be read.
    fn get(&self, namespace: &str, id: &str) -> Option<Vec<u8>>;

    /// Store raw bytes, replacing any previous content of the entry.
    fn set(&self, namespace: &str, id: &str, value: &[u8]) -> Result<(), CacheError>;

    /// Last write time of an entry, or `None` if it does not exist.
    fn modified(&self, namespace: &str, id: &str) -> Option<SystemTime>;

    /// Whether the entry must be refreshed from the source.
    ///
    /// True if no entry exists, or if `source_modified` is strictly newer
    /// than the entry's last write.
    fn should_update(&self, namespace: &str, id: &str, source_modified: SystemTime) -> bool {
        match self.modified(namespace, id) {
            Some(written) => source_modified > written,
            None => true,
        }
    }
}

/// No-op [`Cache`].
///
/// Every `get` misses, every `set` is discarded, and every entry is
/// always stale. Use when caching is disabled.
pub struct NullCache;

impl Cache for NullCache {
    fn get(&self, _namespace: &str, _id: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _namespace: &str, _id: &str, _value: &[u8]) -> Result<(), CacheError> {
        Ok(())
    }

    fn modified(&self, _namespace: &str, _id: &str) -> Option<SystemTime> {
        None
    }
}

/// Derive the entry key for a `(namespace, id)` pair.
///
/// The key is the lowercase hex SHA-256 digest of the namespace
/// immediately followed by the id.
#[must_use]
pub fn entry_key(namespace: &str, id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(id.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_key_is_hex_sha256() {
        let key = entry_key("content", "abc");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        // sha256("contentabc")
        assert_eq!(key, hex::encode(Sha256::digest(b"contentabc")));
    }

    #[test]
    fn test_entry_key_is_deterministic() {
        assert_eq!(entry_key("content", "p1"), entry_key("content", "p1"));
        assert_ne!(entry_key("content", "p1"), entry_key("content", "p2"));
        assert_ne!(entry_key("content", "p1"), entry_key("other", "p1"));
    }

    #[test]
    fn test_null_cache_always_misses() {
        let cache = NullCache;

        cache.set("content", "key", b"hello").unwrap();
        assert_eq!(cache.get("content", "key"), None);
        assert_eq!(cache.modified("content", "key"), None);
    }

    #[test]
    fn test_null_cache_is_always_stale() {
        let cache = NullCache;

        assert!(cache.should_update("content", "key", SystemTime::UNIX_EPOCH));
    }
}
