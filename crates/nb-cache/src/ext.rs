//! Extension trait for [`Cache`] with typed convenience methods.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Cache, CacheError};

/// Typed JSON access for any [`Cache`].
///
/// Implemented as default methods on an extension trait so that [`Cache`]
/// stays object-safe and implementors only handle raw bytes.
///
/// # Example
///
/// ```
/// use nb_cache::{CacheExt, NullCache};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Entry { title: String }
///
/// let cache = NullCache;
/// cache.set_json("content", "page", &Entry { title: "Hello".into() }).unwrap();
/// let entry: Option<Entry> = cache.get_json("content", "page");
/// assert!(entry.is_none());
/// ```
pub trait CacheExt: Cache {
    /// Retrieve a JSON-deserialized value.
    ///
    /// Returns `None` on miss. A corrupted entry is also a miss and is
    /// logged as a warning.
    fn get_json<T: DeserializeOwned>(&self, namespace: &str, id: &str) -> Option<T> {
        let bytes = self.get(namespace, id)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(namespace, id, error = %e, "cache entry is corrupted");
                None
            }
        }
    }

    /// Store a value as JSON.
    fn set_json<T: Serialize + ?Sized>(
        &self,
        namespace: &str,
        id: &str,
        value: &T,
    ) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.set(namespace, id, &bytes)
    }
}

impl<C: Cache + ?Sized> CacheExt for C {}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use tempfile::TempDir;

    use super::*;
    use crate::FileCache;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        title: String,
        children: Vec<u32>,
    }

    #[test]
    fn test_json_round_trip() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"));
        let entry = Entry {
            title: "Hello".to_owned(),
            children: vec![1, 2, 3],
        };

        cache.set_json("content", "page", &entry).unwrap();

        assert_eq!(cache.get_json::<Entry>("content", "page"), Some(entry));
    }

    #[test]
    fn test_corrupted_entry_is_a_miss() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"));

        cache.set("content", "page", b"{not json").unwrap();

        assert_eq!(cache.get_json::<Entry>("content", "page"), None);
    }

    #[test]
    fn test_works_through_trait_object() {
        let tmp = TempDir::new().unwrap();
        let cache: Box<dyn Cache> = Box::new(FileCache::new(tmp.path().join("cache")));

        cache.set_json("content", "page", &vec!["a", "b"]).unwrap();

        assert_eq!(
            cache.get_json::<Vec<String>>("content", "page"),
            Some(vec!["a".to_owned(), "b".to_owned()])
        );
    }
}
