//! Mock content source for testing.
//!
//! Provides [`MockSource`] for tests that must not touch the filesystem.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use nb_site::{ContentTree, RawTable, to_plain_id};

use crate::source::{ContentSource, SourceError};

/// In-memory content source.
///
/// Records how often each page was fetched and how many fetches ran at the
/// same time, and can be told to fail specific pages.
///
/// # Example
///
/// ```ignore
/// let source = MockSource::new()
///     .with_table(table)
///     .with_page("0eeee000ccccbbbbaaaa123450000000", tree)
///     .with_failure("1111...");
/// ```
#[derive(Debug, Default)]
pub struct MockSource {
    table: Mutex<Option<RawTable>>,
    pages: Mutex<HashMap<String, ContentTree>>,
    failures: Mutex<HashSet<String>>,
    fetches: Mutex<HashMap<String, usize>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `table` from [`ContentSource::fetch_table`] regardless of id.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_table(self, table: RawTable) -> Self {
        *self.table.lock().unwrap() = Some(table);
        self
    }

    /// Add the content of a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, page_id: &str, tree: ContentTree) -> Self {
        self.pages.lock().unwrap().insert(to_plain_id(page_id), tree);
        self
    }

    /// Make every fetch of `page_id` fail with a transport error.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, page_id: &str) -> Self {
        self.failures.lock().unwrap().insert(to_plain_id(page_id));
        self
    }

    /// Suspend every page fetch for `delay`.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches of `page_id`, successful or not.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn fetch_count(&self, page_id: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .get(&to_plain_id(page_id))
            .copied()
            .unwrap_or(0)
    }

    /// Total number of page fetches.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().unwrap().values().sum()
    }

    /// Highest number of page fetches observed running at once.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl ContentSource for MockSource {
    async fn fetch_table(&self, table_id: &str) -> Result<RawTable, SourceError> {
        self.table
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SourceError::NotFound {
                id: table_id.to_owned(),
            })
    }

    async fn fetch_page(&self, page_id: &str) -> Result<ContentTree, SourceError> {
        let id = to_plain_id(page_id);
        *self.fetches.lock().unwrap().entry(id.clone()).or_default() += 1;

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failures.lock().unwrap().contains(&id) {
            return Err(SourceError::Transport {
                id: page_id.to_owned(),
                message: "injected failure".to_owned(),
            });
        }
        self.pages
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                id: page_id.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use nb_site::{BlockKind, Node};
    use pretty_assertions::assert_eq;

    use super::*;

    const ID: &str = "0eeee000ccccbbbbaaaa123450000000";

    fn tree() -> ContentTree {
        ContentTree::new(Node::new(ID, BlockKind::Page))
    }

    #[tokio::test]
    async fn test_fetch_counts_by_normalized_id() {
        let source = MockSource::new().with_page(ID, tree());

        source.fetch_page(ID).await.unwrap();
        source
            .fetch_page("0eeee000-cccc-bbbb-aaaa-123450000000")
            .await
            .unwrap();

        assert_eq!(source.fetch_count(ID), 2);
        assert_eq!(source.total_fetches(), 2);
        assert_eq!(source.max_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let source = MockSource::new().with_page(ID, tree()).with_failure(ID);

        let err = source.fetch_page(ID).await.unwrap_err();
        assert!(matches!(err, SourceError::Transport { .. }));
        assert_eq!(source.fetch_count(ID), 1);
    }

    #[tokio::test]
    async fn test_missing_table() {
        let err = MockSource::new().fetch_table("t").await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound { .. }));
    }
}
