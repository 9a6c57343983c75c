//! Filesystem-backed content source.

use std::path::PathBuf;

use nb_site::{ContentTree, RawTable, to_dash_id};
use serde::de::DeserializeOwned;

use crate::source::{ContentSource, SourceError};

/// Content source reading an exported snapshot.
///
/// Every table and page lives in `{root}/{dashed id}.json`, in the same
/// JSON format the cache stores.
#[derive(Clone, Debug)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// File holding the document with `id`.
    #[must_use]
    pub fn document_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.json", to_dash_id(id)))
    }

    async fn read<T: DeserializeOwned>(&self, id: &str) -> Result<T, SourceError> {
        let path = self.document_path(id);
        tracing::debug!(path = %path.display(), "Reading source document");

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::NotFound { id: id.to_owned() });
            }
            Err(source) => return Err(SourceError::Io { path, source }),
        };

        serde_json::from_slice(&bytes).map_err(|source| SourceError::Parse {
            id: id.to_owned(),
            source,
        })
    }
}

impl ContentSource for FsSource {
    async fn fetch_table(&self, table_id: &str) -> Result<RawTable, SourceError> {
        self.read(table_id).await
    }

    async fn fetch_page(&self, page_id: &str) -> Result<ContentTree, SourceError> {
        let tree: ContentTree = self.read(page_id).await?;
        tree.validate().map_err(|source| SourceError::Content {
            id: page_id.to_owned(),
            source,
        })?;
        Ok(tree)
    }
}
