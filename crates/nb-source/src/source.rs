//! Source trait and error type.

use std::future::Future;
use std::path::PathBuf;

use nb_site::{ContentError, ContentTree, RawTable};

/// Error returned by a content source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("No content for \"{id}\"")]
    NotFound { id: String },
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed content for \"{id}\": {source}")]
    Parse {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid content tree for \"{id}\": {source}")]
    Content {
        id: String,
        #[source]
        source: ContentError,
    },
    /// Failure talking to a remote service.
    #[error("Failed to fetch \"{id}\": {message}")]
    Transport { id: String, message: String },
}

/// Provider of the site table and page contents.
///
/// Ids may be given in either spelling; implementations normalize them.
/// Fetches are independent and may run concurrently.
pub trait ContentSource: Send + Sync {
    /// Fetch the table behind the site.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the table cannot be retrieved or decoded.
    fn fetch_table(
        &self,
        table_id: &str,
    ) -> impl Future<Output = Result<RawTable, SourceError>> + Send;

    /// Fetch the content tree of one page.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the page cannot be retrieved or decoded.
    fn fetch_page(
        &self,
        page_id: &str,
    ) -> impl Future<Output = Result<ContentTree, SourceError>> + Send;
}
