//! Error types of the generator.

use std::path::PathBuf;

use nb_cache::CacheError;
use nb_renderer::RenderError;
use nb_site::{InvalidPageUrl, TableError};
use nb_source::SourceError;

/// Error that aborts a run before any page task is scheduled.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Cannot find theme \"{}\" in themes/ folder", .0.display())]
    ThemeNotFound(PathBuf),
    #[error(transparent)]
    InvalidTableUrl(#[from] InvalidPageUrl),
    #[error("Failed to fetch site table: {0}")]
    Table(#[from] SourceError),
    #[error(transparent)]
    Schema(#[from] TableError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Failed to build template view: {0}")]
    View(#[from] serde_json::Error),
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error confined to a single page task.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] SourceError),
    /// The cached content of a page the cache reported as fresh is gone or unreadable.
    #[error("Cache of page \"{page_id}\" is corrupted, delete cache/ to rebuild")]
    CacheCorrupted { page_id: String },
    #[error("Failed to save cache: {0}")]
    CacheWrite(#[from] CacheError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Failed to build template view: {0}")]
    View(#[from] serde_json::Error),
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Page task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
