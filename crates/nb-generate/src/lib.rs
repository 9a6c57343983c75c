//! Incremental fetch-render pipeline for nb.
//!
//! A run fetches the site table, renders the site entry and tag listings,
//! then fetches (or loads from cache) and renders every page on a bounded
//! [`WorkerPool`]. Pages whose source is not newer than their cache entry
//! are not fetched again.
//!
//! ```ignore
//! let generator = Generator::new(options, source, renderer, cache);
//! let report = generator.generate().await?;
//! std::process::exit(report.exit_code());
//! ```

mod assets;
mod error;
mod generator;
mod pool;
mod report;
mod site;

pub use assets::copy_dir;
pub use error::{GenerateError, PageError};
pub use generator::{CONTENT_NAMESPACE, GenerateOptions, Generator, Partition};
pub use pool::WorkerPool;
pub use report::{GenerateReport, PageFailure, PageStatus};
pub use site::{INDEX_TEMPLATE, TAG_TEMPLATE, home_view, post_view, tag_file_name, tag_view};
