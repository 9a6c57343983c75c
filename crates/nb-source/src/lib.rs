//! Content source abstraction for nb.
//!
//! The generator never talks to the hosted service directly. It fetches the
//! site table and page contents through the [`ContentSource`] trait:
//!
//! - [`FsSource`] reads an exported snapshot from disk
//! - [`MockSource`] serves in-memory data for tests (behind the `mock` feature)

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod source;

pub use fs::FsSource;
#[cfg(feature = "mock")]
pub use mock::MockSource;
pub use source::{ContentSource, SourceError};
