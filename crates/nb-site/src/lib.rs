//! Site model for nb.
//!
//! This crate turns the raw remote table into a typed [`SiteModel`] and holds
//! the page content model shared by the cache, the content source and the
//! renderer:
//!
//! - [`rich_text`]: inline text runs and annotations
//! - [`content`]: arena-backed page content tree
//! - [`table`]: raw table, columns and typed cells
//! - [`builder`]: table to [`SiteModel`] projection
//! - [`links`]: rewriting of internal references to output urls
//! - [`html`]: HTML rendering of rich text and content

pub mod builder;
pub mod content;
pub mod html;
pub mod id;
pub mod links;
pub mod model;
pub mod rich_text;
pub mod table;

pub use builder::{REQUIRED_COLUMNS, TableError, build_site_model};
pub use content::{BlockKind, ContentError, ContentTree, Node, NodeId, Visit};
pub use html::{escape_html, icon_html, render_content, render_rich_text};
pub use id::{InvalidPageUrl, SOURCE_ORIGIN, page_id_from_collection_url, to_dash_id, to_plain_id};
pub use links::LinkResolver;
pub use model::{PageMetadata, SiteMeta, SiteModel, Tag, TagIndex};
pub use rich_text::{DateValue, MENTION_SENTINEL, Mark, RichText, plain_text};
pub use table::{Cell, Column, ColumnKind, RawRow, RawTable, SelectOption};
