//! Inline text runs and their annotations.

use serde::{Deserialize, Serialize};

/// Text of an inline run that stands in for an embedded mention.
pub const MENTION_SENTINEL: &str = "‣";

/// A run of text sharing the same annotations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    /// Literal text of the run.
    pub text: String,
    /// Annotations applied to the whole run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

impl RichText {
    /// Create an unannotated run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    /// Create a run with annotations.
    pub fn with_marks(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    /// Create an inline page mention pointing at `uri`.
    pub fn page_mention(uri: impl Into<String>) -> Self {
        Self::with_marks(MENTION_SENTINEL, vec![Mark::PageMention { uri: uri.into() }])
    }

    /// Whether this run is an inline page mention.
    ///
    /// A mention is a sentinel run whose first annotation is a page mention.
    #[must_use]
    pub fn is_page_mention(&self) -> bool {
        self.text == MENTION_SENTINEL
            && matches!(self.marks.first(), Some(Mark::PageMention { .. }))
    }
}

/// Annotation of a [`RichText`] run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mark {
    Bold,
    Italic,
    Strikethrough,
    Underline,
    Code,
    /// Text or background color name.
    Color { value: String },
    /// Hyperlink. Source-internal targets start with `/`.
    Link { href: String },
    /// Inline mention of another page.
    PageMention { uri: String },
    /// Inline date.
    Date(DateValue),
    /// Annotation this version does not understand.
    #[serde(other)]
    Unknown,
}

/// Date payload of a date cell or inline date mention.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateValue {
    /// `YYYY-MM-DD`.
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Concatenate the text of all runs.
#[must_use]
pub fn plain_text(runs: &[RichText]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect()
}
