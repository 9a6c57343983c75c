//! Raw remote table and typed cells.
//!
//! The source hands over a table as a schema (column definitions) plus rows
//! whose properties are keyed by column id and hold raw rich text. Cells are
//! decoded into the closed [`Cell`] variant set according to the column type.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::rich_text::{DateValue, Mark, RichText, plain_text};

/// Marker text of a checked checkbox cell.
const CHECKED: &str = "Yes";

/// A remote table as fetched from the content source.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub id: String,
    /// Table title.
    #[serde(default)]
    pub name: Vec<RichText>,
    #[serde(default)]
    pub description: Vec<RichText>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    /// Column definitions in display order.
    pub schema: Vec<Column>,
    #[serde(default)]
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Human-readable summary of the table structure.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = format!("table {} ({} rows)\n", self.id, self.rows.len());
        for column in &self.schema {
            let _ = writeln!(out, "  {} [{:?}] id={}", column.name, column.kind, column.id);
            for option in &column.options {
                let _ = writeln!(out, "    - {} ({})", option.value, option.color);
            }
        }
        out
    }
}

/// Column definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Source-assigned column id; names may repeat, ids do not.
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnKind,
    /// Palette of select and multi-select columns.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

/// Column type as declared by the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Title,
    Text,
    Checkbox,
    Select,
    MultiSelect,
    #[serde(rename = "date")]
    DateTime,
    /// Any other type; decoded as text.
    #[serde(other)]
    Other,
}

/// One entry of a select palette.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: String,
    pub color: String,
    pub value: String,
}

/// One row of the table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    /// Source uri of the row's page; its last segment is the page id.
    pub uri: String,
    #[serde(default)]
    pub title: Vec<RichText>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    /// Raw cell values keyed by column id. `None` for placeholder rows.
    #[serde(default)]
    pub properties: Option<BTreeMap<String, Vec<RichText>>>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub created_time: i64,
    /// Epoch milliseconds.
    #[serde(default)]
    pub last_edited_time: i64,
}

impl RawRow {
    /// Decode the cell of `column`; absent properties decode as empty cells.
    #[must_use]
    pub fn cell(&self, column: &Column) -> Cell {
        match self.properties.as_ref().and_then(|p| p.get(&column.id)) {
            Some(raw) => Cell::decode(column.kind, raw),
            None => Cell::empty(column.kind),
        }
    }
}

/// Typed value of a table cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Text(Vec<RichText>),
    Checkbox(bool),
    Select(Option<String>),
    MultiSelect(Vec<String>),
    DateTime(Option<DateValue>),
}

impl Cell {
    /// Decode raw rich text according to the column type.
    #[must_use]
    pub fn decode(kind: ColumnKind, raw: &[RichText]) -> Self {
        match kind {
            ColumnKind::Title | ColumnKind::Text | ColumnKind::Other => Self::Text(raw.to_vec()),
            ColumnKind::Checkbox => Self::Checkbox(raw.first().is_some_and(|r| r.text == CHECKED)),
            ColumnKind::Select => Self::Select(split_options(raw).into_iter().next()),
            ColumnKind::MultiSelect => Self::MultiSelect(split_options(raw)),
            ColumnKind::DateTime => Self::DateTime(
                raw.first()
                    .and_then(|run| run.marks.iter().find_map(date_mark))
                    .cloned(),
            ),
        }
    }

    /// Empty value of a column type.
    #[must_use]
    pub fn empty(kind: ColumnKind) -> Self {
        Self::decode(kind, &[])
    }

    /// Boolean reading of the cell.
    #[must_use]
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Checkbox(checked) => *checked,
            Self::Text(runs) => plain_text(runs) == CHECKED,
            Self::Select(option) => option.as_deref() == Some(CHECKED),
            Self::MultiSelect(options) => options.first().is_some_and(|o| o == CHECKED),
            Self::DateTime(_) => false,
        }
    }

    /// Selected options, in cell order.
    #[must_use]
    pub fn options(&self) -> Vec<String> {
        match self {
            Self::MultiSelect(options) => options.clone(),
            Self::Select(option) => option.iter().cloned().collect(),
            Self::Text(runs) => split_options(runs),
            Self::Checkbox(_) | Self::DateTime(_) => Vec::new(),
        }
    }

    /// First selected option, or an empty string.
    #[must_use]
    pub fn first_option(&self) -> String {
        self.options().into_iter().next().unwrap_or_default()
    }

    /// Rich text reading of the cell.
    #[must_use]
    pub fn rich_text(&self) -> Vec<RichText> {
        match self {
            Self::Text(runs) => runs.clone(),
            Self::Checkbox(_) | Self::Select(_) | Self::MultiSelect(_) | Self::DateTime(_) => {
                match self.plain() {
                    text if text.is_empty() => Vec::new(),
                    text => vec![RichText::plain(text)],
                }
            }
        }
    }

    /// Plain text reading of the cell.
    #[must_use]
    pub fn plain(&self) -> String {
        match self {
            Self::Text(runs) => plain_text(runs),
            Self::Checkbox(true) => CHECKED.to_owned(),
            Self::Checkbox(false) => String::new(),
            Self::Select(option) => option.clone().unwrap_or_default(),
            Self::MultiSelect(options) => options.join(","),
            Self::DateTime(date) => date.as_ref().map(|d| d.start_date.clone()).unwrap_or_default(),
        }
    }

    /// Date reading of the cell.
    #[must_use]
    pub fn date(&self) -> Option<&DateValue> {
        match self {
            Self::DateTime(date) => date.as_ref(),
            Self::Text(_) | Self::Checkbox(_) | Self::Select(_) | Self::MultiSelect(_) => None,
        }
    }
}

fn date_mark(mark: &Mark) -> Option<&DateValue> {
    match mark {
        Mark::Date(date) => Some(date),
        _ => None,
    }
}

/// Split the comma-joined option list stored in the first run.
fn split_options(raw: &[RichText]) -> Vec<String> {
    raw.first()
        .map(|run| {
            run.text
                .split(',')
                .filter(|option| !option.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}
