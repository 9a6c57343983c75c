//! Projection of a raw table into the [`SiteModel`].

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::html::{icon_html, render_rich_text};
use crate::id::{page_id_from_uri, to_plain_id};
use crate::model::{PageMetadata, SiteMeta, SiteModel, Tag, TagIndex};
use crate::rich_text::plain_text;
use crate::table::{Cell, Column, RawRow, RawTable};

/// Columns every site table must define.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "tags",
    "publish",
    "inMenu",
    "inList",
    "template",
    "url",
    "description",
    "date",
    "canonical",
];

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_DISPLAY_FORMAT: &str = "%a, %b %-d, %Y";

/// Error returned when a table cannot be turned into a site.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Required column \"{0}\" is missing in table")]
    MissingColumn(String),
}

/// Column lookup by name.
///
/// Names may repeat in a table; the first column with a given name wins.
struct Columns<'a> {
    by_name: HashMap<&'a str, &'a Column>,
}

impl<'a> Columns<'a> {
    fn new(schema: &'a [Column]) -> Self {
        let mut by_name = HashMap::with_capacity(schema.len());
        for column in schema {
            if by_name.contains_key(column.name.as_str()) {
                tracing::warn!(
                    name = %column.name,
                    id = %column.id,
                    "Duplicate column name, keeping the first column"
                );
                continue;
            }
            by_name.insert(column.name.as_str(), column);
        }
        Self { by_name }
    }

    fn require(&self) -> Result<(), TableError> {
        match REQUIRED_COLUMNS
            .iter()
            .find(|name| !self.by_name.contains_key(*name))
        {
            Some(name) => Err(TableError::MissingColumn((*name).to_owned())),
            None => Ok(()),
        }
    }

    fn get(&self, name: &str) -> Option<&'a Column> {
        self.by_name.get(name).copied()
    }
}

/// Build the site model from a raw table.
///
/// Rows without properties are placeholders and are dropped. Pages are
/// ordered by date, newest first; undated pages sort as the oldest and ties
/// keep table order.
///
/// # Errors
///
/// Returns [`TableError::MissingColumn`] if any of [`REQUIRED_COLUMNS`] is
/// absent from the schema.
pub fn build_site_model(table: &RawTable) -> Result<SiteModel, TableError> {
    tracing::debug!("{}", table.describe());

    let columns = Columns::new(&table.schema);
    columns.require()?;

    let tag_colors: HashMap<&str, &str> = columns
        .get("tags")
        .map(|column| column.options.as_slice())
        .unwrap_or_default()
        .iter()
        .map(|option| (option.value.as_str(), option.color.as_str()))
        .collect();

    let mut pages: Vec<PageMetadata> = table
        .rows
        .iter()
        .filter(|row| row.properties.is_some())
        .map(|row| page_metadata(row, &columns, &tag_colors))
        .collect();
    pages.sort_by_key(|page| Reverse(date_timestamp(page.date.as_deref())));

    warn_duplicate_urls(&pages);

    let mut tags = TagIndex::default();
    for (index, page) in pages.iter().enumerate() {
        for tag in &page.tags {
            tags.insert(&tag.value, index);
        }
    }

    let meta = SiteMeta {
        icon: table.icon.clone(),
        icon_html: icon_html(table.icon.as_deref()),
        cover: table.cover.clone(),
        title: plain_text(&table.name),
        description: table.description.clone(),
        description_plain: plain_text(&table.description),
        description_html: render_rich_text(&table.description),
    };

    Ok(SiteModel { meta, pages, tags })
}

fn page_metadata(
    row: &RawRow,
    columns: &Columns<'_>,
    tag_colors: &HashMap<&str, &str>,
) -> PageMetadata {
    let cell = |name: &str| {
        columns
            .get(name)
            .map_or_else(|| Cell::Text(Vec::new()), |column| row.cell(column))
    };
    let id = to_plain_id(page_id_from_uri(&row.uri));

    let tags = cell("tags")
        .options()
        .into_iter()
        .map(|value| Tag {
            color: tag_colors
                .get(value.as_str())
                .map(|color| (*color).to_owned())
                .unwrap_or_default(),
            value,
        })
        .collect();

    let date = cell("date").date().map(|date| date.start_date.clone());
    let date_string = date.as_deref().and_then(display_date);
    let description = cell("description");

    PageMetadata {
        url: output_url(&cell("url").plain(), &id),
        icon_html: icon_html(row.icon.as_deref()),
        icon: row.icon.clone(),
        cover: row.cover.clone(),
        title: plain_text(&row.title),
        tags,
        publish: cell("publish").as_bool(),
        in_menu: cell("inMenu").as_bool(),
        in_list: cell("inList").as_bool(),
        template: cell("template").first_option(),
        canonical: cell("canonical").plain(),
        description: description.rich_text(),
        description_plain: description.plain(),
        description_html: render_rich_text(&description.rich_text()),
        date,
        date_string,
        created_time: row.created_time,
        last_edited_time: row.last_edited_time,
        id,
    }
}

/// Output path of a page: the user slug without path separators, or the
/// page id when the slug is empty.
fn output_url(slug: &str, id: &str) -> String {
    let safe: String = slug.chars().filter(|c| !matches!(c, '/' | '\\')).collect();
    if safe.is_empty() {
        format!("{id}.html")
    } else {
        format!("{safe}.html")
    }
}

/// Sort key of a raw date; missing and unparsable dates are 0.
fn date_timestamp(date: Option<&str>) -> i64 {
    date.and_then(parse_date)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map_or(0, |datetime| datetime.and_utc().timestamp())
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}

fn display_date(date: &str) -> Option<String> {
    parse_date(date).map(|date| date.format(DATE_DISPLAY_FORMAT).to_string())
}

fn warn_duplicate_urls(pages: &[PageMetadata]) {
    let mut seen = HashSet::new();
    for page in pages.iter().filter(|page| page.publish) {
        if !seen.insert(page.url.as_str()) {
            tracing::warn!(
                url = %page.url,
                page = %page.id,
                "Duplicate output url, pages will overwrite each other"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::rich_text::{DateValue, Mark, RichText};
    use crate::table::{ColumnKind, SelectOption};

    fn column(name: &str, kind: ColumnKind) -> Column {
        Column {
            id: format!("col-{name}"),
            name: name.to_owned(),
            kind,
            options: Vec::new(),
        }
    }

    fn schema() -> Vec<Column> {
        let mut tags = column("tags", ColumnKind::MultiSelect);
        tags.options = vec![SelectOption {
            id: "o1".to_owned(),
            color: "blue".to_owned(),
            value: "web".to_owned(),
        }];
        vec![
            tags,
            column("publish", ColumnKind::Checkbox),
            column("inMenu", ColumnKind::Checkbox),
            column("inList", ColumnKind::Checkbox),
            column("template", ColumnKind::Select),
            column("url", ColumnKind::Text),
            column("description", ColumnKind::Text),
            column("date", ColumnKind::DateTime),
            column("canonical", ColumnKind::Text),
        ]
    }

    fn row(id: &str, date: Option<&str>) -> RawRow {
        let mut properties = BTreeMap::new();
        properties.insert(
            "col-publish".to_owned(),
            vec![RichText::plain("Yes")],
        );
        if let Some(date) = date {
            properties.insert(
                "col-date".to_owned(),
                vec![RichText::with_marks(
                    "‣",
                    vec![Mark::Date(DateValue {
                        start_date: date.to_owned(),
                        ..DateValue::default()
                    })],
                )],
            );
        }
        RawRow {
            uri: format!("https://www.notion.so/{id}"),
            title: vec![RichText::plain(format!("Title {id}"))],
            properties: Some(properties),
            ..RawRow::default()
        }
    }

    fn table(rows: Vec<RawRow>) -> RawTable {
        RawTable {
            id: "table".to_owned(),
            name: vec![RichText::plain("My Blog")],
            schema: schema(),
            rows,
            ..RawTable::default()
        }
    }

    fn set(row: &mut RawRow, column: &str, text: &str) {
        row.properties
            .as_mut()
            .unwrap()
            .insert(format!("col-{column}"), vec![RichText::plain(text)]);
    }

    #[test]
    fn test_sort_is_stable_and_undated_last() {
        let model = build_site_model(&table(vec![
            row("a", None),
            row("b", Some("2024-01-01")),
            row("c", Some("2023-01-01")),
            row("d", None),
        ]))
        .unwrap();

        let order: Vec<_> = model.pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a", "d"]);
        assert_eq!(model.pages[0].date.as_deref(), Some("2024-01-01"));
        assert_eq!(model.pages[2].date, None);
    }

    #[test]
    fn test_unparsable_date_sorts_as_undated() {
        let model = build_site_model(&table(vec![
            row("a", Some("someday")),
            row("b", Some("2020-05-05")),
        ]))
        .unwrap();

        assert_eq!(model.pages[0].id, "b");
        assert_eq!(model.pages[1].date.as_deref(), Some("someday"));
        assert_eq!(model.pages[1].date_string, None);
    }

    #[test]
    fn test_missing_publish_column_is_fatal() {
        let mut table = table(Vec::new());
        table.schema.retain(|c| c.name != "publish");

        let err = build_site_model(&table).unwrap_err();
        assert!(matches!(err, TableError::MissingColumn(ref name) if name == "publish"));
        assert_eq!(err.to_string(), "Required column \"publish\" is missing in table");
    }

    #[test]
    fn test_duplicate_column_first_wins() {
        let mut table = table(vec![row("a", None)]);
        table.schema.push(Column {
            id: "col-publish-2".to_owned(),
            name: "publish".to_owned(),
            kind: ColumnKind::Checkbox,
            options: Vec::new(),
        });

        let model = build_site_model(&table).unwrap();
        assert!(model.pages[0].publish);
    }

    #[test]
    fn test_rows_without_properties_are_dropped() {
        let placeholder = RawRow {
            uri: "https://www.notion.so/empty".to_owned(),
            ..RawRow::default()
        };
        let model = build_site_model(&table(vec![placeholder, row("a", None)])).unwrap();
        assert_eq!(model.pages.len(), 1);
        assert_eq!(model.pages[0].id, "a");
    }

    #[test]
    fn test_page_projection() {
        let mut r = row("0eeee000-cccc-bbbb-aaaa-123450000000", Some("2024-01-01"));
        set(&mut r, "tags", "web,misc");
        set(&mut r, "template", "post");
        set(&mut r, "url", "/my/post\\");
        set(&mut r, "canonical", "https://example.com/post");
        set(&mut r, "description", "Hi <there>");
        r.icon = Some("https://x/i.png".to_owned());
        r.last_edited_time = 42;

        let model = build_site_model(&table(vec![r])).unwrap();
        let page = &model.pages[0];

        assert_eq!(page.id, "0eeee000ccccbbbbaaaa123450000000");
        assert_eq!(page.url, "mypost.html");
        assert_eq!(page.template, "post");
        assert_eq!(
            page.tags,
            vec![
                Tag {
                    value: "web".to_owned(),
                    color: "blue".to_owned()
                },
                Tag {
                    value: "misc".to_owned(),
                    color: String::new()
                },
            ]
        );
        assert!(page.publish);
        assert!(!page.in_menu);
        assert_eq!(page.canonical, "https://example.com/post");
        assert_eq!(page.description_plain, "Hi <there>");
        assert_eq!(page.description_html, "Hi &lt;there&gt;");
        assert_eq!(page.date_string.as_deref(), Some("Mon, Jan 1, 2024"));
        assert!(page.icon_html.contains("inline-img-icon"));
        assert_eq!(page.last_edited_time, 42);
        assert_eq!(model.meta.title, "My Blog");
    }

    #[test]
    fn test_url_falls_back_to_id() {
        let mut r = row("abc", None);
        set(&mut r, "url", "//");
        let model = build_site_model(&table(vec![r])).unwrap();
        assert_eq!(model.pages[0].url, "abc.html");
    }

    #[test]
    fn test_tag_index_follows_sorted_order() {
        let mut older = row("old", Some("2023-01-01"));
        set(&mut older, "tags", "web");
        let mut newer = row("new", Some("2024-01-01"));
        set(&mut newer, "tags", "web");

        let model = build_site_model(&table(vec![older, newer])).unwrap();
        let tagged: Vec<_> = model
            .pages_with_tag("web")
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(tagged, vec!["new", "old"]);
        assert_eq!(model.tags.len(), 1);
    }
}
