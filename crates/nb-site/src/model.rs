//! Typed site model produced from the remote table.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::id::to_dash_id;
use crate::rich_text::RichText;

/// Site-level metadata taken from the table itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMeta {
    pub icon: Option<String>,
    #[serde(rename = "iconHTML")]
    pub icon_html: String,
    pub cover: Option<String>,
    pub title: String,
    pub description: Vec<RichText>,
    pub description_plain: String,
    #[serde(rename = "descriptionHTML")]
    pub description_html: String,
}

/// A tag attached to a page, with the color class from the column palette.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub value: String,
    /// Empty when the tag is not part of the palette.
    pub color: String,
}

/// Metadata of one page (one table row).
///
/// Immutable for the duration of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    /// Page id without dashes.
    pub id: String,
    pub icon: Option<String>,
    #[serde(rename = "iconHTML")]
    pub icon_html: String,
    pub cover: Option<String>,
    pub title: String,
    pub tags: Vec<Tag>,
    pub publish: bool,
    pub in_menu: bool,
    pub in_list: bool,
    /// Template name; empty when the cell is empty.
    pub template: String,
    /// Output path relative to the output directory.
    pub url: String,
    pub canonical: String,
    pub description: Vec<RichText>,
    pub description_plain: String,
    #[serde(rename = "descriptionHTML")]
    pub description_html: String,
    /// Raw `YYYY-MM-DD` start date.
    pub date: Option<String>,
    /// Human-readable date, e.g. `Mon, Jan 1, 2024`.
    pub date_string: Option<String>,
    /// Epoch milliseconds.
    pub created_time: i64,
    /// Epoch milliseconds.
    pub last_edited_time: i64,
}

impl PageMetadata {
    /// Dashed page id, used for cache keys and fetches.
    #[must_use]
    pub fn dash_id(&self) -> String {
        to_dash_id(&self.id)
    }

    /// Source-side modification time; negative values clamp to the epoch.
    #[must_use]
    pub fn last_edited(&self) -> SystemTime {
        let millis = u64::try_from(self.last_edited_time).unwrap_or(0);
        UNIX_EPOCH + Duration::from_millis(millis)
    }
}

/// Tag value to the pages carrying it, in page order.
///
/// Buckets are kept in order of first appearance and hold indices into
/// [`SiteModel::pages`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagIndex {
    buckets: Vec<(String, Vec<usize>)>,
}

impl TagIndex {
    /// Append `page` to the bucket of `tag`, creating it if needed.
    pub fn insert(&mut self, tag: &str, page: usize) {
        match self.buckets.iter_mut().find(|(value, _)| value == tag) {
            Some((_, pages)) => pages.push(page),
            None => self.buckets.push((tag.to_owned(), vec![page])),
        }
    }

    /// Page indices of `tag`.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&[usize]> {
        self.buckets
            .iter()
            .find(|(value, _)| value == tag)
            .map(|(_, pages)| pages.as_slice())
    }

    /// Iterate buckets in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.buckets
            .iter()
            .map(|(value, pages)| (value.as_str(), pages.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// The resolved site: metadata, ordered pages and tag index.
///
/// Built once per run and shared read-only by all page tasks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SiteModel {
    pub meta: SiteMeta,
    /// Pages ordered by date, newest first.
    pub pages: Vec<PageMetadata>,
    pub tags: TagIndex,
}

impl SiteModel {
    /// Pages carrying `tag`, in page order.
    #[must_use]
    pub fn pages_with_tag(&self, tag: &str) -> Vec<&PageMetadata> {
        self.tags
            .get(tag)
            .unwrap_or_default()
            .iter()
            .filter_map(|&index| self.pages.get(index))
            .collect()
    }

    /// Number of pages marked for publishing.
    #[must_use]
    pub fn published_count(&self) -> usize {
        self.pages.iter().filter(|page| page.publish).count()
    }
}

/// Template view: site metadata flattened with `pages` and `tagMap`.
impl Serialize for SiteModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct View<'a> {
            #[serde(flatten)]
            meta: &'a SiteMeta,
            pages: &'a [PageMetadata],
            tag_map: TagMap<'a>,
        }

        View {
            meta: &self.meta,
            pages: &self.pages,
            tag_map: TagMap(self),
        }
        .serialize(serializer)
    }
}

struct TagMap<'a>(&'a SiteModel);

impl Serialize for TagMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.tags.len()))?;
        for (tag, _) in self.0.tags.iter() {
            map.serialize_entry(tag, &self.0.pages_with_tag(tag))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn page(id: &str) -> PageMetadata {
        PageMetadata {
            id: id.to_owned(),
            url: format!("{id}.html"),
            ..PageMetadata::default()
        }
    }

    #[test]
    fn test_tag_index_keeps_first_appearance_order() {
        let mut index = TagIndex::default();
        index.insert("web", 0);
        index.insert("rust", 0);
        index.insert("web", 2);

        let buckets: Vec<_> = index.iter().collect();
        assert_eq!(buckets, vec![("web", &[0, 2][..]), ("rust", &[0][..])]);
        assert_eq!(index.get("missing"), None);
    }

    #[test]
    fn test_last_edited_from_millis() {
        let mut meta = page("a");
        meta.last_edited_time = 1_500;
        assert_eq!(meta.last_edited(), UNIX_EPOCH + Duration::from_millis(1_500));

        meta.last_edited_time = -1;
        assert_eq!(meta.last_edited(), UNIX_EPOCH);
    }

    #[test]
    fn test_dash_id() {
        let meta = page("0eeee000ccccbbbbaaaa123450000000");
        assert_eq!(meta.dash_id(), "0eeee000-cccc-bbbb-aaaa-123450000000");
    }

    #[test]
    fn test_site_model_view_shape() {
        let mut tags = TagIndex::default();
        tags.insert("web", 1);
        let model = SiteModel {
            meta: SiteMeta {
                title: "Blog".to_owned(),
                ..SiteMeta::default()
            },
            pages: vec![page("a"), page("b")],
            tags,
        };

        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value["title"], "Blog");
        assert_eq!(value["iconHTML"], "");
        assert_eq!(value["pages"][0]["url"], "a.html");
        assert_eq!(value["pages"][0]["inMenu"], false);
        assert_eq!(value["tagMap"]["web"][0]["id"], "b");
        assert_eq!(value["tagMap"]["web"].as_array().unwrap().len(), 1);
    }
}
