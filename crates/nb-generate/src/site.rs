//! Template views and the pages that do not depend on page content.

use std::path::{Path, PathBuf};

use nb_renderer::Renderer;
use nb_site::{PageMetadata, SiteModel};
use serde_json::{Map, Value};

use crate::error::GenerateError;

/// Template of the site entry.
pub const INDEX_TEMPLATE: &str = "index";
/// Template of tag listing pages.
pub const TAG_TEMPLATE: &str = "tag";

/// View of the site entry: `{siteMeta}`.
pub fn home_view(site: &Value) -> Value {
    object([("siteMeta", site.clone())])
}

/// View of a tag listing: `{siteMeta, tagName, pages}`.
pub fn tag_view(
    site: &Value,
    tag: &str,
    pages: &[&PageMetadata],
) -> Result<Value, serde_json::Error> {
    Ok(object([
        ("siteMeta", site.clone()),
        ("tagName", Value::from(tag)),
        ("pages", serde_json::to_value(pages)?),
    ]))
}

/// View of a page: `{siteMeta, post: {..metadata, contentHTML}}`.
pub fn post_view(
    site: &Value,
    page: &PageMetadata,
    content_html: String,
) -> Result<Value, serde_json::Error> {
    let mut post = serde_json::to_value(page)?;
    if let Value::Object(fields) = &mut post {
        fields.insert("contentHTML".to_owned(), Value::String(content_html));
    }
    Ok(object([("siteMeta", site.clone()), ("post", post)]))
}

fn object<const N: usize>(fields: [(&str, Value); N]) -> Value {
    Value::Object(
        fields
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value))
            .collect::<Map<_, _>>(),
    )
}

/// File name of a tag listing; path separators are dropped.
pub fn tag_file_name(tag: &str) -> String {
    let safe: String = tag.chars().filter(|c| !matches!(c, '/' | '\\')).collect();
    format!("{safe}.html")
}

/// Render the site entry and one listing per tag.
///
/// Returns the paths written.
pub(crate) async fn render_site_pages<R: Renderer + ?Sized>(
    renderer: &R,
    model: &SiteModel,
    site: &Value,
    index_path: &Path,
    tag_dir: &Path,
) -> Result<Vec<PathBuf>, GenerateError> {
    let mut written = Vec::with_capacity(model.tags.len() + 1);

    tracing::info!("Render home page");
    let html = renderer.render(INDEX_TEMPLATE, &home_view(site))?;
    write(index_path, html).await?;
    written.push(index_path.to_path_buf());

    for (tag, _) in model.tags.iter() {
        tracing::info!(tag, "Render tag");
        let view = tag_view(site, tag, &model.pages_with_tag(tag))?;
        let html = renderer.render(TAG_TEMPLATE, &view)?;
        let path = tag_dir.join(tag_file_name(tag));
        write(&path, html).await?;
        written.push(path);
    }
    Ok(written)
}

async fn write(path: &Path, html: String) -> Result<(), GenerateError> {
    tokio::fs::write(path, html)
        .await
        .map_err(|source| GenerateError::Io {
            path: path.to_path_buf(),
            source,
        })
}
