//! Theme layout loading.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

const TEMPLATE_EXTENSION: &str = ".html";

const EMPTY_NAME_MESSAGE: &str = "The template name has zero length, \
    please check the \"template\" field in your table.";

/// File name of template `name`: `{name}.html` unless it already ends in `.html`.
#[must_use]
pub fn template_file_name(name: &str) -> String {
    if name.ends_with(TEMPLATE_EXTENSION) {
        name.to_owned()
    } else {
        format!("{name}{TEMPLATE_EXTENSION}")
    }
}

/// A template as returned by [`TemplateProvider::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Template {
    /// Source text read from the layout directory.
    Source(Arc<str>),
    /// Message shown in place of a template that could not be loaded.
    /// It is plain text and must not be compiled.
    Placeholder(Arc<str>),
}

impl Template {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Source(text) | Self::Placeholder(text) => text,
        }
    }
}

/// Loads and memoizes template sources from a layout directory.
#[derive(Debug)]
pub struct TemplateProvider {
    layout_dir: PathBuf,
    loaded: Mutex<HashMap<String, Template>>,
}

impl TemplateProvider {
    #[must_use]
    pub fn new(layout_dir: PathBuf) -> Self {
        Self {
            layout_dir,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Template `name`.
    ///
    /// Missing or unreadable templates yield a [`Template::Placeholder`]
    /// describing the problem. Each name is read from disk at most once.
    pub fn get(&self, name: &str) -> Template {
        let mut loaded = self
            .loaded
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(template) = loaded.get(name) {
            return template.clone();
        }
        let template = self.load(name);
        loaded.insert(name.to_owned(), template.clone());
        template
    }

    fn load(&self, name: &str) -> Template {
        if name.is_empty() {
            tracing::warn!("Empty template name");
            return Template::Placeholder(EMPTY_NAME_MESSAGE.into());
        }

        let file_name = template_file_name(name);
        let path = self.layout_dir.join(&file_name);
        match std::fs::read_to_string(&path) {
            Ok(source) => {
                tracing::debug!(path = %path.display(), "Loaded template");
                Template::Source(source.into())
            }
            Err(e) => {
                tracing::warn!(template = %file_name, error = %e, "Cannot load template");
                Template::Placeholder(
                    format!(
                        "Cannot find \"{file_name}\" in \"{}\".",
                        self.layout_dir.display()
                    )
                    .into(),
                )
            }
        }
    }
}
