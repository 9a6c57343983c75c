//! Template rendering for nb.
//!
//! Themes ship their layouts as `{theme}/layout/{name}.html` files. The
//! [`TemplateProvider`] loads them (substituting a readable placeholder for
//! missing ones) and [`JinjaRenderer`] evaluates them against a JSON view.

mod jinja;
mod provider;

pub use jinja::JinjaRenderer;
pub use provider::{Template, TemplateProvider, template_file_name};

/// Error returned when a template fails to compile or evaluate.
#[derive(Debug, thiserror::Error)]
#[error("Failed to render template \"{name}\": {source}")]
pub struct RenderError {
    pub name: String,
    #[source]
    pub source: minijinja::Error,
}

/// Renders a named template against view data.
///
/// A template that cannot be found renders as a placeholder message instead
/// of failing, so one bad `template` cell only degrades its own page.
pub trait Renderer: Send + Sync {
    /// Render template `name` with `data`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the template has a syntax error or fails
    /// during evaluation.
    fn render(&self, name: &str, data: &serde_json::Value) -> Result<String, RenderError>;
}
