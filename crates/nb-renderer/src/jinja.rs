//! `minijinja`-backed renderer.

use std::sync::Arc;

use minijinja::{AutoEscape, Environment};

use crate::provider::{Template, TemplateProvider};
use crate::{RenderError, Renderer};

/// Renderer evaluating theme layouts with `minijinja`.
///
/// Output is not auto-escaped: views carry pre-rendered HTML
/// (`contentHTML`, `iconHTML`, `descriptionHTML`).
pub struct JinjaRenderer {
    env: Environment<'static>,
    provider: Arc<TemplateProvider>,
}

impl JinjaRenderer {
    #[must_use]
    pub fn new(provider: Arc<TemplateProvider>) -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        let loader = Arc::clone(&provider);
        env.set_loader(move |name| Ok(Some(loader_source(&loader.get(name)))));
        Self { env, provider }
    }
}

/// Source handed to `minijinja` for an included template.
///
/// A placeholder is emitted as a single string literal so that braces in
/// the template name or layout path are never parsed as syntax.
fn loader_source(template: &Template) -> String {
    match template {
        Template::Source(source) => source.to_string(),
        Template::Placeholder(text) => {
            let literal = serde_json::Value::from(&**text).to_string();
            format!("{{{{ {literal} }}}}")
        }
    }
}

impl Renderer for JinjaRenderer {
    fn render(&self, name: &str, data: &serde_json::Value) -> Result<String, RenderError> {
        if let Template::Placeholder(text) = self.provider.get(name) {
            return Ok(text.to_string());
        }
        let error = |source| RenderError {
            name: name.to_owned(),
            source,
        };
        self.env
            .get_template(name)
            .map_err(error)?
            .render(data)
            .map_err(error)
    }
}
