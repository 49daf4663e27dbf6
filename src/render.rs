//! Template rendering
//!
//! The composition engine treats rendering as an opaque collaborator: a
//! [`Renderer`] turns a template body plus a [`RenderContext`] into text, or
//! fails with [`Error::Template`]. [`TemplateEngine`] is the default
//! implementation, backed by `minijinja` with strict undefined handling so a
//! missing key is an error instead of an empty string.

use indexmap::IndexMap;
use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use crate::error::{Error, Result};

/// Values visible to templates, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RenderContext {
    values: IndexMap<String, serde_json::Value>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Renders a template body with a context
pub trait Renderer {
    /// Render `source`; `name` identifies the template in error messages.
    fn render(&self, name: &str, source: &str, context: &RenderContext) -> Result<String>;
}

/// Default renderer using `minijinja` syntax (`{{ key }}`, `{% if %}`, ...)
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        Self { env }
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for TemplateEngine {
    fn render(&self, name: &str, source: &str, context: &RenderContext) -> Result<String> {
        self.env
            .render_named_str(name, source, context)
            .map_err(|err| Error::Template {
                message: err.to_string(),
                template: Some(name.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> RenderContext {
        let mut context = RenderContext::new();
        context.insert("projectName", "shop");
        context.insert("projectBuildDirectory", "target");
        context
    }

    #[test]
    fn test_render_substitutes_values() {
        let engine = TemplateEngine::new();
        let rendered = engine
            .render(
                "angular.json",
                "{\"name\": \"{{ projectName }}\", \"out\": \"{{projectBuildDirectory}}/dist\"}\n",
                &context(),
            )
            .unwrap();
        assert_eq!(rendered, "{\"name\": \"shop\", \"out\": \"target/dist\"}\n");
    }

    #[test]
    fn test_render_missing_key_is_template_error() {
        let engine = TemplateEngine::new();
        let err = engine
            .render("main.ts", "{{ serverPort }}", &context())
            .unwrap_err();
        match err {
            Error::Template { template, .. } => assert_eq!(template.as_deref(), Some("main.ts")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_render_malformed_template_is_template_error() {
        let engine = TemplateEngine::new();
        let err = engine
            .render("broken", "{% if projectName %}", &context())
            .unwrap_err();
        assert!(matches!(err, Error::Template { .. }));
    }

    #[test]
    fn test_context_insert_replaces() {
        let mut context = context();
        context.insert("projectName", "other");
        assert_eq!(context.get("projectName"), Some(&serde_json::json!("other")));
        assert_eq!(context.len(), 2);
    }
}
