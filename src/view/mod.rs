//! # View Module
//!
//! What the response layer needs from the view side: templates to render
//! ([`TemplateHandle`] through a [`Renderer`]) and files to stream
//! ([`AssetDescriptor`], usually found through an [`AssetDirectory`]).
//!
//! [`TemplateDirectory`] is a minimal renderer over a directory of
//! minijinja templates. Published parameters from the dispatch are part of
//! the render context; values in the handle's own context take precedence.

mod asset;

pub use asset::{content_type, AssetDescriptor, AssetDirectory};

use crate::controller::Params;
use anyhow::{anyhow, Context};
use minijinja::Environment;
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;

/// A template name plus the context to render it with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemplateHandle {
    pub name: String,
    pub context: Map<String, Value>,
}

impl TemplateHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context: Map::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Renders template handles into response bodies.
pub trait Renderer: Send + Sync {
    fn render(&self, template: &TemplateHandle, published: &Params) -> anyhow::Result<String>;
}

/// Published parameters first, then the handle's own context on top.
#[must_use]
pub fn render_context(template: &TemplateHandle, published: &Params) -> Value {
    let mut ctx: Map<String, Value> = published
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    ctx.extend(template.context.clone());
    Value::Object(ctx)
}

/// Renderer reading minijinja templates from a directory.
#[derive(Debug, Clone)]
pub struct TemplateDirectory {
    base_dir: PathBuf,
}

impl TemplateDirectory {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base_dir: base.into(),
        }
    }
}

impl Renderer for TemplateDirectory {
    fn render(&self, template: &TemplateHandle, published: &Params) -> anyhow::Result<String> {
        let path = asset::map_below(&self.base_dir, &template.name)
            .ok_or_else(|| anyhow!("invalid template name '{}'", template.name))?;
        let source = fs::read_to_string(&path)
            .with_context(|| format!("template '{}' not found", template.name))?;

        let mut env = Environment::new();
        env.add_template(&template.name, &source)?;
        let tmpl = env.get_template(&template.name)?;
        let rendered = tmpl.render(render_context(template, published))?;
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn templates() -> TemplateDirectory {
        TemplateDirectory::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/templates"))
    }

    #[test]
    fn test_render_html() {
        let handle = TemplateHandle::new("hello.html").with("name", "World");
        let out = templates().render(&handle, &Params::new()).unwrap();
        assert_eq!(out, "<h1>Hello World!</h1>");
    }

    #[test]
    fn test_published_params_join_context() {
        let mut published = Params::new();
        published.insert("title".into(), json!("Admin"));
        published.insert("user".into(), json!("ignored"));
        let handle = TemplateHandle::new("user.html").with("user", "ada");
        let out = templates().render(&handle, &published).unwrap();
        assert_eq!(out, "<p>ada (Admin)</p>");
    }

    #[test]
    fn test_addition_template_renders_sum() {
        let (a, b) = (7, 13);
        let handle = TemplateHandle::new("add.txt")
            .with("a", a)
            .with("b", b)
            .with("sum", a + b);
        let out = templates().render(&handle, &Params::new()).unwrap();
        assert_eq!(out, "7 + 13 = 20");
    }

    #[test]
    fn test_missing_and_escaping_templates_fail() {
        assert!(templates()
            .render(&TemplateHandle::new("missing.html"), &Params::new())
            .is_err());
        assert!(templates()
            .render(&TemplateHandle::new("../Cargo.toml"), &Params::new())
            .is_err());
    }
}
