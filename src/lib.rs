//! mustache-layouts - named mustache renderers with partials and layouts
//!
//! This library loads mustache templates into a registry of renderers. Partials
//! are resolved from an in-memory set first and from files on disk second, and a
//! content template can be rendered inside a layout through the `content` slot.
//!
//! # Example
//!
//! ```rust
//! use mustache_layouts::render;
//! use serde_json::json;
//!
//! let html = render("<p>{{greeting}}, {{name}}!</p>", &json!({"greeting": "Hi", "name": "Ana"})).unwrap();
//! assert_eq!(html, "<p>Hi, Ana!</p>");
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod parser;
pub mod renderer;
pub mod template;

pub use config::{Composition, Config, ConfigError};
pub use engine::{EngineError, MustacheEngine, TemplateEngine};
pub use error::ParseError;
pub use parser::{parse, Document};
pub use renderer::{LayoutRenderer, RenderError, Renderer, SimpleRenderer, CONTENT_SLOT};
pub use template::{
    DebugContext, FilePartials, LayeredResolver, PartialBuild, PartialResolver, RegistryBuilder,
    RegistryError, RendererRegistry, StaticPartials,
};

use std::sync::Arc;

use serde_json::Value;

/// Render mustache source against `context`
///
/// Partials resolve against the built-in set only. For templates with
/// partials on disk, build a registry instead.
///
/// # Example
///
/// ```rust
/// use mustache_layouts::render;
/// use serde_json::json;
///
/// let html = render(
///     "<ul>{{#items}}<li>{{.}}</li>{{/items}}</ul>",
///     &json!({"items": ["a", "b"]}),
/// ).unwrap();
///
/// assert_eq!(html, "<ul><li>a</li><li>b</li></ul>");
/// ```
pub fn render(source: &str, context: &Value) -> Result<String, RenderError> {
    let engine = MustacheEngine::new();
    let template = engine.compile(source, Arc::new(StaticPartials::builtin()))?;
    let renderer = SimpleRenderer::new(Arc::new(engine), template);

    let mut out = Vec::new();
    renderer.render(context, &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Build a registry for everything declared in `config` with the mustache engine
///
/// Partials resolve against the built-in set, then files (see
/// [`Config::partial_resolver`]).
pub fn build_from_config(config: &Config) -> Result<RendererRegistry, PartialBuild> {
    let partials = config.partial_resolver(StaticPartials::builtin());
    RegistryBuilder::new(MustacheEngine::new(), partials)
        .with_config(config)
        .build()
}
