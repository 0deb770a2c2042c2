//! Renderers that turn a context into output
//!
//! A renderer owns compiled templates and writes output for a context to a sink.
//! [`SimpleRenderer`] runs one template; [`LayoutRenderer`] renders a content
//! template and wraps the result in a layout.

mod layout;
mod simple;

use std::io::Write;

use serde_json::Value;
use thiserror::Error;

use crate::engine::EngineError;

pub use layout::LayoutRenderer;
pub use simple::SimpleRenderer;

/// Name of the variable a layout reads the rendered content from
pub const CONTENT_SLOT: &str = "content";

/// Errors that can occur while rendering
#[derive(Debug, Error)]
pub enum RenderError {
    /// Compiling or executing a template failed
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// No renderer is registered under the requested name
    #[error("renderer not found: {name}")]
    NotFound { name: String },
}

/// Renders a context to a sink
///
/// Renderers hold no mutable state; `render` may be called repeatedly and from
/// several threads at once.
pub trait Renderer: Send + Sync {
    fn render(&self, context: &Value, out: &mut dyn Write) -> Result<(), RenderError>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&self, context: &Value, out: &mut dyn Write) -> Result<(), RenderError> {
        (**self).render(context, out)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! A stand-in engine whose "templates" are plain strings
    //!
    //! `compile` fails on sources starting with `!`. `execute` writes the
    //! source, replacing each `$name` with the string value of `name` looked up
    //! from the last scope to the first.

    use std::io::Write;
    use std::sync::Arc;

    use serde_json::Value;

    use crate::engine::{EngineError, TemplateEngine};
    use crate::error::ParseError;
    use crate::template::PartialResolver;

    #[derive(Debug, Default)]
    pub struct FakeEngine;

    impl TemplateEngine for FakeEngine {
        type Template = String;

        fn compile(
            &self,
            source: &str,
            _partials: Arc<dyn PartialResolver>,
        ) -> Result<String, EngineError> {
            if source.starts_with('!') {
                return Err(EngineError::Parse(vec![ParseError::Syntax {
                    span: 0..1,
                    message: "fake parse failure".to_string(),
                    expected: vec![],
                }]));
            }
            Ok(source.to_string())
        }

        fn execute(
            &self,
            template: &String,
            scopes: &[&Value],
            out: &mut dyn Write,
        ) -> Result<(), EngineError> {
            let mut words = Vec::new();
            for word in template.split(' ') {
                match word.strip_prefix('$') {
                    Some(name) => {
                        let value = scopes
                            .iter()
                            .rev()
                            .find_map(|scope| scope.get(name))
                            .ok_or_else(|| {
                                EngineError::Io(std::io::Error::other(format!(
                                    "fake engine: no value for {}",
                                    name
                                )))
                            })?;
                        words.push(value.as_str().unwrap_or_default().to_string());
                    }
                    None => words.push(word.to_string()),
                }
            }
            out.write_all(words.join(" ").as_bytes())?;
            Ok(())
        }
    }
}
