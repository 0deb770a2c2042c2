//! Renderer for a single template

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use serde_json::Value;

use super::{RenderError, Renderer};
use crate::engine::TemplateEngine;

/// Executes one compiled template, streaming output to the sink
pub struct SimpleRenderer<E: TemplateEngine> {
    engine: Arc<E>,
    template: E::Template,
}

impl<E: TemplateEngine> SimpleRenderer<E> {
    pub fn new(engine: Arc<E>, template: E::Template) -> Self {
        Self { engine, template }
    }
}

impl<E: TemplateEngine> Renderer for SimpleRenderer<E> {
    fn render(&self, context: &Value, out: &mut dyn Write) -> Result<(), RenderError> {
        self.engine.execute(&self.template, &[context], out)?;
        Ok(())
    }
}

impl<E: TemplateEngine> fmt::Debug for SimpleRenderer<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleRenderer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MustacheEngine;
    use crate::renderer::fake::FakeEngine;
    use crate::template::StaticPartials;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn compile<E: TemplateEngine>(engine: E, source: &str) -> SimpleRenderer<E> {
        let template = engine
            .compile(source, Arc::new(StaticPartials::new()))
            .expect("Should compile");
        SimpleRenderer::new(Arc::new(engine), template)
    }

    #[test]
    fn test_render_with_fake_engine() {
        let renderer = compile(FakeEngine, "hello $name");
        let mut out = Vec::new();
        renderer.render(&json!({"name": "Ana"}), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "hello Ana");
    }

    #[test]
    fn test_engine_error_is_returned() {
        let renderer = compile(FakeEngine, "hello $name");
        let mut out = Vec::new();
        let result = renderer.render(&json!({}), &mut out);
        assert!(matches!(result, Err(RenderError::Engine(_))));
    }

    #[test]
    fn test_render_repeatedly() {
        let renderer = compile(MustacheEngine, "{{#xs}}{{.}};{{/xs}}");
        let context = json!({"xs": ["a", "b"]});
        for _ in 0..3 {
            let mut out = Vec::new();
            renderer.render(&context, &mut out).unwrap();
            assert_eq!(String::from_utf8(out).unwrap(), "a;b;");
        }
    }
}
