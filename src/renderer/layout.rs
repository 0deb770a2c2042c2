//! Renderer composing a content template inside a layout

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::{RenderError, Renderer, CONTENT_SLOT};
use crate::engine::TemplateEngine;

/// Renders `content`, then renders `layout` with the result bound to
/// [`CONTENT_SLOT`]
///
/// The layout sees the caller's context plus the slot, and the slot shadows a
/// `content` key in the context. If the content fails nothing is written to the
/// sink. Only one level of nesting is supported.
pub struct LayoutRenderer<E: TemplateEngine> {
    engine: Arc<E>,
    content: E::Template,
    layout: E::Template,
}

impl<E: TemplateEngine> LayoutRenderer<E> {
    pub fn new(engine: Arc<E>, content: E::Template, layout: E::Template) -> Self {
        Self {
            engine,
            content,
            layout,
        }
    }
}

impl<E: TemplateEngine> Renderer for LayoutRenderer<E> {
    fn render(&self, context: &Value, out: &mut dyn Write) -> Result<(), RenderError> {
        let mut rendered = Vec::new();
        self.engine.execute(&self.content, &[context], &mut rendered)?;

        let mut slot = Map::new();
        slot.insert(
            CONTENT_SLOT.to_string(),
            Value::String(String::from_utf8_lossy(&rendered).into_owned()),
        );
        let slot = Value::Object(slot);

        self.engine.execute(&self.layout, &[context, &slot], out)?;
        Ok(())
    }
}

impl<E: TemplateEngine> fmt::Debug for LayoutRenderer<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutRenderer").finish_non_exhaustive()
    }
}
