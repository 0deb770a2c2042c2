//! Mustache execution over `serde_json` values

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::{EngineError, TemplateEngine};
use crate::parser::{parse, Document, Node, Spanned};
use crate::template::PartialResolver;

/// Maximum nesting of partials inside partials
pub const MAX_PARTIAL_DEPTH: usize = 64;

/// The mustache engine
///
/// Supports variables (escaped and unescaped), sections, inverted sections,
/// partials and comments. Partials that no resolver knows render as nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct MustacheEngine;

impl MustacheEngine {
    pub fn new() -> Self {
        Self
    }
}

/// A parsed mustache template bound to its partial resolver
pub struct Template {
    document: Document,
    partials: Arc<dyn PartialResolver>,
}

impl Template {
    /// Names of the partials this template references directly
    pub fn partial_names(&self) -> Vec<&str> {
        self.document.partial_names()
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("nodes", &self.document.nodes.len())
            .field("partials", &self.partials)
            .finish()
    }
}

impl TemplateEngine for MustacheEngine {
    type Template = Template;

    fn compile(
        &self,
        source: &str,
        partials: Arc<dyn PartialResolver>,
    ) -> Result<Template, EngineError> {
        let document = parse(source).map_err(EngineError::Parse)?;
        Ok(Template { document, partials })
    }

    fn execute(
        &self,
        template: &Template,
        scopes: &[&Value],
        out: &mut dyn Write,
    ) -> Result<(), EngineError> {
        let mut stack = scopes.to_vec();
        let mut executor = Executor {
            partials: template.partials.as_ref(),
            out,
            depth: 0,
        };
        executor.render_nodes(&template.document.nodes, &mut stack)
    }
}

/// State for one execution of a template
struct Executor<'a, 'w> {
    partials: &'a dyn PartialResolver,
    out: &'w mut dyn Write,
    depth: usize,
}

impl Executor<'_, '_> {
    fn render_nodes<'v>(
        &mut self,
        nodes: &[Spanned<Node>],
        stack: &mut Vec<&'v Value>,
    ) -> Result<(), EngineError> {
        for node in nodes {
            match &node.node {
                Node::Text(text) => self.out.write_all(text.as_bytes())?,
                Node::Variable { name, escape } => {
                    if let Some(value) = lookup(stack, name) {
                        self.write_value(value, *escape)?;
                    }
                }
                Node::Section {
                    name,
                    inverted,
                    children,
                } => {
                    let value = lookup(stack, name);
                    if *inverted {
                        if !is_truthy(value) {
                            self.render_nodes(children, stack)?;
                        }
                        continue;
                    }
                    match value {
                        Some(Value::Array(items)) => {
                            for item in items {
                                self.render_scoped(children, stack, item)?;
                            }
                        }
                        Some(value) if is_truthy(Some(value)) => {
                            self.render_scoped(children, stack, value)?;
                        }
                        _ => {}
                    }
                }
                Node::Partial(name) => self.render_partial(name, stack)?,
            }
        }
        Ok(())
    }

    /// Render `nodes` with `scope` pushed on top of the stack
    fn render_scoped<'v>(
        &mut self,
        nodes: &[Spanned<Node>],
        stack: &mut Vec<&'v Value>,
        scope: &'v Value,
    ) -> Result<(), EngineError> {
        stack.push(scope);
        let result = self.render_nodes(nodes, stack);
        stack.pop();
        result
    }

    fn render_partial<'v>(
        &mut self,
        name: &str,
        stack: &mut Vec<&'v Value>,
    ) -> Result<(), EngineError> {
        if self.depth >= MAX_PARTIAL_DEPTH {
            return Err(EngineError::PartialDepth {
                name: name.to_string(),
                depth: self.depth,
            });
        }

        let source = self
            .partials
            .resolve(name)
            .map_err(|source| EngineError::Partial {
                name: name.to_string(),
                source,
            })?;
        let Some(source) = source else {
            debug!(partial = name, "partial not found, rendering nothing");
            return Ok(());
        };

        let document = parse(&source).map_err(|errors| EngineError::PartialParse {
            name: name.to_string(),
            errors,
        })?;

        self.depth += 1;
        let result = self.render_nodes(&document.nodes, stack);
        self.depth -= 1;
        result
    }

    fn write_value(&mut self, value: &Value, escape: bool) -> Result<(), EngineError> {
        let text = match value {
            Value::Null => return Ok(()),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if escape {
            write_escaped(&mut *self.out, &text)?;
        } else {
            self.out.write_all(text.as_bytes())?;
        }
        Ok(())
    }
}

/// Find `name` in the scope stack
///
/// `.` is the top scope. For dotted names the first segment is searched from
/// the top of the stack down; the remaining segments only descend into the
/// value that was found.
fn lookup<'v>(stack: &[&'v Value], name: &str) -> Option<&'v Value> {
    if name == "." {
        return stack.last().copied();
    }

    let mut segments = name.split('.');
    let first = segments.next()?;
    let mut value = stack.iter().rev().find_map(|scope| child(scope, first))?;
    for segment in segments {
        value = child(value, segment)?;
    }
    Some(value)
}

fn child<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Whether a section over this value renders
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(_)) => true,
    }
}

/// Write `text` with HTML special characters replaced by entities
fn write_escaped(out: &mut dyn Write, text: &str) -> std::io::Result<()> {
    let mut last = 0;
    for (i, c) in text.char_indices() {
        let entity = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '"' => "&quot;",
            '\'' => "&#39;",
            _ => continue,
        };
        out.write_all(text[last..i].as_bytes())?;
        out.write_all(entity.as_bytes())?;
        last = i + 1;
    }
    out.write_all(text[last..].as_bytes())
}
