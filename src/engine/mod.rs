//! Template engine interface
//!
//! Renderers only need two things from a templating engine: turning source text
//! into a reusable compiled template, and executing a compiled template against
//! data. [`TemplateEngine`] captures exactly that, so the rest of the crate can
//! be tested against any engine. [`MustacheEngine`] is the implementation used
//! by default.

pub mod mustache;

use std::io::Write;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::error::{format_parse_errors, ParseError};
use crate::template::{PartialResolver, ResolveError};

pub use mustache::{MustacheEngine, Template, MAX_PARTIAL_DEPTH};

/// Errors raised while compiling or executing a template
#[derive(Debug, Error)]
pub enum EngineError {
    /// The template source is not valid
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// The partial resolver failed while looking up a partial
    #[error("failed to resolve partial {name}: {source}")]
    Partial {
        name: String,
        #[source]
        source: ResolveError,
    },

    /// A resolved partial is not valid template source
    #[error("parse errors in partial {name}: {}", format_parse_errors(.errors))]
    PartialParse { name: String, errors: Vec<ParseError> },

    /// Partials include each other too deeply (usually a partial including itself)
    #[error("partial {name} nested deeper than {depth} levels")]
    PartialDepth { name: String, depth: usize },

    /// Writing to the output failed
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A templating engine: compile once, execute many times
pub trait TemplateEngine: Send + Sync {
    /// Compiled form of a template, immutable and shareable across threads
    type Template: Send + Sync + 'static;

    /// Parse `source` into a template bound to `partials`
    ///
    /// Partials referenced by the template are resolved through `partials`
    /// when the template executes, not here.
    fn compile(
        &self,
        source: &str,
        partials: Arc<dyn PartialResolver>,
    ) -> Result<Self::Template, EngineError>;

    /// Execute `template`, streaming the output to `out`
    ///
    /// `scopes` is the lookup stack, lowest priority first: names are looked up
    /// from the last scope backwards.
    fn execute(
        &self,
        template: &Self::Template,
        scopes: &[&Value],
        out: &mut dyn Write,
    ) -> Result<(), EngineError>;
}
