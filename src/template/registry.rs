//! Registry of named renderers and the builder that loads it

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use super::resolver::PartialResolver;
use crate::config::Config;
use crate::engine::{EngineError, TemplateEngine};
use crate::renderer::{LayoutRenderer, RenderError, Renderer, SimpleRenderer};

/// Errors that stop a registry build
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A declared template file could not be read
    #[error("error reading template file {}: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A declared template file is not a valid template
    #[error("error parsing template file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: EngineError,
    },
}

impl RegistryError {
    /// Path of the template file that caused the error
    pub fn path(&self) -> &Path {
        match self {
            RegistryError::SourceUnavailable { path, .. } | RegistryError::Parse { path, .. } => {
                path
            }
        }
    }
}

/// A failed build, with the renderers registered before the failure
#[derive(Debug, Error)]
#[error("{error}")]
pub struct PartialBuild {
    pub registry: RendererRegistry,
    #[source]
    pub error: RegistryError,
}

/// Immutable mapping from names to renderers
#[derive(Default)]
pub struct RendererRegistry {
    renderers: HashMap<String, Box<dyn Renderer>>,
}

impl RendererRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a renderer by name
    pub fn get(&self, name: &str) -> Option<&dyn Renderer> {
        self.renderers.get(name).map(|r| r.as_ref())
    }

    /// Check if a renderer is registered
    pub fn contains(&self, name: &str) -> bool {
        self.renderers.contains_key(name)
    }

    /// Get all renderer names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.renderers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    /// Render the renderer registered as `name`
    pub fn render(&self, name: &str, context: &Value, out: &mut dyn Write) -> Result<(), RenderError> {
        let renderer = self.get(name).ok_or_else(|| RenderError::NotFound {
            name: name.to_string(),
        })?;
        renderer.render(context, out)
    }

    /// Register a renderer, returning true if it replaced an existing one
    fn insert(&mut self, name: String, renderer: Box<dyn Renderer>) -> bool {
        self.renderers.insert(name, renderer).is_some()
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("renderers", &self.names())
            .finish()
    }
}

/// Read a template file fully into memory
pub fn load_source(path: &Path) -> Result<String, RegistryError> {
    std::fs::read_to_string(path).map_err(|source| RegistryError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

/// Collects renderer declarations and compiles them into a [`RendererRegistry`]
///
/// Declarations are processed templates first, then layouts, then
/// compositions, each group in name order. Every template is compiled against
/// the same partial resolver.
pub struct RegistryBuilder<E: TemplateEngine> {
    engine: Arc<E>,
    partials: Arc<dyn PartialResolver>,
    templates: BTreeMap<String, PathBuf>,
    layouts: BTreeMap<String, PathBuf>,
    compositions: BTreeMap<String, (PathBuf, PathBuf)>,
}

impl<E: TemplateEngine + 'static> RegistryBuilder<E> {
    pub fn new(engine: E, partials: impl PartialResolver + 'static) -> Self {
        Self {
            engine: Arc::new(engine),
            partials: Arc::new(partials),
            templates: BTreeMap::new(),
            layouts: BTreeMap::new(),
            compositions: BTreeMap::new(),
        }
    }

    /// Declare a standalone template
    pub fn template(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.templates.insert(name.into(), path.into());
        self
    }

    /// Declare a layout; layouts render standalone like templates
    pub fn layout(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.layouts.insert(name.into(), path.into());
        self
    }

    /// Declare a content template rendered inside a layout
    pub fn composition(
        mut self,
        name: impl Into<String>,
        content: impl Into<PathBuf>,
        layout: impl Into<PathBuf>,
    ) -> Self {
        self.compositions
            .insert(name.into(), (content.into(), layout.into()));
        self
    }

    /// Declare everything in `config`, with paths resolved against its base directory
    pub fn with_config(mut self, config: &Config) -> Self {
        for (name, path) in &config.templates {
            self = self.template(name.clone(), config.resolve_path(path));
        }
        for (name, path) in &config.layouts {
            self = self.layout(name.clone(), config.resolve_path(path));
        }
        for (name, composition) in &config.compositions {
            self = self.composition(
                name.clone(),
                config.resolve_path(&composition.content),
                config.resolve_path(&composition.layout),
            );
        }
        self
    }

    /// Compile every declaration
    ///
    /// Stops at the first file that cannot be read or compiled and returns the
    /// error together with the renderers registered so far.
    pub fn build(self) -> Result<RendererRegistry, PartialBuild> {
        let mut registry = RendererRegistry::new();

        if let Err(error) = self.build_into(&mut registry) {
            error!(path = %error.path().display(), %error, "failed to build renderer registry");
            return Err(PartialBuild { registry, error });
        }

        Ok(registry)
    }

    fn build_into(&self, registry: &mut RendererRegistry) -> Result<(), RegistryError> {
        let simple = self
            .templates
            .iter()
            .map(|entry| ("template", entry))
            .chain(self.layouts.iter().map(|entry| ("layout", entry)));

        for (kind, (name, path)) in simple {
            let template = self.compile(path)?;
            let renderer = SimpleRenderer::new(self.engine.clone(), template);
            self.register(registry, kind, name, Box::new(renderer));
        }

        for (name, (content_path, layout_path)) in &self.compositions {
            let content = self.compile(content_path)?;
            let layout = self.compile(layout_path)?;
            let renderer = LayoutRenderer::new(self.engine.clone(), content, layout);
            self.register(registry, "composition", name, Box::new(renderer));
        }

        Ok(())
    }

    fn compile(&self, path: &Path) -> Result<E::Template, RegistryError> {
        let source = load_source(path)?;
        self.engine
            .compile(&source, self.partials.clone())
            .map_err(|source| RegistryError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    fn register(
        &self,
        registry: &mut RendererRegistry,
        kind: &str,
        name: &str,
        renderer: Box<dyn Renderer>,
    ) {
        if registry.insert(name.to_string(), renderer) {
            warn!(name, kind, "renderer name declared twice, keeping the later one");
        }
        info!(name, kind, "registered renderer");
    }
}

/// Build a registry from standalone templates and layouts
pub fn build_registry<E: TemplateEngine + 'static>(
    engine: E,
    partials: impl PartialResolver + 'static,
    templates: &BTreeMap<String, PathBuf>,
    layouts: &BTreeMap<String, PathBuf>,
) -> Result<RendererRegistry, PartialBuild> {
    let mut builder = RegistryBuilder::new(engine, partials);
    for (name, path) in templates {
        builder = builder.template(name.clone(), path.clone());
    }
    for (name, path) in layouts {
        builder = builder.layout(name.clone(), path.clone());
    }
    builder.build()
}
