//! Partial resolution - maps a partial's name to its template source
//!
//! Three resolvers are provided:
//!
//! - [`StaticPartials`]: an immutable in-memory set, built once and passed around
//!   explicitly
//! - [`FilePartials`]: reads `<root>/<name><ext>` from disk on every call
//! - [`LayeredResolver`]: asks an ordered list of resolvers and takes the first
//!   non-empty match

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::trace;

use super::debug::{DEBUG_PARTIAL, DEBUG_TEMPLATE};

/// Extensions tried, in order, when looking a partial up on disk
pub const DEFAULT_EXTENSIONS: [&str; 3] = ["", ".mustache", ".stache"];

/// Errors that can occur while resolving a partial
///
/// A partial that does not exist is not an error; resolvers report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Reading the partial's source failed for a reason other than "not found"
    #[error("error reading partial file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Looks up partial source text by name
///
/// `Ok(Some(text))` means found, `Ok(None)` means unknown. Implementations are
/// shared by every template compiled against them and must be safe to call
/// concurrently.
pub trait PartialResolver: Send + Sync + fmt::Debug {
    fn resolve(&self, name: &str) -> Result<Option<String>, ResolveError>;
}

impl<R: PartialResolver + ?Sized> PartialResolver for Arc<R> {
    fn resolve(&self, name: &str) -> Result<Option<String>, ResolveError> {
        (**self).resolve(name)
    }
}

/// Immutable set of partials registered in memory
#[derive(Debug, Clone, Default)]
pub struct StaticPartials {
    partials: HashMap<String, String>,
}

impl StaticPartials {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// The set of partials every registry starts from: the debug partial
    pub fn builtin() -> Self {
        Self::new().with(DEBUG_PARTIAL, DEBUG_TEMPLATE)
    }

    /// Add a partial, replacing any previous one with the same name
    ///
    /// An empty text is a placeholder: the name is declared but the layered
    /// resolver falls through to the next source for it.
    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.partials.insert(name.into(), text.into());
        self
    }

    /// Get the source of a partial
    pub fn get(&self, name: &str) -> Option<&str> {
        self.partials.get(name).map(|s| s.as_str())
    }

    /// Check if a partial is declared
    pub fn contains(&self, name: &str) -> bool {
        self.partials.contains_key(name)
    }

    /// Get all partial names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.partials.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.partials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partials.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticPartials {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            partials: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl PartialResolver for StaticPartials {
    fn resolve(&self, name: &str) -> Result<Option<String>, ResolveError> {
        Ok(self.get(name).map(str::to_string))
    }
}

/// Partials read from the filesystem when they are needed
///
/// Nothing is cached: every resolution reads the file again.
#[derive(Debug, Clone)]
pub struct FilePartials {
    /// Directory partial names are relative to (current directory if unset)
    root: Option<PathBuf>,
    extensions: Vec<String>,
}

impl Default for FilePartials {
    fn default() -> Self {
        Self::new()
    }
}

impl FilePartials {
    /// Resolve partial names relative to the current directory
    pub fn new() -> Self {
        Self {
            root: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Resolve partial names relative to `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::new()
        }
    }

    /// Replace the list of extensions tried for each name
    pub fn with_extensions<S: Into<String>>(mut self, extensions: impl IntoIterator<Item = S>) -> Self {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Get the root directory
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Path of a partial without extension, or None if the name would leave the root
    fn base_path(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if name.is_empty() || !contained {
            return None;
        }

        Some(match &self.root {
            Some(root) => root.join(relative),
            None => relative.to_path_buf(),
        })
    }
}

impl PartialResolver for FilePartials {
    fn resolve(&self, name: &str) -> Result<Option<String>, ResolveError> {
        let Some(base) = self.base_path(name) else {
            return Ok(None);
        };

        for ext in &self.extensions {
            let mut file = base.clone().into_os_string();
            file.push(ext);
            let path = PathBuf::from(file);

            if path.is_dir() {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(text) => return Ok(Some(text)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(ResolveError::Io { path, source }),
            }
        }

        Ok(None)
    }
}

/// Resolver that consults several resolvers in priority order
///
/// A result is accepted only when it is found and non-empty; an empty match
/// falls through to the next layer. An error from any layer stops the search.
#[derive(Debug, Clone, Default)]
pub struct LayeredResolver {
    layers: Vec<Arc<dyn PartialResolver>>,
}

impl LayeredResolver {
    /// Create a resolver with no layers (resolves nothing)
    pub fn new() -> Self {
        Self::default()
    }

    /// Static partials first, then the dynamic source
    pub fn standard(statics: StaticPartials, dynamic: impl PartialResolver + 'static) -> Self {
        Self::new().with_layer(statics).with_layer(dynamic)
    }

    /// Append a layer with lower priority than the existing ones
    pub fn with_layer(mut self, layer: impl PartialResolver + 'static) -> Self {
        self.layers.push(Arc::new(layer));
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl PartialResolver for LayeredResolver {
    fn resolve(&self, name: &str) -> Result<Option<String>, ResolveError> {
        for (index, layer) in self.layers.iter().enumerate() {
            match layer.resolve(name)? {
                Some(text) if !text.is_empty() => {
                    trace!(partial = name, layer = index, "resolved partial");
                    return Ok(Some(text));
                }
                _ => continue,
            }
        }
        Ok(None)
    }
}
