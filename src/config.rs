//! Renderer declarations loaded from TOML
//!
//! ```toml
//! partials_dir = "partials"
//!
//! [templates]
//! home = "templates/home.mustache"
//!
//! [layouts]
//! main = "layouts/main.mustache"
//!
//! [compositions.home_page]
//! content = "templates/home.mustache"
//! layout = "layouts/main.mustache"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::template::{FilePartials, LayeredResolver, StaticPartials};

/// Errors that can occur when loading or parsing a config
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// A content template rendered inside a layout
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Composition {
    pub content: PathBuf,
    pub layout: PathBuf,
}

/// Declared renderers and where partials live
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root directory for partials loaded from disk
    #[serde(default)]
    pub partials_dir: Option<PathBuf>,
    /// Standalone templates: name -> path
    #[serde(default)]
    pub templates: BTreeMap<String, PathBuf>,
    /// Layouts, rendered standalone like templates: name -> path
    #[serde(default)]
    pub layouts: BTreeMap<String, PathBuf>,
    #[serde(default)]
    pub compositions: BTreeMap<String, Composition>,
    /// Directory relative paths are resolved against
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl Config {
    /// Load config from a TOML file; relative paths resolve against its directory
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_str(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Load config from a TOML string; relative paths resolve against the current directory
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Set the directory relative paths are resolved against
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Get the base directory
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Resolve a path from the config against the base directory
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Number of declared renderers, counting every group
    pub fn len(&self) -> usize {
        self.templates.len() + self.layouts.len() + self.compositions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The standard resolver for this config: `statics` first, then files
    ///
    /// Files are looked up under `partials_dir`, or the base directory when no
    /// partials directory is set.
    pub fn partial_resolver(&self, statics: StaticPartials) -> LayeredResolver {
        let files = match (&self.partials_dir, &self.base_dir) {
            (Some(dir), _) => FilePartials::with_root(self.resolve_path(dir)),
            (None, Some(base)) => FilePartials::with_root(base),
            (None, None) => FilePartials::new(),
        };
        LayeredResolver::standard(statics, files)
    }
}
