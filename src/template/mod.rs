//! Partial resolution and the renderer registry
//!
//! Templates reference other templates by name with `{{> name}}`. Those names
//! are resolved through a [`PartialResolver`]; the standard one is a
//! [`LayeredResolver`] that prefers partials registered in memory and falls back
//! to files on disk.
//!
//! # Example
//!
//! ```rust
//! use mustache_layouts::template::{FilePartials, LayeredResolver, PartialResolver, StaticPartials};
//!
//! let statics = StaticPartials::new().with("greeting", "Hi {{name}}");
//! let resolver = LayeredResolver::standard(statics, FilePartials::with_root("partials"));
//!
//! assert_eq!(resolver.resolve("greeting").unwrap().as_deref(), Some("Hi {{name}}"));
//! ```

mod debug;
mod registry;
mod resolver;

pub use debug::{DebugContext, DebugHelper, RequestContext, DEBUG_PARTIAL, DEBUG_TEMPLATE};
pub use registry::{
    build_registry, load_source, PartialBuild, RegistryBuilder, RegistryError, RendererRegistry,
};
pub use resolver::{
    FilePartials, LayeredResolver, PartialResolver, ResolveError, StaticPartials,
    DEFAULT_EXTENSIONS,
};
