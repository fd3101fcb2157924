//! Lazy, de-duplicated loading of the external scripts and stylesheets a
//! component depends on (map SDKs, video players and the like).
//!
//! Each dependency group is loaded at most once per [`DependencyRegistry`];
//! callers arriving while a group is in flight wait for its global symbol
//! instead of injecting the resources again.

pub mod error;
pub mod host;
pub mod loader;
pub mod registry;
pub mod resource;

pub use error::{LoaderError, LoaderResult};
pub use host::ResourceHost;
pub use loader::DependencyLoader;
pub use registry::{DependencyRegistry, DependencyState};
pub use resource::{GlobalSymbol, Resource, ResourceKind};
