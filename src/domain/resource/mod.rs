//! Configuration resources
//!
//! A resource is looked up by logical name (`core-site.xml`). Names backed by
//! registered properties are materialized into a physical artifact; anything
//! else is handed to a fallback locator.

mod locator;
mod source;

pub use locator::{ResolvedResource, ResourceLocator, ResourceOrigin};
pub use source::{ConfigSource, ConfigurationResource};
