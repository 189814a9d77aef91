use std::path::{Path, PathBuf};

use serde::Serialize;

/// How a resource was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceOrigin {
    /// Synthesized from registered properties
    Materialized,
    /// Found on the class path by the fallback locator
    ClassPath,
}

/// Physical location of a logical resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedResource {
    name: String,
    path: PathBuf,
    origin: ResourceOrigin,
}

impl ResolvedResource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, origin: ResourceOrigin) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            origin,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> ResourceOrigin {
        self.origin
    }

    /// `file://` URI of the artifact
    pub fn uri(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

/// Fallback lookup for names the materializer does not synthesize
pub trait ResourceLocator: Send + Sync + std::fmt::Debug {
    fn locate(&self, name: &str) -> Option<ResolvedResource>;
}
