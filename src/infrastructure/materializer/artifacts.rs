//! Config materializer
//!
//! Turns a logical resource name into a physical file. Names with registered
//! properties are written out as configuration XML into a temporary file
//! owned by the materializer; other names go to the fallback locator.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tempfile::{Builder, TempPath};
use tracing::{debug, info, warn};

use super::writer::write_configuration;
use crate::domain::{
    ConfigSource, ConfigurationResource, DomainError, ResolvedResource, ResourceLocator,
    ResourceOrigin,
};
use crate::infrastructure::observability::record_resource_resolution;

/// A written artifact; the file is removed when this is dropped
#[derive(Debug)]
struct Artifact {
    resource: ResolvedResource,
    file: TempPath,
}

#[derive(Debug)]
pub struct ConfigMaterializer {
    source: Arc<dyn ConfigSource>,
    fallback: Arc<dyn ResourceLocator>,
    temp_dir: Option<PathBuf>,
    artifacts: Mutex<HashMap<String, Artifact>>,
}

/// Temp file prefix and suffix for a logical name
///
/// `core-site.xml` becomes `core-site-XXXX.xml`; a name without a dot
/// becomes `nameXXXX.txt`.
fn artifact_affixes(name: &str) -> (String, String) {
    let name = name.replace(['/', '\\'], "_");

    match name.split_once('.') {
        Some((stem, ext)) => (format!("{}-", stem), format!(".{}", ext)),
        None => (name, ".txt".to_string()),
    }
}

impl ConfigMaterializer {
    pub fn new(source: Arc<dyn ConfigSource>, fallback: Arc<dyn ResourceLocator>) -> Self {
        Self {
            source,
            fallback,
            temp_dir: None,
            artifacts: Mutex::new(HashMap::new()),
        }
    }

    /// Write artifacts under `dir` instead of the system temp directory
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    fn artifacts(&self) -> MutexGuard<'_, HashMap<String, Artifact>> {
        self.artifacts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve a logical name to a physical resource
    ///
    /// Returns `Ok(None)` when the name has no registered properties and the
    /// fallback locator does not know it either. A failure to write the
    /// artifact is a fatal configuration error.
    pub fn resolve(&self, name: &str) -> Result<Option<ResolvedResource>, DomainError> {
        if let Some(artifact) = self.artifacts().get(name) {
            return Ok(Some(artifact.resource.clone()));
        }

        let snapshot =
            ConfigurationResource::new(name, self.source.properties(name).unwrap_or_default());

        if snapshot.is_empty() {
            let located = self.fallback.locate(name);
            match &located {
                Some(resource) => {
                    debug!(name, path = %resource.path().display(), "Resolved from class path");
                    record_resource_resolution("class_path");
                }
                None => {
                    debug!(name, "Resource not found");
                    record_resource_resolution("missing");
                }
            }
            return Ok(located);
        }

        // Written outside the lock; a concurrent first resolution may write
        // a second file, which is dropped below.
        let artifact = self.materialize(&snapshot)?;

        let mut artifacts = self.artifacts();
        let resolved = match artifacts.entry(name.to_string()) {
            Entry::Occupied(existing) => {
                debug!(
                    name,
                    discarded = %artifact.resource.path().display(),
                    "Discarding duplicate artifact"
                );
                existing.get().resource.clone()
            }
            Entry::Vacant(slot) => slot.insert(artifact).resource.clone(),
        };

        record_resource_resolution("materialized");
        Ok(Some(resolved))
    }

    fn materialize(&self, resource: &ConfigurationResource) -> Result<Artifact, DomainError> {
        let (prefix, suffix) = artifact_affixes(resource.name());
        let mut builder = Builder::new();
        builder.prefix(&prefix).suffix(&suffix);

        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| {
            DomainError::configuration(format!(
                "Failed to create artifact for '{}': {}",
                resource.name(),
                e
            ))
        })?;

        write_configuration(BufWriter::new(file.as_file()), resource)?;

        let path = file.into_temp_path();
        info!(
            name = resource.name(),
            properties = resource.len(),
            path = %path.display(),
            "Materialized configuration resource"
        );

        Ok(Artifact {
            resource: ResolvedResource::new(
                resource.name(),
                path.to_path_buf(),
                ResourceOrigin::Materialized,
            ),
            file: path,
        })
    }

    /// Number of artifacts currently held
    pub fn artifact_count(&self) -> usize {
        self.artifacts().len()
    }

    /// Delete every artifact written so far
    pub fn teardown(&self) {
        let artifacts: Vec<Artifact> = self.artifacts().drain().map(|(_, a)| a).collect();
        let count = artifacts.len();

        for artifact in artifacts {
            let path = artifact.resource.path().to_path_buf();
            if let Err(e) = artifact.file.close() {
                warn!(path = %path.display(), error = %e, "Failed to delete artifact");
            }
        }

        if count > 0 {
            info!(count, "Removed materialized configuration artifacts");
        }
    }
}
