//! Materialize command - resolves one resource outside the server
//!
//! Artifacts are removed when the command exits; pass `--output` to keep a
//! copy.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::domain::{ResolvedResource, ResourceOrigin};

/// Arguments for the materialize command
#[derive(Args, Clone)]
pub struct MaterializeArgs {
    /// Logical resource name, e.g. `core-site.xml`
    pub name: String,

    /// Copy the resolved file here before it is cleaned up
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Resolve the named resource and print its location
pub async fn run(args: MaterializeArgs) -> anyhow::Result<()> {
    let config = super::load_config();
    let materializer = crate::create_materializer(&config.materializer);

    let resolved = materializer
        .resolve(&args.name)
        .with_context(|| format!("Failed to resolve '{}'", args.name))?;

    let result = match resolved {
        Some(resource) => emit(&resource, args.output.as_deref()),
        None => Err(anyhow::anyhow!(
            "Configuration resource '{}' not found",
            args.name
        )),
    };

    materializer.teardown();
    result
}

fn emit(resource: &ResolvedResource, output: Option<&Path>) -> anyhow::Result<()> {
    info!(
        name = %resource.name(),
        origin = ?resource.origin(),
        "Resource resolved"
    );

    let mut stdout = std::io::stdout();
    writeln!(stdout, "{}", format_location(resource))?;

    if let Some(target) = output {
        std::fs::copy(resource.path(), target)
            .with_context(|| format!("Failed to copy to {}", target.display()))?;
        writeln!(stdout, "copied to {}", target.display())?;
    }

    Ok(())
}

fn format_location(resource: &ResolvedResource) -> String {
    let origin = match resource.origin() {
        ResourceOrigin::Materialized => "materialized",
        ResourceOrigin::ClassPath => "class_path",
    };

    format!("{}\t{}\t{}", resource.name(), origin, resource.uri())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_copies_to_output() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("core-site.xml");
        std::fs::write(&source, "<configuration/>").unwrap();

        let resource = ResolvedResource::new("core-site.xml", &source, ResourceOrigin::ClassPath);
        let target = dir.path().join("copy.xml");

        emit(&resource, Some(&target)).unwrap();
        assert_eq!(std::fs::read_to_string(target).unwrap(), "<configuration/>");
    }

    #[test]
    fn test_location_line() {
        let resource = ResolvedResource::new(
            "core-site.xml",
            "/tmp/core-site123.xml",
            ResourceOrigin::Materialized,
        );

        assert_eq!(
            format_location(&resource),
            "core-site.xml\tmaterialized\tfile:///tmp/core-site123.xml"
        );
    }

    #[test]
    fn test_emit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let resource = ResolvedResource::new(
            "gone.xml",
            dir.path().join("gone.xml"),
            ResourceOrigin::ClassPath,
        );

        assert!(emit(&resource, Some(&dir.path().join("out.xml"))).is_err());
    }
}
