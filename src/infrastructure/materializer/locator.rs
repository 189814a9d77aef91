//! Class-path fallback for resources that are not materialized

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::domain::{ResolvedResource, ResourceLocator, ResourceOrigin};

/// Searches an ordered list of directories, first hit wins
#[derive(Debug, Clone, Default)]
pub struct ClassPathLocator {
    roots: Vec<PathBuf>,
}

impl ClassPathLocator {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

/// Only plain relative names may be looked up
fn is_relative_name(name: &str) -> bool {
    let path = Path::new(name);

    !name.is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

impl ResourceLocator for ClassPathLocator {
    fn locate(&self, name: &str) -> Option<ResolvedResource> {
        if !is_relative_name(name) {
            debug!(name, "Rejected class path lookup outside the roots");
            return None;
        }

        self.roots
            .iter()
            .map(|root| root.join(name))
            .find(|candidate| candidate.is_file())
            .map(|path| ResolvedResource::new(name, path, ResourceOrigin::ClassPath))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_first_root_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("hdfs-site.xml"), "<configuration/>").unwrap();
        fs::write(second.path().join("hdfs-site.xml"), "<configuration/>").unwrap();

        let locator =
            ClassPathLocator::new(vec![first.path().to_path_buf(), second.path().to_path_buf()]);
        let found = locator.locate("hdfs-site.xml").unwrap();

        assert_eq!(found.path(), first.path().join("hdfs-site.xml"));
        assert_eq!(found.origin(), ResourceOrigin::ClassPath);
    }

    #[test]
    fn test_nested_name() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("conf")).unwrap();
        fs::write(root.path().join("conf/ranger.xml"), "").unwrap();

        let locator = ClassPathLocator::new(vec![root.path().to_path_buf()]);
        assert!(locator.locate("conf/ranger.xml").is_some());
        assert!(locator.locate("conf").is_none());
    }

    #[test]
    fn test_rejects_escaping_names() {
        let root = tempfile::tempdir().unwrap();
        let locator = ClassPathLocator::new(vec![root.path().join("inner")]);
        fs::create_dir(root.path().join("inner")).unwrap();
        fs::write(root.path().join("secret.xml"), "").unwrap();

        assert!(locator.locate("../secret.xml").is_none());
        assert!(locator
            .locate(&root.path().join("secret.xml").display().to_string())
            .is_none());
        assert!(locator.locate("").is_none());
    }

    #[test]
    fn test_missing() {
        let locator = ClassPathLocator::new(vec![]);
        assert!(locator.locate("core-site.xml").is_none());
    }
}
