//! In-memory configuration source

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use crate::domain::ConfigSource;

/// Properties registered per logical resource name
///
/// Keys are trimmed on registration. Lookups return a copy, so later
/// registrations never reach an artifact that was already written.
#[derive(Debug, Default)]
pub struct InMemoryConfigSource {
    resources: RwLock<HashMap<String, BTreeMap<String, String>>>,
}

impl InMemoryConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one property; a blank key is ignored
    pub fn register(&self, name: &str, key: &str, value: impl Into<String>) {
        let key = key.trim();
        if key.is_empty() {
            return;
        }

        self.resources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    pub fn register_all(&self, name: &str, properties: BTreeMap<String, String>) {
        for (key, value) in properties {
            self.register(name, &key, value);
        }
    }
}

impl ConfigSource for InMemoryConfigSource {
    fn properties(&self, name: &str) -> Option<BTreeMap<String, String>> {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_trims_keys() {
        let source = InMemoryConfigSource::new();
        source.register("core-site.xml", "  fs.defaultFS  ", "hdfs://nn");
        source.register("core-site.xml", "   ", "dropped");

        let props = source.properties("core-site.xml").unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props["fs.defaultFS"], "hdfs://nn");
    }

    #[test]
    fn test_unregistered_name() {
        let source = InMemoryConfigSource::new();
        assert!(source.properties("missing.xml").is_none());
    }

    #[test]
    fn test_lookup_is_a_copy() {
        let source = InMemoryConfigSource::new();
        source.register("a.xml", "k", "v1");

        let snapshot = source.properties("a.xml").unwrap();
        source.register("a.xml", "k", "v2");

        assert_eq!(snapshot["k"], "v1");
        assert_eq!(source.properties("a.xml").unwrap()["k"], "v2");
    }
}
