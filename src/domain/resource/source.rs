use std::collections::BTreeMap;

/// Lookup of the key/value pairs registered for a logical resource name
pub trait ConfigSource: Send + Sync + std::fmt::Debug {
    /// Snapshot of the properties registered for `name`
    ///
    /// `None` and an empty map both mean "nothing registered".
    fn properties(&self, name: &str) -> Option<BTreeMap<String, String>>;
}

/// Point-in-time snapshot of one resource's properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationResource {
    name: String,
    properties: BTreeMap<String, String>,
}

impl ConfigurationResource {
    /// Build a snapshot, trimming keys and dropping keys that trim to nothing
    pub fn new(name: impl Into<String>, properties: BTreeMap<String, String>) -> Self {
        let properties = properties
            .into_iter()
            .filter_map(|(key, value)| {
                let key = key.trim();
                (!key.is_empty()).then(|| (key.to_string(), value))
            })
            .collect();

        Self {
            name: name.into(),
            properties,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_trimmed() {
        let props = BTreeMap::from([
            ("  fs.defaultFS ".to_string(), "hdfs://nn:8020".to_string()),
            ("   ".to_string(), "ignored".to_string()),
        ]);

        let resource = ConfigurationResource::new("core-site.xml", props);
        assert_eq!(resource.len(), 1);
        assert_eq!(
            resource.properties().get("fs.defaultFS").map(String::as_str),
            Some("hdfs://nn:8020")
        );
    }

    #[test]
    fn test_values_kept_verbatim() {
        let props = BTreeMap::from([("k".to_string(), "  spaced <&> ".to_string())]);
        let resource = ConfigurationResource::new("x", props);

        assert_eq!(resource.properties()["k"], "  spaced <&> ");
    }
}
