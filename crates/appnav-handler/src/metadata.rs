//! Metadata lookup over a static path map

use appnav_state::MetadataLookup;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Metadata answered from a fixed `path -> object` map
///
/// A document like `{"/Orders/": {...}, "/Orders/Margin@": {...}}` maps
/// one to one onto lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticMetadata {
    loaded: bool,
    objects: HashMap<String, Value>,
}

impl Default for StaticMetadata {
    fn default() -> Self {
        Self {
            loaded: true,
            objects: HashMap::new(),
        }
    }
}

impl StaticMetadata {
    /// Loaded, empty metadata
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata that is not loaded yet
    #[must_use]
    pub fn not_loaded() -> Self {
        Self {
            loaded: false,
            objects: HashMap::new(),
        }
    }

    /// From a JSON document keyed by path
    #[must_use]
    pub fn from_document(document: &Map<String, Value>) -> Self {
        Self {
            loaded: true,
            objects: document
                .iter()
                .map(|(path, value)| (path.clone(), value.clone()))
                .collect(),
        }
    }

    /// Add an object at `path`
    #[must_use]
    pub fn with_object(mut self, path: impl Into<String>, value: Value) -> Self {
        self.objects.insert(path.into(), value);
        self
    }

    /// Declare an entity set with plain properties
    #[must_use]
    pub fn with_entity_set(mut self, entity_set: &str, properties: &[&str]) -> Self {
        let members: Map<String, Value> = properties
            .iter()
            .map(|name| ((*name).to_string(), serde_json::json!({"$kind": "Property"})))
            .collect();
        let path = format!("/{entity_set}/");
        let entry = self
            .objects
            .entry(path)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(existing) = entry {
            existing.extend(members);
        }
        self
    }

    /// Annotate `entity_set/property` with `term = true`
    #[must_use]
    pub fn with_annotation(mut self, entity_set: &str, property: &str, term: &str) -> Self {
        let entry = self
            .objects
            .entry(format!("/{entity_set}/{property}@"))
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(annotations) = entry {
            annotations.insert(term.to_string(), Value::Bool(true));
        }
        self
    }

    /// Toggle the loaded flag
    #[must_use]
    pub fn with_loaded(mut self, loaded: bool) -> Self {
        self.loaded = loaded;
        self
    }
}

impl MetadataLookup for StaticMetadata {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn get_object(&self, path: &str) -> Option<Value> {
        self.objects.get(path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_produces_lookup_paths() {
        let metadata = StaticMetadata::new()
            .with_entity_set("Order", &["Customer", "InternalMargin"])
            .with_annotation(
                "Order",
                "InternalMargin",
                "@com.sap.vocabularies.Analytics.v1.Measure",
            );
        assert_eq!(
            metadata.get_object("/Order/").unwrap()["Customer"],
            json!({"$kind": "Property"})
        );
        assert_eq!(
            metadata.get_object("/Order/InternalMargin@").unwrap()
                ["@com.sap.vocabularies.Analytics.v1.Measure"],
            json!(true)
        );
        assert!(metadata.is_loaded());
        assert!(!StaticMetadata::not_loaded().is_loaded());
    }
}
