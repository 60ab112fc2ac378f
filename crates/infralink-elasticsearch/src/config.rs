//! Elasticsearch connection, index and mapping configuration.

use indexmap::IndexMap;
use infralink_core::{ResourceSpec, Result};
use serde::{Deserialize, Serialize};

/// Index setting fixed at creation.
pub const NUMBER_OF_SHARDS: &str = "number_of_shards";
pub const NUMBER_OF_REPLICAS: &str = "number_of_replicas";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub indices: Vec<IndexConfig>,
}

fn default_url() -> String {
    "http://localhost:9200".into()
}
fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            request_timeout_ms: default_request_timeout_ms(),
            indices: Vec::new(),
        }
    }
}

impl ElasticsearchConfig {
    /// Builds one spec per index, with its mappings as children.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::InvalidSpec` if an index or mapping has an empty name.
    pub fn index_specs(&self) -> Result<Vec<ResourceSpec>> {
        self.indices.iter().map(IndexConfig::to_spec).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    pub name: String,
    #[serde(default)]
    pub settings: IndexSettings,
    #[serde(default)]
    pub mappings: Vec<MappingConfig>,
}

impl IndexConfig {
    pub fn to_spec(&self) -> Result<ResourceSpec> {
        let mappings = self
            .mappings
            .iter()
            .map(MappingConfig::to_spec)
            .collect::<Result<Vec<_>>>()?;

        ResourceSpec::builder(self.name.as_str())
            .structural(NUMBER_OF_SHARDS, self.settings.number_of_shards)
            .mutable(NUMBER_OF_REPLICAS, self.settings.number_of_replicas)
            .children(mappings)
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSettings {
    #[serde(default = "default_shards")]
    pub number_of_shards: u32,
    #[serde(default = "default_replicas")]
    pub number_of_replicas: u32,
}

fn default_shards() -> u32 {
    1
}
fn default_replicas() -> u32 {
    1
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            number_of_shards: default_shards(),
            number_of_replicas: default_replicas(),
        }
    }
}

/// Field mappings applied to an index.
///
/// Only top-level fields are supported. Each becomes three mutable settings:
/// `<field>.type`, `<field>.index` and `<field>.fielddata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    pub name: String,
    #[serde(default)]
    pub properties: IndexMap<String, PropertyConfig>,
}

impl MappingConfig {
    pub fn to_spec(&self) -> Result<ResourceSpec> {
        let mut builder = ResourceSpec::builder(self.name.as_str());
        for (field, property) in &self.properties {
            builder = builder
                .mutable(format!("{field}.type"), property.field_type.as_str())
                .mutable(format!("{field}.index"), property.index)
                .mutable(format!("{field}.fielddata"), property.fielddata);
        }
        builder.build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyConfig {
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    #[serde(default = "default_index")]
    pub index: bool,
    #[serde(default)]
    pub fielddata: bool,
}

fn default_field_type() -> String {
    "text".into()
}
fn default_index() -> bool {
    true
}

impl Default for PropertyConfig {
    fn default() -> Self {
        Self {
            field_type: default_field_type(),
            index: default_index(),
            fielddata: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infralink_core::SettingValue;
    use serde_json::json;

    #[test]
    fn test_index_defaults() {
        let index: IndexConfig = serde_json::from_value(json!({"name": "products"})).unwrap();
        assert_eq!(index.settings, IndexSettings::default());
        assert!(index.mappings.is_empty());
    }

    #[test]
    fn test_index_spec_with_mappings() {
        let index: IndexConfig = serde_json::from_value(json!({
            "name": "products",
            "settings": {"number_of_shards": 3},
            "mappings": [{
                "name": "default",
                "properties": {
                    "title": {},
                    "sku": {"type": "keyword", "index": false}
                }
            }]
        }))
        .unwrap();

        let spec = index.to_spec().unwrap();
        assert!(spec.is_structural(NUMBER_OF_SHARDS));
        assert!(!spec.is_structural(NUMBER_OF_REPLICAS));
        assert_eq!(spec.settings()[NUMBER_OF_SHARDS], SettingValue::Int(3));

        let mapping = &spec.children()[0];
        assert_eq!(mapping.name(), "default");
        let keys: Vec<&str> = mapping.settings().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "title.type",
                "title.index",
                "title.fielddata",
                "sku.type",
                "sku.index",
                "sku.fielddata"
            ]
        );
        assert_eq!(mapping.settings()["title.type"], SettingValue::from("text"));
        assert_eq!(mapping.settings()["sku.index"], SettingValue::Bool(false));
        assert!(mapping.structural_settings().is_empty());
    }
}
