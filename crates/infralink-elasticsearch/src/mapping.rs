//! Mapping client, scoped to one index.
//!
//! A mapping is described as flattened field attributes:
//! `title.type = "text"`, `title.index = true`, `title.fielddata = false`.
//! Every attribute is mutable; the index merges new fields into its mapping.
//! Several mapping specs under one index all describe the same index mapping,
//! so a mapping exists exactly when its index does.

use async_trait::async_trait;
use indexmap::IndexMap;
use infralink_core::{RemoteResourceClient, ResourceError, ResourceSpec, SettingValue, Settings};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::transport::{EsHttp, failure, parse_json};

const KIND: &str = "mapping";

#[derive(Deserialize)]
struct IndexMappings {
    mappings: MappingBody,
}

#[derive(Deserialize)]
struct MappingBody {
    #[serde(default)]
    properties: Map<String, Value>,
}

pub struct MappingClient<'a> {
    http: &'a EsHttp,
    index: String,
}

impl<'a> MappingClient<'a> {
    pub(crate) fn new(http: &'a EsHttp, index: &str) -> Self {
        Self {
            http,
            index: index.to_string(),
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    async fn put_properties(&self, name: &str, settings: &Settings) -> Result<(), ResourceError> {
        let body = json!({ "properties": properties_object(settings) });
        debug!(index = %self.index, mapping = %name, "putting mapping");
        let resp = self
            .http
            .send(self.http.put(&[self.index.as_str(), "_mapping"])?.json(&body))
            .await?;
        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(ResourceError::not_found("index", self.index.as_str())),
            _ => Err(failure(resp).await.into_error()),
        }
    }
}

#[async_trait]
impl RemoteResourceClient for MappingClient<'_> {
    fn resource_kind(&self) -> &'static str {
        KIND
    }

    async fn list_names(&self) -> Result<Vec<String>, ResourceError> {
        Err(ResourceError::unsupported(format!(
            "mappings of {} are addressed through their index",
            self.index
        )))
    }

    async fn describe(&self, _name: &str) -> Result<Option<Settings>, ResourceError> {
        let resp = self
            .http
            .send(self.http.get(&[self.index.as_str(), "_mapping"])?)
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(failure(resp).await.into_error());
        }

        let body: IndexMap<String, IndexMappings> = parse_json(resp).await?;
        let properties = body
            .get(self.index.as_str())
            .or_else(|| body.values().next())
            .map(|m| &m.mappings.properties);
        Ok(Some(properties.map(flatten_properties).unwrap_or_default()))
    }

    async fn create(&self, spec: &ResourceSpec) -> Result<(), ResourceError> {
        self.put_properties(spec.name(), spec.settings()).await
    }

    async fn update(&self, name: &str, settings: &Settings) -> Result<(), ResourceError> {
        self.put_properties(name, settings).await
    }
}

/// Flattens fields, filling in the defaults the index omits.
///
/// Object fields are walked through their `properties`, and their leaves are
/// keyed by dotted path. A field declared as `address.city` is stored by the
/// index as `address.properties.city` and flattens back to `address.city.*`.
fn flatten_properties(properties: &Map<String, Value>) -> Settings {
    let mut settings = Settings::new();
    flatten_into(&mut settings, None, properties);
    settings
}

fn flatten_into(settings: &mut Settings, prefix: Option<&str>, properties: &Map<String, Value>) {
    for (field, definition) in properties {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.clone(),
        };
        if let Some(field_type) = definition.get("type").and_then(Value::as_str) {
            let index = definition.get("index").and_then(Value::as_bool).unwrap_or(true);
            let fielddata = definition
                .get("fielddata")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            settings.insert(format!("{path}.type"), SettingValue::from(field_type));
            settings.insert(format!("{path}.index"), SettingValue::Bool(index));
            settings.insert(format!("{path}.fielddata"), SettingValue::Bool(fielddata));
        }
        if let Some(Value::Object(children)) = definition.get("properties") {
            flatten_into(settings, Some(&path), children);
        }
    }
}

/// Rebuilds a `properties` object from flattened settings.
///
/// `index` is only emitted when false and `fielddata` only when true.
fn properties_object(settings: &Settings) -> Map<String, Value> {
    let mut properties = Map::new();
    for (key, value) in settings {
        let Some((field, attribute)) = key.rsplit_once('.') else {
            continue;
        };
        let emit = match attribute {
            "index" => !value.matches(&SettingValue::Bool(true)),
            "fielddata" => value.matches(&SettingValue::Bool(true)),
            _ => true,
        };
        if !emit {
            continue;
        }
        let entry = properties
            .entry(field.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(definition) = entry {
            definition.insert(attribute.to_string(), value.to_json());
        }
    }
    properties
}
