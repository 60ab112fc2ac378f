//! Index client.

use async_trait::async_trait;
use indexmap::IndexMap;
use infralink_core::{RemoteResourceClient, ResourceError, ResourceSpec, SettingValue, Settings};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::config::ElasticsearchConfig;
use crate::mapping::MappingClient;
use crate::transport::{ALREADY_EXISTS_ERROR, EsHttp, failure, parse_json};

const KIND: &str = "index";

#[derive(Deserialize)]
struct CatIndex {
    index: String,
}

#[derive(Deserialize)]
struct IndexSettingsBody {
    settings: Map<String, Value>,
}

/// Manages indices of one Elasticsearch cluster.
///
/// Settings are reported and sent without the `index.` prefix. Mappings are
/// reachable through [`RemoteResourceClient::nested`].
pub struct IndexClient {
    http: EsHttp,
}

impl IndexClient {
    /// # Errors
    ///
    /// Returns `ResourceError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &ElasticsearchConfig) -> Result<Self, ResourceError> {
        Ok(Self {
            http: EsHttp::new(&config.url, config.request_timeout_ms)?,
        })
    }

    pub fn with_http(http: reqwest::Client, url: &str) -> Self {
        Self {
            http: EsHttp::with_http(http, url),
        }
    }

    /// Client for the mappings of `index`.
    pub fn mappings(&self, index: &str) -> MappingClient<'_> {
        MappingClient::new(&self.http, index)
    }
}

#[async_trait]
impl RemoteResourceClient for IndexClient {
    fn resource_kind(&self) -> &'static str {
        KIND
    }

    async fn list_names(&self) -> Result<Vec<String>, ResourceError> {
        let resp = self
            .http
            .send(
                self.http
                    .get(&["_cat", "indices"])?
                    .query(&[("h", "index"), ("format", "json")]),
            )
            .await?;
        if !resp.status().is_success() {
            return Err(failure(resp).await.into_error());
        }
        let indices: Vec<CatIndex> = parse_json(resp).await?;
        Ok(indices.into_iter().map(|i| i.index).collect())
    }

    async fn describe(&self, name: &str) -> Result<Option<Settings>, ResourceError> {
        let resp = self
            .http
            .send(
                self.http
                    .get(&[name, "_settings"])?
                    .query(&[("flat_settings", "true")]),
            )
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(failure(resp).await.into_error());
        }

        let body: IndexMap<String, IndexSettingsBody> = parse_json(resp).await?;
        let Some(index) = body.get(name).or_else(|| body.values().next()) else {
            return Err(ResourceError::invalid_response(format!(
                "settings response for {name} contained no index"
            )));
        };

        let settings = index
            .settings
            .iter()
            .filter_map(|(key, value)| {
                let key = key.strip_prefix("index.").unwrap_or(key);
                SettingValue::from_json(value).map(|v| (key.to_string(), v))
            })
            .collect();
        Ok(Some(settings))
    }

    async fn create(&self, spec: &ResourceSpec) -> Result<(), ResourceError> {
        let body = json!({ "settings": settings_object(spec.settings()) });
        let resp = self
            .http
            .send(self.http.put(&[spec.name()])?.json(&body))
            .await?;
        if resp.status().is_success() {
            return Ok(());
        }

        let failure = failure(resp).await;
        if failure.kind.as_deref() == Some(ALREADY_EXISTS_ERROR) {
            return Err(ResourceError::already_exists(KIND, spec.name()));
        }
        Err(failure.into_error())
    }

    async fn update(&self, name: &str, settings: &Settings) -> Result<(), ResourceError> {
        let body = json!({ "index": settings_object(settings) });
        let resp = self
            .http
            .send(self.http.put(&[name, "_settings"])?.json(&body))
            .await?;
        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(ResourceError::not_found(KIND, name)),
            _ => Err(failure(resp).await.into_error()),
        }
    }

    fn nested(&self, parent: &str) -> Option<Box<dyn RemoteResourceClient + '_>> {
        Some(Box::new(self.mappings(parent)))
    }
}

fn settings_object(settings: &Settings) -> Map<String, Value> {
    settings
        .iter()
        .map(|(key, value)| (key.clone(), value.to_json()))
        .collect()
}
