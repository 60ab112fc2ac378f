//! Topic client over the Confluent Kafka REST Proxy v3 API.

use std::time::Duration;

use async_trait::async_trait;
use infralink_core::{RemoteResourceClient, ResourceError, ResourceSpec, SettingValue, Settings};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::{KafkaConfig, PARTITIONS, REPLICATION_FACTOR};

const KIND: &str = "topic";
/// REST Proxy error code for "topic already exists".
const TOPIC_EXISTS_ERROR_CODE: i64 = 40002;

#[derive(Deserialize)]
struct DataList<T> {
    data: Vec<T>,
}

#[derive(Deserialize)]
struct ClusterData {
    cluster_id: String,
}

#[derive(Deserialize)]
struct TopicName {
    topic_name: String,
}

#[derive(Deserialize)]
struct TopicData {
    partitions_count: i64,
    replication_factor: i64,
}

#[derive(Deserialize)]
struct ConfigData {
    name: String,
    value: Option<String>,
}

#[derive(Deserialize)]
struct BrokerData {
    broker_id: i32,
}

#[derive(Deserialize)]
struct ErrorBody {
    error_code: Option<i64>,
    message: Option<String>,
}

#[derive(Serialize)]
struct ConfigEntry<'a> {
    name: &'a str,
    value: String,
}

#[derive(Serialize)]
struct CreateTopicRequest<'a> {
    topic_name: &'a str,
    partitions_count: i64,
    replication_factor: i64,
    configs: Vec<ConfigEntry<'a>>,
}

#[derive(Serialize)]
struct AlterConfigsRequest<'a> {
    data: Vec<ConfigEntry<'a>>,
}

/// Manages the topics of one Kafka cluster.
///
/// The cluster id is taken from configuration or discovered on first use.
pub struct KafkaTopicClient {
    http: reqwest::Client,
    base_url: String,
    cluster_id: OnceCell<String>,
}

impl KafkaTopicClient {
    /// Builds a client with its own HTTP connection pool.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &KafkaConfig) -> Result<Self, ResourceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| ResourceError::transport_with_source("failed to build HTTP client", e))?;
        Ok(Self::with_http(http, &config.rest_url, config.cluster_id.clone()))
    }

    pub fn with_http(http: reqwest::Client, base_url: &str, cluster_id: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cluster_id: OnceCell::new_with(cluster_id),
        }
    }

    /// Id of the managed cluster.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::InvalidResponse` if the proxy reports no cluster.
    pub async fn cluster_id(&self) -> Result<&str, ResourceError> {
        let id = self
            .cluster_id
            .get_or_try_init(|| async {
                let url = self.url(&["v3", "clusters"])?;
                let clusters: DataList<ClusterData> = self.get_json(url).await?;
                let id = clusters
                    .data
                    .into_iter()
                    .next()
                    .map(|c| c.cluster_id)
                    .ok_or_else(|| ResourceError::invalid_response("no Kafka cluster reported"))?;
                debug!(cluster_id = %id, "discovered Kafka cluster");
                Ok::<_, ResourceError>(id)
            })
            .await?;
        Ok(id.as_str())
    }

    /// Ids of the brokers currently in the cluster.
    pub async fn brokers(&self) -> Result<Vec<i32>, ResourceError> {
        let url = self.cluster_url(&["brokers"]).await?;
        let brokers: DataList<BrokerData> = self.get_json(url).await?;
        Ok(brokers.data.into_iter().map(|b| b.broker_id).collect())
    }

    /// Joins `segments` onto the proxy URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, ResourceError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ResourceError::transport_with_source(
                format!("invalid Kafka REST Proxy URL {}", self.base_url),
                e,
            )
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                ResourceError::transport(format!(
                    "Kafka REST Proxy URL {} cannot take a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL of `rest` under `/v3/clusters/<cluster id>`.
    async fn cluster_url(&self, rest: &[&str]) -> Result<Url, ResourceError> {
        let cluster_id = self.cluster_id().await?;
        let mut segments = vec!["v3", "clusters", cluster_id];
        segments.extend_from_slice(rest);
        self.url(&segments)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, ResourceError> {
        request
            .send()
            .await
            .map_err(|e| ResourceError::transport_with_source("failed to reach Kafka REST Proxy", e))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ResourceError> {
        let resp = self.send(self.http.get(url)).await?;
        if !resp.status().is_success() {
            return Err(remote_error(resp).await);
        }
        parse_json(resp).await
    }
}

#[async_trait]
impl RemoteResourceClient for KafkaTopicClient {
    fn resource_kind(&self) -> &'static str {
        KIND
    }

    fn supports_direct_lookup(&self) -> bool {
        false
    }

    async fn list_names(&self) -> Result<Vec<String>, ResourceError> {
        let url = self.cluster_url(&["topics"]).await?;
        let topics: DataList<TopicName> = self.get_json(url).await?;
        Ok(topics.data.into_iter().map(|t| t.topic_name).collect())
    }

    async fn describe(&self, name: &str) -> Result<Option<Settings>, ResourceError> {
        let url = self.cluster_url(&["topics", name]).await?;
        let resp = self.send(self.http.get(url)).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(remote_error(resp).await);
        }
        let topic: TopicData = parse_json(resp).await?;

        let mut settings = Settings::new();
        settings.insert(PARTITIONS.into(), SettingValue::Int(topic.partitions_count));
        settings.insert(
            REPLICATION_FACTOR.into(),
            SettingValue::Int(topic.replication_factor),
        );

        let url = self.cluster_url(&["topics", name, "configs"]).await?;
        let configs: DataList<ConfigData> = self.get_json(url).await?;
        for config in configs.data {
            if let Some(value) = config.value {
                settings.insert(config.name, SettingValue::Str(value));
            }
        }
        Ok(Some(settings))
    }

    async fn create(&self, spec: &ResourceSpec) -> Result<(), ResourceError> {
        let request = CreateTopicRequest {
            topic_name: spec.name(),
            partitions_count: required_int(spec, PARTITIONS)?,
            replication_factor: required_int(spec, REPLICATION_FACTOR)?,
            configs: config_entries(spec.settings(), |key| !spec.is_structural(key)),
        };
        let url = self.cluster_url(&["topics"]).await?;
        let resp = self.send(self.http.post(url).json(&request)).await?;
        if resp.status().is_success() {
            return Ok(());
        }

        let status = resp.status();
        let body = error_body(resp).await;
        let exists = body.error_code == Some(TOPIC_EXISTS_ERROR_CODE)
            || body
                .message
                .as_deref()
                .is_some_and(|m| m.contains("already exists"));
        if exists {
            return Err(ResourceError::already_exists(KIND, spec.name()));
        }
        Err(ResourceError::remote(status.as_u16(), body.describe()))
    }

    async fn update(&self, name: &str, settings: &Settings) -> Result<(), ResourceError> {
        let request = AlterConfigsRequest {
            data: config_entries(settings, |_| true),
        };
        let url = self.cluster_url(&["topics", name, "configs:alter"]).await?;
        let resp = self.send(self.http.post(url).json(&request)).await?;
        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(ResourceError::not_found(KIND, name)),
            _ => Err(remote_error(resp).await),
        }
    }
}

impl ErrorBody {
    fn describe(&self) -> String {
        self.message.clone().unwrap_or_else(|| "unknown error".into())
    }
}

fn config_entries(settings: &Settings, include: impl Fn(&str) -> bool) -> Vec<ConfigEntry<'_>> {
    settings
        .iter()
        .filter(|(key, _)| include(key.as_str()))
        .map(|(key, value)| ConfigEntry {
            name: key,
            value: value.to_string(),
        })
        .collect()
}

fn required_int(spec: &ResourceSpec, key: &str) -> Result<i64, ResourceError> {
    spec.settings()
        .get(key)
        .and_then(SettingValue::as_i64)
        .ok_or_else(|| {
            ResourceError::invalid_spec(format!("topic {} requires an integer {key}", spec.name()))
        })
}

async fn error_body(resp: Response) -> ErrorBody {
    let text = resp.text().await.unwrap_or_default();
    serde_json::from_str(&text).unwrap_or_else(|_| ErrorBody {
        error_code: None,
        message: (!text.is_empty()).then_some(text),
    })
}

async fn remote_error(resp: Response) -> ResourceError {
    let status = resp.status().as_u16();
    ResourceError::remote(status, error_body(resp).await.describe())
}

async fn parse_json<T: DeserializeOwned>(resp: Response) -> Result<T, ResourceError> {
    resp.json()
        .await
        .map_err(|e| ResourceError::invalid_response(format!("unexpected Kafka REST Proxy body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use infralink_core::{ReconcileOutcome, reconcile};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CLUSTER: &str = "/v3/clusters/c1";

    fn client(server: &MockServer) -> KafkaTopicClient {
        KafkaTopicClient::with_http(reqwest::Client::new(), &server.uri(), Some("c1".into()))
    }

    fn orders() -> ResourceSpec {
        ResourceSpec::builder("orders")
            .structural(PARTITIONS, 6)
            .structural(REPLICATION_FACTOR, 3)
            .mutable("retention.ms", 604_800_000_i64)
            .build()
            .unwrap()
    }

    async fn mount_topic(server: &MockServer, retention: &str) {
        Mock::given(method("GET"))
            .and(path(format!("{CLUSTER}/topics")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [{"topic_name": "orders"}]})),
            )
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{CLUSTER}/topics/orders")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "topic_name": "orders",
                "partitions_count": 6,
                "replication_factor": 3
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{CLUSTER}/topics/orders/configs")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
                {"name": "retention.ms", "value": retention},
                {"name": "cleanup.policy", "value": "delete"},
                {"name": "message.downconversion.enable", "value": null}
            ]})))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_discovers_cluster_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/clusters"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [{"cluster_id": "abc"}]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = KafkaTopicClient::with_http(reqwest::Client::new(), &server.uri(), None);
        assert_eq!(client.cluster_id().await.unwrap(), "abc");
        assert_eq!(client.cluster_id().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_describe_merges_topic_and_configs() {
        let server = MockServer::start().await;
        mount_topic(&server, "1000").await;

        let settings = client(&server).describe("orders").await.unwrap().unwrap();
        assert_eq!(settings[PARTITIONS], SettingValue::Int(6));
        assert_eq!(settings["retention.ms"], SettingValue::from("1000"));
        assert!(!settings.contains_key("message.downconversion.enable"));
    }

    #[tokio::test]
    async fn test_describe_missing_topic() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{CLUSTER}/topics/missing")))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error_code": 40403,
                "message": "This server does not host this topic-partition."
            })))
            .mount(&server)
            .await;

        assert!(client(&server).describe("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reconcile_creates_missing_topic() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{CLUSTER}/topics")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{CLUSTER}/topics")))
            .and(body_json(json!({
                "topic_name": "orders",
                "partitions_count": 6,
                "replication_factor": 3,
                "configs": [{"name": "retention.ms", "value": "604800000"}]
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = reconcile(&orders(), &client(&server)).await;
        assert_eq!(outcome, ReconcileOutcome::Created);
    }

    #[tokio::test]
    async fn test_reconcile_updates_retention_only() {
        let server = MockServer::start().await;
        mount_topic(&server, "1000").await;
        Mock::given(method("POST"))
            .and(path(format!("{CLUSTER}/topics/orders/configs:alter")))
            .and(body_json(json!({"data": [{"name": "retention.ms", "value": "604800000"}]})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = reconcile(&orders(), &client(&server)).await;
        assert_eq!(outcome, ReconcileOutcome::Updated);
    }

    #[tokio::test]
    async fn test_reconcile_up_to_date_sends_nothing() {
        let server = MockServer::start().await;
        mount_topic(&server, "604800000").await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = reconcile(&orders(), &client(&server)).await;
        assert_eq!(outcome, ReconcileOutcome::AlreadyUpToDate);
    }

    #[tokio::test]
    async fn test_create_conflict_maps_to_already_exists() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{CLUSTER}/topics")))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error_code": 40002,
                "message": "Topic 'orders' already exists."
            })))
            .mount(&server)
            .await;

        let err = client(&server).create(&orders()).await.unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_server_error_becomes_failed_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{CLUSTER}/topics")))
            .respond_with(ResponseTemplate::new(503).set_body_string("proxy unavailable"))
            .mount(&server)
            .await;

        let outcome = reconcile(&orders(), &client(&server)).await;
        assert!(outcome.is_failed());
        assert!(outcome.to_string().contains("HTTP 503"));
    }

    #[tokio::test]
    async fn test_cluster_url_encodes_segments_under_base_path() {
        let client = KafkaTopicClient::with_http(
            reqwest::Client::new(),
            "http://proxy:8082/kafka/",
            Some("lkc 1".into()),
        );
        let url = client.cluster_url(&["topics", "orders", "configs:alter"]).await.unwrap();
        assert_eq!(
            url.as_str(),
            "http://proxy:8082/kafka/v3/clusters/lkc%201/topics/orders/configs:alter"
        );
    }
}
