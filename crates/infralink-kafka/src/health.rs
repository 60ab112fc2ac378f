//! Kafka cluster liveness.

use async_trait::async_trait;
use infralink_core::{
    HealthCheck, HealthNode, HealthResult, NodeKind, ResourceError, RoundTrip, probe,
};

use crate::client::KafkaTopicClient;

/// Healthy when the cluster can be described and reports at least one broker.
pub struct KafkaHealthCheck {
    client: KafkaTopicClient,
}

impl KafkaHealthCheck {
    pub fn new(client: KafkaTopicClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RoundTrip for KafkaHealthCheck {
    async fn round_trip(&self) -> Result<(), ResourceError> {
        let brokers = self.client.brokers().await?;
        if brokers.is_empty() {
            return Err(ResourceError::invalid_response("cluster reports no brokers"));
        }
        Ok(())
    }
}

#[async_trait]
impl HealthCheck for KafkaHealthCheck {
    fn name(&self) -> &str {
        "kafka"
    }

    async fn check(&self) -> HealthResult {
        let cluster_id = match self.client.cluster_id().await {
            Ok(id) => id.to_string(),
            Err(e) => {
                return HealthResult::unhealthy(format!("Error connecting to Kafka cluster: {e}"))
                    .with_cause(e);
            }
        };

        let node = HealthNode::round_trip(NodeKind::Cluster, cluster_id, self);
        let result = probe(&node).await;
        if result.is_healthy() {
            return result;
        }
        HealthResult {
            detail: format!("Error connecting to Kafka cluster: {}", result.detail),
            ..result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn check_with_brokers(body: serde_json::Value, status: u16) -> HealthResult {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/clusters"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [{"cluster_id": "c1"}]})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v3/clusters/c1/brokers"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;

        let client = KafkaTopicClient::with_http(reqwest::Client::new(), &server.uri(), None);
        KafkaHealthCheck::new(client).check().await
    }

    #[tokio::test]
    async fn test_healthy_with_brokers() {
        let result = check_with_brokers(json!({"data": [{"broker_id": 1}]}), 200).await;
        assert!(result.is_healthy());
    }

    #[tokio::test]
    async fn test_unhealthy_without_brokers() {
        let result = check_with_brokers(json!({"data": []}), 200).await;
        assert!(!result.is_healthy());
        assert!(result.detail.starts_with("Error connecting to Kafka cluster"));
        assert!(result.detail.contains("Cluster [c1] is not available"));
    }

    #[tokio::test]
    async fn test_unhealthy_when_proxy_unreachable() {
        let client =
            KafkaTopicClient::with_http(reqwest::Client::new(), "http://127.0.0.1:9", None);
        let result = KafkaHealthCheck::new(client).check().await;
        assert!(!result.is_healthy());
        assert!(result.cause.is_some());
    }
}
