//! Elasticsearch cluster liveness.

use async_trait::async_trait;
use infralink_core::{
    HealthCheck, HealthNode, HealthResult, NodeKind, ResourceError, RoundTrip, check_all,
};
use reqwest::StatusCode;

use crate::config::ElasticsearchConfig;
use crate::transport::{EsHttp, failure};

/// Healthy only when `GET /_nodes` answers 200.
pub struct ElasticsearchHealthCheck {
    http: EsHttp,
}

impl ElasticsearchHealthCheck {
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
}

#[async_trait]
impl RoundTrip for ElasticsearchHealthCheck {
    async fn round_trip(&self) -> Result<(), ResourceError> {
        let resp = self.http.send(self.http.get(&["_nodes"])?).await?;
        if resp.status() == StatusCode::OK {
            return Ok(());
        }
        Err(failure(resp).await.into_error())
    }
}

#[async_trait]
impl HealthCheck for ElasticsearchHealthCheck {
    fn name(&self) -> &str {
        "elasticsearch"
    }

    async fn check(&self) -> HealthResult {
        let root = HealthNode::round_trip(NodeKind::Cluster, self.http.base_url(), self);
        check_all(&root, &[]).await
    }
}
