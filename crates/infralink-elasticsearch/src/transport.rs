use std::time::Duration;

use infralink_core::ResourceError;
use reqwest::{RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Error type reported when creating an index that already exists.
pub(crate) const ALREADY_EXISTS_ERROR: &str = "resource_already_exists_exception";

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Structured {
        #[serde(rename = "type")]
        kind: String,
        reason: Option<String>,
    },
    Plain(String),
}

/// Parsed error response.
pub(crate) struct RemoteFailure {
    pub status: u16,
    pub kind: Option<String>,
    pub reason: String,
}

impl RemoteFailure {
    pub fn into_error(self) -> ResourceError {
        let message = match self.kind {
            Some(kind) => format!("{kind}: {}", self.reason),
            None => self.reason,
        };
        ResourceError::remote(self.status, message)
    }
}

/// HTTP access to one Elasticsearch cluster.
#[derive(Clone)]
pub(crate) struct EsHttp {
    http: reqwest::Client,
    base_url: String,
}

impl EsHttp {
    pub fn new(url: &str, request_timeout_ms: u64) -> Result<Self, ResourceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(request_timeout_ms))
            .build()
            .map_err(|e| ResourceError::transport_with_source("failed to build HTTP client", e))?;
        Ok(Self::with_http(http, url))
    }

    pub fn with_http(http: reqwest::Client, url: &str) -> Self {
        Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `segments` onto the base URL, percent-encoding each one.
    pub fn url(&self, segments: &[&str]) -> Result<Url, ResourceError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ResourceError::transport_with_source(
                format!("invalid Elasticsearch URL {}", self.base_url),
                e,
            )
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                ResourceError::transport(format!(
                    "Elasticsearch URL {} cannot take a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn get(&self, segments: &[&str]) -> Result<RequestBuilder, ResourceError> {
        Ok(self.http.get(self.url(segments)?))
    }

    pub fn put(&self, segments: &[&str]) -> Result<RequestBuilder, ResourceError> {
        Ok(self.http.put(self.url(segments)?))
    }

    pub async fn send(&self, request: RequestBuilder) -> Result<Response, ResourceError> {
        request
            .send()
            .await
            .map_err(|e| ResourceError::transport_with_source("failed to reach Elasticsearch", e))
    }
}

pub(crate) async fn failure(resp: Response) -> RemoteFailure {
    let status = resp.status().as_u16();
    let text = resp.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorEnvelope>(&text) {
        Ok(ErrorEnvelope {
            error: ErrorDetail::Structured { kind, reason },
        }) => RemoteFailure {
            status,
            reason: reason.unwrap_or_else(|| kind.clone()),
            kind: Some(kind),
        },
        Ok(ErrorEnvelope {
            error: ErrorDetail::Plain(reason),
        }) => RemoteFailure {
            status,
            kind: None,
            reason,
        },
        Err(_) => RemoteFailure {
            status,
            kind: None,
            reason: text,
        },
    }
}

pub(crate) async fn parse_json<T: DeserializeOwned>(resp: Response) -> Result<T, ResourceError> {
    resp.json()
        .await
        .map_err(|e| ResourceError::invalid_response(format!("unexpected Elasticsearch body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(url: &str) -> EsHttp {
        EsHttp::with_http(reqwest::Client::new(), url)
    }

    #[test]
    fn test_url_encodes_each_segment() {
        let url = http("http://localhost:9200").url(&["logs 2024/01", "_settings"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9200/logs%202024%2F01/_settings");
    }

    #[test]
    fn test_url_keeps_base_path() {
        let url = http("http://proxy:8080/es/").url(&["_cat", "indices"]).unwrap();
        assert_eq!(url.as_str(), "http://proxy:8080/es/_cat/indices");
    }

    #[test]
    fn test_url_rejects_invalid_base() {
        let err = http("not a url").url(&["_nodes"]).unwrap_err();
        assert!(err.to_string().contains("invalid Elasticsearch URL"));
    }
}
