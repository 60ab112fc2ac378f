//! Kafka connection and topic configuration.

use infralink_core::{ResourceSpec, Result};
use serde::{Deserialize, Serialize};

/// Setting key for the partition count. Structural.
pub const PARTITIONS: &str = "partitions";
/// Setting key for the replication factor. Structural.
pub const REPLICATION_FACTOR: &str = "replication.factor";
pub const CLEANUP_POLICY: &str = "cleanup.policy";
pub const RETENTION_MS: &str = "retention.ms";
pub const RETENTION_BYTES: &str = "retention.bytes";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    /// Base URL of the Kafka REST Proxy.
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    /// Cluster to manage. Discovered from the proxy when unset.
    #[serde(default)]
    pub cluster_id: Option<String>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub topics: Vec<TopicConfig>,
}

fn default_rest_url() -> String {
    "http://localhost:8082".into()
}
fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            rest_url: default_rest_url(),
            cluster_id: None,
            request_timeout_ms: default_request_timeout_ms(),
            topics: Vec::new(),
        }
    }
}

impl KafkaConfig {
    /// Builds one spec per configured topic, in declared order.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::InvalidSpec` if a topic has an empty name.
    pub fn topic_specs(&self) -> Result<Vec<ResourceSpec>> {
        self.topics.iter().map(TopicConfig::to_spec).collect()
    }
}

/// Desired state of one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicConfig {
    pub name: String,
    #[serde(default = "default_partitions")]
    pub partitions: i32,
    #[serde(default = "default_replication_factor")]
    pub replication_factor: i16,
    #[serde(default = "default_cleanup_policy")]
    pub cleanup_policy: String,
    /// Defaults to seven days.
    #[serde(default = "default_retention_ms")]
    pub retention_ms: i64,
    /// `-1` means unbounded.
    #[serde(default = "default_retention_bytes")]
    pub retention_bytes: i64,
}

fn default_partitions() -> i32 {
    1
}
fn default_replication_factor() -> i16 {
    1
}
fn default_cleanup_policy() -> String {
    "delete".into()
}
fn default_retention_ms() -> i64 {
    604_800_000
}
fn default_retention_bytes() -> i64 {
    -1
}

impl TopicConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partitions: default_partitions(),
            replication_factor: default_replication_factor(),
            cleanup_policy: default_cleanup_policy(),
            retention_ms: default_retention_ms(),
            retention_bytes: default_retention_bytes(),
        }
    }

    /// Converts to a spec. Partition count and replication factor are structural.
    pub fn to_spec(&self) -> Result<ResourceSpec> {
        ResourceSpec::builder(self.name.as_str())
            .structural(PARTITIONS, self.partitions)
            .structural(REPLICATION_FACTOR, self.replication_factor)
            .mutable(CLEANUP_POLICY, self.cleanup_policy.as_str())
            .mutable(RETENTION_MS, self.retention_ms)
            .mutable(RETENTION_BYTES, self.retention_bytes)
            .build()
    }
}
