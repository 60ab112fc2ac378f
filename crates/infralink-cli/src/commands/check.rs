use anyhow::{Context, Result};
use infralink_core::{HealthRegistry, HealthResult};
use infralink_elasticsearch::ElasticsearchHealthCheck;
use infralink_kafka::{KafkaHealthCheck, KafkaTopicClient};

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::output::{print_health, print_warning};

/// Builds a registry with one check per configured cluster.
pub fn registry(config: &AppConfig) -> Result<HealthRegistry> {
    let mut registry = HealthRegistry::new();
    if let Some(kafka) = &config.kafka {
        let client = KafkaTopicClient::new(kafka).context("Failed to create Kafka client")?;
        registry.register(KafkaHealthCheck::new(client));
    }
    if let Some(es) = &config.elasticsearch {
        let check =
            ElasticsearchHealthCheck::new(es).context("Failed to create Elasticsearch client")?;
        registry.register(check);
    }
    Ok(registry)
}

/// Runs every check once. Returns `false` if anything is down.
pub async fn check(config: &AppConfig, format: OutputFormat) -> Result<bool> {
    let results = run(config).await?;
    if results.is_empty() {
        print_warning("no clusters configured");
    }
    print_health(&results, format);
    Ok(results.iter().all(|(_, r)| r.is_healthy()))
}

pub async fn run(config: &AppConfig) -> Result<Vec<(String, HealthResult)>> {
    Ok(registry(config)?.run_all().await)
}
