use anyhow::{Context, Result};
use infralink_core::provision_all;
use infralink_elasticsearch::IndexClient;
use infralink_kafka::KafkaTopicClient;
use tracing::info;

use crate::cli::{OutputFormat, Target};
use crate::config::AppConfig;
use crate::output::{ProvisionRow, print_provision_rows, print_warning, provision_rows};

/// Provisions every configured resource group.
///
/// Returns `false` if any step failed.
pub async fn provision(
    config: &AppConfig,
    only: Option<Target>,
    format: OutputFormat,
) -> Result<bool> {
    let rows = collect(config, only).await?;
    print_provision_rows(&rows, format);
    Ok(!rows.iter().any(|r| r.failed))
}

/// Runs provisioning and returns the summary rows without printing them.
pub async fn collect(config: &AppConfig, only: Option<Target>) -> Result<Vec<ProvisionRow>> {
    let wants = |target: Target| only.is_none_or(|o| o == target);
    let mut rows = Vec::new();

    match &config.kafka {
        Some(kafka) if wants(Target::Kafka) => {
            let specs = kafka.topic_specs().context("Invalid Kafka topic configuration")?;
            let client = KafkaTopicClient::new(kafka).context("Failed to create Kafka client")?;
            info!(topics = specs.len(), "provisioning Kafka topics");
            let report = provision_all(&specs, &client).await;
            rows.extend(provision_rows("topic", &report));
        }
        None if only == Some(Target::Kafka) => print_warning("no [kafka] section configured"),
        _ => {}
    }

    match &config.elasticsearch {
        Some(es) if wants(Target::Elasticsearch) => {
            let specs = es
                .index_specs()
                .context("Invalid Elasticsearch index configuration")?;
            let client = IndexClient::new(es).context("Failed to create Elasticsearch client")?;
            info!(indices = specs.len(), "provisioning Elasticsearch indices");
            let report = provision_all(&specs, &client).await;
            rows.extend(provision_rows("index", &report));
        }
        None if only == Some(Target::Elasticsearch) => {
            print_warning("no [elasticsearch] section configured");
        }
        _ => {}
    }

    Ok(rows)
}
