use anyhow::{Context, Result};
use infralink_core::RemoteResourceClient;
use infralink_elasticsearch::IndexClient;
use infralink_kafka::KafkaTopicClient;

use crate::cli::{OutputFormat, Target};
use crate::config::AppConfig;
use crate::output::print_names;

/// Names of the resources that currently exist in `target`.
pub async fn names(config: &AppConfig, target: Target) -> Result<Vec<String>> {
    let client: Box<dyn RemoteResourceClient> = match target {
        Target::Kafka => {
            let kafka = config.kafka.as_ref().context("no [kafka] section configured")?;
            Box::new(KafkaTopicClient::new(kafka)?)
        }
        Target::Elasticsearch => {
            let es = config
                .elasticsearch
                .as_ref()
                .context("no [elasticsearch] section configured")?;
            Box::new(IndexClient::new(es)?)
        }
    };
    client
        .list_names()
        .await
        .with_context(|| format!("Failed to list {}s", client.resource_kind()))
}

pub async fn list(config: &AppConfig, target: Target, format: OutputFormat) -> Result<()> {
    let names = names(config, target).await?;
    print_names(&names, format);
    Ok(())
}
