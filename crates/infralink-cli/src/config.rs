use std::collections::HashSet;

use infralink_elasticsearch::ElasticsearchConfig;
use infralink_kafka::KafkaConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "infralink.toml";
pub const CONFIG_PATH_ENV: &str = "INFRALINK_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub otel: OtelConfig,
    /// Kafka cluster and topics; absent means Kafka is not managed
    #[serde(default)]
    pub kafka: Option<KafkaConfig>,
    /// Elasticsearch cluster, indices and mappings
    #[serde(default)]
    pub elasticsearch: Option<ElasticsearchConfig>,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // OTEL validation
        if self.otel.enabled && self.otel.endpoint.as_deref().unwrap_or("").is_empty() {
            return Err("otel.enabled=true requires otel.endpoint".into());
        }
        if let Some(ratio) = self.otel.sample_ratio
            && !(0.0..=1.0).contains(&ratio)
        {
            return Err("otel.sample_ratio must be between 0.0 and 1.0".into());
        }

        if let Some(kafka) = &self.kafka {
            validate_kafka(kafka)?;
        }
        if let Some(es) = &self.elasticsearch {
            validate_elasticsearch(es)?;
        }
        Ok(())
    }
}

fn validate_kafka(kafka: &KafkaConfig) -> Result<(), String> {
    validate_url("kafka.rest_url", &kafka.rest_url)?;
    if kafka.request_timeout_ms == 0 {
        return Err("kafka.request_timeout_ms must be > 0".into());
    }
    unique_names("kafka.topics", kafka.topics.iter().map(|t| t.name.as_str()))?;
    for topic in &kafka.topics {
        if topic.partitions <= 0 {
            return Err(format!("kafka topic {}: partitions must be > 0", topic.name));
        }
        if topic.replication_factor <= 0 {
            return Err(format!(
                "kafka topic {}: replication_factor must be > 0",
                topic.name
            ));
        }
        if topic.cleanup_policy.trim().is_empty() {
            return Err(format!(
                "kafka topic {}: cleanup_policy must not be empty",
                topic.name
            ));
        }
    }
    Ok(())
}

fn validate_elasticsearch(es: &ElasticsearchConfig) -> Result<(), String> {
    validate_url("elasticsearch.url", &es.url)?;
    if es.request_timeout_ms == 0 {
        return Err("elasticsearch.request_timeout_ms must be > 0".into());
    }
    unique_names(
        "elasticsearch.indices",
        es.indices.iter().map(|i| i.name.as_str()),
    )?;
    for index in &es.indices {
        if index.settings.number_of_shards == 0 {
            return Err(format!(
                "elasticsearch index {}: number_of_shards must be > 0",
                index.name
            ));
        }
        unique_names(
            &format!("elasticsearch index {} mappings", index.name),
            index.mappings.iter().map(|m| m.name.as_str()),
        )?;
        for mapping in &index.mappings {
            for (field, property) in &mapping.properties {
                if field.split('.').any(|part| part.trim().is_empty()) {
                    return Err(format!(
                        "elasticsearch mapping {}/{}: field name {field:?} has an empty path segment",
                        index.name, mapping.name
                    ));
                }
                if property.field_type.trim().is_empty() {
                    return Err(format!(
                        "elasticsearch mapping {}/{}: field {field} needs a type",
                        index.name, mapping.name
                    ));
                }
            }
        }
    }
    Ok(())
}

fn validate_url(key: &str, value: &str) -> Result<(), String> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| format!("{key} is not a valid URL: {e}"))
}

fn unique_names<'a>(group: &str, names: impl Iterator<Item = &'a str>) -> Result<(), String> {
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(format!("{group}: names must not be empty"));
        }
        if !seen.insert(name) {
            return Err(format!("{group}: duplicate name {name}"));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    /// OTLP/HTTP traces endpoint, e.g. `http://localhost:4318/v1/traces`
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub sample_ratio: Option<f64>,
    #[serde(default = "default_service_name")]
    pub service_name: String,
}
fn default_service_name() -> String {
    "infralink".into()
}
impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            sample_ratio: None,
            service_name: default_service_name(),
        }
    }
}

/// Where the configuration file path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From INFRALINK_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (infralink.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (INFRALINK_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Picks the config path: `--config`, then `INFRALINK_CONFIG`, then the default.
pub fn resolve_config_path(cli_path: Option<&str>) -> (String, ConfigSource) {
    if let Some(path) = cli_path {
        return (path.to_string(), ConfigSource::CliArgument);
    }
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV)
        && !path.is_empty()
    {
        return (path, ConfigSource::EnvironmentVariable);
    }
    (DEFAULT_CONFIG_PATH.to_string(), ConfigSource::Default)
}

pub mod loader {
    use super::{AppConfig, ConfigSource};
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Loads and validates the configuration.
    ///
    /// An explicitly chosen file must exist; the default file is optional.
    /// Environment variables such as `INFRALINK__KAFKA__REST_URL` override the file.
    pub fn load_config(path: &str, source: ConfigSource) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path);
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        } else if source != ConfigSource::Default {
            return Err(format!("config file not found: {path} (from {source})"));
        }
        builder = builder.add_source(
            Environment::with_prefix("INFRALINK")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infralink_kafka::TopicConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_duplicate_topic_rejected() {
        let cfg = AppConfig {
            kafka: Some(KafkaConfig {
                topics: vec![TopicConfig::new("orders"), TopicConfig::new("orders")],
                ..KafkaConfig::default()
            }),
            ..AppConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("duplicate name orders"));
    }

    #[test]
    fn test_zero_partitions_rejected() {
        let cfg = AppConfig {
            kafka: Some(KafkaConfig {
                topics: vec![TopicConfig {
                    partitions: 0,
                    ..TopicConfig::new("orders")
                }],
                ..KafkaConfig::default()
            }),
            ..AppConfig::default()
        };
        assert!(cfg.validate().unwrap_err().contains("partitions must be > 0"));
    }

    #[test]
    fn test_otel_requires_endpoint() {
        let cfg = AppConfig {
            otel: OtelConfig {
                enabled: true,
                ..OtelConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(cfg.validate().unwrap_err().contains("otel.endpoint"));
    }

    #[test]
    fn test_mapping_field_paths() {
        let parse = |field: &str| -> AppConfig {
            toml::from_str(&format!(
                r#"
[[elasticsearch.indices]]
name = "products"

[[elasticsearch.indices.mappings]]
name = "default"

[elasticsearch.indices.mappings.properties."{field}"]
type = "keyword"
"#
            ))
            .unwrap()
        };
        assert!(parse("address.city").validate().is_ok());
        for bad in ["address.", ".city", "address..city"] {
            let err = parse(bad).validate().unwrap_err();
            assert!(err.contains("empty path segment"), "{bad}: {err}");
        }
    }

    #[test]
    fn test_invalid_url_rejected() {
        let cfg = AppConfig {
            elasticsearch: Some(ElasticsearchConfig {
                url: "not a url".into(),
                ..ElasticsearchConfig::default()
            }),
            ..AppConfig::default()
        };
        assert!(cfg.validate().unwrap_err().contains("elasticsearch.url"));
    }

    #[test]
    fn test_cli_path_wins() {
        let (path, source) = resolve_config_path(Some("custom.toml"));
        assert_eq!(path, "custom.toml");
        assert_eq!(source, ConfigSource::CliArgument);
    }
}
