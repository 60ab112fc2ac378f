//! Elasticsearch integration for Infralink.
//!
//! Indices are reconciled through the REST API with their mappings as nested
//! resources. The shard count is fixed at creation; replicas and mappings can
//! be updated in place.

pub mod config;
pub mod health;
pub mod index;
pub mod mapping;
mod transport;

pub use config::{ElasticsearchConfig, IndexConfig, IndexSettings, MappingConfig, PropertyConfig};
pub use health::ElasticsearchHealthCheck;
pub use index::IndexClient;
pub use mapping::MappingClient;
