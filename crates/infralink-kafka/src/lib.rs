//! Kafka integration for Infralink.
//!
//! Topics are reconciled through the Confluent REST Proxy v3 API; the
//! partition count and replication factor are fixed at creation while topic
//! configs such as retention can be updated later.

pub mod client;
pub mod config;
pub mod health;

pub use client::KafkaTopicClient;
pub use config::{KafkaConfig, TopicConfig};
pub use health::KafkaHealthCheck;
