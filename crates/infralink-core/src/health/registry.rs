use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::HealthResult;
use super::node::{HealthNode, NodeKind, Startable};
use super::probe::probe;

/// A named health check that can be run on demand.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    fn name(&self) -> &str;

    /// Runs the check. Never fails: problems are reported as unhealthy results.
    async fn check(&self) -> HealthResult;
}

/// Health check over a single stateful node, e.g. a stream processor client.
pub struct NodeHealthCheck {
    name: String,
    kind: NodeKind,
    target: Arc<dyn Startable>,
}

impl NodeHealthCheck {
    pub fn new(name: impl Into<String>, kind: NodeKind, target: Arc<dyn Startable>) -> Self {
        Self {
            name: name.into(),
            kind,
            target,
        }
    }
}

#[async_trait]
impl HealthCheck for NodeHealthCheck {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> HealthResult {
        let node = HealthNode::stateful(self.kind, self.name.as_str(), self.target.as_ref());
        probe(&node).await
    }
}

/// Named health checks, run in registration order.
#[derive(Default)]
pub struct HealthRegistry {
    checks: Vec<Box<dyn HealthCheck>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, check: impl HealthCheck + 'static) {
        self.checks.push(Box::new(check));
    }

    /// Registers a stateful node as its own check.
    pub fn register_node(
        &mut self,
        name: impl Into<String>,
        kind: NodeKind,
        target: Arc<dyn Startable>,
    ) {
        self.register(NodeHealthCheck::new(name, kind, target));
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Runs every check and returns `(name, result)` pairs in registration order.
    pub async fn run_all(&self) -> Vec<(String, HealthResult)> {
        let mut results = Vec::with_capacity(self.checks.len());
        for check in &self.checks {
            let result = check.check().await;
            if result.is_healthy() {
                info!(check = check.name(), "health check passed");
            } else {
                warn!(check = check.name(), detail = %result.detail, "health check failed");
            }
            results.push((check.name().to_string(), result));
        }
        results
    }

    /// Returns `true` if every registered check is healthy.
    pub async fn is_healthy(&self) -> bool {
        self.run_all().await.iter().all(|(_, r)| r.is_healthy())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    struct StreamsClient {
        running: AtomicBool,
    }

    impl Startable for StreamsClient {
        fn is_started(&self) -> bool {
            self.running.load(Ordering::SeqCst)
        }
    }

    struct Fixed(&'static str, bool);

    #[async_trait]
    impl HealthCheck for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        async fn check(&self) -> HealthResult {
            if self.1 {
                HealthResult::healthy()
            } else {
                HealthResult::unhealthy(format!("{} is down", self.0))
            }
        }
    }

    #[tokio::test]
    async fn test_run_all_keeps_registration_order() {
        let mut registry = HealthRegistry::new();
        registry.register(Fixed("kafka", true));
        registry.register(Fixed("elasticsearch", false));

        let results = registry.run_all().await;
        let names: Vec<&str> = results.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["kafka", "elasticsearch"]);
        assert!(!results[1].1.is_healthy());
        assert!(!registry.is_healthy().await);
    }

    #[tokio::test]
    async fn test_registered_node_is_checked_freshly() {
        let streams = Arc::new(StreamsClient {
            running: AtomicBool::new(true),
        });
        let mut registry = HealthRegistry::new();
        registry.register_node("kafka-streams", NodeKind::Client, streams.clone());
        assert!(registry.is_healthy().await);

        streams.running.store(false, Ordering::SeqCst);
        let results = registry.run_all().await;
        assert_eq!(results[0].1.detail, "Client [kafka-streams] is not running");
    }

    #[tokio::test]
    async fn test_empty_registry_is_healthy() {
        let registry = HealthRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.is_healthy().await);
    }
}
