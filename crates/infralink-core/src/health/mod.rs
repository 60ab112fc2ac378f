//! Liveness checks over trees of dependent resources.
//!
//! A [`HealthNode`] describes one unit under inspection and what it can be
//! asked. [`probe`] checks a node and its nested nodes, [`check_all`] walks a
//! root and its stages, and [`HealthRegistry`] runs named checks together.
//!
//! Nothing here caches state: every call performs a fresh traversal.

mod aggregate;
mod node;
mod probe;
mod registry;

use std::error::Error;
use std::fmt;
use std::sync::Arc;

pub use aggregate::{HealthStage, check_all};
pub use node::{Capability, HealthNode, NodeKind, RoundTrip, Startable};
pub use probe::{probe, probe_node};
pub use registry::{HealthCheck, HealthRegistry, NodeHealthCheck};

/// Binary health signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "UP"),
            Self::Unhealthy => write!(f, "DOWN"),
        }
    }
}

/// Result of a health check.
///
/// `detail` names the offending node whenever the status is unhealthy.
#[derive(Debug, Clone)]
pub struct HealthResult {
    pub status: HealthStatus,
    pub detail: String,
    pub cause: Option<Arc<dyn Error + Send + Sync>>,
}

impl HealthResult {
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            detail: String::new(),
            cause: None,
        }
    }

    pub fn unhealthy(detail: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            detail: detail.into(),
            cause: None,
        }
    }

    /// Attaches the underlying error.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

impl fmt::Display for HealthResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{}", self.status)
        } else {
            write!(f, "{}: {}", self.status, self.detail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResourceError;

    #[test]
    fn test_result_display() {
        assert_eq!(HealthResult::healthy().to_string(), "UP");
        assert_eq!(
            HealthResult::unhealthy("Route [r1] is not running").to_string(),
            "DOWN: Route [r1] is not running"
        );
    }

    #[test]
    fn test_cause_is_kept() {
        let result =
            HealthResult::unhealthy("down").with_cause(ResourceError::transport("refused"));
        assert!(!result.is_healthy());
        let cause = result.cause.unwrap();
        assert_eq!(cause.to_string(), "Transport error: refused");
    }
}
