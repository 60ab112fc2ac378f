use tracing::{debug, instrument, warn};

use super::HealthResult;
use super::node::HealthNode;
use super::probe::probe;

/// A named group of nodes checked together, e.g. all routes of a context.
#[derive(Debug, Clone)]
pub struct HealthStage<'a> {
    pub name: &'static str,
    pub members: Vec<HealthNode<'a>>,
}

impl<'a> HealthStage<'a> {
    pub fn new(name: &'static str, members: Vec<HealthNode<'a>>) -> Self {
        Self { name, members }
    }
}

/// Checks `root`, then every stage member in order.
///
/// Stops at the first unhealthy result and returns it; nothing after it is
/// probed. Empty stages are healthy.
#[instrument(skip_all, fields(root = %root.label(), stages = stages.len()))]
pub async fn check_all(root: &HealthNode<'_>, stages: &[HealthStage<'_>]) -> HealthResult {
    let result = probe(root).await;
    if !result.is_healthy() {
        warn!(detail = %result.detail, "root is unhealthy");
        return result;
    }

    for stage in stages {
        debug!(stage = stage.name, members = stage.members.len(), "checking stage");
        for member in &stage.members {
            let result = probe(member).await;
            if !result.is_healthy() {
                warn!(stage = stage.name, detail = %result.detail, "health check failed");
                return result;
            }
        }
    }

    HealthResult::healthy()
}
