use tracing::debug;

use super::HealthResult;
use super::node::{Capability, HealthNode};

/// Checks `node` alone, ignoring its nested nodes.
pub async fn probe_node(node: &HealthNode<'_>) -> HealthResult {
    match node.capability {
        Capability::None => HealthResult::healthy(),
        Capability::Stateful(target) => {
            if target.is_started() {
                HealthResult::healthy()
            } else {
                HealthResult::unhealthy(format!("{} is not running", node.label()))
            }
        }
        Capability::RoundTrip(target) => match target.round_trip().await {
            Ok(()) => HealthResult::healthy(),
            Err(e) => HealthResult::unhealthy(format!("{} is not available: {e}", node.label()))
                .with_cause(e),
        },
    }
}

/// Checks `node`, then its nested nodes depth-first in declared order.
///
/// Returns the first unhealthy result; later nodes are not probed.
pub async fn probe(node: &HealthNode<'_>) -> HealthResult {
    let mut pending = vec![node];
    while let Some(current) = pending.pop() {
        let result = probe_node(current).await;
        debug!(node = %current.label(), status = %result.status, "probed");
        if !result.is_healthy() {
            return result;
        }
        pending.extend(current.nested.iter().rev());
    }
    HealthResult::healthy()
}
