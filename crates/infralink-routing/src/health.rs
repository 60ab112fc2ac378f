//! Health of a routing context and everything it runs.
//!
//! The context is the root; its stages are checked in this order:
//! routes (each with its consumer nested), then components, then endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use infralink_core::{HealthCheck, HealthNode, HealthResult, HealthStage, NodeKind, check_all};
use tracing::{debug, instrument};

use crate::context::{RoutingContext, RoutingElement};

pub const ROUTES_STAGE: &str = "routes";
pub const COMPONENTS_STAGE: &str = "components";
pub const ENDPOINTS_STAGE: &str = "endpoints";

/// Builds a health node for one routing element.
pub fn element_node(kind: NodeKind, element: &dyn RoutingElement) -> HealthNode<'_> {
    HealthNode {
        kind,
        id: element.id().to_string(),
        capability: element.capability(),
        nested: Vec::new(),
    }
}

/// Builds the stages checked after the context itself.
pub fn context_stages(context: &dyn RoutingContext) -> Vec<HealthStage<'_>> {
    let routes = context
        .routes()
        .into_iter()
        .map(|route| {
            let node = element_node(NodeKind::Route, route);
            match route.consumer() {
                Some(consumer) => node.with_nested(element_node(NodeKind::Consumer, consumer)),
                None => node,
            }
        })
        .collect();

    let components = context
        .components()
        .into_iter()
        .map(|c| element_node(NodeKind::Component, c))
        .collect();

    let endpoints = context
        .endpoints()
        .into_iter()
        .map(|e| element_node(NodeKind::Endpoint, e))
        .collect();

    vec![
        HealthStage::new(ROUTES_STAGE, routes),
        HealthStage::new(COMPONENTS_STAGE, components),
        HealthStage::new(ENDPOINTS_STAGE, endpoints),
    ]
}

/// Named health check over a whole routing context.
pub struct RoutingContextHealthCheck {
    name: String,
    context: Arc<dyn RoutingContext>,
}

impl RoutingContextHealthCheck {
    pub fn new(context: Arc<dyn RoutingContext>) -> Self {
        Self {
            name: format!("routing:{}", context.id()),
            context,
        }
    }
}

#[async_trait]
impl HealthCheck for RoutingContextHealthCheck {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip_all, fields(context = %self.context.id()))]
    async fn check(&self) -> HealthResult {
        let context = self.context.as_ref();
        let root = element_node(NodeKind::Context, context);
        let stages = context_stages(context);
        for stage in &stages {
            debug!(stage = stage.name, members = stage.members.len(), "collected stage");
        }
        check_all(&root, &stages).await
    }
}
