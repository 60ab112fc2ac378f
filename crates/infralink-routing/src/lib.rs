//! Routing engine integration for Infralink.
//!
//! Hosts expose their routing engine through [`RoutingContext`] and register a
//! [`RoutingContextHealthCheck`] with their health registry.

pub mod context;
pub mod health;

pub use context::{Route, RoutingContext, RoutingElement};
pub use health::{RoutingContextHealthCheck, context_stages, element_node};
