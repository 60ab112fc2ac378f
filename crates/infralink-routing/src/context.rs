//! Traits a host routing engine implements to be health checked.

use infralink_core::Capability;

/// Any element of a routing engine: a route, consumer, component or endpoint.
pub trait RoutingElement: Send + Sync {
    /// Label used in diagnostics, e.g. a route id or an endpoint URI.
    fn id(&self) -> &str;

    /// How the element can be checked. Elements without a lifecycle are
    /// always healthy.
    fn capability(&self) -> Capability<'_> {
        Capability::None
    }
}

/// A route, optionally fed by a consumer.
pub trait Route: RoutingElement {
    fn consumer(&self) -> Option<&dyn RoutingElement> {
        None
    }
}

/// The routing engine itself.
///
/// Collections are returned in the engine's own declared order.
pub trait RoutingContext: RoutingElement {
    fn routes(&self) -> Vec<&dyn Route>;

    fn components(&self) -> Vec<&dyn RoutingElement>;

    fn endpoints(&self) -> Vec<&dyn RoutingElement>;
}
