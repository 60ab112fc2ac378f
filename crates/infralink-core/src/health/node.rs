use std::fmt;

use async_trait::async_trait;

use crate::error::ResourceError;

/// Kind of a unit under inspection; used as the prefix of diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Context,
    Route,
    Consumer,
    Component,
    Endpoint,
    Cluster,
    Node,
    Client,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Context => "Context",
            Self::Route => "Route",
            Self::Consumer => "Consumer",
            Self::Component => "Component",
            Self::Endpoint => "Endpoint",
            Self::Cluster => "Cluster",
            Self::Node => "Node",
            Self::Client => "Client",
        };
        f.write_str(name)
    }
}

/// Something with a started/stopped lifecycle.
pub trait Startable: Send + Sync {
    fn is_started(&self) -> bool;
}

impl<F> Startable for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_started(&self) -> bool {
        self()
    }
}

/// Something that can prove liveness with a lightweight remote request.
#[async_trait]
pub trait RoundTrip: Send + Sync {
    /// Issues the request.
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures and non-success responses.
    async fn round_trip(&self) -> Result<(), ResourceError>;
}

/// What a node can be asked about its health.
#[derive(Clone, Copy, Default)]
pub enum Capability<'a> {
    /// Nothing to ask; the node is healthy.
    #[default]
    None,
    Stateful(&'a dyn Startable),
    RoundTrip(&'a dyn RoundTrip),
}

impl fmt::Debug for Capability<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Stateful(_) => write!(f, "Stateful"),
            Self::RoundTrip(_) => write!(f, "RoundTrip"),
        }
    }
}

/// One unit under inspection, borrowing its host object for a single check.
#[derive(Debug, Clone)]
pub struct HealthNode<'a> {
    pub kind: NodeKind,
    pub id: String,
    pub capability: Capability<'a>,
    pub nested: Vec<HealthNode<'a>>,
}

impl<'a> HealthNode<'a> {
    /// A node without capability; always healthy on its own.
    pub fn new(kind: NodeKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            capability: Capability::None,
            nested: Vec::new(),
        }
    }

    pub fn stateful(kind: NodeKind, id: impl Into<String>, target: &'a dyn Startable) -> Self {
        Self {
            capability: Capability::Stateful(target),
            ..Self::new(kind, id)
        }
    }

    pub fn round_trip(kind: NodeKind, id: impl Into<String>, target: &'a dyn RoundTrip) -> Self {
        Self {
            capability: Capability::RoundTrip(target),
            ..Self::new(kind, id)
        }
    }

    /// Appends a nested node, probed after this one.
    #[must_use]
    pub fn with_nested(mut self, node: HealthNode<'a>) -> Self {
        self.nested.push(node);
        self
    }

    /// Short label used in diagnostics, e.g. `Route [orders]`.
    pub fn label(&self) -> String {
        format!("{} [{}]", self.kind, self.id)
    }
}
