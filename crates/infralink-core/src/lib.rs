//! Infralink core: declarative reconciliation of remote resources and
//! hierarchical health aggregation.
//!
//! Remote systems plug in through [`RemoteResourceClient`]. Desired state is a
//! [`ResourceSpec`]; [`reconcile`] and [`provision`] bring the remote side in
//! line with it without ever deleting anything. Liveness is checked by walking
//! [`HealthNode`] trees with [`probe`] and [`check_all`].

pub mod client;
pub mod error;
pub mod health;
pub mod memory;
pub mod provision;
pub mod reconcile;
pub mod settings;
pub mod spec;

pub use client::RemoteResourceClient;
pub use error::{ErrorCategory, ResourceError, Result};
pub use health::{
    Capability, HealthCheck, HealthNode, HealthRegistry, HealthResult, HealthStage, HealthStatus,
    NodeKind, RoundTrip, Startable, check_all, probe,
};
pub use memory::InMemoryResourceClient;
pub use provision::{ProvisionReport, ProvisionStep, StepOutcome, provision, provision_all};
pub use reconcile::{ReconcileOutcome, reconcile, update_request};
pub use settings::{SettingValue, Settings};
pub use spec::{ResourceSpec, ResourceSpecBuilder};
