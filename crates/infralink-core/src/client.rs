//! The client seam between the reconciler and a remote resource system.

use async_trait::async_trait;

use crate::error::ResourceError;
use crate::settings::Settings;
use crate::spec::ResourceSpec;

/// Primitives a remote system must offer for its resources to be reconciled.
///
/// One implementation exists per resource kind (Kafka topics, Elasticsearch
/// indices, ...). Implementations own their network I/O and report every
/// failure as a [`ResourceError`]; they never panic on remote errors.
///
/// # Example
///
/// ```ignore
/// use infralink_core::{reconcile, RemoteResourceClient, ResourceSpec};
///
/// async fn ensure(client: &dyn RemoteResourceClient) {
///     let spec = ResourceSpec::builder("orders").structural("partitions", 6).build()?;
///     let outcome = reconcile(&spec, client).await;
///     println!("{outcome}");
/// }
/// ```
#[async_trait]
pub trait RemoteResourceClient: Send + Sync {
    /// Short name of the resource kind, used in logs and error messages.
    fn resource_kind(&self) -> &'static str;

    /// Whether [`describe`](Self::describe) can be called for a name that may not exist.
    ///
    /// When `false`, the reconciler lists names first and only describes
    /// resources that are known to exist.
    fn supports_direct_lookup(&self) -> bool {
        true
    }

    /// Lists the names of all existing resources of this kind.
    ///
    /// # Errors
    ///
    /// Returns an error for transport or remote-side failures.
    async fn list_names(&self) -> Result<Vec<String>, ResourceError>;

    /// Fetches the current settings of the named resource.
    ///
    /// Returns `None` if the resource does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing resources.
    async fn describe(&self, name: &str) -> Result<Option<Settings>, ResourceError>;

    /// Creates the resource with the full settings payload of `spec`.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::AlreadyExists` if the resource was created by someone else.
    async fn create(&self, spec: &ResourceSpec) -> Result<(), ResourceError>;

    /// Updates mutable settings of an existing resource.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::NotFound` if the resource does not exist.
    async fn update(&self, name: &str, settings: &Settings) -> Result<(), ResourceError>;

    /// Client for resources that live under `parent`, e.g. the mappings of an index.
    fn nested(&self, _parent: &str) -> Option<Box<dyn RemoteResourceClient + '_>> {
        None
    }
}
