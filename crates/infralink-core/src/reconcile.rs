//! Create-or-update reconciliation of a single resource.
//!
//! [`reconcile`] brings one remote resource in line with its [`ResourceSpec`]:
//! - creates it with the full settings payload when it is missing
//! - updates only its mutable settings when they differ
//! - does nothing when it already matches
//!
//! Resources are never deleted and structural settings are never resent.

use std::fmt;

use tracing::{debug, info, instrument, warn};

use crate::client::RemoteResourceClient;
use crate::error::ResourceError;
use crate::settings::Settings;
use crate::spec::ResourceSpec;

/// Result of reconciling one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The resource did not exist and was created.
    Created,
    /// The resource existed and its mutable settings were updated.
    Updated,
    /// The resource existed and already matched the spec.
    AlreadyUpToDate,
    /// A remote call failed; the reason is kept for reporting.
    Failed(String),
}

impl ReconcileOutcome {
    /// Returns `true` for [`ReconcileOutcome::Failed`].
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns `true` if the remote resource was changed.
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Created | Self::Updated)
    }
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::AlreadyUpToDate => write!(f, "up to date"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Reconcile one resource against the remote system.
///
/// Never returns an error: transport and remote failures are captured as
/// [`ReconcileOutcome::Failed`] so that callers can decide whether a larger
/// run should continue.
///
/// A creation that loses a race against another actor (`AlreadyExists`) is
/// demoted to the update path.
#[instrument(skip_all, fields(kind = client.resource_kind(), resource = %spec.name()))]
pub async fn reconcile(spec: &ResourceSpec, client: &dyn RemoteResourceClient) -> ReconcileOutcome {
    match lookup(spec.name(), client).await {
        Ok(Some(current)) => return apply_update(spec, client, &current).await,
        Ok(None) => {}
        Err(e) => return failed(spec, client, "lookup", &e),
    }

    debug!("resource not found, creating");
    match client.create(spec).await {
        Ok(()) => {
            info!("resource created");
            ReconcileOutcome::Created
        }
        Err(e) if e.is_already_exists() => {
            warn!("resource was created concurrently, reconciling as update");
            match client.describe(spec.name()).await {
                Ok(Some(current)) => apply_update(spec, client, &current).await,
                Ok(None) => ReconcileOutcome::Failed(format!(
                    "{} {} reported as existing but could not be described",
                    client.resource_kind(),
                    spec.name()
                )),
                Err(e) => failed(spec, client, "describe", &e),
            }
        }
        Err(e) => failed(spec, client, "create", &e),
    }
}

/// Build the update request for an existing resource, if one is needed.
///
/// The request carries every mutable setting of `spec` and nothing else.
/// Returns `None` when all mutable settings already match `current`.
/// Structural settings that differ remotely are reported as drift and left alone.
pub fn update_request(spec: &ResourceSpec, current: &Settings) -> Option<Settings> {
    for (key, desired) in spec.structural_settings() {
        if let Some(actual) = current.get(&key)
            && !actual.matches(&desired)
        {
            warn!(
                resource = %spec.name(),
                setting = %key,
                desired = %desired,
                actual = %actual,
                "structural setting differs remotely and cannot be changed"
            );
        }
    }

    let mutable = spec.mutable_settings();
    let changed = mutable
        .iter()
        .any(|(key, desired)| current.get(key).is_none_or(|actual| !actual.matches(desired)));

    changed.then_some(mutable)
}

async fn lookup(
    name: &str,
    client: &dyn RemoteResourceClient,
) -> Result<Option<Settings>, ResourceError> {
    if !client.supports_direct_lookup() {
        let names = client.list_names().await?;
        if !names.iter().any(|n| n == name) {
            return Ok(None);
        }
    }
    client.describe(name).await
}

async fn apply_update(
    spec: &ResourceSpec,
    client: &dyn RemoteResourceClient,
    current: &Settings,
) -> ReconcileOutcome {
    let Some(request) = update_request(spec, current) else {
        debug!("resource already up to date");
        return ReconcileOutcome::AlreadyUpToDate;
    };

    match client.update(spec.name(), &request).await {
        Ok(()) => {
            info!(settings = request.len(), "resource updated");
            ReconcileOutcome::Updated
        }
        Err(e) => failed(spec, client, "update", &e),
    }
}

fn failed(
    spec: &ResourceSpec,
    client: &dyn RemoteResourceClient,
    step: &str,
    error: &ResourceError,
) -> ReconcileOutcome {
    warn!(step, category = %error.category(), error = %error, "reconciliation failed");
    ReconcileOutcome::Failed(format!(
        "{} {} {step} failed: {error}",
        client.resource_kind(),
        spec.name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryResourceClient;
    use crate::settings::SettingValue;

    fn orders(retention_ms: i64) -> ResourceSpec {
        ResourceSpec::builder("orders")
            .structural("partitions", 6)
            .structural("replication.factor", 3)
            .mutable("retention.ms", retention_ms)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_orders_scenario() {
        let client = InMemoryResourceClient::new("topic");

        assert_eq!(reconcile(&orders(604_800_000), &client).await, ReconcileOutcome::Created);

        assert_eq!(reconcile(&orders(1_209_600_000), &client).await, ReconcileOutcome::Updated);
        let sent = client.update_requests().await;
        assert_eq!(sent.len(), 1);
        let keys: Vec<&str> = sent[0].1.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["retention.ms"]);

        assert_eq!(
            reconcile(&orders(1_209_600_000), &client).await,
            ReconcileOutcome::AlreadyUpToDate
        );
        assert_eq!(client.update_requests().await.len(), 1);
    }

    #[tokio::test]
    async fn test_create_race_demotes_to_update() {
        let client = InMemoryResourceClient::new("topic").with_list_first();
        client.seed_hidden("orders", orders(1).settings().clone()).await;

        // The listing does not show the hidden resource, so create is attempted
        // and loses the race.
        let outcome = reconcile(&orders(2), &client).await;
        assert_eq!(outcome, ReconcileOutcome::Updated);
        let stored = client.get("orders").await.unwrap();
        assert_eq!(stored["retention.ms"], SettingValue::Int(2));
    }

    #[tokio::test]
    async fn test_create_conflict_without_resource_fails() {
        let client = InMemoryResourceClient::new("topic");
        client.conflict_on("orders").await;

        let outcome = reconcile(&orders(1), &client).await;
        assert_eq!(
            outcome,
            ReconcileOutcome::Failed(
                "topic orders reported as existing but could not be described".into()
            )
        );
        assert!(client.is_empty().await);
        assert!(client.update_requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_captured() {
        let client = InMemoryResourceClient::new("topic");
        client.fail_on("orders").await;
        let outcome = reconcile(&orders(1), &client).await;
        assert!(outcome.is_failed());
        assert!(outcome.to_string().contains("topic orders"));
    }

    #[test]
    fn test_update_request_excludes_structural_keys() {
        let spec = orders(10);
        let mut current = Settings::new();
        current.insert("partitions".into(), SettingValue::from("3"));
        current.insert("replication.factor".into(), SettingValue::from("1"));
        current.insert("retention.ms".into(), SettingValue::from("5"));

        let request = update_request(&spec, &current).unwrap();
        assert!(!request.contains_key("partitions"));
        assert!(!request.contains_key("replication.factor"));
        assert_eq!(request["retention.ms"], SettingValue::Int(10));
    }

    #[test]
    fn test_update_request_none_when_matching() {
        let spec = orders(10);
        let mut current = Settings::new();
        current.insert("retention.ms".into(), SettingValue::from("10"));
        assert!(update_request(&spec, &current).is_none());
    }

    #[test]
    fn test_update_request_none_when_float_reported_with_decimals() {
        let spec = ResourceSpec::builder("orders")
            .mutable("min.cleanable.dirty.ratio", 1.0)
            .build()
            .unwrap();
        let mut current = Settings::new();
        current.insert("min.cleanable.dirty.ratio".into(), SettingValue::from("1.0"));
        assert!(update_request(&spec, &current).is_none());
    }

    #[test]
    fn test_update_request_none_for_structural_only_spec() {
        let spec = ResourceSpec::builder("orders")
            .structural("partitions", 6)
            .build()
            .unwrap();
        assert!(update_request(&spec, &Settings::new()).is_none());
    }
}
