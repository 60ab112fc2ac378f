//! Provisioning of a resource group: a parent spec followed by its children.

use std::fmt;

use tracing::{info, instrument, warn};

use crate::client::RemoteResourceClient;
use crate::reconcile::{ReconcileOutcome, reconcile};
use crate::spec::ResourceSpec;

/// Outcome of one step in a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The spec was reconciled against the remote system.
    Reconciled(ReconcileOutcome),
    /// The spec was skipped because its parent failed.
    NotAttempted,
}

impl StepOutcome {
    /// Returns `true` if the step was reconciled and failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Reconciled(outcome) if outcome.is_failed())
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reconciled(outcome) => outcome.fmt(f),
            Self::NotAttempted => write!(f, "not attempted"),
        }
    }
}

/// One spec and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionStep {
    /// `parent` for a group root, `parent/child` for nested specs.
    pub path: String,
    pub outcome: StepOutcome,
}

/// Ordered record of every step of a provisioning run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub steps: Vec<ProvisionStep>,
}

impl ProvisionReport {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns `true` if no step failed. Skipped steps count as failures of
    /// their parent, which is already reported.
    pub fn is_success(&self) -> bool {
        !self.steps.iter().any(|s| s.outcome.is_failed())
    }

    /// Steps that failed, in run order.
    pub fn failures(&self) -> impl Iterator<Item = &ProvisionStep> {
        self.steps.iter().filter(|s| s.outcome.is_failed())
    }

    /// Looks up a step by its path.
    pub fn step(&self, path: &str) -> Option<&ProvisionStep> {
        self.steps.iter().find(|s| s.path == path)
    }

    fn push(&mut self, path: String, outcome: StepOutcome) {
        self.steps.push(ProvisionStep { path, outcome });
    }

    fn extend(&mut self, other: ProvisionReport) {
        self.steps.extend(other.steps);
    }
}

/// Provision one group: the parent first, then each child in declared order.
///
/// Children run against `client.nested(parent)`. They are skipped when the
/// parent fails; a failed child does not stop its siblings.
#[instrument(skip_all, fields(kind = client.resource_kind(), group = %group.name()))]
pub async fn provision(group: &ResourceSpec, client: &dyn RemoteResourceClient) -> ProvisionReport {
    let mut report = ProvisionReport::default();

    let parent = reconcile(group, client).await;
    let parent_failed = parent.is_failed();
    report.push(group.name().to_string(), StepOutcome::Reconciled(parent));

    let children = group.children();
    if children.is_empty() {
        return report;
    }

    let child_path = |child: &ResourceSpec| format!("{}/{}", group.name(), child.name());

    if parent_failed {
        warn!(children = children.len(), "parent failed, skipping nested resources");
        for child in children {
            report.push(child_path(child), StepOutcome::NotAttempted);
        }
        return report;
    }

    let Some(nested) = client.nested(group.name()) else {
        warn!("client does not support nested resources");
        let reason = format!("{} does not support nested resources", client.resource_kind());
        for child in children {
            report.push(
                child_path(child),
                StepOutcome::Reconciled(ReconcileOutcome::Failed(reason.clone())),
            );
        }
        return report;
    };

    for child in children {
        let outcome = reconcile(child, nested.as_ref()).await;
        report.push(child_path(child), StepOutcome::Reconciled(outcome));
    }

    report
}

/// Provision every group in order, concatenating their reports.
pub async fn provision_all(
    groups: &[ResourceSpec],
    client: &dyn RemoteResourceClient,
) -> ProvisionReport {
    let mut report = ProvisionReport::default();
    if groups.is_empty() {
        info!(kind = client.resource_kind(), "no resources configured");
        return report;
    }

    for group in groups {
        report.extend(provision(group, client).await);
    }

    let failed = report.failures().count();
    info!(
        kind = client.resource_kind(),
        steps = report.len(),
        failed,
        "provisioning complete"
    );
    report
}
