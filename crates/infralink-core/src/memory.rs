//! In-memory [`RemoteResourceClient`] used by tests.
//!
//! Resources live in a shared map keyed by name; nested resources are keyed
//! by `parent/child`. Every update request is recorded so callers can assert
//! exactly which keys were sent.
//!
//! # Example
//!
//! ```ignore
//! use infralink_core::{InMemoryResourceClient, ResourceSpec, reconcile};
//!
//! let client = InMemoryResourceClient::new("topic");
//! let spec = ResourceSpec::builder("orders").structural("partitions", 6).build()?;
//! assert_eq!(reconcile(&spec, &client).await, ReconcileOutcome::Created);
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use crate::client::RemoteResourceClient;
use crate::error::ResourceError;
use crate::settings::Settings;
use crate::spec::ResourceSpec;

#[derive(Debug, Default)]
struct State {
    resources: IndexMap<String, Settings>,
    hidden: HashSet<String>,
    failing: HashSet<String>,
    conflicting: HashSet<String>,
    updates: Vec<(String, Settings)>,
}

/// Resource client backed by a process-local map.
#[derive(Debug, Clone)]
pub struct InMemoryResourceClient {
    kind: &'static str,
    nested_kind: Option<&'static str>,
    list_first: bool,
    scope: Option<String>,
    state: Arc<RwLock<State>>,
}

impl InMemoryResourceClient {
    /// Creates an empty client for resources of `kind`.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            nested_kind: None,
            list_first: false,
            scope: None,
            state: Arc::new(RwLock::new(State::default())),
        }
    }

    /// Enables nested clients of `kind` under every resource.
    #[must_use]
    pub fn with_nested(mut self, kind: &'static str) -> Self {
        self.nested_kind = Some(kind);
        self
    }

    /// Makes the reconciler list names before describing, like the Kafka client.
    #[must_use]
    pub fn with_list_first(mut self) -> Self {
        self.list_first = true;
        self
    }

    /// Stores a resource directly.
    pub async fn seed(&self, key: impl Into<String>, settings: Settings) {
        self.state.write().await.resources.insert(key.into(), settings);
    }

    /// Stores a resource that exists but is missing from `list_names`,
    /// as if another actor created it after the listing.
    pub async fn seed_hidden(&self, key: impl Into<String>, settings: Settings) {
        let key = key.into();
        let mut state = self.state.write().await;
        state.hidden.insert(key.clone());
        state.resources.insert(key, settings);
    }

    /// Makes every call touching `key` fail with a transport error.
    pub async fn fail_on(&self, key: impl Into<String>) {
        self.state.write().await.failing.insert(key.into());
    }

    /// Makes `create` for `key` report `AlreadyExists` without storing
    /// anything, as if another actor created and then removed the resource.
    pub async fn conflict_on(&self, key: impl Into<String>) {
        self.state.write().await.conflicting.insert(key.into());
    }

    /// Current settings stored under `key`.
    pub async fn get(&self, key: &str) -> Option<Settings> {
        self.state.read().await.resources.get(key).cloned()
    }

    /// Every update request received so far, as `(key, settings)`.
    pub async fn update_requests(&self) -> Vec<(String, Settings)> {
        self.state.read().await.updates.clone()
    }

    /// Number of resources stored, nested ones included.
    pub async fn len(&self) -> usize {
        self.state.read().await.resources.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn key(&self, name: &str) -> String {
        match &self.scope {
            Some(parent) => format!("{parent}/{name}"),
            None => name.to_string(),
        }
    }

    fn check_failing(&self, state: &State, key: &str) -> Result<(), ResourceError> {
        if state.failing.contains(key) {
            return Err(ResourceError::transport(format!(
                "simulated failure for {} {key}",
                self.kind
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteResourceClient for InMemoryResourceClient {
    fn resource_kind(&self) -> &'static str {
        self.kind
    }

    fn supports_direct_lookup(&self) -> bool {
        !self.list_first
    }

    async fn list_names(&self) -> Result<Vec<String>, ResourceError> {
        let state = self.state.read().await;
        let names = state
            .resources
            .keys()
            .filter(|k| !state.hidden.contains(*k))
            .filter_map(|k| match &self.scope {
                Some(parent) => k
                    .strip_prefix(parent.as_str())
                    .and_then(|rest| rest.strip_prefix('/'))
                    .map(str::to_string),
                None => (!k.contains('/')).then(|| k.clone()),
            })
            .collect();
        Ok(names)
    }

    async fn describe(&self, name: &str) -> Result<Option<Settings>, ResourceError> {
        let key = self.key(name);
        let state = self.state.read().await;
        self.check_failing(&state, &key)?;
        Ok(state.resources.get(&key).cloned())
    }

    async fn create(&self, spec: &ResourceSpec) -> Result<(), ResourceError> {
        let key = self.key(spec.name());
        let mut state = self.state.write().await;
        self.check_failing(&state, &key)?;
        if state.resources.contains_key(&key) || state.conflicting.contains(&key) {
            return Err(ResourceError::already_exists(self.kind, spec.name()));
        }
        state.resources.insert(key, spec.settings().clone());
        Ok(())
    }

    async fn update(&self, name: &str, settings: &Settings) -> Result<(), ResourceError> {
        let key = self.key(name);
        let mut state = self.state.write().await;
        self.check_failing(&state, &key)?;
        let Some(current) = state.resources.get_mut(&key) else {
            return Err(ResourceError::not_found(self.kind, name));
        };
        for (k, v) in settings {
            current.insert(k.clone(), v.clone());
        }
        state.updates.push((key, settings.clone()));
        Ok(())
    }

    fn nested(&self, parent: &str) -> Option<Box<dyn RemoteResourceClient + '_>> {
        let kind = self.nested_kind?;
        Some(Box::new(Self {
            kind,
            nested_kind: None,
            list_first: false,
            scope: Some(self.key(parent)),
            state: Arc::clone(&self.state),
        }))
    }
}
