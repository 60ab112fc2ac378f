//! Desired-state description of a remote resource.

use indexmap::IndexSet;

use crate::error::{ResourceError, Result};
use crate::settings::{SettingValue, Settings};

/// Immutable description of one desired resource.
///
/// Every setting is either *structural* (fixed at creation, e.g. partition
/// count) or *mutable* (changeable afterwards, e.g. retention). Only mutable
/// settings ever travel in an update request.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSpec {
    name: String,
    settings: Settings,
    structural: IndexSet<String>,
    children: Vec<ResourceSpec>,
}

impl ResourceSpec {
    /// Starts building a spec for the resource called `name`.
    pub fn builder(name: impl Into<String>) -> ResourceSpecBuilder {
        ResourceSpecBuilder {
            name: name.into(),
            settings: Settings::new(),
            structural: IndexSet::new(),
            children: Vec::new(),
        }
    }

    /// Name of the resource; the join key against the remote system.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All settings, structural and mutable, in declaration order.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns `true` if `key` is a structural setting of this spec.
    pub fn is_structural(&self, key: &str) -> bool {
        self.structural.contains(key)
    }

    /// Settings that can only be set at creation time.
    pub fn structural_settings(&self) -> Settings {
        self.settings
            .iter()
            .filter(|(k, _)| self.is_structural(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Settings that may be changed after creation.
    pub fn mutable_settings(&self) -> Settings {
        self.settings
            .iter()
            .filter(|(k, _)| !self.is_structural(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Nested specs, in declared order.
    pub fn children(&self) -> &[ResourceSpec] {
        &self.children
    }
}

/// Builder for [`ResourceSpec`].
#[derive(Debug, Clone)]
pub struct ResourceSpecBuilder {
    name: String,
    settings: Settings,
    structural: IndexSet<String>,
    children: Vec<ResourceSpec>,
}

impl ResourceSpecBuilder {
    /// Adds a setting that is fixed once the resource exists.
    #[must_use]
    pub fn structural(mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        let key = key.into();
        self.structural.insert(key.clone());
        self.settings.insert(key, value.into());
        self
    }

    /// Adds a setting that can be updated on an existing resource.
    #[must_use]
    pub fn mutable(mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        let key = key.into();
        self.structural.shift_remove(&key);
        self.settings.insert(key, value.into());
        self
    }

    /// Appends a nested spec. Children are reconciled in the order they are added.
    #[must_use]
    pub fn child(mut self, child: ResourceSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several nested specs.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = ResourceSpec>) -> Self {
        self.children.extend(children);
        self
    }

    /// Finishes the spec.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::InvalidSpec` if the name is empty.
    pub fn build(self) -> Result<ResourceSpec> {
        if self.name.trim().is_empty() {
            return Err(ResourceError::invalid_spec("resource name must not be empty"));
        }
        Ok(ResourceSpec {
            name: self.name,
            settings: self.settings,
            structural: self.structural,
            children: self.children,
        })
    }
}
