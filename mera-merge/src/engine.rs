use std::sync::Arc;

use mera_model::{ComponentConfig, ComponentTypeDescriptor, ProgressSnapshot};
use mera_registry::TypeRegistry;
use tracing::debug;

use crate::error::{MergeError, MergeResult};
use crate::reducers;
use crate::repair::{self, Repaired};

/// Merges progress snapshots using the reducers declared in a
/// [`TypeRegistry`].
///
/// Cheap to clone and safe to share between threads; holds no mutable state.
#[derive(Debug, Clone)]
pub struct MergeEngine {
    registry: Arc<TypeRegistry>,
}

impl MergeEngine {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    fn descriptor(&self, type_name: &str) -> MergeResult<&ComponentTypeDescriptor> {
        self.registry
            .lookup(type_name)
            .map(|d| d.as_ref())
            .map_err(|_| MergeError::UnknownType(type_name.to_string()))
    }

    /// Combines two snapshots of the same component.
    ///
    /// Each declared field is merged independently by its reducer. Fields the
    /// type does not declare are dropped: no field survives without a
    /// reducer. The result is the same whichever side is `local`.
    pub fn merge(
        &self,
        type_name: &str,
        local: &ProgressSnapshot,
        remote: &ProgressSnapshot,
    ) -> MergeResult<ProgressSnapshot> {
        let descriptor = self.descriptor(type_name)?;
        let schema = &descriptor.progress_schema;

        let mut merged = ProgressSnapshot::new();
        for field in &schema.fields {
            // The registry guarantees a reducer for every declared field.
            let Some(reducer) = schema.reducer(&field.name) else {
                continue;
            };
            if let Some(value) = reducers::apply(reducer, local.get(&field.name), remote.get(&field.name)) {
                merged.insert(&field.name, value);
            }
        }

        let undeclared = local
            .field_names()
            .chain(remote.field_names())
            .filter(|name| schema.field(name).is_none())
            .count();
        if undeclared > 0 {
            debug!(type_name = %type_name, undeclared, "Dropped undeclared progress fields during merge");
        }

        Ok(merged)
    }

    /// Default progress for a component the learner has not touched yet.
    pub fn initialize(&self, config: &ComponentConfig) -> MergeResult<ProgressSnapshot> {
        Ok(self.descriptor(&config.component_type)?.initialize(config))
    }

    /// Brings a stored snapshot in line with the live config.
    pub fn repair(&self, config: &ComponentConfig, snapshot: &ProgressSnapshot) -> MergeResult<Repaired> {
        let descriptor = self.descriptor(&config.component_type)?;
        Ok(repair::repair(descriptor, config, snapshot))
    }

    /// Repairs both sides against the live config, then merges them.
    pub fn reconcile(
        &self,
        config: &ComponentConfig,
        local: &ProgressSnapshot,
        remote: &ProgressSnapshot,
    ) -> MergeResult<ProgressSnapshot> {
        let local = self.repair(config, local)?;
        let remote = self.repair(config, remote)?;
        self.merge(&config.component_type, &local.snapshot, &remote.snapshot)
    }

    /// Runs the type's validator against a progress value.
    pub fn validate(&self, config: &ComponentConfig, progress: &ProgressSnapshot) -> MergeResult<()> {
        self.descriptor(&config.component_type)?
            .validate(config, progress)
            .map_err(|reason| MergeError::InvalidProgress {
                component_id: config.id,
                reason,
            })
    }
}
