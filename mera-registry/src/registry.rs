//! The component type registry.
//!
//! Populated once at process start through [`TypeRegistryBuilder`], then
//! frozen into a [`TypeRegistry`] that is only ever read. Every descriptor
//! is checked when it is registered, so the merge engine never meets a
//! progress field it cannot merge.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use mera_model::ComponentTypeDescriptor;
use tracing::{debug, info, warn};

use crate::error::{RegistryError, RegistryResult};
use crate::manifest::TypeRegistration;

/// Returns every structural problem with a descriptor, in a stable order.
///
/// An empty result means the descriptor may be registered under `key`.
pub fn check_descriptor(key: &str, descriptor: &ComponentTypeDescriptor) -> Vec<RegistryError> {
    let type_name = &descriptor.type_name;
    let schema = &descriptor.progress_schema;
    let mut problems = Vec::new();

    if key != type_name {
        problems.push(RegistryError::TypeNameMismatch {
            key: key.to_string(),
            declared: type_name.clone(),
        });
    }

    let mut seen = HashSet::new();
    for field in &schema.fields {
        if !seen.insert(field.name.as_str()) {
            problems.push(RegistryError::DuplicateField {
                type_name: type_name.clone(),
                field: field.name.clone(),
            });
        }
    }

    let missing: Vec<String> = schema
        .fields
        .iter()
        .filter(|f| !schema.reducers.contains_key(&f.name))
        .map(|f| f.name.clone())
        .collect();
    if !missing.is_empty() {
        problems.push(RegistryError::MissingReducer {
            type_name: type_name.clone(),
            fields: missing,
        });
    }

    let orphans: Vec<String> = schema
        .reducers
        .keys()
        .filter(|name| !seen.contains(name.as_str()))
        .cloned()
        .collect();
    if !orphans.is_empty() {
        problems.push(RegistryError::OrphanReducer {
            type_name: type_name.clone(),
            fields: orphans,
        });
    }

    for field in &schema.fields {
        if let Some(reducer) = schema.reducers.get(&field.name) {
            if !reducer.accepts(&field.shape) {
                problems.push(RegistryError::ReducerShapeMismatch {
                    type_name: type_name.clone(),
                    field: field.name.clone(),
                    reducer: reducer.kind(),
                });
            }
        }
    }

    problems
}

/// What happened to a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registered {
    Added,
    /// An identical descriptor was already present.
    Unchanged,
}

/// Mutable registry under construction.
#[derive(Debug, Default)]
pub struct TypeRegistryBuilder {
    types: BTreeMap<String, ComponentTypeDescriptor>,
}

impl TypeRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor under `type_name`.
    ///
    /// Re-registering a structurally identical descriptor is a no-op. A
    /// different descriptor under a taken name fails with
    /// [`RegistryError::DuplicateTypeConflict`]. Shape problems (a progress
    /// field without a reducer, ...) fail here, never at merge time; when
    /// several exist the first from [`check_descriptor`] is returned.
    pub fn register(
        &mut self,
        type_name: &str,
        descriptor: ComponentTypeDescriptor,
    ) -> RegistryResult<Registered> {
        if let Some(problem) = check_descriptor(type_name, &descriptor).into_iter().next() {
            return Err(problem);
        }

        if let Some(existing) = self.types.get(type_name) {
            if *existing == descriptor {
                debug!(type_name = %type_name, "Component type re-registered (identical)");
                return Ok(Registered::Unchanged);
            }
            return Err(RegistryError::DuplicateTypeConflict(type_name.to_string()));
        }

        debug!(type_name = %type_name, "Component type registered");
        self.types.insert(type_name.to_string(), descriptor);
        Ok(Registered::Added)
    }

    /// Registers a manifest entry. Entries missing a config schema, progress
    /// schema or initializer are excluded with a warning and reported as
    /// [`RegistryError::IncompleteRegistration`].
    pub fn register_manifest(&mut self, registration: TypeRegistration) -> RegistryResult<Registered> {
        let type_tag = registration.type_tag.clone();
        match registration.into_descriptor() {
            Ok(descriptor) => self.register(&type_tag, descriptor),
            Err(missing) => {
                warn!(type_name = %type_tag, ?missing, "Component type excluded from registry");
                Err(RegistryError::IncompleteRegistration {
                    type_name: type_tag,
                    missing,
                })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Freezes the registry.
    pub fn build(self) -> TypeRegistry {
        info!(types = self.types.len(), "Type registry built");
        TypeRegistry {
            types: self
                .types
                .into_iter()
                .map(|(name, d)| (name, Arc::new(d)))
                .collect(),
        }
    }
}

/// Immutable catalog of component types.
///
/// Read-only after construction; share it through `Arc` and read it from
/// any number of threads without locking.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    types: BTreeMap<String, Arc<ComponentTypeDescriptor>>,
}

impl TypeRegistry {
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::new()
    }

    /// Builds a registry from manifest entries, keeping every rejection.
    pub fn from_registrations(
        registrations: impl IntoIterator<Item = TypeRegistration>,
    ) -> (Self, Vec<RegistryError>) {
        let mut builder = Self::builder();
        let mut rejected = Vec::new();
        for registration in registrations {
            if let Err(e) = builder.register_manifest(registration) {
                rejected.push(e);
            }
        }
        (builder.build(), rejected)
    }

    pub fn lookup(&self, type_name: &str) -> RegistryResult<&Arc<ComponentTypeDescriptor>> {
        self.types
            .get(type_name)
            .ok_or_else(|| RegistryError::UnknownType(type_name.to_string()))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Type names in lexicographic order.
    pub fn list_types(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ComponentTypeDescriptor> {
        self.types.values().map(|d| d.as_ref())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
