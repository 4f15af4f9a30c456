use std::collections::BTreeMap;

use mera_model::{ComponentConfig, DomainDocument, Entity};
use mera_types::{ComponentId, DomainId, EntityId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("entity {0} not found")]
    NotFound(EntityId),
}

/// Summary figures for one lesson or menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetrics {
    pub page_count: usize,
    pub component_count: usize,
    pub title: String,
    pub difficulty: String,
}

impl EntityMetrics {
    pub(crate) fn of(entity: &Entity) -> Self {
        Self {
            page_count: entity.page_count(),
            component_count: entity.component_count(),
            title: entity.metadata.title.clone(),
            difficulty: entity.metadata.difficulty.clone(),
        }
    }
}

/// The indexed content of one release.
///
/// Built once by [`CurriculumGraphBuilder`](crate::CurriculumGraphBuilder)
/// and never mutated afterwards, so it can be shared freely through `Arc`.
#[derive(Debug, Clone, Default)]
pub struct CurriculumGraph {
    pub(crate) entities: BTreeMap<EntityId, Entity>,
    pub(crate) component_types: BTreeMap<ComponentId, String>,
    pub(crate) component_owners: BTreeMap<ComponentId, EntityId>,
    pub(crate) domain_lessons: BTreeMap<DomainId, Vec<EntityId>>,
    pub(crate) metrics: BTreeMap<EntityId, EntityMetrics>,
    pub(crate) domains: BTreeMap<DomainId, DomainDocument>,
    pub(crate) curriculum: Option<Value>,
}

impl CurriculumGraph {
    pub fn has_entity(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn has_component(&self, id: ComponentId) -> bool {
        self.component_types.contains_key(&id)
    }

    pub fn component_type(&self, id: ComponentId) -> Option<&str> {
        self.component_types.get(&id).map(String::as_str)
    }

    /// The first entity that declared the component.
    pub fn owning_entity(&self, id: ComponentId) -> Option<EntityId> {
        self.component_owners.get(&id).copied()
    }

    pub fn entity_page_count(&self, id: EntityId) -> GraphResult<usize> {
        self.entities
            .get(&id)
            .map(Entity::page_count)
            .ok_or(GraphError::NotFound(id))
    }

    /// Lessons of a domain in source order; empty for unknown domains.
    pub fn domain_lessons(&self, domain: DomainId) -> &[EntityId] {
        self.domain_lessons
            .get(&domain)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_metrics(&self, id: EntityId) -> GraphResult<&EntityMetrics> {
        self.metrics.get(&id).ok_or(GraphError::NotFound(id))
    }

    /// The config of a component as declared by its owning entity.
    pub fn component_config(&self, id: ComponentId) -> Option<&ComponentConfig> {
        let owner = self.component_owners.get(&id)?;
        self.entities
            .get(owner)?
            .components()
            .find(|c| c.id == id)
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    pub fn component_ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.component_types.keys().copied()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn domains(&self) -> impl Iterator<Item = &DomainDocument> {
        self.domains.values()
    }

    pub fn domain(&self, id: DomainId) -> Option<&DomainDocument> {
        self.domains.get(&id)
    }

    /// The curriculum document, verbatim.
    pub fn curriculum(&self) -> Option<&Value> {
        self.curriculum.as_ref()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn component_count(&self) -> usize {
        self.component_types.len()
    }
}
