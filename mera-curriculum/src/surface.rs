//! The generated query surface: a serializable snapshot of a validated
//! catalog for consumers that cannot link this crate (the web build, page
//! templates).

use std::collections::BTreeMap;

use mera_model::{
    ConfigField, DomainDocument, EntityKind, EntityMetadata, FieldShape, Reducer, ReducerKind,
};
use mera_registry::TypeRegistry;
use mera_types::{ComponentId, DomainId, EntityId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::graph::{CurriculumGraph, EntityMetrics};
use crate::validator::Catalog;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySurface {
    pub types: Vec<TypeSummary>,
    pub entity_ids: Vec<EntityId>,
    pub component_ids: Vec<ComponentId>,
    pub component_types: BTreeMap<ComponentId, String>,
    pub component_owners: BTreeMap<ComponentId, EntityId>,
    pub domain_lessons: BTreeMap<DomainId, Vec<EntityId>>,
    pub entity_metrics: BTreeMap<EntityId, EntityMetrics>,
    pub entities: BTreeMap<EntityId, EntitySummary>,
    pub domains: Vec<DomainDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curriculum: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSummary {
    pub name: String,
    pub config_fields: Vec<ConfigField>,
    pub progress_fields: Vec<ProgressFieldSummary>,
    pub has_validator: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressFieldSummary {
    pub name: String,
    pub shape: FieldShape,
    pub reducer: ReducerKind,
    /// Name of a custom reducer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySummary {
    pub entity_type: EntityKind,
    pub source: String,
    pub metadata: EntityMetadata,
}

impl QuerySurface {
    pub fn new(registry: &TypeRegistry, graph: &CurriculumGraph) -> Self {
        let types = registry
            .descriptors()
            .map(|descriptor| {
                let schema = &descriptor.progress_schema;
                let progress_fields = schema
                    .fields
                    .iter()
                    .filter_map(|field| {
                        let reducer = schema.reducer(&field.name)?;
                        Some(ProgressFieldSummary {
                            name: field.name.clone(),
                            shape: field.shape.clone(),
                            reducer: reducer.kind(),
                            custom: match reducer {
                                Reducer::Custom(custom) => Some(custom.name.clone()),
                                _ => None,
                            },
                        })
                    })
                    .collect();
                TypeSummary {
                    name: descriptor.type_name.clone(),
                    config_fields: descriptor.config_schema.fields.clone(),
                    progress_fields,
                    has_validator: descriptor.validator.is_some(),
                }
            })
            .collect();

        Self {
            types,
            entity_ids: graph.entity_ids().collect(),
            component_ids: graph.component_ids().collect(),
            component_types: graph.component_types.clone(),
            component_owners: graph.component_owners.clone(),
            domain_lessons: graph.domain_lessons.clone(),
            entity_metrics: graph.metrics.clone(),
            entities: graph
                .entities()
                .map(|e| {
                    (
                        e.id,
                        EntitySummary {
                            entity_type: e.entity_type,
                            source: e.source.clone(),
                            metadata: e.metadata.clone(),
                        },
                    )
                })
                .collect(),
            domains: graph.domains().cloned().collect(),
            curriculum: graph.curriculum().cloned(),
        }
    }

    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self::new(&catalog.registry, &catalog.graph)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
