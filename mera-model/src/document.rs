//! Content documents: lessons, menus, domains and the curriculum.

use mera_types::{DomainId, EntityId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ComponentConfig;

/// Kind of a top-level entity. Lessons and menus share one id namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Lesson,
    Menu,
}

/// Kind of a content source, decided by where the file lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Lesson,
    Menu,
    Domain,
    Curriculum,
}

impl DocumentKind {
    /// The entity kind for lesson and menu sources; `None` otherwise.
    pub fn entity_kind(self) -> Option<EntityKind> {
        match self {
            Self::Lesson => Some(EntityKind::Lesson),
            Self::Menu => Some(EntityKind::Menu),
            Self::Domain | Self::Curriculum => None,
        }
    }
}

/// A raw content document tagged with its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    /// Where the document came from (a relative path for file sources).
    pub source: String,
    pub kind: DocumentKind,
    pub body: Value,
}

impl SourceDocument {
    pub fn new(source: impl Into<String>, kind: DocumentKind, body: Value) -> Self {
        Self {
            source: source.into(),
            kind,
            body,
        }
    }
}

fn default_difficulty() -> String {
    "beginner".to_string()
}

fn default_required() -> bool {
    true
}

/// The `metadata` block of a lesson or menu document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub title: String,
    /// Only meaningful for lessons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<DomainId>,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default)]
    pub estimated_minutes: u32,
    #[serde(default = "default_required")]
    pub required: bool,
}

impl EntityMetadata {
    /// Metadata carrying only an id; every other field takes its default.
    pub fn new(id: EntityId) -> Self {
        Self {
            id: Some(id),
            title: String::new(),
            domain_id: None,
            difficulty: default_difficulty(),
            estimated_minutes: 0,
            required: default_required(),
        }
    }
}

/// One page of an entity: an ordered list of components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub components: Vec<ComponentConfig>,
}

/// A fully decoded lesson or menu document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
    pub metadata: EntityMetadata,
    #[serde(default)]
    pub pages: Vec<Page>,
}

/// A validated lesson or menu inside the curriculum graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: EntityId,
    pub entity_type: EntityKind,
    pub source: String,
    pub metadata: EntityMetadata,
    pub pages: Vec<Page>,
}

impl Entity {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn component_count(&self) -> usize {
        self.pages.iter().map(|p| p.components.len()).sum()
    }

    /// Iterates every component in page order.
    pub fn components(&self) -> impl Iterator<Item = &ComponentConfig> {
        self.pages.iter().flat_map(|p| p.components.iter())
    }

    /// The domain this entity belongs to; always `None` for menus.
    pub fn domain_id(&self) -> Option<DomainId> {
        match self.entity_type {
            EntityKind::Lesson => self.metadata.domain_id,
            EntityKind::Menu => None,
        }
    }
}

/// A domain document. Only `id` is interpreted; the rest is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainDocument {
    pub id: DomainId,
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
