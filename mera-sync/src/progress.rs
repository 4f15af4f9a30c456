use std::collections::BTreeMap;

use mera_curriculum::CurriculumGraph;
use mera_model::ProgressSnapshot;
use mera_types::{ComponentId, EntityId};
use serde::{Deserialize, Serialize};

/// Progress field that marks a component finished. Every built-in type
/// declares it.
pub const COMPLETE: &str = "complete";

/// Progress of one component inside a lesson document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentProgress {
    #[serde(rename = "type")]
    pub component_type: String,
    pub progress: ProgressSnapshot,
}

impl ComponentProgress {
    pub fn new(component_type: impl Into<String>, progress: ProgressSnapshot) -> Self {
        Self {
            component_type: component_type.into(),
            progress,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress.get_bool(COMPLETE) == Some(true)
    }
}

/// A learner's progress for one lesson, as stored in the pod: one JSON
/// document per lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonProgress {
    pub schema_version: String,
    pub lesson_id: EntityId,
    #[serde(default)]
    pub components: BTreeMap<ComponentId, ComponentProgress>,
}

impl LessonProgress {
    pub fn new(lesson_id: EntityId, schema_version: impl Into<String>) -> Self {
        Self {
            schema_version: schema_version.into(),
            lesson_id,
            components: BTreeMap::new(),
        }
    }

    pub fn component(&self, id: ComponentId) -> Option<&ComponentProgress> {
        self.components.get(&id)
    }

    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut ComponentProgress> {
        self.components.get_mut(&id)
    }

    pub fn set(&mut self, id: ComponentId, component_type: impl Into<String>, progress: ProgressSnapshot) {
        self.components
            .insert(id, ComponentProgress::new(component_type, progress));
    }

    /// Components whose `complete` flag is set, in id order.
    pub fn completed_components(&self) -> Vec<ComponentId> {
        self.components
            .iter()
            .filter(|(_, c)| c.is_complete())
            .map(|(id, _)| *id)
            .collect()
    }

    /// True when every component of the lesson, as the curriculum defines
    /// it now, is complete. Unknown lessons are never complete.
    pub fn is_lesson_complete(&self, graph: &CurriculumGraph) -> bool {
        let Some(lesson) = graph.entity(self.lesson_id) else {
            return false;
        };
        lesson
            .components()
            .all(|config| self.component(config.id).is_some_and(ComponentProgress::is_complete))
    }
}
