use std::collections::BTreeSet;
use std::sync::Arc;

use mera_curriculum::CurriculumGraph;
use mera_merge::{MergeEngine, MergeError, MergeResult};
use mera_model::ComponentConfig;
use mera_types::{ComponentId, EntityId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};
use crate::progress::{ComponentProgress, LessonProgress};
use crate::store::{RemoteStore, Session};

/// Where and how lesson progress is stored in the pod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Container path relative to the pod root, with a trailing slash.
    pub container: String,
    /// Version written into every lesson document.
    pub schema_version: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            container: "private/mera-education/lessons/".to_string(),
            schema_version: "0.0.1".to_string(),
        }
    }
}

/// Result of one lesson sync.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    /// The document now stored in the pod.
    pub merged: LessonProgress,
    /// Components that could not be merged (unregistered type, or two
    /// different types with no live config to decide); their local value
    /// was kept.
    pub skipped: Vec<ComponentId>,
    /// Whether the pod already held a copy.
    pub remote_found: bool,
}

/// Reconciles local lesson progress with the copy in the learner's pod.
///
/// Each sync is fetch, merge, store. Two syncs of the same lesson running
/// at once can lose the first write; callers run at most one sync per
/// lesson at a time.
pub struct ProgressSync {
    store: Arc<dyn RemoteStore>,
    session: Session,
    engine: MergeEngine,
    graph: Arc<CurriculumGraph>,
    config: SyncConfig,
}

impl ProgressSync {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        session: Session,
        engine: MergeEngine,
        graph: Arc<CurriculumGraph>,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            session,
            engine,
            graph,
            config,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Pod location of a lesson's progress document.
    pub fn key_for(&self, lesson_id: EntityId) -> String {
        format!(
            "{}{}{}.json",
            self.session.pod_url, self.config.container, lesson_id
        )
    }

    /// Fresh progress for every component of a lesson, built by each
    /// type's initializer. Components of unregistered types are left out.
    pub fn initial_progress(&self, lesson_id: EntityId) -> SyncResult<LessonProgress> {
        let lesson = self
            .graph
            .entity(lesson_id)
            .ok_or(SyncError::UnknownLesson(lesson_id))?;

        let mut progress = LessonProgress::new(lesson_id, self.config.schema_version.clone());
        for config in lesson.components() {
            match self.engine.initialize(config) {
                Ok(initial) => progress.set(config.id, config.component_type.clone(), initial),
                Err(e) => warn!(component_id = %config.id, error = %e, "No initial progress for component"),
            }
        }
        Ok(progress)
    }

    /// Reads a lesson's stored progress. `None` when the pod has none yet.
    pub async fn load_lesson(&self, lesson_id: EntityId) -> SyncResult<Option<LessonProgress>> {
        let key = self.key_for(lesson_id);
        let Some(bytes) = self.store.fetch(&key).await? else {
            debug!(key = %key, "No stored progress");
            return Ok(None);
        };

        let stored: LessonProgress = serde_json::from_slice(&bytes)?;
        if stored.schema_version != self.config.schema_version {
            return Err(SyncError::UnsupportedSchema {
                found: stored.schema_version,
                expected: self.config.schema_version.clone(),
            });
        }
        if stored.lesson_id != lesson_id {
            return Err(SyncError::LessonMismatch {
                expected: lesson_id,
                found: stored.lesson_id,
            });
        }
        Ok(Some(stored))
    }

    /// Merges `local` with the pod's copy and writes the result back.
    ///
    /// The write replaces whatever the pod holds: the store itself is
    /// last-writer-wins, so a sync racing another device's sync of the same
    /// lesson can overwrite it. Run one sync per lesson at a time and sync
    /// again after a failure.
    pub async fn sync_lesson(&self, local: &LessonProgress) -> SyncResult<SyncOutcome> {
        let lesson_id = local.lesson_id;
        let remote = self.load_lesson(lesson_id).await?;
        let remote_found = remote.is_some();
        let remote = remote.unwrap_or_else(|| {
            LessonProgress::new(lesson_id, self.config.schema_version.clone())
        });

        let mut merged = LessonProgress::new(lesson_id, self.config.schema_version.clone());
        let mut skipped = Vec::new();

        let ids: BTreeSet<ComponentId> = local
            .components
            .keys()
            .chain(remote.components.keys())
            .copied()
            .collect();
        for id in ids {
            let local_side = local.component(id);
            let remote_side = remote.component(id);
            match self.reconcile_component(id, local_side, remote_side) {
                Ok(Some(progress)) => {
                    merged.components.insert(id, progress);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(component_id = %id, error = %e, "Component progress not merged; keeping local value");
                    skipped.push(id);
                    if let Some(kept) = local_side.or(remote_side) {
                        merged.components.insert(id, kept.clone());
                    }
                }
            }
        }

        let key = self.key_for(lesson_id);
        let bytes = serde_json::to_vec(&merged)?;
        self.store.store(&key, &bytes).await?;

        info!(
            lesson_id = %lesson_id,
            components = merged.components.len(),
            skipped = skipped.len(),
            remote_found,
            "Lesson progress synced"
        );
        Ok(SyncOutcome {
            merged,
            skipped,
            remote_found,
        })
    }

    /// Merges one component. With a live config the graph's type is
    /// authoritative: a side tagged with any other type is stale and is
    /// discarded, and what remains is repaired to the config. Without one,
    /// both sides must carry the same registered type.
    fn reconcile_component(
        &self,
        id: ComponentId,
        local: Option<&ComponentProgress>,
        remote: Option<&ComponentProgress>,
    ) -> MergeResult<Option<ComponentProgress>> {
        let Some(either) = local.or(remote) else {
            return Ok(None);
        };
        match self.graph.component_config(id) {
            Some(config) => self.reconcile_live(config, local, remote).map(Some),
            None => self.reconcile_orphan(id, local, remote, either).map(Some),
        }
    }

    fn reconcile_live(
        &self,
        config: &ComponentConfig,
        local: Option<&ComponentProgress>,
        remote: Option<&ComponentProgress>,
    ) -> MergeResult<ComponentProgress> {
        let progress = match (current_side(config, local, "local"), current_side(config, remote, "remote")) {
            (Some(l), Some(r)) => self.engine.reconcile(config, &l.progress, &r.progress)?,
            (Some(only), None) | (None, Some(only)) => {
                self.engine.repair(config, &only.progress)?.snapshot
            }
            (None, None) => self.engine.initialize(config)?,
        };
        Ok(ComponentProgress::new(config.component_type.clone(), progress))
    }

    fn reconcile_orphan(
        &self,
        id: ComponentId,
        local: Option<&ComponentProgress>,
        remote: Option<&ComponentProgress>,
        either: &ComponentProgress,
    ) -> MergeResult<ComponentProgress> {
        match (local, remote) {
            (Some(l), Some(r)) if l.component_type != r.component_type => {
                Err(MergeError::TypeMismatch {
                    component_id: id,
                    local: l.component_type.clone(),
                    remote: r.component_type.clone(),
                })
            }
            (Some(l), Some(r)) => {
                let progress = self.engine.merge(&l.component_type, &l.progress, &r.progress)?;
                Ok(ComponentProgress::new(l.component_type.clone(), progress))
            }
            _ => {
                if !self.engine.registry().contains(&either.component_type) {
                    return Err(MergeError::UnknownType(either.component_type.clone()));
                }
                Ok(either.clone())
            }
        }
    }
}

/// `side`, unless it was recorded under a type other than the live one.
fn current_side<'a>(
    config: &ComponentConfig,
    side: Option<&'a ComponentProgress>,
    origin: &str,
) -> Option<&'a ComponentProgress> {
    let side = side?;
    if side.component_type == config.component_type {
        return Some(side);
    }
    warn!(
        component_id = %config.id,
        origin,
        stored_type = %side.component_type,
        live_type = %config.component_type,
        "Discarding progress recorded under another type"
    );
    None
}
