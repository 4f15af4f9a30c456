use std::sync::Arc;

use mera_curriculum::{Catalog, IntegrityValidator};
use mera_merge::MergeEngine;
use mera_model::{DocumentKind, ProgressSnapshot, SourceDocument};
use mera_sync::{
    LessonProgress, MemoryStore, ProgressSync, RemoteStore, Session, SyncConfig, SyncError,
};
use mera_types::{ComponentId, EntityId, HybridTimestamp};
use pretty_assertions::assert_eq;
use serde_json::json;

const LESSON: EntityId = EntityId::new(10);

fn cid(id: u64) -> ComponentId {
    ComponentId::new(id).unwrap()
}

fn catalog(checkboxes: usize) -> Catalog {
    let boxes: Vec<_> = (0..checkboxes)
        .map(|i| json!({"content": format!("step {i}"), "required": true}))
        .collect();
    let lesson = SourceDocument::new(
        "lessons/10.json",
        DocumentKind::Lesson,
        json!({
            "metadata": {"id": 10, "title": "Updates", "domainId": 7},
            "pages": [{"components": [
                {
                    "id": 501, "type": "basic_task", "accessibilityLabel": "Update task",
                    "order": 100, "title": "Update", "description": "Install updates",
                    "checkboxes": boxes
                },
                {
                    "id": 502, "type": "multiple_choice", "accessibilityLabel": "Update quiz",
                    "order": 200, "question": "When should you update?",
                    "options": ["Now", "Never"], "correctIndex": 0
                }
            ]}]
        }),
    );
    IntegrityValidator::builtin().validate([lesson]).unwrap()
}

fn sync_with(store: Arc<MemoryStore>, catalog: &Catalog) -> ProgressSync {
    ProgressSync::new(
        store,
        Session::new("https://learner.pod.example", "token"),
        MergeEngine::new(catalog.registry.clone()),
        catalog.graph.clone(),
        SyncConfig::default(),
    )
}

#[test]
fn key_layout() {
    let catalog = catalog(2);
    let sync = sync_with(Arc::new(MemoryStore::new()), &catalog);
    assert_eq!(
        sync.key_for(LESSON),
        "https://learner.pod.example/private/mera-education/lessons/10.json"
    );
}

#[test]
fn initial_progress_covers_every_component() {
    let catalog = catalog(2);
    let sync = sync_with(Arc::new(MemoryStore::new()), &catalog);
    let progress = sync.initial_progress(LESSON).unwrap();

    assert_eq!(progress.schema_version, "0.0.1");
    assert_eq!(progress.components.len(), 2);
    let task = progress.component(cid(501)).unwrap();
    assert_eq!(task.component_type, "basic_task");
    assert_eq!(task.progress.get_bool_list("checkbox_checked"), Some(vec![false, false]));
    assert!(progress.completed_components().is_empty());

    assert!(matches!(
        sync.initial_progress(EntityId::new(99)),
        Err(SyncError::UnknownLesson(id)) if id == EntityId::new(99)
    ));
}

#[tokio::test]
async fn first_sync_stores_local_copy() {
    let catalog = catalog(2);
    let store = Arc::new(MemoryStore::new());
    let sync = sync_with(store.clone(), &catalog);
    let local = sync.initial_progress(LESSON).unwrap();

    let outcome = sync.sync_lesson(&local).await.unwrap();
    assert!(!outcome.remote_found);
    assert!(outcome.skipped.is_empty());
    assert_eq!(outcome.merged, local);

    assert_eq!(store.keys().await, vec![sync.key_for(LESSON)]);
    assert_eq!(sync.load_lesson(LESSON).await.unwrap(), Some(local));
}

#[tokio::test]
async fn two_devices_converge() {
    let catalog = catalog(2);
    let store = Arc::new(MemoryStore::new());
    let sync = sync_with(store.clone(), &catalog);

    // Phone ticks the first box, laptop the second and answers the quiz.
    let mut phone = sync.initial_progress(LESSON).unwrap();
    phone.component_mut(cid(501)).unwrap().progress.set_bool_list("checkbox_checked", &[true, false]);

    let mut laptop = sync.initial_progress(LESSON).unwrap();
    laptop.component_mut(cid(501)).unwrap().progress.set_bool_list("checkbox_checked", &[false, true]);
    laptop
        .component_mut(cid(502))
        .unwrap()
        .progress
        .set_stamped("selected", json!(0), HybridTimestamp::new(1_000, 0));

    sync.sync_lesson(&phone).await.unwrap();
    let outcome = sync.sync_lesson(&laptop).await.unwrap();
    assert!(outcome.remote_found);

    let task = outcome.merged.component(cid(501)).unwrap();
    assert_eq!(task.progress.get_bool_list("checkbox_checked"), Some(vec![true, true]));
    let quiz = outcome.merged.component(cid(502)).unwrap();
    assert_eq!(quiz.progress.get_stamped("selected").unwrap().value, json!(0));

    // Syncing the phone again pulls the laptop's work.
    let again = sync.sync_lesson(&phone).await.unwrap();
    assert_eq!(again.merged, outcome.merged);
}

#[tokio::test]
async fn completion_is_never_lost() {
    let catalog = catalog(1);
    let store = Arc::new(MemoryStore::new());
    let sync = sync_with(store.clone(), &catalog);

    let mut done = sync.initial_progress(LESSON).unwrap();
    for id in [cid(501), cid(502)] {
        done.component_mut(id).unwrap().progress.set_bool("complete", true);
    }
    done.component_mut(cid(501)).unwrap().progress.set_bool_list("checkbox_checked", &[true]);
    sync.sync_lesson(&done).await.unwrap();

    let stale = sync.initial_progress(LESSON).unwrap();
    let outcome = sync.sync_lesson(&stale).await.unwrap();
    assert_eq!(outcome.merged.completed_components(), vec![cid(501), cid(502)]);
    assert!(outcome.merged.is_lesson_complete(&catalog.graph));
}

#[tokio::test]
async fn stored_progress_is_repaired_to_live_config() {
    let store = Arc::new(MemoryStore::new());

    // Written when the task had three checkboxes.
    let old_catalog = catalog(3);
    let old = sync_with(store.clone(), &old_catalog);
    let mut written = old.initial_progress(LESSON).unwrap();
    written
        .component_mut(cid(501))
        .unwrap()
        .progress
        .set_bool_list("checkbox_checked", &[true, false, true]);
    old.sync_lesson(&written).await.unwrap();

    // Content now has two.
    let new_catalog = catalog(2);
    let new = sync_with(store.clone(), &new_catalog);
    let local = new.initial_progress(LESSON).unwrap();
    let outcome = new.sync_lesson(&local).await.unwrap();

    let task = outcome.merged.component(cid(501)).unwrap();
    assert_eq!(task.progress.get_bool_list("checkbox_checked"), Some(vec![true, false]));
}

#[tokio::test]
async fn unknown_types_keep_local_value() {
    let catalog = catalog(1);
    let store = Arc::new(MemoryStore::new());
    let sync = sync_with(store.clone(), &catalog);

    let mut local = sync.initial_progress(LESSON).unwrap();
    let retired = ProgressSnapshot::new().with_bool("complete", true);
    local.set(cid(900), "essay", retired.clone());

    let outcome = sync.sync_lesson(&local).await.unwrap();
    assert_eq!(outcome.skipped, vec![cid(900)]);
    assert_eq!(outcome.merged.component(cid(900)).unwrap().progress, retired);
}

#[tokio::test]
async fn stale_type_tag_never_clears_progress() {
    let catalog = catalog(2);
    let stale = ProgressSnapshot::new().with_bool("complete", false);

    // The stale tag on either side must give the same result.
    for stale_is_local in [true, false] {
        let store = Arc::new(MemoryStore::new());
        let sync = sync_with(store.clone(), &catalog);

        let mut checked = sync.initial_progress(LESSON).unwrap();
        checked.component_mut(cid(501)).unwrap().progress.set_bool_list("checkbox_checked", &[true, true]);
        let mut retagged = sync.initial_progress(LESSON).unwrap();
        retagged.set(cid(501), "text", stale.clone());

        let (first, second) = if stale_is_local {
            (checked, retagged)
        } else {
            (retagged, checked)
        };
        sync.sync_lesson(&first).await.unwrap();
        let outcome = sync.sync_lesson(&second).await.unwrap();

        assert!(outcome.skipped.is_empty());
        let task = outcome.merged.component(cid(501)).unwrap();
        assert_eq!(task.component_type, "basic_task");
        assert_eq!(task.progress.get_bool_list("checkbox_checked"), Some(vec![true, true]));
        assert_eq!(sync.load_lesson(LESSON).await.unwrap(), Some(outcome.merged));
    }
}

#[tokio::test]
async fn disagreeing_types_without_live_config_are_skipped() {
    let catalog = catalog(1);
    let store = Arc::new(MemoryStore::new());
    let sync = sync_with(store.clone(), &catalog);

    let mut pod = sync.initial_progress(LESSON).unwrap();
    pod.set(cid(900), "multiple_choice", ProgressSnapshot::new());
    sync.sync_lesson(&pod).await.unwrap();

    let mut local = sync.initial_progress(LESSON).unwrap();
    let mine = ProgressSnapshot::new().with_bool("complete", true);
    local.set(cid(900), "text", mine.clone());
    let outcome = sync.sync_lesson(&local).await.unwrap();

    assert_eq!(outcome.skipped, vec![cid(900)]);
    let kept = outcome.merged.component(cid(900)).unwrap();
    assert_eq!(kept.component_type, "text");
    assert_eq!(kept.progress, mine);
}

#[tokio::test]
async fn unsupported_schema_is_rejected() {
    let catalog = catalog(1);
    let store = Arc::new(MemoryStore::new());
    let sync = sync_with(store.clone(), &catalog);

    let future = LessonProgress::new(LESSON, "9.0.0");
    store
        .store(&sync.key_for(LESSON), &serde_json::to_vec(&future).unwrap())
        .await
        .unwrap();

    let err = sync.load_lesson(LESSON).await.unwrap_err();
    assert!(matches!(err, SyncError::UnsupportedSchema { found, .. } if found == "9.0.0"));
}

#[tokio::test]
async fn memory_store_round_trip() {
    let store = MemoryStore::new();
    assert!(store.is_empty().await);
    assert_eq!(store.fetch("a").await.unwrap(), None);
    store.store("a", b"one").await.unwrap();
    store.store("a", b"two").await.unwrap();
    assert_eq!(store.fetch("a").await.unwrap(), Some(b"two".to_vec()));
    assert_eq!(store.len().await, 1);
}
