use mera_curriculum::{CurriculumGraphBuilder, DiagnosticKind, GraphError};
use mera_model::{DocumentKind, SourceDocument};
use mera_types::{ComponentId, DomainId, EntityId};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn task(id: u64, order: i64) -> Value {
    json!({
        "id": id,
        "type": "basic_task",
        "accessibilityLabel": "Update your software",
        "order": order,
        "title": "Update",
        "description": "Install pending updates",
        "checkboxes": [{"content": "Open settings", "required": true}]
    })
}

fn lesson(source: &str, id: u64, domain: Option<u64>, components: Vec<Value>) -> SourceDocument {
    let mut metadata = json!({"id": id, "title": format!("Lesson {id}")});
    if let Some(domain) = domain {
        metadata["domainId"] = json!(domain);
    }
    SourceDocument::new(
        source,
        DocumentKind::Lesson,
        json!({"metadata": metadata, "pages": [{"components": components}]}),
    )
}

fn cid(id: u64) -> ComponentId {
    ComponentId::new(id).unwrap()
}

fn kinds(diagnostics: &[mera_curriculum::Diagnostic]) -> Vec<DiagnosticKind> {
    diagnostics.iter().map(|d| d.kind).collect()
}

// ── Acceptance scenarios ─────────────────────────────────────────

#[test]
fn shared_component_with_same_type_builds() {
    let (graph, diagnostics) = CurriculumGraphBuilder::from_documents([
        lesson("lessons/a.json", 1, None, vec![task(501, 100)]),
        lesson("lessons/b.json", 2, None, vec![task(501, 100)]),
    ]);

    assert!(diagnostics.iter().all(|d| !d.is_fatal()));
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::AmbiguousOwnership]);
    assert_eq!(graph.component_type(cid(501)), Some("basic_task"));
    assert_eq!(graph.owning_entity(cid(501)), Some(EntityId::new(1)));
}

#[test]
fn conflicting_component_type_names_both_sources() {
    let mut quiz = task(501, 100);
    quiz["type"] = json!("multiple_choice");
    let (graph, diagnostics) = CurriculumGraphBuilder::from_documents([
        lesson("lessons/a.json", 1, None, vec![task(501, 100)]),
        lesson("lessons/b.json", 2, None, vec![quiz]),
    ]);

    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::TypeConflict]);
    let conflict = &diagnostics[0];
    assert!(conflict.is_fatal());
    assert_eq!(conflict.sources, vec!["lessons/a.json", "lessons/b.json"]);
    assert_eq!(conflict.component_id, Some(cid(501)));
    // First declaration stays canonical.
    assert_eq!(graph.component_type(cid(501)), Some("basic_task"));
}

#[test]
fn domain_lessons_keep_source_order() {
    let (graph, diagnostics) = CurriculumGraphBuilder::from_documents([
        lesson("lessons/10.json", 10, Some(7), vec![task(1, 100)]),
        lesson("lessons/11.json", 11, Some(7), vec![task(2, 100)]),
        lesson("lessons/12.json", 12, Some(7), vec![task(3, 100)]),
    ]);

    assert!(diagnostics.is_empty());
    assert_eq!(
        graph.domain_lessons(DomainId::new(7)),
        &[EntityId::new(10), EntityId::new(11), EntityId::new(12)]
    );
    assert!(graph.domain_lessons(DomainId::new(8)).is_empty());
}

// ── Identifiers ──────────────────────────────────────────────────

#[test]
fn duplicate_entity_id_keeps_first() {
    let (graph, diagnostics) = CurriculumGraphBuilder::from_documents([
        lesson("lessons/a.json", 1, None, vec![task(501, 100)]),
        lesson("lessons/b.json", 1, None, vec![task(502, 100)]),
    ]);

    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::DuplicateIdentifier]);
    assert_eq!(diagnostics[0].sources, vec!["lessons/a.json", "lessons/b.json"]);
    assert_eq!(graph.entity(EntityId::new(1)).unwrap().source, "lessons/a.json");
    assert!(!graph.has_component(cid(502)));
}

#[test]
fn lessons_and_menus_share_one_namespace() {
    let menu = SourceDocument::new(
        "menus/main.json",
        DocumentKind::Menu,
        json!({"metadata": {"id": 1, "title": "Main"}, "pages": []}),
    );
    let (_, diagnostics) = CurriculumGraphBuilder::from_documents([
        lesson("lessons/a.json", 1, None, vec![]),
        menu,
    ]);
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::DuplicateIdentifier]);
}

#[test]
fn component_repeated_within_entity_is_fatal() {
    let (_, diagnostics) = CurriculumGraphBuilder::from_documents([lesson(
        "lessons/a.json",
        1,
        None,
        vec![task(501, 100), task(501, 200)],
    )]);
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::DuplicateIdentifier]);
    assert!(diagnostics[0].is_fatal());
}

#[test]
fn metadata_without_id_is_skipped() {
    let doc = SourceDocument::new(
        "lessons/draft.json",
        DocumentKind::Lesson,
        json!({"metadata": {"title": "Draft"}, "pages": [{"components": [task(9, 100)]}]}),
    );
    let (graph, diagnostics) = CurriculumGraphBuilder::from_documents([doc]);
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::MalformedDocument]);
    assert!(!diagnostics[0].is_fatal());
    assert_eq!(graph.entity_count(), 0);
    assert!(!graph.has_component(cid(9)));
}

#[test]
fn mistyped_metadata_field_keeps_entity_and_its_components() {
    let mut text = task(501, 100);
    text["type"] = json!("text");
    let doc = SourceDocument::new(
        "lessons/b.json",
        DocumentKind::Lesson,
        json!({
            "metadata": {"id": 2, "title": "Backups", "domainId": 7, "estimatedMinutes": "ten"},
            "pages": [{"components": [text]}]
        }),
    );
    let (graph, diagnostics) = CurriculumGraphBuilder::from_documents([
        lesson("lessons/a.json", 1, None, vec![task(501, 100)]),
        doc,
    ]);

    assert_eq!(
        kinds(&diagnostics),
        vec![DiagnosticKind::InvalidMetadata, DiagnosticKind::TypeConflict]
    );
    assert!(diagnostics.iter().all(|d| d.is_fatal()));
    assert!(diagnostics[0].message.contains("estimatedMinutes"));

    let entity = graph.entity(EntityId::new(2)).unwrap();
    assert_eq!(entity.metadata.title, "Backups");
    assert_eq!(entity.metadata.domain_id, Some(DomainId::new(7)));
    assert_eq!(entity.metadata.estimated_minutes, 0);
    assert_eq!(graph.domain_lessons(DomainId::new(7)), &[EntityId::new(2)]);
}

#[test]
fn duplicate_entity_components_are_still_type_checked() {
    let mut text = task(501, 100);
    text["type"] = json!("text");
    let (graph, diagnostics) = CurriculumGraphBuilder::from_documents([
        lesson("lessons/a.json", 1, None, vec![task(501, 100)]),
        lesson("lessons/b.json", 1, None, vec![text, task(777, 200)]),
    ]);

    assert_eq!(
        kinds(&diagnostics),
        vec![DiagnosticKind::DuplicateIdentifier, DiagnosticKind::TypeConflict]
    );
    assert_eq!(diagnostics[1].sources, vec!["lessons/a.json", "lessons/b.json"]);
    assert_eq!(graph.component_type(cid(501)), Some("basic_task"));
    assert!(!graph.has_component(cid(777)));
}

// ── Components ───────────────────────────────────────────────────

#[test]
fn component_without_type_is_skipped() {
    let (graph, diagnostics) = CurriculumGraphBuilder::from_documents([lesson(
        "lessons/a.json",
        1,
        None,
        vec![json!({"id": 5, "order": 100}), task(6, 200)],
    )]);
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::MalformedDocument]);
    assert!(!graph.has_component(cid(5)));
    assert!(graph.has_component(cid(6)));
}

#[test]
fn out_of_range_component_id_is_invalid() {
    let (graph, diagnostics) = CurriculumGraphBuilder::from_documents([lesson(
        "lessons/a.json",
        1,
        None,
        vec![task(1_000_000_000_000, 100)],
    )]);
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::InvalidComponentConfig]);
    assert_eq!(graph.component_count(), 0);
}

#[test]
fn sibling_order_must_increase() {
    let (graph, diagnostics) = CurriculumGraphBuilder::from_documents([lesson(
        "lessons/a.json",
        1,
        None,
        vec![task(1, 200), task(2, 100)],
    )]);
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::InvalidComponentConfig]);
    assert_eq!(diagnostics[0].component_id, Some(cid(2)));
    // Still indexed; the release is blocked by the diagnostic.
    assert!(graph.has_component(cid(2)));
}

// ── Queries ──────────────────────────────────────────────────────

#[test]
fn metrics_and_defaults() {
    let doc = SourceDocument::new(
        "lessons/a.json",
        DocumentKind::Lesson,
        json!({
            "metadata": {"id": 3},
            "pages": [
                {"components": [task(1, 100), task(2, 200)]},
                {"components": [task(3, 100)]}
            ]
        }),
    );
    let (graph, _) = CurriculumGraphBuilder::from_documents([doc]);
    let id = EntityId::new(3);

    assert_eq!(graph.entity_page_count(id), Ok(2));
    let metrics = graph.entity_metrics(id).unwrap();
    assert_eq!(metrics.component_count, 3);
    assert_eq!(metrics.title, "");
    assert_eq!(metrics.difficulty, "beginner");

    let entity = graph.entity(id).unwrap();
    assert_eq!(entity.metadata.estimated_minutes, 0);
    assert!(entity.metadata.required);
    assert_eq!(graph.component_config(cid(3)).unwrap().order, 100);
}

#[test]
fn page_count_of_unknown_entity_is_not_found() {
    let (graph, _) = CurriculumGraphBuilder::from_documents(Vec::<SourceDocument>::new());
    assert_eq!(
        graph.entity_page_count(EntityId::new(99)),
        Err(GraphError::NotFound(EntityId::new(99)))
    );
}

#[test]
fn menus_never_join_domains() {
    let menu = SourceDocument::new(
        "menus/main.json",
        DocumentKind::Menu,
        json!({"metadata": {"id": 50, "domainId": 7}, "pages": []}),
    );
    let (graph, _) = CurriculumGraphBuilder::from_documents([menu]);
    assert!(graph.domain_lessons(DomainId::new(7)).is_empty());
    assert!(graph.has_entity(EntityId::new(50)));
}

// ── Domains and curriculum ───────────────────────────────────────

#[test]
fn undeclared_domain_is_warned_when_domains_exist() {
    let domain = SourceDocument::new(
        "domains/7.json",
        DocumentKind::Domain,
        json!({"id": 7, "title": "Security", "color": "teal"}),
    );
    let (graph, diagnostics) = CurriculumGraphBuilder::from_documents([
        lesson("lessons/a.json", 1, Some(7), vec![]),
        lesson("lessons/b.json", 2, Some(9), vec![]),
        domain,
    ]);
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::UnknownDomain]);
    assert_eq!(diagnostics[0].entity_id, Some(EntityId::new(2)));
    let security = graph.domain(DomainId::new(7)).unwrap();
    assert_eq!(security.extra.get("color"), Some(&json!("teal")));
}

#[test]
fn curriculum_is_kept_verbatim() {
    let body = json!({"tracks": [{"name": "Basics", "lessons": [1, 2]}]});
    let (graph, diagnostics) = CurriculumGraphBuilder::from_documents([
        SourceDocument::new("curriculum/main.json", DocumentKind::Curriculum, body.clone()),
        SourceDocument::new("curriculum/old.json", DocumentKind::Curriculum, json!({})),
    ]);
    assert_eq!(graph.curriculum(), Some(&body));
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::MalformedDocument]);
}
