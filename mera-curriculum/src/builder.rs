use std::collections::{BTreeMap, BTreeSet};

use mera_model::{
    ComponentConfig, DocumentKind, DomainDocument, Entity, EntityKind, EntityMetadata, Page,
    SourceDocument,
};
use mera_types::{ComponentId, DomainId, EntityId};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::graph::{CurriculumGraph, EntityMetrics};

/// Indexes content documents into a [`CurriculumGraph`].
///
/// Documents are ingested one at a time in the order given; the first
/// occurrence of an identifier wins and every later clash is recorded as a
/// diagnostic rather than aborting the build. The builder knows nothing
/// about component types beyond their tags: checking tags against the
/// registry is the validator's job.
#[derive(Debug, Default)]
pub struct CurriculumGraphBuilder {
    graph: CurriculumGraph,
    component_sources: BTreeMap<ComponentId, String>,
    domain_sources: BTreeMap<DomainId, String>,
    curriculum_source: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl CurriculumGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingests every document in order and builds the graph.
    pub fn from_documents(
        documents: impl IntoIterator<Item = SourceDocument>,
    ) -> (CurriculumGraph, Vec<Diagnostic>) {
        let mut builder = Self::new();
        for document in documents {
            builder.ingest(document);
        }
        builder.build()
    }

    pub fn ingest(&mut self, document: SourceDocument) {
        match document.kind {
            DocumentKind::Lesson => self.ingest_entity(EntityKind::Lesson, document),
            DocumentKind::Menu => self.ingest_entity(EntityKind::Menu, document),
            DocumentKind::Domain => self.ingest_domain(document),
            DocumentKind::Curriculum => self.ingest_curriculum(document),
        }
    }

    /// Diagnostics recorded so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Finishes the graph and returns it with every diagnostic.
    pub fn build(mut self) -> (CurriculumGraph, Vec<Diagnostic>) {
        if !self.graph.domains.is_empty() {
            let mut orphans = Vec::new();
            for (domain, lessons) in &self.graph.domain_lessons {
                if self.graph.domains.contains_key(domain) {
                    continue;
                }
                for lesson in lessons {
                    let source = self
                        .graph
                        .entities
                        .get(lesson)
                        .map(|e| e.source.clone())
                        .unwrap_or_default();
                    orphans.push(
                        Diagnostic::new(
                            DiagnosticKind::UnknownDomain,
                            format!("lesson {lesson} belongs to undeclared domain {domain}"),
                        )
                        .with_source(source)
                        .for_entity(*lesson),
                    );
                }
            }
            for diagnostic in orphans {
                self.report(diagnostic);
            }
        }

        info!(
            entities = self.graph.entities.len(),
            components = self.graph.component_types.len(),
            domains = self.graph.domains.len(),
            diagnostics = self.diagnostics.len(),
            "Curriculum graph built"
        );
        (self.graph, self.diagnostics)
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        debug!(kind = %diagnostic.kind, sources = ?diagnostic.sources, "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    fn malformed(&mut self, source: &str, message: impl Into<String>) {
        self.report(Diagnostic::new(DiagnosticKind::MalformedDocument, message).with_source(source));
    }

    // ── Lessons and menus ────────────────────────────────────────

    fn ingest_entity(&mut self, kind: EntityKind, document: SourceDocument) {
        let SourceDocument { source, body, .. } = document;

        let raw = match body.get("metadata") {
            Some(Value::Object(raw)) => raw,
            Some(_) => {
                self.malformed(&source, "metadata must be a mapping");
                return;
            }
            None => {
                self.malformed(&source, "document has no metadata block");
                return;
            }
        };
        let id = match raw.get("id").filter(|v| !v.is_null()).cloned() {
            None => {
                self.malformed(&source, "metadata has no id; document skipped");
                return;
            }
            Some(raw_id) => match serde_json::from_value::<EntityId>(raw_id) {
                Ok(id) => id,
                Err(e) => {
                    self.malformed(&source, format!("metadata id is unreadable: {e}; document skipped"));
                    return;
                }
            },
        };
        let metadata = self.decode_metadata(id, &source, raw);

        if let Some(first) = self.graph.entities.get(&id).map(|e| e.source.clone()) {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::DuplicateIdentifier,
                    format!("entity id {id} is declared in {first} and again in {source}"),
                )
                .with_source(first)
                .with_source(source.clone())
                .for_entity(id),
            );
            // Components of the dropped copy are still checked for type
            // conflicts, but never indexed.
            self.ingest_pages(id, &source, &body, false);
            return;
        }

        let pages = self.ingest_pages(id, &source, &body, true);

        if kind == EntityKind::Lesson {
            if let Some(domain) = metadata.domain_id {
                self.graph.domain_lessons.entry(domain).or_default().push(id);
            }
        }

        let entity = Entity {
            id,
            entity_type: kind,
            source,
            metadata,
            pages,
        };
        debug!(
            entity_id = %id,
            kind = ?kind,
            pages = entity.page_count(),
            components = entity.component_count(),
            "Entity indexed"
        );
        self.graph.metrics.insert(id, EntityMetrics::of(&entity));
        self.graph.entities.insert(id, entity);
    }

    /// Decodes identified metadata field by field. A field of the wrong
    /// shape is reported and falls back to its default, so the entity's
    /// components still go through the global checks.
    fn decode_metadata(
        &mut self,
        id: EntityId,
        source: &str,
        raw: &Map<String, Value>,
    ) -> EntityMetadata {
        if let Ok(metadata) = serde_json::from_value::<EntityMetadata>(Value::Object(raw.clone())) {
            return metadata;
        }

        let mut metadata = EntityMetadata::new(id);
        let mut accepted = Map::new();
        accepted.insert("id".to_string(), Value::from(id.get()));
        for (key, value) in raw.iter().filter(|(key, _)| key.as_str() != "id") {
            let mut trial = accepted.clone();
            trial.insert(key.clone(), value.clone());
            match serde_json::from_value::<EntityMetadata>(Value::Object(trial.clone())) {
                Ok(decoded) => {
                    metadata = decoded;
                    accepted = trial;
                }
                Err(e) => self.report(
                    Diagnostic::new(
                        DiagnosticKind::InvalidMetadata,
                        format!("entity {id}: metadata field '{key}' is unreadable: {e}"),
                    )
                    .with_source(source)
                    .for_entity(id),
                ),
            }
        }
        metadata
    }

    fn ingest_pages(
        &mut self,
        entity_id: EntityId,
        source: &str,
        body: &Value,
        record: bool,
    ) -> Vec<Page> {
        let raw_pages = match body.get("pages") {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::Array(pages)) => pages,
            Some(_) => {
                self.malformed(source, format!("entity {entity_id}: pages must be a list"));
                return Vec::new();
            }
        };

        let mut seen = BTreeSet::new();
        let mut pages = Vec::with_capacity(raw_pages.len());
        for (page, raw) in raw_pages.iter().enumerate() {
            pages.push(self.ingest_page(entity_id, source, page, raw, &mut seen, record));
        }
        pages
    }

    fn ingest_page(
        &mut self,
        entity_id: EntityId,
        source: &str,
        index: usize,
        raw: &Value,
        seen: &mut BTreeSet<ComponentId>,
        record: bool,
    ) -> Page {
        let raw_components = match raw.get("components") {
            None | Some(Value::Null) => return Page::default(),
            Some(Value::Array(components)) => components,
            Some(_) => {
                self.malformed(
                    source,
                    format!("entity {entity_id} page {index}: components must be a list"),
                );
                return Page::default();
            }
        };

        let mut components = Vec::with_capacity(raw_components.len());
        let mut previous_order: Option<i64> = None;
        for raw in raw_components {
            let Some(config) = self.decode_component(entity_id, source, index, raw) else {
                continue;
            };

            if !seen.insert(config.id) {
                self.report(
                    Diagnostic::new(
                        DiagnosticKind::DuplicateIdentifier,
                        format!("component {} appears twice in entity {entity_id}", config.id),
                    )
                    .with_source(source)
                    .for_entity(entity_id)
                    .for_component(config.id),
                );
                continue;
            }

            if let Some(previous) = previous_order {
                if config.order <= previous {
                    self.report(
                        Diagnostic::new(
                            DiagnosticKind::InvalidComponentConfig,
                            format!(
                                "component {} order {} does not follow {previous} on page {index}",
                                config.id, config.order
                            ),
                        )
                        .with_source(source)
                        .for_entity(entity_id)
                        .for_component(config.id),
                    );
                }
            }
            previous_order = Some(config.order);

            if record {
                self.record_component(entity_id, source, &config);
            } else {
                self.check_component_type(entity_id, source, &config);
            }
            components.push(config);
        }
        Page { components }
    }

    fn decode_component(
        &mut self,
        entity_id: EntityId,
        source: &str,
        page: usize,
        raw: &Value,
    ) -> Option<ComponentConfig> {
        let present = |key: &str| raw.get(key).is_some_and(|v| !v.is_null());
        if !present("id") || !present("type") {
            self.malformed(
                source,
                format!("entity {entity_id} page {page}: component without id or type skipped"),
            );
            return None;
        }

        match serde_json::from_value::<ComponentConfig>(raw.clone()) {
            Ok(config) => Some(config),
            Err(e) => {
                let mut diagnostic = Diagnostic::new(
                    DiagnosticKind::InvalidComponentConfig,
                    format!("entity {entity_id} page {page}: component cannot be decoded: {e}"),
                )
                .with_source(source)
                .for_entity(entity_id);
                if let Some(id) = raw
                    .get("id")
                    .and_then(Value::as_u64)
                    .and_then(|id| ComponentId::new(id).ok())
                {
                    diagnostic = diagnostic.for_component(id);
                }
                self.report(diagnostic);
                None
            }
        }
    }

    fn record_component(&mut self, entity_id: EntityId, source: &str, config: &ComponentConfig) {
        let id = config.id;
        if !self.graph.component_types.contains_key(&id) {
            self.graph
                .component_types
                .insert(id, config.component_type.clone());
            self.graph.component_owners.insert(id, entity_id);
            self.component_sources.insert(id, source.to_string());
            return;
        }

        if !self.check_component_type(entity_id, source, config) {
            return;
        }

        let first = self.component_sources.get(&id).cloned().unwrap_or_default();
        if let Some(owner) = self.graph.component_owners.get(&id).copied() {
            if owner != entity_id {
                self.report(
                    Diagnostic::new(
                        DiagnosticKind::AmbiguousOwnership,
                        format!("component {id} is owned by entity {owner}; also used by entity {entity_id}"),
                    )
                    .with_source(first)
                    .with_source(source)
                    .for_entity(entity_id)
                    .for_component(id),
                );
            }
        }
    }

    /// Reports a `TypeConflict` when `config` disagrees with the type already
    /// recorded for its id. Returns whether the types agree (or none is recorded).
    fn check_component_type(&mut self, entity_id: EntityId, source: &str, config: &ComponentConfig) -> bool {
        let id = config.id;
        let Some(existing) = self.graph.component_types.get(&id).cloned() else {
            return true;
        };
        if existing == config.component_type {
            return true;
        }

        let first = self.component_sources.get(&id).cloned().unwrap_or_default();
        self.report(
            Diagnostic::new(
                DiagnosticKind::TypeConflict,
                format!(
                    "component {id} is '{existing}' in {first} but '{}' in {source}",
                    config.component_type
                ),
            )
            .with_source(first)
            .with_source(source)
            .for_entity(entity_id)
            .for_component(id),
        );
        false
    }

    // ── Domains and curriculum ───────────────────────────────────

    fn ingest_domain(&mut self, document: SourceDocument) {
        let SourceDocument { source, body, .. } = document;
        let domain = match serde_json::from_value::<DomainDocument>(body) {
            Ok(domain) => domain,
            Err(e) => {
                self.malformed(&source, format!("unreadable domain document: {e}"));
                return;
            }
        };

        if let Some(first) = self.domain_sources.get(&domain.id).cloned() {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::DuplicateIdentifier,
                    format!("domain id {} is declared in {first} and again in {source}", domain.id),
                )
                .with_source(first)
                .with_source(source),
            );
            return;
        }

        debug!(domain_id = %domain.id, "Domain indexed");
        self.domain_sources.insert(domain.id, source);
        self.graph.domains.insert(domain.id, domain);
    }

    fn ingest_curriculum(&mut self, document: SourceDocument) {
        if let Some(first) = self.curriculum_source.clone() {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::MalformedDocument,
                    "only one curriculum document is allowed; later one ignored",
                )
                .with_source(first)
                .with_source(document.source),
            );
            return;
        }
        self.curriculum_source = Some(document.source);
        self.graph.curriculum = Some(document.body);
    }
}
