use std::sync::Arc;

use mera_model::SourceDocument;
use mera_registry::{builtin, check_descriptor, RegistryError, TypeRegistration, TypeRegistry};
use tracing::{info, warn};

use crate::builder::CurriculumGraphBuilder;
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticReport};
use crate::graph::CurriculumGraph;

/// A validated release: the frozen registry, the content graph and any
/// non-fatal diagnostics.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub registry: Arc<TypeRegistry>,
    pub graph: Arc<CurriculumGraph>,
    pub warnings: Vec<Diagnostic>,
}

/// Builds the type registry and the curriculum graph, then cross-checks
/// them. Every problem is collected; the result is either a [`Catalog`] or
/// a report listing all of them.
#[derive(Debug, Default)]
pub struct IntegrityValidator {
    registrations: Vec<TypeRegistration>,
    prior: Vec<Diagnostic>,
}

impl IntegrityValidator {
    pub fn new(registrations: impl IntoIterator<Item = TypeRegistration>) -> Self {
        Self {
            registrations: registrations.into_iter().collect(),
            prior: Vec::new(),
        }
    }

    /// A validator for the built-in component types.
    pub fn builtin() -> Self {
        Self::new(builtin::registrations())
    }

    /// Adds diagnostics found before validation (e.g. by the loader) so
    /// they land in the same report.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) -> Self {
        self.prior.extend(diagnostics);
        self
    }

    pub fn validate(
        self,
        documents: impl IntoIterator<Item = SourceDocument>,
    ) -> Result<Catalog, DiagnosticReport> {
        let mut report: DiagnosticReport = self.prior.into_iter().collect();

        let registry = build_registry(self.registrations, &mut report);
        let (graph, diagnostics) = CurriculumGraphBuilder::from_documents(documents);
        report.extend(diagnostics);
        report.extend(cross_check(&registry, &graph));

        if report.has_fatal() {
            warn!(
                errors = report.errors().count(),
                warnings = report.warnings().count(),
                "Curriculum validation failed"
            );
            return Err(report);
        }

        info!(
            types = registry.len(),
            entities = graph.entity_count(),
            components = graph.component_count(),
            warnings = report.len(),
            "Curriculum validated"
        );
        Ok(Catalog {
            registry: Arc::new(registry),
            graph: Arc::new(graph),
            warnings: report.into_vec(),
        })
    }
}

/// Registers every entry, reporting each rejection. Shape problems are
/// reported in full, not just the first one per type.
fn build_registry(registrations: Vec<TypeRegistration>, report: &mut DiagnosticReport) -> TypeRegistry {
    let mut builder = TypeRegistry::builder();
    for registration in registrations {
        let type_tag = registration.type_tag.clone();
        let descriptor = match registration.into_descriptor() {
            Ok(descriptor) => descriptor,
            Err(missing) => {
                warn!(type_name = %type_tag, ?missing, "Component type excluded from registry");
                report.push(
                    RegistryError::IncompleteRegistration {
                        type_name: type_tag,
                        missing,
                    }
                    .into(),
                );
                continue;
            }
        };

        let problems = check_descriptor(&type_tag, &descriptor);
        if !problems.is_empty() {
            report.extend(problems.into_iter().map(Diagnostic::from));
            continue;
        }
        if let Err(e) = builder.register(&type_tag, descriptor) {
            report.push(e.into());
        }
    }
    builder.build()
}

/// Checks every component in the graph against the registry: the type must
/// exist, the config must satisfy the base constraints and the type's config
/// schema, and the type's validator must accept the initial progress.
pub fn cross_check(registry: &TypeRegistry, graph: &CurriculumGraph) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for entity in graph.entities() {
        for config in entity.components() {
            let invalid = |message: String| {
                Diagnostic::new(DiagnosticKind::InvalidComponentConfig, message)
                    .with_source(entity.source.clone())
                    .for_entity(entity.id)
                    .for_component(config.id)
            };

            let descriptor = match registry.lookup(&config.component_type) {
                Ok(descriptor) => descriptor,
                Err(_) => {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticKind::UnknownComponentType,
                            format!(
                                "component {} in entity {} uses unregistered type '{}'",
                                config.id, entity.id, config.component_type
                            ),
                        )
                        .with_source(entity.source.clone())
                        .for_entity(entity.id)
                        .for_component(config.id),
                    );
                    continue;
                }
            };

            let mut problems: Vec<String> = config.check_base().err().into_iter().collect();
            problems.extend(
                descriptor
                    .config_schema
                    .check(config)
                    .into_iter()
                    .map(|p| format!("component {}: {p}", config.id)),
            );
            if problems.is_empty() {
                let initial = descriptor.initialize(config);
                if let Err(reason) = descriptor.validate(config, &initial) {
                    problems.push(format!(
                        "component {}: initial progress rejected: {reason}",
                        config.id
                    ));
                }
            }
            diagnostics.extend(problems.into_iter().map(invalid));
        }
    }
    diagnostics
}
