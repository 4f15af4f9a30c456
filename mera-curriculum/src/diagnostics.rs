//! Build diagnostics.
//!
//! Nothing in catalog construction fails fast: every problem found while
//! registering types, reading sources and cross-checking the graph becomes a
//! [`Diagnostic`], and the whole list is reported at once.

use std::fmt;

use mera_registry::RegistryError;
use mera_types::{ComponentId, EntityId};
use serde::Serialize;

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Reported; the release still ships.
    Warning,
    /// Blocks the release.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Unreadable source, metadata without an id, component without id or type.
    MalformedDocument,
    /// Identified metadata with a field of the wrong shape.
    InvalidMetadata,
    /// Entity id reused, or a component id repeated inside one entity.
    DuplicateIdentifier,
    /// One component id declared with two different types.
    TypeConflict,
    /// A component references a type the registry does not know.
    UnknownComponentType,
    /// A progress field has no reducer.
    MissingReducer,
    /// A type name registered twice with different descriptors.
    DuplicateTypeConflict,
    /// Any other shape problem in a type descriptor.
    InvalidTypeDescriptor,
    /// A registration manifest entry missing a binding.
    ExcludedType,
    /// A component config that fails decoding, its schema, its validator or sibling ordering.
    InvalidComponentConfig,
    /// The same component (same type) appears in more than one entity.
    AmbiguousOwnership,
    /// A lesson names a domain that was never declared.
    UnknownDomain,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            Self::MalformedDocument
            | Self::ExcludedType
            | Self::AmbiguousOwnership
            | Self::UnknownDomain => Severity::Warning,
            Self::DuplicateIdentifier
            | Self::InvalidMetadata
            | Self::TypeConflict
            | Self::UnknownComponentType
            | Self::MissingReducer
            | Self::DuplicateTypeConflict
            | Self::InvalidTypeDescriptor
            | Self::InvalidComponentConfig => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One problem found while building the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// Every source involved; both sides for conflicts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<ComponentId>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            sources: Vec::new(),
            entity_id: None,
            component_id: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.sources.push(source.into());
        self
    }

    #[must_use]
    pub fn for_entity(mut self, id: EntityId) -> Self {
        self.entity_id = Some(id);
        self
    }

    #[must_use]
    pub fn for_component(mut self, id: ComponentId) -> Self {
        self.component_id = Some(id);
        self
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl From<RegistryError> for Diagnostic {
    fn from(err: RegistryError) -> Self {
        let kind = match &err {
            RegistryError::MissingReducer { .. } => DiagnosticKind::MissingReducer,
            RegistryError::DuplicateTypeConflict(_) => DiagnosticKind::DuplicateTypeConflict,
            RegistryError::IncompleteRegistration { .. } => DiagnosticKind::ExcludedType,
            RegistryError::UnknownType(_) => DiagnosticKind::UnknownComponentType,
            RegistryError::OrphanReducer { .. }
            | RegistryError::DuplicateField { .. }
            | RegistryError::ReducerShapeMismatch { .. }
            | RegistryError::TypeNameMismatch { .. } => DiagnosticKind::InvalidTypeDescriptor,
        };
        Self::new(kind, err.to_string())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity(), self.kind, self.message)?;
        if !self.sources.is_empty() {
            write!(f, " ({})", self.sources.join(", "))?;
        }
        Ok(())
    }
}

/// Every diagnostic from one catalog build, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiagnosticReport {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_fatal)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_fatal())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_fatal())
    }

    /// Diagnostics of one kind.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl Extend<Diagnostic> for DiagnosticReport {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.diagnostics.extend(iter);
    }
}

impl FromIterator<Diagnostic> for DiagnosticReport {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self {
            diagnostics: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for DiagnosticReport {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self.errors().count();
        writeln!(
            f,
            "{errors} error(s), {} warning(s)",
            self.diagnostics.len() - errors
        )?;
        for diagnostic in &self.diagnostics {
            writeln!(f, "  {diagnostic}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DiagnosticReport {}
