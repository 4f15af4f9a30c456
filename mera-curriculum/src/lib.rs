//! Curriculum graph and integrity validation for Mera.
//!
//! Content arrives as lesson, menu, domain and curriculum documents. The
//! [`CurriculumGraphBuilder`] indexes them into an immutable
//! [`CurriculumGraph`]; the [`IntegrityValidator`] builds the type registry
//! alongside it, cross-checks the two, and either returns a [`Catalog`] or
//! a [`DiagnosticReport`] that blocks the release.

mod builder;
mod diagnostics;
mod graph;
pub mod source;
mod surface;
mod validator;

pub use builder::CurriculumGraphBuilder;
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticReport, Severity};
pub use graph::{CurriculumGraph, EntityMetrics, GraphError, GraphResult};
pub use source::{load_content, ContentLayout, LoadError, LoadResult, LoadedContent};
pub use surface::{EntitySummary, ProgressFieldSummary, QuerySurface, TypeSummary};
pub use validator::{cross_check, Catalog, IntegrityValidator};
