//! Error types for the type registry.

use mera_model::ReducerKind;
use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised while registering or looking up component types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("component type '{0}' is already registered with a different descriptor")]
    DuplicateTypeConflict(String),

    #[error("component type '{type_name}': progress field(s) without a reducer: {}", .fields.join(", "))]
    MissingReducer {
        type_name: String,
        fields: Vec<String>,
    },

    #[error("component type '{type_name}': reducer(s) for undeclared field(s): {}", .fields.join(", "))]
    OrphanReducer {
        type_name: String,
        fields: Vec<String>,
    },

    #[error("component type '{type_name}': progress field '{field}' declared twice")]
    DuplicateField { type_name: String, field: String },

    #[error("component type '{type_name}': reducer {reducer:?} cannot merge field '{field}'")]
    ReducerShapeMismatch {
        type_name: String,
        field: String,
        reducer: ReducerKind,
    },

    #[error("registered as '{key}' but the descriptor declares '{declared}'")]
    TypeNameMismatch { key: String, declared: String },

    #[error("component type '{type_name}' excluded: missing {}", .missing.join(", "))]
    IncompleteRegistration {
        type_name: String,
        missing: Vec<&'static str>,
    },

    #[error("unknown component type: {0}")]
    UnknownType(String),
}
