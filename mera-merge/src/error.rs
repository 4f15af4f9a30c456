//! Error types for the merge engine.

use mera_types::ComponentId;
use thiserror::Error;

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// Errors the merge engine can report.
///
/// Missing reducers are not among them: the registry refuses such types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("unknown component type: {0}")]
    UnknownType(String),

    #[error("component {component_id} progress rejected: {reason}")]
    InvalidProgress {
        component_id: ComponentId,
        reason: String,
    },

    #[error("component {component_id} is '{local}' locally but '{remote}' remotely")]
    TypeMismatch {
        component_id: ComponentId,
        local: String,
        remote: String,
    },
}

