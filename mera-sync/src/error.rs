//! Error types for progress sync.

use mera_types::EntityId;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while syncing progress.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote store failed.
    #[error("remote store error: {0}")]
    Store(String),

    /// A stored document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The stored document was written with a schema this build cannot read.
    #[error("unsupported progress schema version {found} (expected {expected})")]
    UnsupportedSchema { found: String, expected: String },

    /// The stored document belongs to another lesson.
    #[error("stored progress is for lesson {found}, expected lesson {expected}")]
    LessonMismatch { expected: EntityId, found: EntityId },

    /// The lesson is not part of the current curriculum.
    #[error("lesson {0} not found in curriculum")]
    UnknownLesson(EntityId),
}
