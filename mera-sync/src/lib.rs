//! Progress sync for Mera.
//!
//! Keeps a learner's lesson progress consistent between the device and
//! their pod. Each lesson is one JSON document in the pod; syncing fetches
//! it, repairs both copies against the live curriculum, merges them
//! component by component with the [`MergeEngine`](mera_merge::MergeEngine)
//! and stores the result.

mod error;
mod progress;
mod store;
mod sync;

pub use error::{SyncError, SyncResult};
pub use progress::{ComponentProgress, LessonProgress, COMPLETE};
pub use store::{MemoryStore, RemoteStore, Session};
pub use sync::{ProgressSync, SyncConfig, SyncOutcome};
