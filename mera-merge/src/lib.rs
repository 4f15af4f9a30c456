//! Progress merge engine for Mera.
//!
//! A learner's progress for one component lives both on the device and in
//! their pod. Either copy may have moved on independently; this crate
//! combines two snapshots field by field using the reducer each component
//! type declared at registration:
//!
//! - [`Reducer::BooleanOr`](mera_model::Reducer::BooleanOr): completion flags, true wins
//! - [`Reducer::ElementwiseOr`](mera_model::Reducer::ElementwiseOr): checkbox lists
//! - [`Reducer::LastWriteWins`](mera_model::Reducer::LastWriteWins): stamped scalar choices
//! - [`Reducer::Custom`](mera_model::Reducer::Custom): author-supplied
//!
//! Every reducer satisfies the following properties:
//! - **Commutative**: merge(a, b) == merge(b, a)
//! - **Associative**: merge(merge(a, b), c) == merge(a, merge(b, c))
//! - **Idempotent**: merge(a, a) == a
//!
//! so the merged value does not depend on how often or in which order
//! devices sync. Custom reducers carry the same obligation, which the engine
//! cannot check.
//!
//! The engine is pure: no storage, no locks. Callers serialize the write of
//! a merged value back to the pod.

mod engine;
mod error;
pub mod reducers;
mod repair;

pub use engine::MergeEngine;
pub use error::{MergeError, MergeResult};
pub use repair::{MigrationEvent, MigrationKind, Repaired};
