//! Core type definitions for the Mera learning platform.
//!
//! This crate defines the small, content-agnostic types every other Mera
//! crate depends on:
//! - Component, entity and domain identifiers (plain integers, range-checked)
//! - Hybrid Logical Clock timestamps for last-writer-wins progress fields
//!
//! Component types, schemas and documents belong in `mera-model`, not here.

mod ids;
mod timestamp;

pub use ids::{ComponentId, DomainId, EntityId};
pub use timestamp::HybridTimestamp;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("component id {0} is out of range (max {max})", max = ComponentId::MAX)]
    ComponentIdOutOfRange(u64),

    #[error("invalid identifier: {0}")]
    InvalidId(#[from] std::num::ParseIntError),
}
