//! Component type registry for Mera.
//!
//! - [`TypeRegistryBuilder`]: collects registrations and rejects malformed
//!   descriptors (missing reducers, shape mismatches, conflicting names)
//! - [`TypeRegistry`]: the frozen, read-only catalog
//! - [`TypeRegistration`]: a manifest entry (type tag plus named bindings)
//! - [`builtin`]: the component types that ship with the platform
//!
//! The registry is an explicit value passed to whoever needs it; there is
//! no process-wide instance.

pub mod builtin;
mod error;
mod manifest;
mod registry;

pub use error::{RegistryError, RegistryResult};
pub use manifest::TypeRegistration;
pub use registry::{check_descriptor, Registered, TypeRegistry, TypeRegistryBuilder};
