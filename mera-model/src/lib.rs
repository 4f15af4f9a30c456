//! Core content model for Mera.
//!
//! Defines the types that every Mera subsystem agrees on:
//! - [`ComponentConfig`]: an authored component (id, type tag, label, order, type fields)
//! - [`EntityDocument`] / [`Entity`]: lesson and menu documents with ordered pages
//! - [`ConfigSchema`] / [`ProgressSchema`]: the declared shape of a component type
//! - [`Reducer`]: the per-field merge policy for progress
//! - [`ProgressSnapshot`]: one user's progress for one component instance
//! - [`ComponentTypeDescriptor`]: schema, reducers, initializer and validator for a type
//!
//! These types are consumed by the registry, merge engine, curriculum
//! builder and sync layer. They form the contract between content authors,
//! component type authors and the runtime.

mod component;
mod descriptor;
mod document;
mod progress;
mod schema;

pub use component::ComponentConfig;
pub use descriptor::{ComponentTypeDescriptor, Initializer, Validator};
pub use document::{
    DocumentKind, DomainDocument, Entity, EntityDocument, EntityKind, EntityMetadata, Page,
    SourceDocument,
};
pub use progress::{ProgressSnapshot, Stamped};
pub use schema::{
    ConfigField, ConfigSchema, CustomReducer, FieldShape, FieldType, ProgressField,
    ProgressSchema, Reducer, ReducerKind,
};
