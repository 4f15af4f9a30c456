//! Component types shipped with the platform.
//!
//! Each module exposes the same bindings: `TYPE_TAG`, `config_schema()`,
//! `progress_schema()`, `initial_progress()` and, where it has one,
//! `validate_structure()`. [`registrations`] is the manifest built from
//! them; adding a type means adding a module and a line here.

pub mod basic_task;
pub mod multiple_choice;
pub mod text;

use crate::{RegistryError, TypeRegistration, TypeRegistry};

/// The registration manifest for every built-in type.
pub fn registrations() -> Vec<TypeRegistration> {
    vec![
        basic_task::registration(),
        multiple_choice::registration(),
        text::registration(),
    ]
}

/// A registry holding exactly the built-in types.
pub fn registry() -> Result<TypeRegistry, RegistryError> {
    let mut builder = TypeRegistry::builder();
    for registration in registrations() {
        builder.register_manifest(registration)?;
    }
    Ok(builder.build())
}
