//! `text`: a block of reading material, complete once seen.

use mera_model::{
    ComponentConfig, ConfigField, ConfigSchema, ProgressField, ProgressSchema, ProgressSnapshot,
    Reducer,
};

use crate::TypeRegistration;

pub const TYPE_TAG: &str = "text";

pub fn config_schema() -> ConfigSchema {
    ConfigSchema::new(vec![ConfigField::text("content").with_len(1, 20_000)])
}

pub fn progress_schema() -> ProgressSchema {
    ProgressSchema::new()
        .with_field(ProgressField::flag("complete"))
        .with_reducer("complete", Reducer::BooleanOr)
}

pub fn initial_progress(_config: &ComponentConfig) -> ProgressSnapshot {
    ProgressSnapshot::new().with_bool("complete", false)
}

pub fn registration() -> TypeRegistration {
    TypeRegistration::new(TYPE_TAG)
        .config_schema(config_schema())
        .progress_schema(progress_schema())
        .initializer(initial_progress)
}
