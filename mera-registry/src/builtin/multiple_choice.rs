//! `multiple_choice`: one question with a list of options.
//!
//! Progress: `complete` (true wins), `selected` (the last chosen option,
//! last writer wins) and `attempts` (highest count seen on any device).

use mera_model::{
    ComponentConfig, ConfigField, ConfigSchema, ProgressField, ProgressSchema, ProgressSnapshot,
    Reducer,
};
use serde_json::{json, Value};

use crate::TypeRegistration;

pub const TYPE_TAG: &str = "multiple_choice";

pub const COMPLETE: &str = "complete";
pub const SELECTED: &str = "selected";
pub const ATTEMPTS: &str = "attempts";

pub fn config_schema() -> ConfigSchema {
    ConfigSchema::new(vec![
        ConfigField::text("question").with_len(1, 1000),
        ConfigField::list("options").with_len(2, 10),
        ConfigField::integer("correctIndex"),
    ])
}

/// Larger attempt count wins. Commutative, associative and idempotent on
/// non-negative integers; anything else counts as 0.
fn max_attempts(a: &Value, b: &Value) -> Value {
    json!(a.as_u64().unwrap_or(0).max(b.as_u64().unwrap_or(0)))
}

pub fn progress_schema() -> ProgressSchema {
    ProgressSchema::new()
        .with_field(ProgressField::flag(COMPLETE))
        .with_field(ProgressField::value(SELECTED, Value::Null))
        .with_field(ProgressField::value(ATTEMPTS, json!(0)))
        .with_reducer(COMPLETE, Reducer::BooleanOr)
        .with_reducer(SELECTED, Reducer::LastWriteWins)
        .with_reducer(ATTEMPTS, Reducer::custom("max", max_attempts))
}

pub fn initial_progress(_config: &ComponentConfig) -> ProgressSnapshot {
    let mut progress = ProgressSnapshot::new().with_bool(COMPLETE, false);
    progress.insert(SELECTED, Value::Null);
    progress.insert(ATTEMPTS, json!(0));
    progress
}

pub fn validate_structure(config: &ComponentConfig, progress: &ProgressSnapshot) -> Result<(), String> {
    let options = config.array_len("/options");
    let correct = config.pointer("/correctIndex").and_then(Value::as_u64);
    match correct {
        Some(i) if (i as usize) < options => {}
        _ => return Err(format!("correctIndex must point at one of {options} options")),
    }

    if let Some(stamped) = progress.get_stamped(SELECTED) {
        if let Some(choice) = stamped.value.as_u64() {
            if choice as usize >= options {
                return Err(format!("selected option {choice} does not exist"));
            }
        }
    }
    Ok(())
}

pub fn registration() -> TypeRegistration {
    TypeRegistration::new(TYPE_TAG)
        .config_schema(config_schema())
        .progress_schema(progress_schema())
        .initializer(initial_progress)
        .validator(validate_structure)
}
