//! `basic_task`: a titled task with a list of checkboxes.
//!
//! Config: `title`, `description`, `checkboxes: [{content, required}]`.
//! Progress: `complete` (true wins) and `checkbox_checked`, one flag per
//! checkbox (element-wise OR).

use mera_model::{
    ComponentConfig, ConfigField, ConfigSchema, ProgressField, ProgressSchema, ProgressSnapshot,
    Reducer,
};

use crate::TypeRegistration;

pub const TYPE_TAG: &str = "basic_task";

pub const COMPLETE: &str = "complete";
pub const CHECKBOX_CHECKED: &str = "checkbox_checked";
const CHECKBOXES: &str = "/checkboxes";

pub fn config_schema() -> ConfigSchema {
    ConfigSchema::new(vec![
        ConfigField::text("title").with_len(1, 200),
        ConfigField::text("description").with_len(1, 1000),
        ConfigField::list("checkboxes").with_len(1, 10),
    ])
}

pub fn progress_schema() -> ProgressSchema {
    ProgressSchema::new()
        .with_field(ProgressField::flag(COMPLETE))
        .with_field(ProgressField::flags(CHECKBOX_CHECKED, CHECKBOXES))
        .with_reducer(COMPLETE, Reducer::BooleanOr)
        .with_reducer(CHECKBOX_CHECKED, Reducer::ElementwiseOr)
}

/// Indices of checkboxes that must be ticked before the task completes.
fn required_indices(config: &ComponentConfig) -> Vec<usize> {
    config
        .get_array(CHECKBOXES)
        .map(|items| {
            items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.get("required").and_then(|v| v.as_bool()) == Some(true))
                .map(|(i, _)| i)
                .collect()
        })
        .unwrap_or_default()
}

pub fn initial_progress(config: &ComponentConfig) -> ProgressSnapshot {
    let unchecked = vec![false; config.array_len(CHECKBOXES)];
    ProgressSnapshot::new()
        .with_bool(COMPLETE, false)
        .with_bool_list(CHECKBOX_CHECKED, &unchecked)
}

pub fn validate_structure(config: &ComponentConfig, progress: &ProgressSnapshot) -> Result<(), String> {
    for (i, item) in config.get_array(CHECKBOXES).into_iter().flatten().enumerate() {
        match item.get("content").and_then(|v| v.as_str()) {
            Some(content) if !content.is_empty() => {}
            _ => return Err(format!("checkbox {i} has no content")),
        }
    }

    let expected = config.array_len(CHECKBOXES);
    let checked = progress.get_bool_list(CHECKBOX_CHECKED).unwrap_or_default();
    if checked.len() != expected {
        return Err(format!(
            "{CHECKBOX_CHECKED} has {} entries, config has {expected} checkboxes",
            checked.len()
        ));
    }

    if progress.get_bool(COMPLETE) == Some(true) {
        if let Some(i) = required_indices(config).into_iter().find(|&i| !checked[i]) {
            return Err(format!("complete while required checkbox {i} is unchecked"));
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
