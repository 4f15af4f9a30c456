//! Shape repair for stored progress.
//!
//! Content keeps changing after learners have started: a checkbox is added,
//! a field is introduced, another is retired. A snapshot written against
//! the old config is brought in line with the live one before it is merged.
//! Repair is deterministic and never fails; every change it makes is
//! reported as a [`MigrationEvent`] and logged.

use mera_model::{ComponentConfig, ComponentTypeDescriptor, FieldShape, ProgressSnapshot};
use mera_types::ComponentId;
use serde_json::Value;
use tracing::warn;

/// A single repair applied to a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationEvent {
    pub component_id: ComponentId,
    pub field: String,
    pub kind: MigrationKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationKind {
    /// List grew to match new config slots.
    Padded { from: usize, to: usize },
    /// List shrank because config slots were removed.
    Truncated { from: usize, to: usize },
    /// Field absent from the snapshot; filled from the initializer.
    Filled,
    /// Value had the wrong JSON type; replaced with the default.
    Reset,
    /// Field no longer declared by the type; removed.
    Dropped,
}

/// A repaired snapshot and the changes made to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Repaired {
    pub snapshot: ProgressSnapshot,
    pub events: Vec<MigrationEvent>,
}

impl Repaired {
    pub fn is_unchanged(&self) -> bool {
        self.events.is_empty()
    }
}

pub(crate) fn repair(
    descriptor: &ComponentTypeDescriptor,
    config: &ComponentConfig,
    snapshot: &ProgressSnapshot,
) -> Repaired {
    let schema = &descriptor.progress_schema;
    let mut repaired = snapshot.clone();
    let mut events = Vec::new();
    let mut record = |field: &str, kind: MigrationKind| {
        warn!(
            target: "mera::migration",
            component_id = %config.id,
            type_name = %descriptor.type_name,
            field,
            ?kind,
            "Progress snapshot repaired"
        );
        events.push(MigrationEvent {
            component_id: config.id,
            field: field.to_string(),
            kind,
        });
    };

    let stale: Vec<String> = snapshot
        .field_names()
        .filter(|name| schema.field(name).is_none())
        .map(str::to_string)
        .collect();
    for name in stale {
        repaired.remove(&name);
        record(&name, MigrationKind::Dropped);
    }

    let mut defaults: Option<ProgressSnapshot> = None;
    for field in &schema.fields {
        let Some(current) = repaired.get(&field.name).cloned() else {
            let initial = defaults.get_or_insert_with(|| descriptor.initialize(config));
            let value = initial
                .get(&field.name)
                .cloned()
                .unwrap_or_else(|| default_for(&field.shape, &field.default, config));
            repaired.insert(&field.name, value);
            record(&field.name, MigrationKind::Filled);
            continue;
        };

        match &field.shape {
            FieldShape::Bool => {
                if !current.is_boolean() {
                    repaired.insert(&field.name, default_for(&field.shape, &field.default, config));
                    record(&field.name, MigrationKind::Reset);
                }
            }
            FieldShape::BoolList { arity_from } => {
                let Some(items) = current.as_array() else {
                    repaired.insert(&field.name, default_for(&field.shape, &field.default, config));
                    record(&field.name, MigrationKind::Reset);
                    continue;
                };
                let from = items.len();
                let to = config.array_len(arity_from);
                if from == to {
                    continue;
                }
                let slot = Value::Bool(field.default.as_bool().unwrap_or(false));
                let mut resized = items.clone();
                resized.resize(to, slot);
                repaired.insert(&field.name, Value::Array(resized));
                let kind = if to > from {
                    MigrationKind::Padded { from, to }
                } else {
                    MigrationKind::Truncated { from, to }
                };
                record(&field.name, kind);
            }
            FieldShape::Value => {}
        }
    }

    Repaired {
        snapshot: repaired,
        events,
    }
}

fn default_for(shape: &FieldShape, default: &Value, config: &ComponentConfig) -> Value {
    match shape {
        FieldShape::Bool => Value::Bool(default.as_bool().unwrap_or(false)),
        FieldShape::BoolList { arity_from } => Value::Array(vec![
            Value::Bool(default.as_bool().unwrap_or(false));
            config.array_len(arity_from)
        ]),
        FieldShape::Value => default.clone(),
    }
}
