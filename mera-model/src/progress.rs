use mera_types::HybridTimestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One user's progress for one component instance.
///
/// Stored as a flat JSON object keyed by progress field name, which is
/// exactly what lands in the user's pod.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressSnapshot(Map<String, Value>);

impl ProgressSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON value; returns `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn insert(&mut self, field: &str, value: Value) {
        self.0.insert(field.to_string(), value);
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.0.get(field).and_then(Value::as_bool)
    }

    /// Reads a boolean list. Non-boolean entries read as `false`.
    pub fn get_bool_list(&self, field: &str) -> Option<Vec<bool>> {
        self.0.get(field).and_then(Value::as_array).map(|items| {
            items
                .iter()
                .map(|v| v.as_bool().unwrap_or(false))
                .collect()
        })
    }

    #[must_use]
    pub fn with_bool(mut self, field: &str, value: bool) -> Self {
        self.set_bool(field, value);
        self
    }

    #[must_use]
    pub fn with_bool_list(mut self, field: &str, values: &[bool]) -> Self {
        self.set_bool_list(field, values);
        self
    }

    pub fn set_bool(&mut self, field: &str, value: bool) {
        self.insert(field, Value::Bool(value));
    }

    pub fn set_bool_list(&mut self, field: &str, values: &[bool]) {
        self.insert(
            field,
            Value::Array(values.iter().copied().map(Value::Bool).collect()),
        );
    }

    /// Reads a last-writer-wins field.
    pub fn get_stamped(&self, field: &str) -> Option<Stamped> {
        self.0
            .get(field)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Writes a last-writer-wins field.
    pub fn set_stamped(&mut self, field: &str, value: Value, at: HybridTimestamp) {
        self.insert(field, Stamped { value, at }.into_value());
    }
}

/// A value stamped with the time it was written, as stored for
/// last-writer-wins fields: `{"value": ..., "at": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamped {
    pub value: Value,
    pub at: HybridTimestamp,
}

impl Stamped {
    pub fn into_value(self) -> Value {
        let mut map = Map::new();
        map.insert("value".into(), self.value);
        map.insert(
            "at".into(),
            serde_json::json!({"wall_time": self.at.wall_time(), "logical": self.at.logical()}),
        );
        Value::Object(map)
    }
}
