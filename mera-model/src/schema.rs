use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::ComponentConfig;

// ── Config schema ────────────────────────────────────────────────

/// Describes the type-specific fields of a component config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigSchema {
    pub fields: Vec<ConfigField>,
}

/// One type-specific config field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigField {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    /// Minimum characters (text) or items (list).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_len: Option<usize>,
    /// Maximum characters (text) or items (list).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
}

impl ConfigField {
    fn simple(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            min_len: None,
            max_len: None,
        }
    }

    /// Shorthand for a required text field.
    pub fn text(name: &str) -> Self {
        Self::simple(name, FieldType::Text)
    }

    /// Shorthand for a required integer field.
    pub fn integer(name: &str) -> Self {
        Self::simple(name, FieldType::Integer)
    }

    /// Shorthand for a required boolean field.
    pub fn bool(name: &str) -> Self {
        Self::simple(name, FieldType::Bool)
    }

    /// Shorthand for a required list field.
    pub fn list(name: &str) -> Self {
        Self::simple(name, FieldType::List)
    }

    /// Shorthand for a required object field.
    pub fn object(name: &str) -> Self {
        Self::simple(name, FieldType::Object)
    }

    /// Marks the field optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Bounds the length of a text or list field.
    #[must_use]
    pub fn with_len(mut self, min: usize, max: usize) -> Self {
        self.min_len = Some(min);
        self.max_len = Some(max);
        self
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        let len = match (self.field_type, value) {
            (FieldType::Text, Value::String(s)) => Some(s.chars().count()),
            (FieldType::List, Value::Array(items)) => Some(items.len()),
            (FieldType::Integer, v) if v.is_i64() || v.is_u64() => None,
            (FieldType::Bool, Value::Bool(_)) | (FieldType::Object, Value::Object(_)) => None,
            (FieldType::Any, _) => None,
            (expected, _) => {
                return Err(format!("field '{}' must be {expected}", self.name));
            }
        };
        if let Some(len) = len {
            if self.min_len.is_some_and(|min| len < min) || self.max_len.is_some_and(|max| len > max)
            {
                return Err(format!(
                    "field '{}' length {len} outside {}..={}",
                    self.name,
                    self.min_len.unwrap_or(0),
                    self.max_len.map_or_else(|| "∞".to_string(), |m| m.to_string()),
                ));
            }
        }
        Ok(())
    }
}

/// The JSON type of a config field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Integer,
    Bool,
    List,
    Object,
    Any,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Integer => "an integer",
            Self::Bool => "a boolean",
            Self::List => "a list",
            Self::Object => "an object",
            Self::Any => "any value",
        };
        f.write_str(name)
    }
}

impl ConfigSchema {
    pub fn new(fields: Vec<ConfigField>) -> Self {
        Self { fields }
    }

    /// Checks a config's type-specific fields, returning every violation.
    pub fn check(&self, config: &ComponentConfig) -> Vec<String> {
        let mut problems = Vec::new();
        for field in &self.fields {
            match config.get(&field.name) {
                Some(value) => {
                    if let Err(e) = field.check(value) {
                        problems.push(e);
                    }
                }
                None if field.required => {
                    problems.push(format!("missing required field '{}'", field.name));
                }
                None => {}
            }
        }
        problems
    }
}

// ── Progress schema ──────────────────────────────────────────────

/// Declares the progress fields of a component type and the reducer that
/// merges each one. Fields and reducers are declared separately and checked
/// one-to-one when the type is registered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressSchema {
    pub fields: Vec<ProgressField>,
    pub reducers: BTreeMap<String, Reducer>,
}

impl ProgressSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field declaration.
    #[must_use]
    pub fn with_field(mut self, field: ProgressField) -> Self {
        self.fields.push(field);
        self
    }

    /// Declares the reducer for a field.
    #[must_use]
    pub fn with_reducer(mut self, field: &str, reducer: Reducer) -> Self {
        self.reducers.insert(field.to_string(), reducer);
        self
    }

    pub fn field(&self, name: &str) -> Option<&ProgressField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn reducer(&self, name: &str) -> Option<&Reducer> {
        self.reducers.get(name)
    }
}

/// A single progress field declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressField {
    pub name: String,
    pub shape: FieldShape,
    /// Default value. For boolean lists this is the default of one slot.
    pub default: Value,
}

impl ProgressField {
    /// A boolean flag defaulting to `false`.
    pub fn flag(name: &str) -> Self {
        Self {
            name: name.into(),
            shape: FieldShape::Bool,
            default: Value::Bool(false),
        }
    }

    /// One boolean per item of the config array at `arity_from`.
    pub fn flags(name: &str, arity_from: &str) -> Self {
        Self {
            name: name.into(),
            shape: FieldShape::BoolList {
                arity_from: arity_from.into(),
            },
            default: Value::Bool(false),
        }
    }

    /// An arbitrary JSON value.
    pub fn value(name: &str, default: Value) -> Self {
        Self {
            name: name.into(),
            shape: FieldShape::Value,
            default,
        }
    }
}

/// Shape of a progress field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldShape {
    Bool,
    /// Ordered booleans whose length follows a config array (a JSON pointer
    /// into the component config, e.g. `/checkboxes`).
    BoolList { arity_from: String },
    Value,
}

// ── Reducers ─────────────────────────────────────────────────────

/// Signature of a custom reducer.
pub type ReduceFn = dyn Fn(&Value, &Value) -> Value + Send + Sync;

/// How two divergent values of one progress field are combined.
///
/// Every reducer must be commutative, associative and idempotent so that
/// replicas converge no matter how often or in which order they merge.
#[derive(Clone, PartialEq)]
pub enum Reducer {
    /// `a || b`. Once true on any device, stays true ("true wins").
    BooleanOr,
    /// `r[i] = a[i] || b[i]`, the shorter list padded with `false`.
    ElementwiseOr,
    /// Value stamped with a [`HybridTimestamp`](mera_types::HybridTimestamp);
    /// the later stamp wins.
    LastWriteWins,
    /// Author-supplied reducer. The engine cannot verify the algebraic laws,
    /// so the author must guarantee them.
    Custom(CustomReducer),
}

impl Reducer {
    /// Wraps a closure as a named custom reducer.
    pub fn custom(
        name: &str,
        reduce: impl Fn(&Value, &Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self::Custom(CustomReducer {
            name: name.to_string(),
            reduce: Arc::new(reduce),
        })
    }

    pub fn kind(&self) -> ReducerKind {
        match self {
            Self::BooleanOr => ReducerKind::BooleanOr,
            Self::ElementwiseOr => ReducerKind::ElementwiseOr,
            Self::LastWriteWins => ReducerKind::LastWriteWins,
            Self::Custom(_) => ReducerKind::Custom,
        }
    }

    /// Whether this reducer can merge values of the given shape.
    pub fn accepts(&self, shape: &FieldShape) -> bool {
        matches!(
            (self, shape),
            (Self::BooleanOr, FieldShape::Bool)
                | (Self::ElementwiseOr, FieldShape::BoolList { .. })
                | (Self::LastWriteWins, FieldShape::Value)
                | (Self::Custom(_), _)
        )
    }
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(c) => write!(f, "Custom({:?})", c.name),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}

/// A named, author-supplied reducer.
#[derive(Clone)]
pub struct CustomReducer {
    pub name: String,
    reduce: Arc<ReduceFn>,
}

impl CustomReducer {
    pub fn apply(&self, a: &Value, b: &Value) -> Value {
        (self.reduce)(a, b)
    }
}

/// Custom reducers compare by name; closures have no structural identity.
impl PartialEq for CustomReducer {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Serializable tag of a [`Reducer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReducerKind {
    #[serde(alias = "true_wins")]
    BooleanOr,
    ElementwiseOr,
    LastWriteWins,
    Custom,
}
