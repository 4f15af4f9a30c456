use mera_types::ComponentId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Minimum length of a component's screen-reader label.
const MIN_LABEL_LEN: usize = 3;

/// An authored component as it appears on a lesson or menu page.
///
/// The four base fields are common to every component type. Everything else
/// (checkbox items, question text, ...) lands in `fields` and is checked
/// against the type's [`ConfigSchema`](crate::ConfigSchema).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentConfig {
    pub id: ComponentId,
    #[serde(rename = "type")]
    pub component_type: String,
    pub accessibility_label: String,
    /// Position among siblings on a page; authored in steps of 100.
    pub order: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ComponentConfig {
    /// Checks the constraints shared by every component type.
    pub fn check_base(&self) -> Result<(), String> {
        if self.component_type.is_empty() {
            return Err(format!("component {} has an empty type", self.id));
        }
        if self.accessibility_label.chars().count() < MIN_LABEL_LEN {
            return Err(format!(
                "component {} accessibilityLabel must be at least {MIN_LABEL_LEN} characters",
                self.id
            ));
        }
        Ok(())
    }

    /// Returns a type-specific field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Resolves a JSON pointer (e.g. `/checkboxes/0/content`) against the
    /// type-specific fields.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let path = pointer.strip_prefix('/')?;
        let (head, rest) = match path.split_once('/') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let value = self.fields.get(head)?;
        match rest {
            Some(rest) => value.pointer(&format!("/{rest}")),
            None => Some(value),
        }
    }

    /// Extract a string value using a JSON pointer.
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.pointer(pointer).and_then(Value::as_str)
    }

    /// Extract an array using a JSON pointer.
    pub fn get_array(&self, pointer: &str) -> Option<&Vec<Value>> {
        self.pointer(pointer).and_then(Value::as_array)
    }

    /// Length of the array at `pointer`, or 0 when absent or not an array.
    pub fn array_len(&self, pointer: &str) -> usize {
        self.get_array(pointer).map_or(0, Vec::len)
    }
}
