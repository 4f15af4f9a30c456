use std::fmt;
use std::sync::Arc;

use crate::{ComponentConfig, ConfigSchema, ProgressSchema, ProgressSnapshot};

/// Builds the default progress for a freshly encountered component.
pub type Initializer = Arc<dyn Fn(&ComponentConfig) -> ProgressSnapshot + Send + Sync>;

/// Checks that a progress value is consistent with its config.
/// Return `Err(message)` to reject it.
pub type Validator =
    Arc<dyn Fn(&ComponentConfig, &ProgressSnapshot) -> Result<(), String> + Send + Sync>;

/// Everything the runtime knows about one component type.
#[derive(Clone)]
pub struct ComponentTypeDescriptor {
    pub type_name: String,
    pub config_schema: ConfigSchema,
    pub progress_schema: ProgressSchema,
    pub validator: Option<Validator>,
    pub initializer: Initializer,
}

impl ComponentTypeDescriptor {
    pub fn new(
        type_name: &str,
        config_schema: ConfigSchema,
        progress_schema: ProgressSchema,
        initializer: impl Fn(&ComponentConfig) -> ProgressSnapshot + Send + Sync + 'static,
    ) -> Self {
        Self {
            type_name: type_name.to_string(),
            config_schema,
            progress_schema,
            validator: None,
            initializer: Arc::new(initializer),
        }
    }

    #[must_use]
    pub fn with_validator(
        mut self,
        validator: impl Fn(&ComponentConfig, &ProgressSnapshot) -> Result<(), String>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Produces the default progress for `config`.
    pub fn initialize(&self, config: &ComponentConfig) -> ProgressSnapshot {
        (self.initializer)(config)
    }

    /// Runs the validator, if any. Types without one accept everything.
    pub fn validate(&self, config: &ComponentConfig, progress: &ProgressSnapshot) -> Result<(), String> {
        match &self.validator {
            Some(validator) => validator(config, progress),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for ComponentTypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentTypeDescriptor")
            .field("type_name", &self.type_name)
            .field("config_schema", &self.config_schema)
            .field("progress_schema", &self.progress_schema)
            .field("has_validator", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

/// Structural equality: name, schemas, reducers and validator presence.
/// Initializer closures cannot be compared and are ignored.
impl PartialEq for ComponentTypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
            && self.config_schema == other.config_schema
            && self.progress_schema == other.progress_schema
            && self.validator.is_some() == other.validator.is_some()
    }
}
