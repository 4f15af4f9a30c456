//! Registration manifest entries.
//!
//! Each component type module exposes a literal type tag plus named
//! bindings: a config schema, a progress schema, an initializer and,
//! optionally, a validator. A [`TypeRegistration`] collects those bindings
//! as data so completeness is a shape check on the entry, not something
//! discovered by reading source files.

use std::sync::Arc;

use mera_model::{
    ComponentConfig, ComponentTypeDescriptor, ConfigSchema, Initializer, ProgressSchema,
    ProgressSnapshot, Validator,
};

/// One entry of the type registration manifest.
#[derive(Clone, Default)]
pub struct TypeRegistration {
    /// The literal type tag; becomes the registry key.
    pub type_tag: String,
    pub config_schema: Option<ConfigSchema>,
    pub progress_schema: Option<ProgressSchema>,
    pub initializer: Option<Initializer>,
    pub validator: Option<Validator>,
}

impl TypeRegistration {
    pub fn new(type_tag: &str) -> Self {
        Self {
            type_tag: type_tag.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config_schema(mut self, schema: ConfigSchema) -> Self {
        self.config_schema = Some(schema);
        self
    }

    #[must_use]
    pub fn progress_schema(mut self, schema: ProgressSchema) -> Self {
        self.progress_schema = Some(schema);
        self
    }

    #[must_use]
    pub fn initializer(
        mut self,
        init: impl Fn(&ComponentConfig) -> ProgressSnapshot + Send + Sync + 'static,
    ) -> Self {
        self.initializer = Some(Arc::new(init));
        self
    }

    #[must_use]
    pub fn validator(
        mut self,
        validate: impl Fn(&ComponentConfig, &ProgressSnapshot) -> Result<(), String>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validate));
        self
    }

    /// Names of required bindings this entry lacks.
    pub fn missing_bindings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.config_schema.is_none() {
            missing.push("config schema");
        }
        if self.progress_schema.is_none() {
            missing.push("progress schema");
        }
        if self.initializer.is_none() {
            missing.push("initializer");
        }
        missing
    }

    /// Converts the entry into a descriptor, or lists the missing bindings.
    pub fn into_descriptor(self) -> Result<ComponentTypeDescriptor, Vec<&'static str>> {
        let missing = self.missing_bindings();
        match (self.config_schema, self.progress_schema, self.initializer) {
            (Some(config_schema), Some(progress_schema), Some(initializer)) => {
                Ok(ComponentTypeDescriptor {
                    type_name: self.type_tag,
                    config_schema,
                    progress_schema,
                    validator: self.validator,
                    initializer,
                })
            }
            _ => Err(missing),
        }
    }
}

impl std::fmt::Debug for TypeRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistration")
            .field("type_tag", &self.type_tag)
            .field("missing", &self.missing_bindings())
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}
