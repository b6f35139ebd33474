use serde::{Deserialize, Serialize};

/// A class (entity model) definition as observed by the host's loading
/// pipeline: its fully qualified name plus the marker attributes it carries.
///
/// Only the attribute list matters to the change predicate; the definition
/// body itself is opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDefinition {
    pub name: String,
    pub attributes: Vec<String>,
}

impl ClassDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Add a marker attribute (builder style)
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }
}

/// A single class (re)definition event.
///
/// Ephemeral: consumed synchronously by the change predicate and never
/// retained. `old` is `None` for a class the host defines for the first time.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub class_name: String,
    pub old: Option<ClassDefinition>,
    pub new: Option<ClassDefinition>,
}

impl ChangeEvent {
    pub fn new(
        class_name: impl Into<String>,
        old: Option<ClassDefinition>,
        new: Option<ClassDefinition>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            old,
            new,
        }
    }
}
