use crate::core::ChangeEvent;

/// Default mapping marker attribute
pub const DEFAULT_ENTITY_MARKER: &str = "persist.Entity";

/// Decides whether a class change touches the persistence mapping.
///
/// A change is relevant when the class carries, or previously carried, the
/// mapping marker. Removal counts: a class demoted to a plain class still
/// requires a rebuild so the mapping forgets it.
pub struct ChangePredicate {
    marker: String,
}

impl ChangePredicate {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn is_mapping_relevant(&self, event: &ChangeEvent) -> bool {
        let marked = |def: &Option<crate::core::ClassDefinition>| {
            def.as_ref().is_some_and(|d| d.has_attribute(&self.marker))
        };
        marked(&event.old) || marked(&event.new)
    }
}

impl Default for ChangePredicate {
    fn default() -> Self {
        Self::new(DEFAULT_ENTITY_MARKER)
    }
}
