use std::collections::BTreeMap;

use crate::schema::PropertyRegistry;

use super::toggles::InheritanceToggles;

/// Template applied to the toggles of newly created nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InheritanceDefaults {
    pub default_all: bool,
    pub overrides: BTreeMap<&'static str, bool>,
}

impl InheritanceDefaults {
    pub fn new(default_all: bool) -> Self {
        Self {
            default_all,
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, name: &'static str, value: bool) -> Self {
        self.overrides.insert(name, value);
        self
    }

    pub fn flag_for(&self, name: &str) -> bool {
        self.overrides.get(name).copied().unwrap_or(self.default_all)
    }

    pub fn template(&self, schema: &PropertyRegistry) -> InheritanceToggles {
        InheritanceToggles::from_defaults(schema, self)
    }
}
