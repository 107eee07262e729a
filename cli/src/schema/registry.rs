use lazy_static::lazy_static;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::error::SchemaError;
use super::properties::{
    Category, PropertySpec, IDENTITY_PROPERTIES, KNOWN_NON_INHERITABLE, KNOWN_NON_SERIALIZABLE,
    PROPERTY_TABLE,
};
use super::validator::{find_missing_toggles, find_orphaned_toggles};
use super::value::{DefaultValue, PropertyValue, ValueType};

/// Static metadata for one property, immutable once the registry is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub category: Category,
    pub value_type: ValueType,
    pub default: DefaultValue,
    pub inheritable: bool,
    pub serializable: bool,
    pub encrypted: bool,
    pub browsable: bool,
    pub writable: bool,
}

impl PropertyDescriptor {
    pub fn default_value(&self) -> PropertyValue {
        self.default.to_value()
    }
}

pub struct PropertyRegistry {
    descriptors: Vec<PropertyDescriptor>,
    by_name: HashMap<&'static str, usize>,
    toggles: Vec<&'static str>,
}

lazy_static! {
    static ref REGISTRY: PropertyRegistry = {
        let registry = PropertyRegistry::build(PROPERTY_TABLE);
        debug!(
            event = "schema.discovered",
            properties = registry.descriptors.len(),
            toggles = registry.toggles.len()
        );
        registry
    };
}

/// The process-wide registry, built on first use.
pub fn discover() -> &'static PropertyRegistry {
    &REGISTRY
}

impl PropertyRegistry {
    /// Builds descriptors and the toggle schema from the same table.
    pub fn build(table: &[PropertySpec]) -> Self {
        let toggles = table.iter().filter(|spec| spec.toggle).map(|spec| spec.name).collect();
        Self::with_toggle_schema(table, toggles)
    }

    /// Builds a registry against an independently supplied toggle schema.
    pub fn with_toggle_schema(table: &[PropertySpec], toggles: Vec<&'static str>) -> Self {
        let descriptors: Vec<PropertyDescriptor> = table
            .iter()
            .map(|spec| describe(spec, &toggles))
            .collect();
        let by_name = descriptors
            .iter()
            .enumerate()
            .map(|(index, descriptor)| (descriptor.name, index))
            .collect();

        Self {
            descriptors,
            by_name,
            toggles,
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.by_name.get(name).map(|&index| &self.descriptors[index])
    }

    pub fn require(&self, name: &str) -> Result<&PropertyDescriptor, SchemaError> {
        self.get(name).ok_or_else(|| SchemaError::UnknownProperty {
            name: name.to_string(),
        })
    }

    pub fn descriptors(&self) -> &[PropertyDescriptor] {
        &self.descriptors
    }

    pub fn inheritable(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.descriptors.iter().filter(|d| d.inheritable)
    }

    pub fn serializable(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.descriptors.iter().filter(|d| d.serializable)
    }

    pub fn encrypted(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.descriptors.iter().filter(|d| d.encrypted)
    }

    /// Names of the boolean slots every inheritance toggle set carries.
    pub fn toggle_names(&self) -> &[&'static str] {
        &self.toggles
    }

    pub fn has_toggle(&self, name: &str) -> bool {
        self.toggles.iter().any(|t| *t == name)
    }

    pub fn is_identity(&self, name: &str) -> bool {
        IDENTITY_PROPERTIES.contains(&name)
    }

    /// Inheritable descriptors without a toggle slot.
    pub fn validate_inheritance_sync(&self) -> Vec<&'static str> {
        find_missing_toggles(&self.descriptors, &self.toggles)
    }

    /// Toggle slots without a descriptor, meta toggles excluded.
    pub fn validate_orphaned_toggles(&self) -> Vec<&'static str> {
        find_orphaned_toggles(&self.descriptors, &self.toggles)
    }

    /// Runs both sync validators and logs what they find. Returns true when in sync.
    pub fn self_check(&self) -> bool {
        let missing = self.validate_inheritance_sync();
        let orphaned = self.validate_orphaned_toggles();
        for name in &missing {
            warn!(event = "schema.toggle_missing", property = %name);
        }
        for name in &orphaned {
            warn!(event = "schema.toggle_orphaned", toggle = %name);
        }
        missing.is_empty() && orphaned.is_empty()
    }
}

fn describe(spec: &PropertySpec, toggles: &[&'static str]) -> PropertyDescriptor {
    let inheritable = match spec.declared {
        Some(declared) => declared.inheritable,
        None if KNOWN_NON_INHERITABLE.contains(&spec.name) => false,
        None => toggles.contains(&spec.name),
    };
    let serializable = match spec.declared {
        Some(declared) => declared.serializable,
        None if KNOWN_NON_SERIALIZABLE.contains(&spec.name) => false,
        None => spec.writable,
    };
    let encrypted = match spec.declared {
        Some(declared) => declared.encrypted,
        None => spec.password,
    };

    PropertyDescriptor {
        name: spec.name,
        category: spec.category,
        value_type: spec.value_type,
        default: spec.default,
        inheritable,
        serializable,
        encrypted,
        browsable: spec.browsable,
        writable: spec.writable,
    }
}
