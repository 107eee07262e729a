use std::collections::BTreeMap;
use std::fmt;

use super::properties::META_TOGGLES;
use super::registry::{PropertyDescriptor, PropertyRegistry};
use super::value::PropertyValue;

#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub message: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Error,
    Warning,
}

/// Diagnostics collected while loading or checking a tree.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, message: String, location: Option<String>) {
        self.errors.push(ValidationIssue {
            severity: IssueSeverity::Error,
            message,
            location,
        });
    }

    pub fn add_warning(&mut self, message: String, location: Option<String>) {
        self.warnings.push(ValidationIssue {
            severity: IssueSeverity::Warning,
            message,
            location,
        });
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_issues(&self) -> bool {
        !self.errors.is_empty() || !self.warnings.is_empty()
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.errors.is_empty() {
            writeln!(f, "Errors:")?;
            for issue in &self.errors {
                write_issue(f, issue)?;
            }
        }
        if !self.warnings.is_empty() {
            writeln!(f, "Warnings:")?;
            for issue in &self.warnings {
                write_issue(f, issue)?;
            }
        }
        Ok(())
    }
}

fn write_issue(f: &mut fmt::Formatter<'_>, issue: &ValidationIssue) -> fmt::Result {
    match &issue.location {
        Some(location) => writeln!(f, "  [{}] {}", location, issue.message),
        None => writeln!(f, "  {}", issue.message),
    }
}

pub fn find_missing_toggles(
    descriptors: &[PropertyDescriptor],
    toggles: &[&'static str],
) -> Vec<&'static str> {
    descriptors
        .iter()
        .filter(|d| d.inheritable && !toggles.contains(&d.name))
        .map(|d| d.name)
        .collect()
}

pub fn find_orphaned_toggles(
    descriptors: &[PropertyDescriptor],
    toggles: &[&'static str],
) -> Vec<&'static str> {
    toggles
        .iter()
        .filter(|t| !META_TOGGLES.contains(*t))
        .filter(|t| !descriptors.iter().any(|d| d.name == **t))
        .copied()
        .collect()
}

/// Checks persisted property and toggle maps against the registry.
pub struct SchemaValidator<'a> {
    registry: &'a PropertyRegistry,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(registry: &'a PropertyRegistry) -> Self {
        Self { registry }
    }

    /// Keeps the entries that match the schema, coercing where unambiguous.
    /// Everything dropped or coerced is reported as a warning against `location`.
    pub fn validate_properties(
        &self,
        location: &str,
        raw: BTreeMap<String, PropertyValue>,
        result: &mut ValidationResult,
    ) -> BTreeMap<&'static str, PropertyValue> {
        let mut accepted = BTreeMap::new();

        for (name, value) in raw {
            let descriptor = match self.registry.get(&name) {
                Some(d) => d,
                None => {
                    result.add_warning(
                        format!("Unknown property '{}' dropped", name),
                        Some(location.to_string()),
                    );
                    continue;
                }
            };

            let original = value.clone();
            match descriptor.value_type.coerce(descriptor.name, value) {
                Ok(coerced) => {
                    if coerced != original && coerced.type_name() != original.type_name() {
                        result.add_warning(
                            format!(
                                "Property '{}' coerced from {} '{}' to {}",
                                name,
                                original.type_name(),
                                original,
                                coerced.type_name()
                            ),
                            Some(location.to_string()),
                        );
                    }
                    accepted.insert(descriptor.name, coerced);
                }
                Err(e) => {
                    result.add_warning(format!("{}; value dropped", e), Some(location.to_string()));
                }
            }
        }

        accepted
    }

    /// Keeps known toggle flags and reports unknown ones.
    pub fn validate_toggles(
        &self,
        location: &str,
        raw: BTreeMap<String, bool>,
        result: &mut ValidationResult,
    ) -> BTreeMap<&'static str, bool> {
        let mut accepted = BTreeMap::new();

        for (name, flag) in raw {
            match self.registry.toggle_names().iter().find(|t| **t == name) {
                Some(toggle) => {
                    accepted.insert(*toggle, flag);
                }
                None => result.add_warning(
                    format!("Unknown inheritance toggle '{}' dropped", name),
                    Some(location.to_string()),
                ),
            }
        }

        accepted
    }
}
