use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::inheritance::InheritanceDefaults;
use crate::schema::{PropertyRegistry, PropertyValue};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Config names unknown property '{name}'")]
    UnknownProperty { name: String },

    #[error("Config lists '{name}' but it has no inheritance toggle")]
    NotInheritable { name: String },

    #[error("max_depth must be at least 1")]
    InvalidDepth,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub inheritance: InheritanceConfig,

    #[serde(default)]
    pub resolution: ResolutionConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InheritanceConfig {
    // Template value for every toggle of a new node
    #[serde(default)]
    pub default_all: bool,

    // Per-property template overrides
    #[serde(default)]
    pub defaults: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolutionConfig {
    #[serde(default = "default_credential_properties")]
    pub credential_properties: Vec<String>,

    #[serde(default)]
    pub empty_values: EmptyValues,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            credential_properties: default_credential_properties(),
            empty_values: EmptyValues::default(),
            max_depth: default_max_depth(),
        }
    }
}

/// What counts as "no value" for the credential empty-skip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyValues {
    #[default]
    Empty,
    Whitespace,
}

impl EmptyValues {
    pub fn is_empty(self, value: &PropertyValue) -> bool {
        match (self, value) {
            (EmptyValues::Empty, PropertyValue::Text(s)) => s.is_empty(),
            (EmptyValues::Whitespace, PropertyValue::Text(s)) => s.trim().is_empty(),
            _ => false,
        }
    }
}

fn default_credential_properties() -> Vec<String> {
    vec![
        "username".to_string(),
        "password".to_string(),
        "domain".to_string(),
    ]
}

fn default_max_depth() -> usize {
    64
}

/// Runtime policy of the resolution engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionPolicy {
    /// Properties whose ancestor delegation skips ancestors with an empty local value.
    pub credential_properties: Vec<&'static str>,
    pub empty_values: EmptyValues,
    /// Upper bound on delegation hops for one lookup.
    pub max_depth: usize,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            credential_properties: vec!["username", "password", "domain"],
            empty_values: EmptyValues::Empty,
            max_depth: default_max_depth(),
        }
    }
}

impl ResolutionPolicy {
    pub fn skips_empty(&self, property: &str) -> bool {
        self.credential_properties.iter().any(|p| *p == property)
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn inheritance_defaults(
        &self,
        schema: &'static PropertyRegistry,
    ) -> Result<InheritanceDefaults, ConfigError> {
        let mut defaults = InheritanceDefaults::new(self.inheritance.default_all);
        for (name, inherit) in &self.inheritance.defaults {
            let toggle = toggle_name(schema, name)?;
            defaults = defaults.with_override(toggle, *inherit);
        }
        Ok(defaults)
    }

    pub fn resolution_policy(
        &self,
        schema: &'static PropertyRegistry,
    ) -> Result<ResolutionPolicy, ConfigError> {
        if self.resolution.max_depth == 0 {
            return Err(ConfigError::InvalidDepth);
        }
        let credential_properties = self
            .resolution
            .credential_properties
            .iter()
            .map(|name| toggle_name(schema, name))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ResolutionPolicy {
            credential_properties,
            empty_values: self.resolution.empty_values,
            max_depth: self.resolution.max_depth,
        })
    }
}

fn toggle_name(schema: &'static PropertyRegistry, name: &str) -> Result<&'static str, ConfigError> {
    if schema.get(name).is_none() {
        return Err(ConfigError::UnknownProperty {
            name: name.to_string(),
        });
    }
    schema
        .toggle_names()
        .iter()
        .copied()
        .find(|t| *t == name)
        .ok_or_else(|| ConfigError::NotInheritable {
            name: name.to_string(),
        })
}
