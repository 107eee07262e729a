use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::SchemaError;

/// Declared type of a configurable property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Int,
    String,
    /// A closed set of lowercase variant names.
    Enum(&'static [&'static str]),
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::String => "string",
            ValueType::Enum(_) => "enum",
        }
    }

    /// Strict check used by setters: the value must already have the right shape.
    /// Enum values are normalised to the canonical variant spelling.
    pub fn check(&self, property: &str, value: PropertyValue) -> Result<PropertyValue, SchemaError> {
        match (self, value) {
            (ValueType::Bool, v @ PropertyValue::Bool(_)) => Ok(v),
            (ValueType::Int, v @ PropertyValue::Int(_)) => Ok(v),
            (ValueType::String, v @ PropertyValue::Text(_)) => Ok(v),
            (ValueType::Enum(variants), PropertyValue::Text(s)) => variants
                .iter()
                .find(|variant| variant.eq_ignore_ascii_case(s.trim()))
                .map(|variant| PropertyValue::Text((*variant).to_string()))
                .ok_or_else(|| SchemaError::InvalidChoice {
                    property: property.to_string(),
                    value: s,
                    allowed: variants.join(", "),
                }),
            (expected, found) => Err(SchemaError::TypeMismatch {
                property: property.to_string(),
                expected: expected.name(),
                found: found.type_name(),
            }),
        }
    }

    /// Lenient conversion used when reading persisted or user-typed values.
    pub fn coerce(&self, property: &str, value: PropertyValue) -> Result<PropertyValue, SchemaError> {
        let coerced = match (self, value) {
            (ValueType::Bool, PropertyValue::Text(s)) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" => PropertyValue::Bool(true),
                "false" | "no" | "0" => PropertyValue::Bool(false),
                _ => PropertyValue::Text(s),
            },
            (ValueType::Bool, PropertyValue::Int(i)) if i == 0 || i == 1 => PropertyValue::Bool(i == 1),
            (ValueType::Int, PropertyValue::Text(s)) => match s.trim().parse::<i64>() {
                Ok(i) => PropertyValue::Int(i),
                Err(_) => PropertyValue::Text(s),
            },
            (ValueType::String, PropertyValue::Int(i)) => PropertyValue::Text(i.to_string()),
            (ValueType::String, PropertyValue::Bool(b)) => PropertyValue::Text(b.to_string()),
            (_, other) => other,
        };
        self.check(property, coerced)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Enum(variants) => write!(f, "enum({})", variants.join("|")),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Compile-time default of a property, convertible into a [`PropertyValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Str(&'static str),
}

impl DefaultValue {
    pub fn to_value(self) -> PropertyValue {
        match self {
            DefaultValue::Bool(b) => PropertyValue::Bool(b),
            DefaultValue::Int(i) => PropertyValue::Int(i),
            DefaultValue::Str(s) => PropertyValue::Text(s.to_string()),
        }
    }
}

/// A raw or effective property value. Enum values are stored as their variant text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl PropertyValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Int(_) => "int",
            PropertyValue::Text(_) => "string",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Int(i) => write!(f, "{}", i),
            PropertyValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(i64::from(value))
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}
