#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Unknown property '{name}'")]
    UnknownProperty { name: String },

    #[error("Property '{property}' expects a {expected} value, got {found}")]
    TypeMismatch {
        property: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("'{value}' is not a valid choice for '{property}' (expected one of: {allowed})")]
    InvalidChoice {
        property: String,
        value: String,
        allowed: String,
    },

    #[error("Property '{property}' is read-only")]
    ReadOnly { property: String },
}
