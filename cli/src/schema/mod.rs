pub mod error;
pub mod properties;
pub mod registry;
pub mod validator;
pub mod value;

#[cfg(test)]
mod tests;

pub use error::*;
pub use properties::{default_port, Category, Declared, PropertySpec, PROPERTY_TABLE};
pub use registry::*;
pub use validator::*;
pub use value::*;
