pub mod error;
pub mod export;
pub mod models;
pub mod snapshot;
pub mod toml_store;

#[cfg(test)]
mod tests;

pub use error::*;
pub use export::*;
pub use models::*;
pub use snapshot::*;
pub use toml_store::*;
