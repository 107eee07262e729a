pub mod error;
pub mod library;
pub mod model;

pub use error::*;
pub use library::*;
pub use model::*;
