pub mod config;
pub mod resolver;


pub use config::*;
pub use resolver::*;
