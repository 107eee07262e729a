pub mod inheritance;
pub mod logging;
pub mod preset;
pub mod schema;
pub mod scope;
pub mod store;
pub mod tree;
