pub mod defaults;
pub mod operations;
pub mod toggles;

#[cfg(test)]
mod tests;

pub use defaults::*;
pub use operations::*;
pub use toggles::*;
