pub mod arena;
pub mod error;
pub mod events;
pub mod lookup;
pub mod node;


pub use arena::*;
pub use error::*;
pub use events::*;
pub use lookup::*;
pub use node::*;
