pub mod config;
pub mod frame;
pub mod store;
pub mod tree;

pub use config::*;
pub use frame::*;
pub use store::*;
pub use tree::*;
