pub mod check;
pub mod nav;
pub mod search;
pub mod tree_ops;
