pub mod config;
pub mod hierarchy;
pub mod implementors;
