pub mod error;
pub mod network_object;
pub mod replicable;
pub mod roles;
