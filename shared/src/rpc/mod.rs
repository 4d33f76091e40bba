pub mod error;
pub mod rpc_kind;
pub mod rpc_message;
pub mod rpc_registry;
