use thiserror::Error;
use volley_serde::SerdeErr;

use crate::{rpc::rpc_kind::RpcKind, types::MethodHash};

/// Errors that can occur while registering, sending or receiving RPCs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// Two handlers on one object type share a method hash
    #[error("RPC method hash {hash:#010x} is already registered. Rename one of the methods")]
    DuplicateHash { hash: MethodHash },

    /// Incoming or outgoing call names a hash with no registration
    #[error("No RPC registered with method hash {hash:#010x}")]
    UnknownHash { hash: MethodHash },

    /// A call was sent through the wrong entry point for its registration
    #[error("RPC {hash:#010x} is registered as {registered:?} but was sent as {requested:?}")]
    KindMismatch {
        hash: MethodHash,
        registered: RpcKind,
        requested: RpcKind,
    },

    /// The sending side is not in a role that may issue this call
    #[error("Cannot send {kind:?} RPC {hash:#010x}: {reason}")]
    InvalidSender {
        hash: MethodHash,
        kind: RpcKind,
        reason: &'static str,
    },

    /// The message could not be decoded
    #[error("Failed to decode RPC message: {0}")]
    Serde(#[from] SerdeErr),
}
