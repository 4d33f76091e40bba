use thiserror::Error;

use crate::{rpc::error::RpcError, sync::error::SyncError};

/// Errors raised while building a NetworkObject
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkObjectError {
    #[error("Failed to register sync members: {0}")]
    Sync(#[from] SyncError),

    #[error("Failed to register RPCs: {0}")]
    Rpc(#[from] RpcError),
}
