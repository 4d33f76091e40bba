use thiserror::Error;
use volley_serde::SerdeErr;

use crate::types::SyncIndex;

/// Errors that can occur while registering or reading sync members
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// A sync member was registered on a second object, or twice on one
    #[error("Sync member already initialized with index {index}. Each member must be registered exactly once")]
    AlreadyInitialized { index: SyncIndex },

    /// The object declared more members than a SyncIndex can address
    #[error("Objects may declare at most {max} sync members")]
    TooManySyncTypes { max: usize },

    /// Incoming data named a member the object does not have
    #[error("No sync member registered at index {index}")]
    UnknownSyncIndex { index: SyncIndex },

    /// The payload could not be decoded
    #[error("Failed to decode sync payload: {0}")]
    Serde(#[from] SerdeErr),
}
