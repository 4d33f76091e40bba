use thiserror::Error;
use volley_serde::SerdeErr;

use crate::types::MethodHash;

/// Errors raised by replicate / reconcile message handling
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictionError {
    /// A message for another predicted method was routed here
    #[error("Expected prediction message {expected:#010x}, found {found:#010x}")]
    UnexpectedHash {
        expected: MethodHash,
        found: MethodHash,
    },

    /// Inputs may only be submitted by the owning client
    #[error("Cannot replicate inputs: {reason}")]
    NotOwner { reason: &'static str },

    /// The message could not be decoded
    #[error("Failed to decode prediction message: {0}")]
    Serde(#[from] SerdeErr),
}
