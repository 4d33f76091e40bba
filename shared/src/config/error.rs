use thiserror::Error;

/// Errors raised while validating a VolleyConfig
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Tick interval must be greater than zero")]
    ZeroTickInterval,

    #[error("Replicate resend window must hold at least one input")]
    ZeroResendWindow,

    #[error("Server replicate queue high-water mark must be greater than zero")]
    ZeroHighWaterMark,

    #[error("Server replicate queue excess threshold ({excess}) exceeds its high-water mark ({high_water})")]
    QueueThresholdsInverted { excess: usize, high_water: usize },

    #[error("Reconcile snapshots must be sent at least once")]
    ZeroReconcileResends,
}
