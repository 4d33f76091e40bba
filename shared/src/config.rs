use std::time::Duration;

use crate::time::PhysicsMode;

pub mod error;
pub use error::ConfigError;

/// Contains Config properties which govern replication, RPCs and prediction
#[derive(Clone, Debug, Default)]
pub struct VolleyConfig {
    /// Fixed tick timing
    pub time: TimeConfig,
    /// Replicate / reconcile buffering
    pub prediction: PredictionConfig,
    /// Remote procedure call behaviour
    pub rpc: RpcConfig,
}

impl VolleyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.time.validate()?;
        self.prediction.validate()?;
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct TimeConfig {
    /// The duration between each network tick
    pub tick_interval: Duration,
    /// Who steps the physics scene
    pub physics_mode: PhysicsMode,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(16),
            physics_mode: PhysicsMode::Automatic,
        }
    }
}

impl TimeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct PredictionConfig {
    /// Ticks a freshly buffered input keeps being resent to the server
    pub resend_count: u8,
    /// How many of the newest buffered inputs go into each resend
    pub resend_window: usize,
    /// Server queue depth beyond which the oldest inputs are dropped before
    /// each consume
    pub server_queue_excess: usize,
    /// Server queue depth at which incoming batches trim the head
    pub server_queue_high_water: usize,
    /// Times each reconcile snapshot is sent; the final send is reliable
    pub reconcile_resends: u8,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            resend_count: 3,
            resend_window: 5,
            server_queue_excess: 3,
            server_queue_high_water: 15,
            reconcile_resends: 3,
        }
    }
}

impl PredictionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resend_window == 0 {
            return Err(ConfigError::ZeroResendWindow);
        }
        if self.server_queue_high_water == 0 {
            return Err(ConfigError::ZeroHighWaterMark);
        }
        if self.server_queue_excess > self.server_queue_high_water {
            return Err(ConfigError::QueueThresholdsInverted {
                excess: self.server_queue_excess,
                high_water: self.server_queue_high_water,
            });
        }
        if self.reconcile_resends == 0 {
            return Err(ConfigError::ZeroReconcileResends);
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct RpcConfig {
    /// Emit a warning when an RPC is dropped for failing an ownership or
    /// recipient check
    pub log_authorization_failures: bool,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            log_authorization_failures: true,
        }
    }
}
