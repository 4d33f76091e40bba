use volley_serde::Serde;

use crate::{
    outbox::Outbox,
    types::{MethodHash, Tick},
};

/// Information passed to each run of a predicted object's input logic
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplicateContext {
    pub tick: Tick,
    pub as_server: bool,
    /// True while re-running buffered inputs after a correction
    pub replaying: bool,
    /// The server had no input for this tick and substituted the default
    pub default_input: bool,
}

/// An object whose movement is simulated ahead on its owning client and
/// corrected by the server
pub trait Predicted {
    /// Per-tick input produced by the owning client
    type Input: Serde + Default;
    /// Authoritative state the server sends back
    type State: Serde;

    const REPLICATE_HASH: MethodHash;
    const RECONCILE_HASH: MethodHash;

    /// Applies one tick of input. Must be deterministic for replays to
    /// converge with the server.
    fn replicate(&mut self, input: &Self::Input, context: &ReplicateContext);

    fn reconcile_state(&self) -> Self::State;

    fn apply_reconcile(&mut self, state: &Self::State);

    /// Buffer and send inputs even when they equal the default
    fn always_replicate(&self) -> bool {
        false
    }

    fn on_pre_reconcile(&mut self) {}

    fn on_post_reconcile(&mut self) {}

    fn on_pre_replicate_replay(&mut self, _tick: Tick) {}

    fn on_post_replicate_replay(&mut self, _tick: Tick) {}

    /// Sends the full physics state once per correction, before its first
    /// reconcile snapshot
    fn broadcast_physics_state(&mut self, _outbox: &mut Outbox) {}
}

/// The physics scene, stepped explicitly during replays
pub trait PhysicsStepper {
    /// Pushes current object transforms into the physics scene
    fn sync_transforms(&mut self);

    fn simulate(&mut self, delta: f64);
}

/// A stepper for objects without a physics scene
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPhysics;

impl PhysicsStepper for NoPhysics {
    fn sync_transforms(&mut self) {}

    fn simulate(&mut self, _delta: f64) {}
}
