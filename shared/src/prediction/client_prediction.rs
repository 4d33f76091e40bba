use log::trace;
use volley_serde::ByteReader;

use crate::{
    channel::Channel,
    config::PredictionConfig,
    network::roles::NetworkRoles,
    outbox::{MessageKind, MessageTarget, Outbox, OutgoingMessage},
    prediction::{
        client_buffer::ClientReplicateBuffer,
        error::PredictionError,
        messages::{write_replicate_batch, ReconcileSnapshot},
        predicted::{PhysicsStepper, Predicted, ReplicateContext},
    },
    time::{PhysicsMode, TimeManager},
    types::Tick,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PredictionState {
    /// No unconfirmed inputs
    Idle,
    /// Inputs simulated locally, awaiting a reconcile
    Buffering,
    /// Re-running buffered inputs over a corrected state
    Replaying,
}

/// Owning-client half of prediction: simulates inputs immediately, sends
/// them to the server, and replays them over each correction
pub struct ClientPrediction<P: Predicted> {
    buffer: ClientReplicateBuffer<P::Input>,
    replaying: bool,
    resend_count: u8,
    resends_remaining: u8,
    resend_window: usize,
    last_reconcile_tick: Option<Tick>,
    pending_reconcile: Option<ReconcileSnapshot<P::State>>,
}

impl<P: Predicted> ClientPrediction<P> {
    pub fn new(config: &PredictionConfig) -> Self {
        Self {
            buffer: ClientReplicateBuffer::new(),
            replaying: false,
            resend_count: config.resend_count,
            resends_remaining: 0,
            resend_window: config.resend_window,
            last_reconcile_tick: None,
            pending_reconcile: None,
        }
    }

    pub fn state(&self) -> PredictionState {
        if self.replaying {
            PredictionState::Replaying
        } else if self.buffer.is_empty() {
            PredictionState::Idle
        } else {
            PredictionState::Buffering
        }
    }

    pub fn buffer(&self) -> &ClientReplicateBuffer<P::Input> {
        &self.buffer
    }

    pub fn has_reconcile(&self) -> bool {
        self.pending_reconcile.is_some()
    }

    pub fn last_reconcile_tick(&self) -> Option<Tick> {
        self.last_reconcile_tick
    }

    /// Simulates `input` for `tick` and queues it for the server. Does
    /// nothing on the server, on non-owners, or while replaying.
    pub fn tick(
        &mut self,
        object: &mut P,
        input: P::Input,
        tick: Tick,
        roles: &NetworkRoles,
        outbox: &mut Outbox,
    ) {
        if roles.is_server || self.replaying || !roles.is_owner() {
            return;
        }

        let default_input = input == P::Input::default();
        let context = ReplicateContext {
            tick,
            as_server: false,
            replaying: false,
            default_input,
        };
        object.replicate(&input, &context);

        if !default_input || object.always_replicate() {
            self.buffer.push(tick, input);
            self.resends_remaining = self.resend_count;
        }

        if self.resends_remaining > 0 {
            self.resends_remaining -= 1;
            let entries = self.buffer.tail_entries(self.resend_window);
            outbox.push(OutgoingMessage::new(
                MessageKind::Replicate,
                Channel::Unreliable,
                MessageTarget::Server,
                write_replicate_batch(P::REPLICATE_HASH, &entries),
            ));
        }
    }

    /// Stores a reconcile snapshot for the next `reconcile` pass. Returns
    /// false if it is not newer than the last one accepted.
    pub fn receive_reconcile(&mut self, reader: &mut ByteReader) -> Result<bool, PredictionError> {
        let snapshot = ReconcileSnapshot::<P::State>::read(reader, P::RECONCILE_HASH)?;
        if self
            .last_reconcile_tick
            .is_some_and(|last| snapshot.tick <= last)
        {
            trace!("Ignoring stale reconcile for tick {}", snapshot.tick);
            return Ok(false);
        }
        self.last_reconcile_tick = Some(snapshot.tick);
        self.pending_reconcile = Some(snapshot);
        Ok(true)
    }

    /// Applies the pending correction and replays every input the server
    /// had not yet processed. Returns false if there was nothing to apply.
    pub fn reconcile(
        &mut self,
        object: &mut P,
        roles: &NetworkRoles,
        stepper: &mut dyn PhysicsStepper,
        time: &dyn TimeManager,
    ) -> bool {
        let Some(snapshot) = self.pending_reconcile.take() else {
            return false;
        };

        // a host already runs the authoritative state
        if roles.is_server {
            object.on_pre_reconcile();
            object.on_post_reconcile();
            return true;
        }

        object.on_pre_reconcile();
        object.apply_reconcile(&snapshot.state);
        self.buffer.remove_through(snapshot.tick);

        stepper.sync_transforms();
        self.replaying = true;
        let simulate = time.physics_mode() == PhysicsMode::TimeManager;
        let default = P::Input::default();
        for (tick, input) in self.buffer.iter() {
            object.on_pre_replicate_replay(*tick);
            let context = ReplicateContext {
                tick: *tick,
                as_server: false,
                replaying: true,
                default_input: *input == default,
            };
            object.replicate(input, &context);
            if simulate {
                stepper.simulate(time.tick_delta());
            }
            object.on_post_replicate_replay(*tick);
        }
        self.replaying = false;
        object.on_post_reconcile();
        true
    }
}
