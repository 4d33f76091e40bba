use log::trace;
use volley_serde::ByteReader;

use crate::{
    channel::Channel,
    config::PredictionConfig,
    outbox::{MessageKind, MessageTarget, Outbox, OutgoingMessage},
    prediction::{
        error::PredictionError,
        messages::{read_replicate_batch, ReconcileSnapshot},
        predicted::{Predicted, ReplicateContext},
        server_queue::ServerReplicateQueue,
    },
    types::Tick,
};

/// Server half of prediction: consumes client inputs one per tick and sends
/// the resulting state back to the owner
pub struct ServerPrediction<P: Predicted> {
    queue: ServerReplicateQueue<P::Input>,
    reconcile_resends: u8,
    resends_remaining: u8,
    last_processed_tick: Option<Tick>,
}

impl<P: Predicted> ServerPrediction<P> {
    pub fn new(config: &PredictionConfig) -> Self {
        Self {
            queue: ServerReplicateQueue::new(config),
            reconcile_resends: config.reconcile_resends,
            resends_remaining: 0,
            last_processed_tick: None,
        }
    }

    pub fn queue(&self) -> &ServerReplicateQueue<P::Input> {
        &self.queue
    }

    pub fn last_processed_tick(&self) -> Option<Tick> {
        self.last_processed_tick
    }

    pub fn resends_remaining(&self) -> u8 {
        self.resends_remaining
    }

    /// Decodes a replicate batch from the owning client and queues its new
    /// inputs. Returns how many were accepted.
    pub fn receive_replicate(&mut self, reader: &mut ByteReader) -> Result<usize, PredictionError> {
        let entries = read_replicate_batch::<P::Input>(reader, P::REPLICATE_HASH)?;
        Ok(self.queue.receive(entries))
    }

    /// Runs the next queued input, or the default input when none arrived
    /// in time
    pub fn process_queue(&mut self, object: &mut P, tick: Tick) {
        match self.queue.dequeue() {
            Some(entry) => self.process(object, &entry.data, entry.tick, false),
            None => {
                trace!("No replicate queued for tick {}, using default input", tick);
                let context = ReplicateContext {
                    tick,
                    as_server: true,
                    replaying: false,
                    default_input: true,
                };
                object.replicate(&P::Input::default(), &context);
            }
        }
    }

    /// Runs an input produced on this process, for objects owned by the
    /// client half of a host
    pub fn process_local(&mut self, object: &mut P, input: &P::Input, tick: Tick) {
        let default_input = *input == P::Input::default();
        self.process(object, input, tick, default_input);
    }

    fn process(&mut self, object: &mut P, input: &P::Input, tick: Tick, default_input: bool) {
        let context = ReplicateContext {
            tick,
            as_server: true,
            replaying: false,
            default_input,
        };
        object.replicate(input, &context);
        self.last_processed_tick = Some(tick);
        self.resends_remaining = self.reconcile_resends;
    }

    /// Sends the state for the last processed input. Each correction goes
    /// out `reconcile_resends` times; the last send is reliable and only the
    /// first is preceded by a physics state broadcast.
    pub fn send_reconcile(&mut self, object: &mut P, outbox: &mut Outbox) {
        if self.resends_remaining == 0 {
            return;
        }
        let Some(tick) = self.last_processed_tick else {
            return;
        };

        let first_send = self.resends_remaining == self.reconcile_resends;
        self.resends_remaining -= 1;
        let channel = if self.resends_remaining == 0 {
            Channel::Reliable
        } else {
            Channel::Unreliable
        };

        if first_send {
            object.broadcast_physics_state(outbox);
        }

        let snapshot = ReconcileSnapshot {
            tick,
            state: object.reconcile_state(),
        };
        outbox.push(OutgoingMessage::new(
            MessageKind::Reconcile,
            channel,
            MessageTarget::Owner,
            snapshot.write(P::RECONCILE_HASH),
        ));
    }
}
