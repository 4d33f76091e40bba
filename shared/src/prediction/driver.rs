use volley_serde::ByteReader;

use crate::{
    config::PredictionConfig,
    network::roles::NetworkRoles,
    outbox::Outbox,
    prediction::{
        client_prediction::ClientPrediction,
        error::PredictionError,
        predicted::{PhysicsStepper, Predicted},
        server_prediction::ServerPrediction,
    },
    time::TimeManager,
};

/// Runs the prediction steps of one object for whichever roles this
/// process holds
pub struct PredictionDriver<P: Predicted> {
    server: ServerPrediction<P>,
    client: ClientPrediction<P>,
}

impl<P: Predicted> PredictionDriver<P> {
    pub fn new(config: &PredictionConfig) -> Self {
        Self {
            server: ServerPrediction::new(config),
            client: ClientPrediction::new(config),
        }
    }

    pub fn server(&self) -> &ServerPrediction<P> {
        &self.server
    }

    pub fn client(&self) -> &ClientPrediction<P> {
        &self.client
    }

    pub fn receive_replicate(&mut self, reader: &mut ByteReader) -> Result<usize, PredictionError> {
        self.server.receive_replicate(reader)
    }

    pub fn receive_reconcile(&mut self, reader: &mut ByteReader) -> Result<bool, PredictionError> {
        self.client.receive_reconcile(reader)
    }

    /// One prediction step: apply any pending correction, then simulate
    /// this tick's input on the side(s) this process runs
    pub fn tick(
        &mut self,
        object: &mut P,
        input: P::Input,
        roles: &NetworkRoles,
        time: &dyn TimeManager,
        stepper: &mut dyn PhysicsStepper,
        outbox: &mut Outbox,
    ) {
        let tick = time.local_tick();
        if roles.is_client {
            self.client.reconcile(object, roles, stepper, time);
        }

        if roles.is_server {
            if roles.is_owner() {
                self.server.process_local(object, &input, tick);
            } else {
                self.server.process_queue(object, tick);
            }
            self.server.send_reconcile(object, outbox);
        } else if roles.is_client {
            self.client.tick(object, input, tick, roles, outbox);
        }
    }
}
