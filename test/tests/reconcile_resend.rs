/// Corrections and inputs are resent a fixed number of times so a single
/// lost datagram does not stall prediction

use volley_shared::{
    read_replicate_batch, write_replicate_batch, ByteReader, Channel, ClientPrediction,
    MessageKind, MessageTarget, NetworkRoles, Outbox, OutgoingMessage, Predicted,
    PredictionConfig, ReplicateEntry, ServerPrediction,
};
use volley_test::{Motor, MotorInput, OWNER};

fn owner_roles() -> NetworkRoles {
    NetworkRoles {
        is_server: false,
        is_client: true,
        owner: Some(OWNER),
        local_connection: Some(OWNER),
    }
}

fn feed(server: &mut ServerPrediction<Motor>, tick: u32) {
    let bytes = write_replicate_batch(
        Motor::REPLICATE_HASH,
        &[ReplicateEntry::new(tick, MotorInput { thrust: 1 })],
    );
    server
        .receive_replicate(&mut ByteReader::new(&bytes))
        .unwrap();
}

fn channels(messages: &[OutgoingMessage]) -> Vec<Channel> {
    messages.iter().map(|message| message.channel).collect()
}

#[test]
fn reconcile_is_sent_three_times_last_reliable() {
    let mut server = ServerPrediction::<Motor>::new(&PredictionConfig::default());
    let mut motor = Motor::default();
    let mut outbox = Outbox::new();
    feed(&mut server, 1);
    server.process_queue(&mut motor, 1);

    for _ in 0..5 {
        server.send_reconcile(&mut motor, &mut outbox);
    }
    let sent = outbox.drain();

    assert_eq!(
        channels(&sent),
        vec![Channel::Unreliable, Channel::Unreliable, Channel::Reliable]
    );
    assert!(sent.iter().all(|message| message.kind == MessageKind::Reconcile
        && message.target == MessageTarget::Owner));
    assert_eq!(motor.physics_broadcasts, 1);
    assert_eq!(server.resends_remaining(), 0);
}

#[test]
fn new_input_restarts_resends() {
    let mut server = ServerPrediction::<Motor>::new(&PredictionConfig::default());
    let mut motor = Motor::default();
    let mut outbox = Outbox::new();
    feed(&mut server, 1);
    server.process_queue(&mut motor, 1);
    server.send_reconcile(&mut motor, &mut outbox);
    server.send_reconcile(&mut motor, &mut outbox);

    feed(&mut server, 2);
    server.process_queue(&mut motor, 2);
    for _ in 0..4 {
        server.send_reconcile(&mut motor, &mut outbox);
    }
    let sent = outbox.drain();

    assert_eq!(
        channels(&sent),
        vec![
            Channel::Unreliable,
            Channel::Unreliable,
            Channel::Unreliable,
            Channel::Unreliable,
            Channel::Reliable,
        ]
    );
    assert_eq!(motor.physics_broadcasts, 2);
}

#[test]
fn nothing_is_sent_before_any_input() {
    let mut server = ServerPrediction::<Motor>::new(&PredictionConfig::default());
    let mut motor = Motor::default();
    let mut outbox = Outbox::new();

    server.process_queue(&mut motor, 1);
    server.send_reconcile(&mut motor, &mut outbox);

    assert!(outbox.is_empty());
}

#[test]
fn client_resends_input_on_the_next_ticks() {
    let mut client = ClientPrediction::<Motor>::new(&PredictionConfig::default());
    let mut motor = Motor::default();
    let mut outbox = Outbox::new();

    client.tick(&mut motor, MotorInput { thrust: 2 }, 1, &owner_roles(), &mut outbox);
    for tick in 2..=5 {
        client.tick(&mut motor, MotorInput::default(), tick, &owner_roles(), &mut outbox);
    }
    let sent = outbox.drain();

    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|message| message.channel == Channel::Unreliable
        && message.kind == MessageKind::Replicate
        && message.target == MessageTarget::Server));
    for message in &sent {
        let entries = read_replicate_batch::<MotorInput>(
            &mut ByteReader::new(&message.bytes),
            Motor::REPLICATE_HASH,
        )
        .unwrap();
        assert_eq!(entries, vec![ReplicateEntry::new(1, MotorInput { thrust: 2 })]);
    }
    // default inputs are simulated but not buffered
    assert_eq!(client.buffer().ticks(), vec![1]);
    assert_eq!(motor.state.position, 10);
}

#[test]
fn resend_carries_at_most_five_newest_inputs() {
    let mut client = ClientPrediction::<Motor>::new(&PredictionConfig::default());
    let mut motor = Motor::default();
    let mut outbox = Outbox::new();

    for tick in 1..=7 {
        client.tick(&mut motor, MotorInput { thrust: 1 }, tick, &owner_roles(), &mut outbox);
    }
    let sent = outbox.drain();
    let last = sent.last().unwrap();
    let entries = read_replicate_batch::<MotorInput>(
        &mut ByteReader::new(&last.bytes),
        Motor::REPLICATE_HASH,
    )
    .unwrap();

    assert_eq!(sent.len(), 7);
    assert_eq!(
        entries.iter().map(|entry| entry.tick).collect::<Vec<_>>(),
        vec![3, 4, 5, 6, 7]
    );
}

#[test]
fn always_replicate_buffers_default_inputs() {
    let mut client = ClientPrediction::<Motor>::new(&PredictionConfig::default());
    let mut motor = Motor {
        always_replicate: true,
        ..Default::default()
    };
    let mut outbox = Outbox::new();

    for tick in 1..=4 {
        client.tick(&mut motor, MotorInput::default(), tick, &owner_roles(), &mut outbox);
    }

    assert_eq!(client.buffer().ticks(), vec![1, 2, 3, 4]);
    assert_eq!(outbox.len(), 4);
}
