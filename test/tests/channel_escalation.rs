/// Unreliable sync values are followed by one reliable delta, and send
/// rates hold deltas back until the member is due again

use volley_shared::{
    ByteReader, Channel, NetworkObject, Outbox, OutgoingMessage, Replicable, SyncSettings,
    SyncType, SyncVar, VolleyConfig,
};
use volley_test::{
    addressed_to, apply_sync, client_player, init_logger, server_player, LinkConditions,
    LocalLink, OBSERVER,
};

fn channels(messages: &[OutgoingMessage]) -> Vec<Channel> {
    messages.iter().map(|message| message.channel).collect()
}

#[test]
fn unreliable_value_is_resent_reliably_once() {
    init_logger();
    let mut server = server_player();
    let mut outbox = Outbox::new();

    server.get_mut().health.set(70);

    server.tick(0, &mut outbox);
    assert_eq!(channels(&outbox.drain()), vec![Channel::Unreliable, Channel::Unreliable]);

    server.tick(1, &mut outbox);
    assert_eq!(channels(&outbox.drain()), vec![Channel::Reliable, Channel::Reliable]);

    server.tick(2, &mut outbox);
    assert!(outbox.is_empty());
}

#[test]
fn new_write_during_escalation_goes_unreliable_again() {
    let mut server = server_player();
    let mut outbox = Outbox::new();

    server.get_mut().health.set(70);
    server.tick(0, &mut outbox);
    outbox.drain();

    server.get_mut().health.set(60);
    server.tick(1, &mut outbox);
    let sent = outbox.drain();
    assert!(sent.iter().all(|message| message.channel == Channel::Unreliable));

    server.tick(2, &mut outbox);
    assert!(outbox
        .drain()
        .iter()
        .all(|message| message.channel == Channel::Reliable));
}

#[test]
fn reliable_follow_up_is_ignored_when_unreliable_arrived() {
    let mut server = server_player();
    let mut client = client_player(OBSERVER);
    let mut outbox = Outbox::new();
    let changes = std::rc::Rc::new(std::cell::Cell::new(0));
    let counter = changes.clone();
    client
        .get_mut()
        .health
        .on_change(move |_, _| counter.set(counter.get() + 1));

    server.get_mut().health.set(1);
    server.tick(0, &mut outbox);
    server.tick(1, &mut outbox);
    apply_sync(&mut client, &addressed_to(&outbox.drain(), OBSERVER));

    assert_eq!(*client.get().health.get(), 1);
    assert_eq!(changes.get(), 1);
}

#[test]
fn lossy_link_converges_through_reliable_follow_up() {
    init_logger();
    let mut server = server_player();
    let mut client = client_player(OBSERVER);
    let mut outbox = Outbox::new();
    let conditions = LinkConditions {
        loss: 1.0,
        duplicate: 0.0,
        reorder: 0.0,
    };
    let mut link = LocalLink::new(7, conditions);

    server.get_mut().health.set(12);
    for tick in 0..3 {
        server.tick(tick, &mut outbox);
        link.send_all(&mut outbox);
        apply_sync(&mut client, &addressed_to(&link.deliver(), OBSERVER));
    }

    assert!(link.dropped() > 0);
    assert_eq!(*client.get().health.get(), 12);
}

// Send rate

struct Gauge {
    level: SyncVar<u8>,
}

impl Replicable for Gauge {
    fn sync_types(&mut self) -> Vec<&mut dyn SyncType> {
        vec![&mut self.level as &mut dyn SyncType]
    }
}

fn server_gauge() -> NetworkObject<Gauge> {
    let gauge = Gauge {
        level: SyncVar::with_settings(0, SyncSettings::new()),
    };
    let mut object = NetworkObject::new(gauge, &VolleyConfig::default());
    object.initialize_server(None);
    object.start_server();
    object
}

#[test]
fn send_rate_holds_deltas_until_due() {
    let mut server = server_gauge();
    let mut outbox = Outbox::new();
    // 100ms at 16ms ticks
    assert_eq!(server.get_mut().level.tracker().send_rate_ticks(), 7);

    server.get_mut().level.set(1);
    server.tick(0, &mut outbox);
    assert_eq!(outbox.drain().len(), 1);

    server.get_mut().level.set(2);
    for tick in 1..7 {
        server.tick(tick, &mut outbox);
        assert!(outbox.is_empty(), "delta sent early at tick {}", tick);
    }
    assert!(server.get_mut().level.tracker().is_dirty());

    server.tick(7, &mut outbox);
    let sent = outbox.drain();
    assert_eq!(sent.len(), 1);

    let mut client = NetworkObject::new(
        Gauge {
            level: SyncVar::new(0),
        },
        &VolleyConfig::default(),
    );
    client.initialize_client(Some(OBSERVER), None);
    client.start_client();
    client
        .read_sync_types(&mut ByteReader::new(&sent[0].bytes), false)
        .unwrap();
    assert_eq!(*client.get().level.get(), 2);
}
