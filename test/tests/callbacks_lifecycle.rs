/// Changes applied before a client has started are reported once it starts

use std::{cell::RefCell, rc::Rc};

use volley_shared::{ListOperation, NetworkObject, Outbox, VolleyConfig};
use volley_test::{addressed_to, apply_sync, server_player, Player, OBSERVER};

#[test]
fn spawn_payload_callbacks_wait_for_start() {
    let mut server = server_player();
    server.get_mut().inventory.add(1);
    server.get_mut().inventory.add(2);

    let mut client = NetworkObject::new(Player::new(), &VolleyConfig::default());
    client.initialize_client(Some(OBSERVER), Some(volley_test::OWNER));
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    client
        .get_mut()
        .inventory
        .on_change(move |change, as_server| sink.borrow_mut().push((change.operation, as_server)));

    apply_sync(&mut client, &[server.write_full(OBSERVER, 0).unwrap()]);
    assert_eq!(client.get().inventory.as_slice(), &[1, 2]);
    assert!(events.borrow().is_empty());
    assert!(!client.get().started_client);

    client.start_client();

    assert!(client.get().started_client);
    assert_eq!(
        *events.borrow(),
        vec![
            (ListOperation::Add, false),
            (ListOperation::Add, false),
            (ListOperation::Complete, false),
        ]
    );
}

#[test]
fn started_client_reports_immediately() {
    let mut server = server_player();
    let mut client = volley_test::client_player(OBSERVER);
    let mut outbox = Outbox::new();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    client
        .get_mut()
        .inventory
        .on_change(move |change, _| sink.borrow_mut().push(change.operation));

    server.get_mut().inventory.add(5);
    server.tick(0, &mut outbox);
    apply_sync(&mut client, &addressed_to(&outbox.drain(), OBSERVER));

    assert_eq!(
        *events.borrow(),
        vec![ListOperation::Add, ListOperation::Complete]
    );
}

#[test]
fn server_changes_before_start_are_flushed_on_start() {
    let mut server = NetworkObject::new(Player::new(), &VolleyConfig::default());
    server.initialize_server(None);
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    server
        .get_mut()
        .name
        .on_change(move |change, as_server| sink.borrow_mut().push((change.next.clone(), as_server)));

    server.get_mut().name.set("early".to_string());
    assert!(events.borrow().is_empty());

    server.start_server();

    assert!(server.get().started_server);
    assert_eq!(*events.borrow(), vec![("early".to_string(), true)]);
}

#[test]
fn offline_changes_never_report() {
    let mut player = Player::new();
    let events = Rc::new(RefCell::new(0));
    let counter = events.clone();
    player.tags.on_change(move |_, _| *counter.borrow_mut() += 1);

    player.tags.add("solo".to_string());

    assert!(player.tags.contains(&"solo".to_string()));
    assert_eq!(*events.borrow(), 0);
}
