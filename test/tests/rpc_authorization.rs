/// Unauthorized calls are drained without running, so the calls behind them
/// in the same stream still dispatch

use volley_shared::{
    write_rpc, ByteReader, Channel, ConnectionId, MessageKind, MessageTarget, Outbox, RpcError,
    RpcKind, RpcOutcome, RpcSkip,
};
use volley_test::{
    client_player, init_logger, server_player, EMOTE, JUMP, OBSERVER, OWNER, RENAME, WHISPER,
};

fn concat(messages: &[Vec<u8>]) -> Vec<u8> {
    messages.iter().flatten().copied().collect()
}

#[test]
fn non_owner_call_is_skipped_and_next_call_runs() {
    init_logger();
    let mut server = server_player();
    let stream = concat(&[
        write_rpc(JUMP, Channel::Reliable, &3u8),
        write_rpc(RENAME, Channel::Reliable, &"bob".to_string()),
    ]);
    let mut reader = ByteReader::new(&stream);

    let first = server.receive_rpc(&mut reader, Some(OBSERVER), None).unwrap();
    let second = server.receive_rpc(&mut reader, Some(OBSERVER), None).unwrap();

    assert_eq!(first, RpcOutcome::Skipped(RpcSkip::NotOwner));
    assert_eq!(second, RpcOutcome::Invoked);
    assert!(reader.is_empty());
    assert!(server.get().jumps.is_empty());
    assert_eq!(server.get().name.get(), "bob");
}

#[test]
fn owner_call_reaches_server_with_sender() {
    let mut server = server_player();
    let mut owner = client_player(OWNER);
    let mut outbox = Outbox::new();

    owner.send_server_rpc(JUMP, &9u8).unwrap();
    owner.flush_rpcs(&mut outbox);
    let sent = outbox.drain();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].target, MessageTarget::Server);

    let outcome = server
        .receive_rpc(&mut ByteReader::new(&sent[0].bytes), Some(OWNER), None)
        .unwrap();

    assert_eq!(outcome, RpcOutcome::Invoked);
    assert_eq!(server.get().jumps, vec![(9, Some(OWNER))]);
}

#[test]
fn non_owner_client_cannot_send_owned_call() {
    let mut observer = client_player(OBSERVER);

    let result = observer.send_server_rpc(JUMP, &1u8);

    assert!(matches!(
        result,
        Err(RpcError::InvalidSender {
            kind: RpcKind::Server,
            ..
        })
    ));
    assert_eq!(observer.pending_rpcs(), 0);
    // ownership is not required for renaming
    observer.send_server_rpc(RENAME, &"eve".to_string()).unwrap();
    assert_eq!(observer.pending_rpcs(), 1);
}

#[test]
fn wrong_target_is_drained_before_next_call() {
    let mut server = server_player();
    let mut observer = client_player(OBSERVER);
    let mut outbox = Outbox::new();

    server
        .send_target_rpc(WHISPER, OWNER, &"secret".to_string())
        .unwrap();
    server.send_observers_rpc(EMOTE, &"wave".to_string()).unwrap();
    server.flush_rpcs(&mut outbox);
    let sent = outbox.drain();
    assert_eq!(sent[0].target, MessageTarget::Connection(OWNER));
    assert_eq!(sent[1].target, MessageTarget::Observers);

    let stream = concat(&[sent[0].bytes.clone(), sent[1].bytes.clone()]);
    let mut reader = ByteReader::new(&stream);

    let whisper = observer.receive_rpc(&mut reader, None, Some(OWNER)).unwrap();
    let emote = observer.receive_rpc(&mut reader, None, None).unwrap();

    assert_eq!(whisper, RpcOutcome::Skipped(RpcSkip::WrongTarget));
    assert_eq!(emote, RpcOutcome::Invoked);
    assert!(observer.get().whispers.is_empty());
    assert_eq!(observer.get().emotes, vec!["wave".to_string()]);
}

#[test]
fn target_call_runs_on_its_recipient() {
    let mut server = server_player();
    let mut owner = client_player(OWNER);
    let mut outbox = Outbox::new();

    server
        .send_target_rpc(WHISPER, OWNER, &"psst".to_string())
        .unwrap();
    server.flush_rpcs(&mut outbox);
    let sent = outbox.drain();

    owner
        .receive_rpc(&mut ByteReader::new(&sent[0].bytes), None, Some(OWNER))
        .unwrap();

    assert_eq!(owner.get().whispers, vec![("psst".to_string(), Some(OWNER))]);
}

#[test]
fn server_kind_arriving_on_client_is_skipped() {
    let mut observer = client_player(OBSERVER);
    let bytes = write_rpc(RENAME, Channel::Reliable, &"mallory".to_string());

    let outcome = observer
        .receive_rpc(&mut ByteReader::new(&bytes), None, None)
        .unwrap();

    assert_eq!(outcome, RpcOutcome::Skipped(RpcSkip::NotServer));
    assert_eq!(observer.get().name.get(), "");
}

#[test]
fn late_observer_gets_last_buffered_call() {
    let mut server = server_player();
    let mut outbox = Outbox::new();
    let late = ConnectionId::new(3);

    server.send_observers_rpc(EMOTE, &"wave".to_string()).unwrap();
    server.send_observers_rpc(EMOTE, &"dance".to_string()).unwrap();
    server.flush_rpcs(&mut outbox);
    assert_eq!(outbox.drain().len(), 2);

    let buffered = server.buffered_rpcs(late);
    assert_eq!(buffered.len(), 1);
    assert_eq!(buffered[0].kind, MessageKind::Rpc);
    assert_eq!(buffered[0].target, MessageTarget::Connection(late));

    let mut joiner = client_player(late);
    joiner
        .receive_rpc(&mut ByteReader::new(&buffered[0].bytes), None, None)
        .unwrap();
    assert_eq!(joiner.get().emotes, vec!["dance".to_string()]);
}

#[test]
fn observers_call_from_client_is_rejected() {
    let mut observer = client_player(OBSERVER);

    let result = observer.send_observers_rpc(EMOTE, &"hi".to_string());

    assert!(matches!(
        result,
        Err(RpcError::InvalidSender {
            kind: RpcKind::Observers,
            ..
        })
    ));
}
