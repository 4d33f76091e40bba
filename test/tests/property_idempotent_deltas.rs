/// PROPERTY-BASED TESTS: delta application is idempotent
///
/// Applying a stream of deltas once, in order, must give the same result as
/// applying it with arbitrary retransmissions of earlier deltas mixed in.

use proptest::prelude::*;
use proptest::sample::Index;
use volley_shared::{Outbox, OutgoingMessage, SyncList};
use volley_test::{addressed_to, client_player, server_player, OBSERVER};

#[derive(Clone, Debug)]
enum ListAction {
    Add(u32),
    Insert(Index, u32),
    Set(Index, u32),
    RemoveAt(Index),
    Clear,
}

fn action_strategy() -> impl Strategy<Value = ListAction> {
    prop_oneof![
        4 => any::<u32>().prop_map(ListAction::Add),
        2 => (any::<Index>(), any::<u32>()).prop_map(|(index, item)| ListAction::Insert(index, item)),
        2 => (any::<Index>(), any::<u32>()).prop_map(|(index, item)| ListAction::Set(index, item)),
        2 => any::<Index>().prop_map(ListAction::RemoveAt),
        1 => Just(ListAction::Clear),
    ]
}

fn perform(list: &mut SyncList<u32>, action: &ListAction) {
    match action {
        ListAction::Add(item) => list.add(*item),
        ListAction::Insert(index, item) => list.insert(index.index(list.len() + 1), *item),
        ListAction::Set(index, item) => {
            if !list.is_empty() {
                list.set(index.index(list.len()), *item);
            }
        }
        ListAction::RemoveAt(index) => {
            if !list.is_empty() {
                list.remove_at(index.index(list.len()));
            }
        }
        ListAction::Clear => list.clear(),
    }
}

/// Runs every batch on a server, one tick each, returning the sync
/// messages an ordinary observer receives per tick
fn record_ticks(batches: &[Vec<ListAction>]) -> (Vec<u32>, Vec<Vec<OutgoingMessage>>) {
    let mut server = server_player();
    let mut outbox = Outbox::new();
    let mut ticks = Vec::new();
    for (tick, batch) in batches.iter().enumerate() {
        for action in batch {
            perform(&mut server.get_mut().inventory, action);
        }
        server.tick(tick as u32, &mut outbox);
        ticks.push(addressed_to(&outbox.drain(), OBSERVER));
    }
    (server.get().inventory.as_slice().to_vec(), ticks)
}

proptest! {
    #[test]
    fn prop_duplicates_are_no_ops(
        batches in prop::collection::vec(prop::collection::vec(action_strategy(), 0..6), 1..10),
        retransmits in prop::collection::vec(prop::collection::vec(any::<Index>(), 0..3), 10),
    ) {
        let (server_items, ticks) = record_ticks(&batches);

        let mut once = client_player(OBSERVER);
        let mut with_duplicates = client_player(OBSERVER);
        for (tick, messages) in ticks.iter().enumerate() {
            volley_test::apply_sync(&mut once, messages);
            volley_test::apply_sync(&mut with_duplicates, messages);
            for earlier in &retransmits[tick] {
                let replayed = &ticks[earlier.index(tick + 1)];
                volley_test::apply_sync(&mut with_duplicates, replayed);
            }
        }

        prop_assert_eq!(once.get().inventory.as_slice(), server_items.as_slice());
        prop_assert_eq!(
            with_duplicates.get().inventory.as_slice(),
            once.get().inventory.as_slice()
        );
    }

    #[test]
    fn prop_full_write_matches_delta_log(
        batches in prop::collection::vec(prop::collection::vec(action_strategy(), 0..6), 1..10),
    ) {
        let mut server = server_player();
        let mut by_delta = client_player(OBSERVER);
        let mut outbox = Outbox::new();
        for (tick, batch) in batches.iter().enumerate() {
            for action in batch {
                perform(&mut server.get_mut().inventory, action);
            }
            server.tick(tick as u32, &mut outbox);
            volley_test::apply_sync(&mut by_delta, &addressed_to(&outbox.drain(), OBSERVER));
        }

        let mut by_full = client_player(OBSERVER);
        if let Some(message) = server.write_full(OBSERVER, batches.len() as u32) {
            volley_test::apply_sync(&mut by_full, &[message]);
        }

        prop_assert_eq!(
            by_full.get().inventory.as_slice(),
            by_delta.get().inventory.as_slice()
        );
    }
}
