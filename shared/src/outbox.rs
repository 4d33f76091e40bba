use std::collections::VecDeque;

use crate::{channel::Channel, types::ConnectionId};

/// What an outgoing payload contains, so the transport can route it to the
/// matching `read_*`/`receive_*` entry point on the other side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    SyncTypes,
    Rpc,
    Replicate,
    Reconcile,
}

/// Who should receive an outgoing payload. Resolving these into concrete
/// connections is the observer system's job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageTarget {
    Server,
    Observers,
    NonOwnerObservers,
    Owner,
    Connection(ConnectionId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub kind: MessageKind,
    pub channel: Channel,
    pub target: MessageTarget,
    pub bytes: Vec<u8>,
}

impl OutgoingMessage {
    pub fn new(kind: MessageKind, channel: Channel, target: MessageTarget, bytes: Vec<u8>) -> Self {
        Self {
            kind,
            channel,
            target,
            bytes,
        }
    }
}

/// Messages produced during a tick, waiting to be handed to the transport
#[derive(Default)]
pub struct Outbox {
    messages: VecDeque<OutgoingMessage>,
}

impl Outbox {
    pub fn new() -> Self {
        Self {
            messages: VecDeque::new(),
        }
    }

    pub fn push(&mut self, message: OutgoingMessage) {
        self.messages.push_back(message);
    }

    pub fn extend<I: IntoIterator<Item = OutgoingMessage>>(&mut self, messages: I) {
        self.messages.extend(messages);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutgoingMessage> {
        self.messages.iter()
    }

    /// Removes every queued message, in the order they were pushed
    pub fn drain(&mut self) -> Vec<OutgoingMessage> {
        self.messages.drain(..).collect()
    }
}
