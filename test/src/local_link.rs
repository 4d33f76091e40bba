//! In-memory link for end-to-end tests
//! Carries outgoing messages from one peer to another, degrading unreliable
//! traffic the way a real network would

use std::collections::VecDeque;

use volley_shared::{Outbox, OutgoingMessage};

/// Probabilities applied to each unreliable message
#[derive(Clone, Copy, Debug, Default)]
pub struct LinkConditions {
    pub loss: f32,
    pub duplicate: f32,
    pub reorder: f32,
}

impl LinkConditions {
    pub fn perfect() -> Self {
        Self::default()
    }

    pub fn lossy() -> Self {
        Self {
            loss: 0.3,
            duplicate: 0.2,
            reorder: 0.3,
        }
    }
}

/// One direction of a connection. Reliable messages arrive once and in
/// order; unreliable ones may be dropped, duplicated or overtaken.
pub struct LocalLink {
    rng: fastrand::Rng,
    conditions: LinkConditions,
    in_flight: VecDeque<OutgoingMessage>,
    dropped: usize,
}

impl LocalLink {
    pub fn new(seed: u64, conditions: LinkConditions) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            conditions,
            in_flight: VecDeque::new(),
            dropped: 0,
        }
    }

    pub fn perfect() -> Self {
        Self::new(0, LinkConditions::perfect())
    }

    pub fn send(&mut self, message: OutgoingMessage) {
        self.in_flight.push_back(message);
    }

    pub fn send_all(&mut self, outbox: &mut Outbox) {
        for message in outbox.drain() {
            self.send(message);
        }
    }

    /// Unreliable messages lost so far
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Everything sent since the last call, as the receiver sees it
    pub fn deliver(&mut self) -> Vec<OutgoingMessage> {
        let mut delivered: Vec<OutgoingMessage> = Vec::new();
        while let Some(message) = self.in_flight.pop_front() {
            if message.channel.is_reliable() {
                delivered.push(message);
                continue;
            }
            if self.rng.f32() < self.conditions.loss {
                log::trace!("LocalLink dropped a {:?} message", message.kind);
                self.dropped += 1;
                continue;
            }
            if self.rng.f32() < self.conditions.duplicate {
                delivered.push(message.clone());
            }
            let overtake = self.rng.f32() < self.conditions.reorder
                && delivered
                    .last()
                    .is_some_and(|previous| !previous.channel.is_reliable());
            delivered.push(message);
            if overtake {
                let len = delivered.len();
                delivered.swap(len - 2, len - 1);
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use volley_shared::{Channel, MessageKind, MessageTarget};

    use super::*;

    fn message(channel: Channel, byte: u8) -> OutgoingMessage {
        OutgoingMessage::new(MessageKind::SyncTypes, channel, MessageTarget::Observers, vec![byte])
    }

    #[test]
    fn reliable_traffic_is_untouched() {
        let mut link = LocalLink::new(
            7,
            LinkConditions {
                loss: 1.0,
                duplicate: 1.0,
                reorder: 1.0,
            },
        );
        for byte in 0..10 {
            link.send(message(Channel::Reliable, byte));
            link.send(message(Channel::Unreliable, 100));
        }

        let bytes: Vec<u8> = link.deliver().iter().map(|message| message.bytes[0]).collect();

        assert_eq!(bytes, (0..10).collect::<Vec<u8>>());
        assert_eq!(link.dropped(), 10);
    }

    #[test]
    fn perfect_link_delivers_everything_in_order() {
        let mut link = LocalLink::perfect();
        for byte in 0..5 {
            link.send(message(Channel::Unreliable, byte));
        }

        let bytes: Vec<u8> = link.deliver().iter().map(|message| message.bytes[0]).collect();

        assert_eq!(bytes, vec![0, 1, 2, 3, 4]);
        assert!(link.is_idle());
    }
}
