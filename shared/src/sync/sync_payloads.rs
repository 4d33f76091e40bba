use volley_serde::ByteWriter;

use crate::{
    channel::Channel,
    outbox::{MessageKind, MessageTarget, OutgoingMessage},
    sync::settings::ReadPermission,
};

/// Which group of observers a sync payload is for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncAudience {
    Owner,
    NonOwnerObservers,
}

impl SyncAudience {
    pub const ALL: [SyncAudience; 2] = [SyncAudience::Owner, SyncAudience::NonOwnerObservers];

    pub fn is_owner(&self) -> bool {
        matches!(self, SyncAudience::Owner)
    }

    pub fn reads(&self, permission: ReadPermission) -> bool {
        permission.allows(self.is_owner())
    }

    fn target(&self) -> MessageTarget {
        match self {
            SyncAudience::Owner => MessageTarget::Owner,
            SyncAudience::NonOwnerObservers => MessageTarget::NonOwnerObservers,
        }
    }
}

/// Output of one sync sweep over an object: a buffer per audience and channel
pub struct SyncPayloads {
    // [owner reliable, owner unreliable, others reliable, others unreliable]
    writers: [ByteWriter; 4],
}

impl Default for SyncPayloads {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncPayloads {
    pub fn new() -> Self {
        Self {
            writers: [
                ByteWriter::new(),
                ByteWriter::new(),
                ByteWriter::new(),
                ByteWriter::new(),
            ],
        }
    }

    fn slot(audience: SyncAudience, channel: Channel) -> usize {
        let audience = match audience {
            SyncAudience::Owner => 0,
            SyncAudience::NonOwnerObservers => 2,
        };
        let channel = match channel {
            Channel::Reliable => 0,
            Channel::Unreliable => 1,
        };
        audience + channel
    }

    pub fn writer_mut(&mut self, audience: SyncAudience, channel: Channel) -> &mut ByteWriter {
        &mut self.writers[Self::slot(audience, channel)]
    }

    pub fn payload(&self, audience: SyncAudience, channel: Channel) -> &[u8] {
        self.writers[Self::slot(audience, channel)].as_slice()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.iter().all(ByteWriter::is_empty)
    }

    /// Turns the non-empty buffers into outgoing messages. Owner payloads
    /// are dropped when the object has no owner.
    pub fn into_messages(self, has_owner: bool) -> Vec<OutgoingMessage> {
        let mut messages = Vec::new();
        for audience in SyncAudience::ALL {
            if audience.is_owner() && !has_owner {
                continue;
            }
            for channel in [Channel::Reliable, Channel::Unreliable] {
                let payload = self.payload(audience, channel);
                if payload.is_empty() {
                    continue;
                }
                messages.push(OutgoingMessage::new(
                    MessageKind::SyncTypes,
                    channel,
                    audience.target(),
                    payload.to_vec(),
                ));
            }
        }
        messages
    }
}
