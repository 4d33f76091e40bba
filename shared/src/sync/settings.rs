use std::time::Duration;

use crate::channel::Channel;

/// Who may change a sync member
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WritePermission {
    /// Only the server records changes; client-side edits stay local
    #[default]
    ServerOnly,
    /// Clients may change their local copy freely, it is never sent
    ClientUnsynchronized,
}

/// Which observers receive a sync member's changes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReadPermission {
    #[default]
    Observers,
    OwnerOnly,
    ExcludeOwner,
}

impl ReadPermission {
    /// Whether a recipient with the given ownership may read this member
    pub fn allows(&self, recipient_is_owner: bool) -> bool {
        match self {
            ReadPermission::Observers => true,
            ReadPermission::OwnerOnly => recipient_is_owner,
            ReadPermission::ExcludeOwner => !recipient_is_owner,
        }
    }
}

/// Per-member replication settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncSettings {
    pub write_permission: WritePermission,
    pub read_permission: ReadPermission,
    /// Minimum time between two deltas of this member
    pub send_rate: Duration,
    pub channel: Channel,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            write_permission: WritePermission::ServerOnly,
            read_permission: ReadPermission::Observers,
            send_rate: Duration::from_millis(100),
            channel: Channel::Reliable,
        }
    }
}

impl SyncSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_permission(mut self, permission: WritePermission) -> Self {
        self.write_permission = permission;
        self
    }

    pub fn read_permission(mut self, permission: ReadPermission) -> Self {
        self.read_permission = permission;
        self
    }

    pub fn send_rate(mut self, rate: Duration) -> Self {
        self.send_rate = rate;
        self
    }

    pub fn channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }
}
