use std::time::Duration;

use log::{trace, warn};
use volley_serde::{ByteReader, ByteWrite, Serde, SerdeErr};

use crate::{
    channel::Channel,
    sync::{
        error::SyncError,
        settings::{SyncSettings, WritePermission},
        sync_handle::SyncHandle,
    },
    time::duration_to_ticks,
    types::{ChangeId, SyncIndex, Tick},
};

/// How a mutation on a sync member should be treated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationContext {
    /// Object is not live on the network yet; changes become part of the
    /// initial state every peer constructs
    Offline,
    /// Server side: apply, record for the network, mark dirty
    Authoritative { host: bool },
    /// Client side of a ClientUnsynchronized member: apply locally only
    ClientLocal,
    /// Client side of a ServerOnly member: apply locally only, and warn
    Unauthorized,
}

impl MutationContext {
    pub fn records(&self) -> bool {
        matches!(self, MutationContext::Authoritative { .. })
    }

    pub fn is_host(&self) -> bool {
        matches!(self, MutationContext::Authoritative { host: true })
    }
}

/// The reset flag and verdict read from an incoming change id
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeIdRead {
    pub reset: bool,
    pub change_id: ChangeId,
    /// The payload is stale or duplicated and must be drained without applying
    pub ignore: bool,
}

/// Dirty / change id bookkeeping and send-rate gating for one sync member
pub struct ChangeTracker {
    settings: SyncSettings,
    is_collection: bool,
    index: Option<SyncIndex>,
    handle: Option<SyncHandle>,
    is_dirty: bool,
    // dirty only to repeat the final value on a reliable channel
    escalated: bool,
    current_channel: Channel,
    change_id: ChangeId,
    last_seen_change_id: ChangeId,
    last_full_write_tick: Tick,
    next_sync_tick: Tick,
    send_rate_ticks: u32,
}

impl ChangeTracker {
    pub fn new(settings: SyncSettings, is_collection: bool) -> Self {
        let current_channel = settings.channel;
        Self {
            settings,
            is_collection,
            index: None,
            handle: None,
            is_dirty: false,
            escalated: false,
            current_channel,
            change_id: 0,
            last_seen_change_id: 0,
            last_full_write_tick: 0,
            next_sync_tick: 0,
            send_rate_ticks: 0,
        }
    }

    /// Binds this member to its owning object
    pub fn initialize(
        &mut self,
        index: SyncIndex,
        handle: &SyncHandle,
        tick_interval: Duration,
    ) -> Result<(), SyncError> {
        if let Some(index) = self.index {
            return Err(SyncError::AlreadyInitialized { index });
        }
        self.index = Some(index);
        self.handle = Some(handle.clone());
        self.send_rate_ticks = duration_to_ticks(self.settings.send_rate, tick_interval);
        Ok(())
    }

    pub fn index(&self) -> Option<SyncIndex> {
        self.index
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn is_collection(&self) -> bool {
        self.is_collection
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Channel the next delta goes out on
    pub fn channel(&self) -> Channel {
        self.current_channel
    }

    pub fn change_id(&self) -> ChangeId {
        self.change_id
    }

    pub fn last_seen_change_id(&self) -> ChangeId {
        self.last_seen_change_id
    }

    pub fn next_sync_tick(&self) -> Tick {
        self.next_sync_tick
    }

    pub fn last_full_write_tick(&self) -> Tick {
        self.last_full_write_tick
    }

    pub fn send_rate_ticks(&self) -> u32 {
        self.send_rate_ticks
    }

    pub fn is_host(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| handle.is_host())
    }

    pub fn is_started(&self, as_server: bool) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| handle.is_started(as_server))
    }

    /// Classifies a mutation about to happen. Logs when a client edits a
    /// member only the server may write.
    pub fn mutation_context(&self, type_name: &'static str) -> MutationContext {
        let Some(handle) = &self.handle else {
            return MutationContext::Offline;
        };
        let roles = handle.roles();
        if !roles.is_network_live() {
            return MutationContext::Offline;
        }
        if roles.is_server {
            return MutationContext::Authoritative {
                host: roles.is_client,
            };
        }
        match self.settings.write_permission {
            WritePermission::ClientUnsynchronized => MutationContext::ClientLocal,
            WritePermission::ServerOnly => {
                warn!(
                    "{} at index {:?} is ServerOnly; client-side change applied locally but not sent",
                    type_name, self.index
                );
                MutationContext::Unauthorized
            }
        }
    }

    /// Host processes see their own server-side writes mirrored directly, so
    /// the client half of a host must not apply them a second time.
    pub fn is_host_client_read(&self, as_server: bool) -> bool {
        !as_server
            && self
                .handle
                .as_ref()
                .is_some_and(|handle| handle.is_authoritative())
    }

    // Dirty

    /// Flags the member as having an unsent change. Returns whether the
    /// owning object went from clean to having dirty members.
    pub fn mark_dirty(&mut self) -> bool {
        if self.is_dirty && !self.escalated {
            return false;
        }
        let Some(index) = self.index else {
            return false;
        };
        let Some(handle) = &self.handle else {
            return false;
        };

        self.is_dirty = true;
        self.escalated = false;
        self.current_channel = self.settings.channel;
        self.change_id = self.change_id.wrapping_add(1);
        handle.mark_dirty(index)
    }

    /// Called after a delta has been written. Unreliable values get one more
    /// pass on the reliable channel so the final value always arrives.
    pub fn reset_dirty(&mut self) {
        if !self.is_dirty {
            return;
        }
        if !self.is_collection
            && self.settings.channel == Channel::Unreliable
            && !self.escalated
        {
            self.escalated = true;
            self.current_channel = Channel::Reliable;
            return;
        }

        self.is_dirty = false;
        self.escalated = false;
        self.current_channel = self.settings.channel;
        if let (Some(index), Some(handle)) = (self.index, &self.handle) {
            handle.clear_dirty(index);
        }
    }

    /// Whether the send rate allows a delta this tick
    pub fn is_sync_due(&self, tick: Tick) -> bool {
        tick >= self.next_sync_tick
    }

    // Wire

    /// Writes the member's SyncIndex; optionally restarts the send-rate timer
    pub fn write_header(&mut self, writer: &mut dyn ByteWrite, tick: Tick, reset_tick: bool) {
        let Some(index) = self.index else {
            panic!("Sync member written before it was registered on an object");
        };
        index.ser(writer);
        if reset_tick {
            self.next_sync_tick = tick.saturating_add(self.send_rate_ticks);
        }
    }

    /// Writes the reset flag followed by the change id. Full writes carry
    /// the reset flag so the receiver adopts the id unconditionally.
    pub fn write_change_id(&self, writer: &mut dyn ByteWrite, reset: bool) {
        reset.ser(writer);
        self.change_id.ser(writer);
    }

    /// Reads the reset flag and change id, deciding whether the payload
    /// behind them must be ignored. Ids are compared as serial numbers, so
    /// the counter may wrap as long as a receiver never falls more than
    /// 2^31 changes behind.
    pub fn read_change_id(&mut self, reader: &mut ByteReader) -> Result<ChangeIdRead, SerdeErr> {
        let reset = bool::de(reader)?;
        let change_id = ChangeId::de(reader)?;
        let ignore = !reset && !is_newer_change_id(change_id, self.last_seen_change_id);
        if ignore {
            trace!(
                "Dropping stale change id {} (last seen {}) at index {:?}",
                change_id,
                self.last_seen_change_id,
                self.index
            );
        } else {
            self.last_seen_change_id = change_id;
        }
        Ok(ChangeIdRead {
            reset,
            change_id,
            ignore,
        })
    }

    pub fn record_full_write(&mut self, tick: Tick) {
        self.last_full_write_tick = tick;
    }
}

/// Whether `id` comes after `last` in wrapping serial-number order
fn is_newer_change_id(id: ChangeId, last: ChangeId) -> bool {
    let distance = id.wrapping_sub(last);
    distance != 0 && distance < 1 << 31
}
