use std::time::Duration;

use volley_serde::{ByteReader, ByteWrite, SerdeErr};

use crate::{
    sync::{change_tracker::ChangeTracker, error::SyncError, sync_handle::SyncHandle},
    types::{SyncIndex, Tick},
};

/// The operations every replicated member exposes to its owning object
pub trait SyncType {
    fn tracker(&self) -> &ChangeTracker;

    fn tracker_mut(&mut self) -> &mut ChangeTracker;

    /// Writes the index, change id and every change recorded since the last
    /// delta, then forgets those changes
    fn write_delta(&mut self, writer: &mut dyn ByteWrite, tick: Tick, reset_tick: bool);

    /// Writes the complete current state, flagged as a reset. Writes nothing
    /// and returns false if the member never left its initial state.
    fn write_full(&mut self, writer: &mut dyn ByteWrite, tick: Tick) -> bool;

    /// Applies a payload written by `write_delta` or `write_full`. The index
    /// has already been consumed by the caller.
    fn read(&mut self, reader: &mut ByteReader, as_server: bool) -> Result<(), SerdeErr>;

    /// Delivers change callbacks held back until the object started
    fn on_start_callback(&mut self, as_server: bool);

    fn reset_dirty(&mut self) {
        self.tracker_mut().reset_dirty();
    }

    fn is_dirty(&self) -> bool {
        self.tracker().is_dirty()
    }

    fn index(&self) -> Option<SyncIndex> {
        self.tracker().index()
    }
}

/// Assigns sync indices, in declaration order, to the members of one object
pub struct SyncRegistrar<'h> {
    handle: &'h SyncHandle,
    tick_interval: Duration,
    next_index: usize,
}

impl<'h> SyncRegistrar<'h> {
    pub const MAX_SYNC_TYPES: usize = SyncIndex::MAX as usize + 1;

    pub fn new(handle: &'h SyncHandle, tick_interval: Duration) -> Self {
        Self {
            handle,
            tick_interval,
            next_index: 0,
        }
    }

    /// Binds `member` to the next free index
    pub fn register(&mut self, member: &mut dyn SyncType) -> Result<SyncIndex, SyncError> {
        if self.next_index >= Self::MAX_SYNC_TYPES {
            return Err(SyncError::TooManySyncTypes {
                max: Self::MAX_SYNC_TYPES,
            });
        }
        let index = self.next_index as SyncIndex;
        member
            .tracker_mut()
            .initialize(index, self.handle, self.tick_interval)?;
        self.next_index += 1;
        Ok(index)
    }

    pub fn register_all<'m>(
        &mut self,
        members: impl IntoIterator<Item = &'m mut dyn SyncType>,
    ) -> Result<usize, SyncError> {
        let mut count = 0;
        for member in members {
            self.register(member)?;
            count += 1;
        }
        Ok(count)
    }

    pub fn registered(&self) -> usize {
        self.next_index
    }
}
