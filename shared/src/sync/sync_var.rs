use volley_serde::{ByteReader, ByteWrite, Serde, SerdeErr};

use crate::{
    sync::{
        callbacks::SyncCallbacks,
        change_tracker::{ChangeTracker, MutationContext},
        settings::SyncSettings,
        sync_type::SyncType,
    },
    types::Tick,
};

/// Old and new value of a SyncVar
#[derive(Clone, Debug, PartialEq)]
pub struct SyncVarChange<T> {
    pub previous: T,
    pub next: T,
}

/// A single replicated value
pub struct SyncVar<T: Serde> {
    tracker: ChangeTracker,
    value: T,
    initial: T,
    callbacks: SyncCallbacks<SyncVarChange<T>>,
}

impl<T: Serde> SyncVar<T> {
    pub fn new(value: T) -> Self {
        Self::with_settings(value, SyncSettings::default())
    }

    pub fn with_settings(value: T, settings: SyncSettings) -> Self {
        Self {
            tracker: ChangeTracker::new(settings, false),
            initial: value.clone(),
            value,
            callbacks: SyncCallbacks::new(),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Value every peer constructs the member with
    pub fn initial(&self) -> &T {
        &self.initial
    }

    /// Registers a change listener, called with the change and whether it
    /// happened on the server side
    pub fn on_change(&mut self, listener: impl FnMut(&SyncVarChange<T>, bool) + 'static) {
        self.callbacks.listen(listener);
    }

    pub fn set(&mut self, next: T) {
        if self.value == next {
            return;
        }
        let context = self.tracker.mutation_context("SyncVar");
        let previous = std::mem::replace(&mut self.value, next);
        match context {
            MutationContext::Offline => {}
            MutationContext::Authoritative { host } => {
                self.tracker.mark_dirty();
                self.emit(previous.clone(), true);
                if host {
                    self.emit(previous, false);
                }
            }
            MutationContext::ClientLocal | MutationContext::Unauthorized => {
                self.emit(previous, false);
            }
        }
    }

    /// Replaces both the value and the initial value without recording a change
    pub fn set_initial(&mut self, value: T) {
        self.initial = value.clone();
        self.value = value;
    }

    /// Forces the current value to be sent again
    pub fn dirty(&mut self) {
        if self.tracker.mutation_context("SyncVar").records() {
            self.tracker.mark_dirty();
        }
    }

    fn emit(&mut self, previous: T, as_server: bool) {
        let started = self.tracker.is_started(as_server);
        let change = SyncVarChange {
            previous,
            next: self.value.clone(),
        };
        self.callbacks.emit(change, as_server, started);
    }
}

impl<T: Serde> SyncType for SyncVar<T> {
    fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut ChangeTracker {
        &mut self.tracker
    }

    fn write_delta(&mut self, writer: &mut dyn ByteWrite, tick: Tick, reset_tick: bool) {
        self.tracker.write_header(writer, tick, reset_tick);
        self.tracker.write_change_id(writer, false);
        self.value.ser(writer);
    }

    fn write_full(&mut self, writer: &mut dyn ByteWrite, tick: Tick) -> bool {
        if self.value == self.initial {
            return false;
        }
        self.tracker.write_header(writer, tick, false);
        self.tracker.write_change_id(writer, true);
        self.value.ser(writer);
        self.tracker.record_full_write(tick);
        true
    }

    fn read(&mut self, reader: &mut ByteReader, as_server: bool) -> Result<(), SerdeErr> {
        let change_id = self.tracker.read_change_id(reader)?;
        let next = T::de(reader)?;
        if change_id.ignore || self.tracker.is_host_client_read(as_server) {
            return Ok(());
        }
        if self.value == next {
            return Ok(());
        }
        let previous = std::mem::replace(&mut self.value, next);
        self.emit(previous, as_server);
        Ok(())
    }

    fn on_start_callback(&mut self, as_server: bool) {
        self.callbacks.flush(as_server);
    }
}
