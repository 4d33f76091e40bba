use log::debug;
use volley_serde::{ByteReader, ByteWrite, Serde, SerdeErr, VarUint};

use crate::{
    sync::{
        callbacks::SyncCallbacks,
        change_tracker::{ChangeTracker, MutationContext},
        settings::SyncSettings,
        sync_type::SyncType,
    },
    types::Tick,
};

/// Kind of change reported to SyncList listeners
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListOperation {
    Add,
    Insert,
    Set,
    RemoveAt,
    Clear,
    /// Raised once after an incoming batch has been fully applied
    Complete,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListChange<T> {
    pub operation: ListOperation,
    pub index: usize,
    pub old_item: Option<T>,
    pub new_item: Option<T>,
}

impl<T> ListChange<T> {
    fn complete() -> Self {
        Self {
            operation: ListOperation::Complete,
            index: 0,
            old_item: None,
            new_item: None,
        }
    }
}

/// One recorded SyncList change, as it travels on the wire
#[derive(Clone, Debug, PartialEq)]
pub enum ListOp<T> {
    Add(T),
    Insert(usize, T),
    Set(usize, T),
    RemoveAt(usize),
    Clear,
}

impl<T: Serde> ListOp<T> {
    const ADD: u8 = 0;
    const INSERT: u8 = 1;
    const SET: u8 = 2;
    const REMOVE_AT: u8 = 3;
    const CLEAR: u8 = 4;

    /// Applies this operation to `view`, returning the change to report.
    /// Out-of-range indices leave `view` untouched.
    fn apply(self, view: &mut Vec<T>) -> Option<ListChange<T>> {
        let (operation, index, old_item, new_item) = match self {
            ListOp::Add(item) => {
                view.push(item.clone());
                (ListOperation::Add, view.len() - 1, None, Some(item))
            }
            ListOp::Insert(index, item) => {
                if index > view.len() {
                    return None;
                }
                view.insert(index, item.clone());
                (ListOperation::Insert, index, None, Some(item))
            }
            ListOp::Set(index, item) => {
                let slot = view.get_mut(index)?;
                let old = std::mem::replace(slot, item.clone());
                (ListOperation::Set, index, Some(old), Some(item))
            }
            ListOp::RemoveAt(index) => {
                if index >= view.len() {
                    return None;
                }
                let old = view.remove(index);
                (ListOperation::RemoveAt, index, Some(old), None)
            }
            ListOp::Clear => {
                view.clear();
                (ListOperation::Clear, 0, None, None)
            }
        };
        Some(ListChange {
            operation,
            index,
            old_item,
            new_item,
        })
    }
}

impl<T: Serde> Serde for ListOp<T> {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        match self {
            ListOp::Add(item) => {
                Self::ADD.ser(writer);
                item.ser(writer);
            }
            ListOp::Insert(index, item) => {
                Self::INSERT.ser(writer);
                VarUint::from(*index).ser(writer);
                item.ser(writer);
            }
            ListOp::Set(index, item) => {
                Self::SET.ser(writer);
                VarUint::from(*index).ser(writer);
                item.ser(writer);
            }
            ListOp::RemoveAt(index) => {
                Self::REMOVE_AT.ser(writer);
                VarUint::from(*index).ser(writer);
            }
            ListOp::Clear => {
                Self::CLEAR.ser(writer);
            }
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let tag = u8::de(reader)?;
        match tag {
            Self::ADD => Ok(ListOp::Add(T::de(reader)?)),
            Self::INSERT => {
                let index = VarUint::de(reader)?.to_usize()?;
                Ok(ListOp::Insert(index, T::de(reader)?))
            }
            Self::SET => {
                let index = VarUint::de(reader)?.to_usize()?;
                Ok(ListOp::Set(index, T::de(reader)?))
            }
            Self::REMOVE_AT => Ok(ListOp::RemoveAt(VarUint::de(reader)?.to_usize()?)),
            Self::CLEAR => Ok(ListOp::Clear),
            value => Err(SerdeErr::InvalidDiscriminant {
                type_name: "SyncList operation",
                value,
            }),
        }
    }
}

/// A replicated ordered list
pub struct SyncList<T: Serde> {
    tracker: ChangeTracker,
    collection: Vec<T>,
    // client-side view kept by a host, fed only by mirrored server writes
    client_host_collection: Vec<T>,
    changes: Vec<ListOp<T>>,
    changed: bool,
    callbacks: SyncCallbacks<ListChange<T>>,
}

impl<T: Serde> Default for SyncList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serde> SyncList<T> {
    pub fn new() -> Self {
        Self::with_settings(SyncSettings::default())
    }

    pub fn with_settings(settings: SyncSettings) -> Self {
        Self {
            tracker: ChangeTracker::new(settings, true),
            collection: Vec::new(),
            client_host_collection: Vec::new(),
            changes: Vec::new(),
            changed: false,
            callbacks: SyncCallbacks::new(),
        }
    }

    pub fn on_change(&mut self, listener: impl FnMut(&ListChange<T>, bool) + 'static) {
        self.callbacks.listen(listener);
    }

    // Reads

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.collection.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.collection.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.collection
    }

    pub fn contains(&self, item: &T) -> bool {
        self.collection.contains(item)
    }

    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.collection.iter().position(|other| other == item)
    }

    /// The list as seen by client-side code. On a host this is the mirrored
    /// view, everywhere else it is the only storage.
    pub fn client_view(&self) -> &[T] {
        if self.tracker.is_host() {
            &self.client_host_collection
        } else {
            &self.collection
        }
    }

    // Mutations

    pub fn add(&mut self, item: T) {
        self.mutate(ListOp::Add(item));
    }

    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, item: T) {
        assert!(
            index <= self.collection.len(),
            "SyncList insert index {} out of bounds (len {})",
            index,
            self.collection.len()
        );
        self.mutate(ListOp::Insert(index, item));
    }

    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn set(&mut self, index: usize, item: T) {
        assert!(
            index < self.collection.len(),
            "SyncList set index {} out of bounds (len {})",
            index,
            self.collection.len()
        );
        if self.collection[index] == item {
            return;
        }
        self.mutate(ListOp::Set(index, item));
    }

    /// Removes the first element equal to `item`
    pub fn remove(&mut self, item: &T) -> bool {
        let Some(index) = self.index_of(item) else {
            return false;
        };
        self.mutate(ListOp::RemoveAt(index));
        true
    }

    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove_at(&mut self, index: usize) -> T {
        assert!(
            index < self.collection.len(),
            "SyncList remove_at index {} out of bounds (len {})",
            index,
            self.collection.len()
        );
        let item = self.collection[index].clone();
        self.mutate(ListOp::RemoveAt(index));
        item
    }

    pub fn clear(&mut self) {
        self.mutate(ListOp::Clear);
    }

    /// Sends the element at `index` again, for items mutated in place
    pub fn dirty(&mut self, index: usize) {
        let Some(item) = self.collection.get(index).cloned() else {
            return;
        };
        let context = self.tracker.mutation_context("SyncList");
        if context.records() {
            self.record(ListOp::Set(index, item));
        }
    }

    fn mutate(&mut self, op: ListOp<T>) {
        let context = self.tracker.mutation_context("SyncList");
        match context {
            MutationContext::Offline => {
                op.clone().apply(&mut self.client_host_collection);
                op.apply(&mut self.collection);
                self.changed = true;
            }
            MutationContext::Authoritative { host } => {
                if host {
                    if let Some(change) = op.clone().apply(&mut self.client_host_collection) {
                        self.emit(change, false);
                    }
                }
                let Some(change) = op.clone().apply(&mut self.collection) else {
                    return;
                };
                self.record(op);
                self.emit(change, true);
            }
            MutationContext::ClientLocal | MutationContext::Unauthorized => {
                if let Some(change) = op.apply(&mut self.collection) {
                    self.emit(change, false);
                }
            }
        }
    }

    fn record(&mut self, op: ListOp<T>) {
        self.changes.push(op);
        self.changed = true;
        self.tracker.mark_dirty();
    }

    fn emit(&mut self, change: ListChange<T>, as_server: bool) {
        let started = self.tracker.is_started(as_server);
        self.callbacks.emit(change, as_server, started);
    }
}

impl<T: Serde> SyncType for SyncList<T> {
    fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut ChangeTracker {
        &mut self.tracker
    }

    fn write_delta(&mut self, writer: &mut dyn ByteWrite, tick: Tick, reset_tick: bool) {
        self.tracker.write_header(writer, tick, reset_tick);
        self.tracker.write_change_id(writer, false);
        VarUint::from(self.changes.len()).ser(writer);
        for op in self.changes.drain(..) {
            op.ser(writer);
        }
    }

    fn write_full(&mut self, writer: &mut dyn ByteWrite, tick: Tick) -> bool {
        if !self.changed {
            return false;
        }
        self.tracker.write_header(writer, tick, false);
        self.tracker.write_change_id(writer, true);
        VarUint::from(self.collection.len()).ser(writer);
        for item in &self.collection {
            ListOp::Add(item.clone()).ser(writer);
        }
        self.tracker.record_full_write(tick);
        true
    }

    fn read(&mut self, reader: &mut ByteReader, as_server: bool) -> Result<(), SerdeErr> {
        let change_id = self.tracker.read_change_id(reader)?;
        let apply = !change_id.ignore && !self.tracker.is_host_client_read(as_server);
        // a snapshot replaces whatever the reader held
        let cleared = apply && change_id.reset && !self.collection.is_empty();
        if cleared {
            if let Some(change) = ListOp::<T>::Clear.apply(&mut self.collection) {
                self.emit(change, as_server);
            }
        }

        let count = VarUint::de(reader)?.to_usize()?;
        for _ in 0..count {
            let op = ListOp::<T>::de(reader)?;
            if !apply {
                continue;
            }
            match op.apply(&mut self.collection) {
                Some(change) => self.emit(change, as_server),
                None => debug!("Skipping SyncList operation with an out of range index"),
            }
        }

        if apply && (cleared || count > 0) {
            self.emit(ListChange::complete(), as_server);
        }
        Ok(())
    }

    fn on_start_callback(&mut self, as_server: bool) {
        self.callbacks.flush(as_server);
    }
}
