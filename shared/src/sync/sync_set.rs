use std::{collections::HashSet, hash::Hash};

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

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetOperation {
    Add,
    Remove,
    Clear,
    Complete,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SetChange<T> {
    pub operation: SetOperation,
    pub item: Option<T>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SetOp<T> {
    Add(T),
    Remove(T),
    Clear,
}

impl<T: Serde + Eq + Hash> SetOp<T> {
    const ADD: u8 = 0;
    const REMOVE: u8 = 1;
    const CLEAR: u8 = 2;

    fn apply(self, view: &mut HashSet<T>) -> Option<SetChange<T>> {
        let (operation, item) = match self {
            SetOp::Add(item) => {
                if !view.insert(item.clone()) {
                    return None;
                }
                (SetOperation::Add, Some(item))
            }
            SetOp::Remove(item) => {
                if !view.remove(&item) {
                    return None;
                }
                (SetOperation::Remove, Some(item))
            }
            SetOp::Clear => {
                view.clear();
                (SetOperation::Clear, None)
            }
        };
        Some(SetChange { operation, item })
    }
}

impl<T: Serde + Eq + Hash> Serde for SetOp<T> {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        match self {
            SetOp::Add(item) => {
                Self::ADD.ser(writer);
                item.ser(writer);
            }
            SetOp::Remove(item) => {
                Self::REMOVE.ser(writer);
                item.ser(writer);
            }
            SetOp::Clear => Self::CLEAR.ser(writer),
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match u8::de(reader)? {
            Self::ADD => Ok(SetOp::Add(T::de(reader)?)),
            Self::REMOVE => Ok(SetOp::Remove(T::de(reader)?)),
            Self::CLEAR => Ok(SetOp::Clear),
            value => Err(SerdeErr::InvalidDiscriminant {
                type_name: "SyncSet operation",
                value,
            }),
        }
    }
}

/// A replicated unordered set
pub struct SyncSet<T: Serde + Eq + Hash> {
    tracker: ChangeTracker,
    collection: HashSet<T>,
    client_host_collection: HashSet<T>,
    changes: Vec<SetOp<T>>,
    changed: bool,
    callbacks: SyncCallbacks<SetChange<T>>,
}

impl<T: Serde + Eq + Hash> Default for SyncSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serde + Eq + Hash> SyncSet<T> {
    pub fn new() -> Self {
        Self::with_settings(SyncSettings::default())
    }

    pub fn with_settings(settings: SyncSettings) -> Self {
        Self {
            tracker: ChangeTracker::new(settings, true),
            collection: HashSet::new(),
            client_host_collection: HashSet::new(),
            changes: Vec::new(),
            changed: false,
            callbacks: SyncCallbacks::new(),
        }
    }

    pub fn on_change(&mut self, listener: impl FnMut(&SetChange<T>, bool) + 'static) {
        self.callbacks.listen(listener);
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.collection.contains(item)
    }

    pub fn iter(&self) -> std::collections::hash_set::Iter<'_, T> {
        self.collection.iter()
    }

    pub fn as_set(&self) -> &HashSet<T> {
        &self.collection
    }

    pub fn client_view(&self) -> &HashSet<T> {
        if self.tracker.is_host() {
            &self.client_host_collection
        } else {
            &self.collection
        }
    }

    /// Returns false if the item was already present
    pub fn add(&mut self, item: T) -> bool {
        if self.collection.contains(&item) {
            return false;
        }
        self.mutate(SetOp::Add(item));
        true
    }

    pub fn remove(&mut self, item: &T) -> bool {
        if !self.collection.contains(item) {
            return false;
        }
        self.mutate(SetOp::Remove(item.clone()));
        true
    }

    pub fn clear(&mut self) {
        self.mutate(SetOp::Clear);
    }

    pub fn union_with(&mut self, other: impl IntoIterator<Item = T>) {
        for item in other {
            self.add(item);
        }
    }

    /// Removes every item of `other`. A result that empties the set is sent
    /// as a single clear.
    pub fn except_with(&mut self, other: impl IntoIterator<Item = T>) {
        let removals: HashSet<T> = other
            .into_iter()
            .filter(|item| self.collection.contains(item))
            .collect();
        self.apply_removals(removals, Vec::new());
    }

    /// Keeps only the items also contained in `other`
    pub fn intersect_with(&mut self, other: impl IntoIterator<Item = T>) {
        let keep: HashSet<T> = other.into_iter().collect();
        let removals: HashSet<T> = self
            .collection
            .iter()
            .filter(|item| !keep.contains(*item))
            .cloned()
            .collect();
        self.apply_removals(removals, Vec::new());
    }

    /// Keeps items in exactly one of the two sets
    pub fn symmetric_except_with(&mut self, other: impl IntoIterator<Item = T>) {
        let other: HashSet<T> = other.into_iter().collect();
        let mut removals = HashSet::new();
        let mut additions = Vec::new();
        for item in other {
            if self.collection.contains(&item) {
                removals.insert(item);
            } else {
                additions.push(item);
            }
        }
        self.apply_removals(removals, additions);
    }

    fn apply_removals(&mut self, removals: HashSet<T>, additions: Vec<T>) {
        if additions.is_empty() && !removals.is_empty() && removals.len() == self.collection.len()
        {
            self.mutate(SetOp::Clear);
            return;
        }
        for item in removals {
            self.mutate(SetOp::Remove(item));
        }
        for item in additions {
            self.mutate(SetOp::Add(item));
        }
    }

    fn mutate(&mut self, op: SetOp<T>) {
        let context = self.tracker.mutation_context("SyncSet");
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
                self.changes.push(op);
                self.changed = true;
                self.tracker.mark_dirty();
                self.emit(change, true);
            }
            MutationContext::ClientLocal | MutationContext::Unauthorized => {
                if let Some(change) = op.apply(&mut self.collection) {
                    self.emit(change, false);
                }
            }
        }
    }

    fn emit(&mut self, change: SetChange<T>, as_server: bool) {
        let started = self.tracker.is_started(as_server);
        self.callbacks.emit(change, as_server, started);
    }
}

impl<T: Serde + Eq + Hash> SyncType for SyncSet<T> {
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
            SetOp::Add(item.clone()).ser(writer);
        }
        self.tracker.record_full_write(tick);
        true
    }

    fn read(&mut self, reader: &mut ByteReader, as_server: bool) -> Result<(), SerdeErr> {
        let change_id = self.tracker.read_change_id(reader)?;
        let apply = !change_id.ignore && !self.tracker.is_host_client_read(as_server);
        let cleared = apply && change_id.reset && !self.collection.is_empty();
        if cleared {
            if let Some(change) = SetOp::<T>::Clear.apply(&mut self.collection) {
                self.emit(change, as_server);
            }
        }

        let count = VarUint::de(reader)?.to_usize()?;
        for _ in 0..count {
            let op = SetOp::<T>::de(reader)?;
            if !apply {
                continue;
            }
            if let Some(change) = op.apply(&mut self.collection) {
                self.emit(change, as_server);
            }
        }

        if apply && (cleared || count > 0) {
            self.emit(
                SetChange {
                    operation: SetOperation::Complete,
                    item: None,
                },
                as_server,
            );
        }
        Ok(())
    }

    fn on_start_callback(&mut self, as_server: bool) {
        self.callbacks.flush(as_server);
    }
}
