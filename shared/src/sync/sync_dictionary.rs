use std::{collections::HashMap, hash::Hash};

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
pub enum DictionaryOperation {
    Add,
    Remove,
    Clear,
    Set,
    Complete,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DictionaryChange<K, V> {
    pub operation: DictionaryOperation,
    pub key: Option<K>,
    pub old_value: Option<V>,
    pub new_value: Option<V>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DictionaryOp<K, V> {
    Add(K, V),
    Remove(K),
    Clear,
    Set(K, V),
}

impl<K: Serde + Eq + Hash, V: Serde> DictionaryOp<K, V> {
    const ADD: u8 = 0;
    const REMOVE: u8 = 1;
    const CLEAR: u8 = 2;
    const SET: u8 = 3;

    fn apply(self, view: &mut HashMap<K, V>) -> Option<DictionaryChange<K, V>> {
        let change = match self {
            // an Add for a present key overwrites it, so full writes can be
            // applied over stale state
            DictionaryOp::Add(key, value) | DictionaryOp::Set(key, value) => {
                let old_value = view.insert(key.clone(), value.clone());
                let operation = if old_value.is_some() {
                    DictionaryOperation::Set
                } else {
                    DictionaryOperation::Add
                };
                DictionaryChange {
                    operation,
                    key: Some(key),
                    old_value,
                    new_value: Some(value),
                }
            }
            DictionaryOp::Remove(key) => {
                let old_value = view.remove(&key)?;
                DictionaryChange {
                    operation: DictionaryOperation::Remove,
                    key: Some(key),
                    old_value: Some(old_value),
                    new_value: None,
                }
            }
            DictionaryOp::Clear => {
                view.clear();
                DictionaryChange {
                    operation: DictionaryOperation::Clear,
                    key: None,
                    old_value: None,
                    new_value: None,
                }
            }
        };
        Some(change)
    }
}

impl<K: Serde + Eq + Hash, V: Serde> Serde for DictionaryOp<K, V> {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        match self {
            DictionaryOp::Add(key, value) => {
                Self::ADD.ser(writer);
                key.ser(writer);
                value.ser(writer);
            }
            DictionaryOp::Remove(key) => {
                Self::REMOVE.ser(writer);
                key.ser(writer);
            }
            DictionaryOp::Clear => Self::CLEAR.ser(writer),
            DictionaryOp::Set(key, value) => {
                Self::SET.ser(writer);
                key.ser(writer);
                value.ser(writer);
            }
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match u8::de(reader)? {
            Self::ADD => Ok(DictionaryOp::Add(K::de(reader)?, V::de(reader)?)),
            Self::REMOVE => Ok(DictionaryOp::Remove(K::de(reader)?)),
            Self::CLEAR => Ok(DictionaryOp::Clear),
            Self::SET => Ok(DictionaryOp::Set(K::de(reader)?, V::de(reader)?)),
            value => Err(SerdeErr::InvalidDiscriminant {
                type_name: "SyncDictionary operation",
                value,
            }),
        }
    }
}

/// A replicated key/value map
pub struct SyncDictionary<K: Serde + Eq + Hash, V: Serde> {
    tracker: ChangeTracker,
    collection: HashMap<K, V>,
    client_host_collection: HashMap<K, V>,
    changes: Vec<DictionaryOp<K, V>>,
    changed: bool,
    callbacks: SyncCallbacks<DictionaryChange<K, V>>,
}

impl<K: Serde + Eq + Hash, V: Serde> Default for SyncDictionary<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Serde + Eq + Hash, V: Serde> SyncDictionary<K, V> {
    pub fn new() -> Self {
        Self::with_settings(SyncSettings::default())
    }

    pub fn with_settings(settings: SyncSettings) -> Self {
        Self {
            tracker: ChangeTracker::new(settings, true),
            collection: HashMap::new(),
            client_host_collection: HashMap::new(),
            changes: Vec::new(),
            changed: false,
            callbacks: SyncCallbacks::new(),
        }
    }

    pub fn on_change(&mut self, listener: impl FnMut(&DictionaryChange<K, V>, bool) + 'static) {
        self.callbacks.listen(listener);
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.collection.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.collection.contains_key(key)
    }

    pub fn iter(&self) -> std::collections::hash_map::Iter<'_, K, V> {
        self.collection.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.collection.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.collection.values()
    }

    pub fn as_map(&self) -> &HashMap<K, V> {
        &self.collection
    }

    pub fn client_view(&self) -> &HashMap<K, V> {
        if self.tracker.is_host() {
            &self.client_host_collection
        } else {
            &self.collection
        }
    }

    /// Inserts or overwrites `key`, returning the previous value
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let previous = self.collection.get(&key).cloned();
        match &previous {
            Some(existing) if *existing == value => {}
            Some(_) => self.mutate(DictionaryOp::Set(key, value)),
            None => self.mutate(DictionaryOp::Add(key, value)),
        }
        previous
    }

    /// Overwrites the value of an existing key. Returns false, changing
    /// nothing, if the key is absent.
    pub fn set(&mut self, key: K, value: V) -> bool {
        if !self.collection.contains_key(&key) {
            return false;
        }
        self.insert(key, value);
        true
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let previous = self.collection.get(key).cloned()?;
        self.mutate(DictionaryOp::Remove(key.clone()));
        Some(previous)
    }

    pub fn clear(&mut self) {
        self.mutate(DictionaryOp::Clear);
    }

    /// Sends the value at `key` again, for values mutated in place
    pub fn dirty(&mut self, key: &K) {
        let Some(value) = self.collection.get(key).cloned() else {
            return;
        };
        if self.tracker.mutation_context("SyncDictionary").records() {
            self.changes.push(DictionaryOp::Set(key.clone(), value));
            self.changed = true;
            self.tracker.mark_dirty();
        }
    }

    fn mutate(&mut self, op: DictionaryOp<K, V>) {
        let context = self.tracker.mutation_context("SyncDictionary");
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

    fn emit(&mut self, change: DictionaryChange<K, V>, as_server: bool) {
        let started = self.tracker.is_started(as_server);
        self.callbacks.emit(change, as_server, started);
    }
}

impl<K: Serde + Eq + Hash, V: Serde> SyncType for SyncDictionary<K, V> {
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
        for (key, value) in &self.collection {
            DictionaryOp::Add(key.clone(), value.clone()).ser(writer);
        }
        self.tracker.record_full_write(tick);
        true
    }

    fn read(&mut self, reader: &mut ByteReader, as_server: bool) -> Result<(), SerdeErr> {
        let change_id = self.tracker.read_change_id(reader)?;
        let apply = !change_id.ignore && !self.tracker.is_host_client_read(as_server);
        let cleared = apply && change_id.reset && !self.collection.is_empty();
        if cleared {
            if let Some(change) = DictionaryOp::<K, V>::Clear.apply(&mut self.collection) {
                self.emit(change, as_server);
            }
        }

        let count = VarUint::de(reader)?.to_usize()?;
        for _ in 0..count {
            let op = DictionaryOp::<K, V>::de(reader)?;
            if !apply {
                continue;
            }
            if let Some(change) = op.apply(&mut self.collection) {
                self.emit(change, as_server);
            }
        }

        if apply && (cleared || count > 0) {
            self.emit(
                DictionaryChange {
                    operation: DictionaryOperation::Complete,
                    key: None,
                    old_value: None,
                    new_value: None,
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
