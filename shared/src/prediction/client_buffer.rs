use crate::{
    prediction::replicate_entry::ReplicateEntry,
    tick_list::TickList,
    types::Tick,
};

/// Inputs the owning client has simulated but the server has not yet
/// confirmed, ordered by tick
pub struct ClientReplicateBuffer<T> {
    entries: TickList<T>,
}

impl<T> Default for ClientReplicateBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ClientReplicateBuffer<T> {
    pub fn new() -> Self {
        Self {
            entries: TickList::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores the input for `tick`, replacing an earlier input for the same tick
    pub fn push(&mut self, tick: Tick, data: T) {
        if let Some(existing) = self.entries.get_mut_scan_from_back(&tick) {
            *existing = data;
            return;
        }
        self.entries.insert_scan_from_back(tick, data);
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Tick, T)> {
        self.entries.iter()
    }

    pub fn ticks(&self) -> Vec<Tick> {
        self.entries.iter().map(|(tick, _)| *tick).collect()
    }

    /// The newest `count` inputs, oldest first
    pub fn tail(&self, count: usize) -> &[(Tick, T)] {
        self.entries.tail(count)
    }

    /// Drops every input up to and including `tick`. If `tick` is no longer
    /// buffered, everything is dropped. Returns how many inputs were removed.
    pub fn remove_through(&mut self, tick: Tick) -> usize {
        match self.entries.position_scan_from_back(&tick) {
            Some(index) => self.entries.drain_through(index),
            None => {
                let removed = self.entries.len();
                self.entries.clear();
                removed
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Clone> ClientReplicateBuffer<T> {
    pub fn tail_entries(&self, count: usize) -> Vec<ReplicateEntry<T>> {
        self.tail(count)
            .iter()
            .map(|(tick, data)| ReplicateEntry::new(*tick, data.clone()))
            .collect()
    }
}
