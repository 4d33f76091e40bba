use std::collections::VecDeque;

use log::{debug, trace};

use crate::{config::PredictionConfig, prediction::replicate_entry::ReplicateEntry, types::Tick};

/// Inputs received from the owning client, waiting to be consumed one per
/// server tick
pub struct ServerReplicateQueue<T> {
    queue: VecDeque<ReplicateEntry<T>>,
    last_received_tick: Option<Tick>,
    excess: usize,
    high_water: usize,
    dropped: u64,
}

impl<T> ServerReplicateQueue<T> {
    pub fn new(config: &PredictionConfig) -> Self {
        Self {
            queue: VecDeque::new(),
            last_received_tick: None,
            excess: config.server_queue_excess,
            high_water: config.server_queue_high_water,
            dropped: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn last_received_tick(&self) -> Option<Tick> {
        self.last_received_tick
    }

    /// Total number of inputs discarded for exceeding either threshold
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn ticks(&self) -> impl Iterator<Item = Tick> + '_ {
        self.queue.iter().map(|entry| entry.tick)
    }

    /// Appends the entries newer than anything received so far, then trims
    /// the head down to the high-water mark. Returns how many were accepted.
    pub fn receive(&mut self, entries: impl IntoIterator<Item = ReplicateEntry<T>>) -> usize {
        let mut accepted = 0;
        for entry in entries {
            if self
                .last_received_tick
                .is_some_and(|last| entry.tick <= last)
            {
                trace!("Ignoring replicate for already received tick {}", entry.tick);
                continue;
            }
            self.last_received_tick = Some(entry.tick);
            self.queue.push_back(entry);
            accepted += 1;
        }

        let overflow = self.queue.len().saturating_sub(self.high_water);
        if overflow > 0 {
            debug!("Replicate queue over high-water mark, trimming {} input(s)", overflow);
            self.queue.drain(..overflow);
            self.dropped += overflow as u64;
        }
        accepted
    }

    /// Takes the next input to simulate. Inputs beyond the excess threshold
    /// are dropped oldest first so the server does not fall behind.
    pub fn dequeue(&mut self) -> Option<ReplicateEntry<T>> {
        let excess = self.queue.len().saturating_sub(self.excess);
        if excess > 0 {
            debug!("Replicate queue backed up, dropping {} oldest input(s)", excess);
            self.queue.drain(..excess);
            self.dropped += excess as u64;
        }
        self.queue.pop_front()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.last_received_tick = None;
    }
}
