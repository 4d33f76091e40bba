use thiserror::Error;

use crate::types::Tick;

/// Errors that can occur during TickList operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickListError {
    /// Attempted to insert a second entry for the same tick
    #[error("Duplicate tick {tick} not allowed in TickList")]
    DuplicateTick { tick: Tick },
}

/// A list of tick-stamped items kept in ascending tick order. Inserts scan
/// from the back since new items almost always belong at the end.
pub struct TickList<T> {
    list: Vec<(Tick, T)>,
}

impl<T> Default for TickList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TickList<T> {
    pub fn new() -> Self {
        Self { list: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn front(&self) -> Option<&(Tick, T)> {
        self.list.first()
    }

    pub fn back(&self) -> Option<&(Tick, T)> {
        self.list.last()
    }

    pub fn pop_front(&mut self) -> Option<(Tick, T)> {
        if self.list.is_empty() {
            return None;
        }
        Some(self.list.remove(0))
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Tick, T)> {
        self.list.iter()
    }

    /// The last `count` entries, oldest first
    pub fn tail(&self, count: usize) -> &[(Tick, T)] {
        let start = self.list.len().saturating_sub(count);
        &self.list[start..]
    }

    pub fn contains_scan_from_back(&self, tick: &Tick) -> bool {
        self.position_scan_from_back(tick).is_some()
    }

    pub fn get_mut_scan_from_back(&mut self, tick: &Tick) -> Option<&mut T> {
        let index = self.position_scan_from_back(tick)?;
        self.list.get_mut(index).map(|(_, item)| item)
    }

    /// Index of the entry stamped with `tick`, if present
    pub fn position_scan_from_back(&self, tick: &Tick) -> Option<usize> {
        for (index, (old_tick, _)) in self.list.iter().enumerate().rev() {
            if *old_tick == *tick {
                return Some(index);
            }
            if *old_tick < *tick {
                return None;
            }
        }
        None
    }

    /// Attempts to insert an item with the given tick, scanning from the back.
    /// Returns an error if the tick already exists.
    pub fn try_insert_scan_from_back(&mut self, tick: Tick, item: T) -> Result<(), TickListError> {
        let mut index = self.list.len();

        loop {
            if index == 0 {
                // made it all the way through, insert at front and be done
                self.list.insert(0, (tick, item));
                return Ok(());
            }

            index -= 1;

            let old_tick = self.list[index].0;
            if old_tick == tick {
                return Err(TickListError::DuplicateTick { tick });
            }
            if old_tick < tick {
                self.list.insert(index + 1, (tick, item));
                return Ok(());
            }
        }
    }

    /// Inserts an item with the given tick, scanning from the back.
    ///
    /// # Panics
    ///
    /// Panics if an entry for the tick already exists in the list.
    pub fn insert_scan_from_back(&mut self, tick: Tick, item: T) {
        self.try_insert_scan_from_back(tick, item)
            .expect("duplicate ticks are not allowed in TickList")
    }

    /// Removes every entry up to and including `index`
    pub fn drain_through(&mut self, index: usize) -> usize {
        let end = (index + 1).min(self.list.len());
        self.list.drain(..end);
        end
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }
}
