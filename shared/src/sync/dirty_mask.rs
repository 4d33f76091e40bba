use crate::types::SyncIndex;

const MASK_BYTES: usize = 32;

/// One bit per `SyncIndex` on an object
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DirtyMask {
    mask: [u8; MASK_BYTES],
    count: u16,
}

impl DirtyMask {
    pub fn new() -> Self {
        Self {
            mask: [0; MASK_BYTES],
            count: 0,
        }
    }

    pub fn bit(&self, index: SyncIndex) -> bool {
        let (byte, bit) = Self::locate(index);
        self.mask[byte] & (1 << bit) != 0
    }

    /// Sets or clears a bit, returning the previous value
    pub fn set_bit(&mut self, index: SyncIndex, value: bool) -> bool {
        let (byte, bit) = Self::locate(index);
        let previous = self.mask[byte] & (1 << bit) != 0;
        if previous == value {
            return previous;
        }
        if value {
            self.mask[byte] |= 1 << bit;
            self.count += 1;
        } else {
            self.mask[byte] &= !(1 << bit);
            self.count -= 1;
        }
        previous
    }

    pub fn is_clear(&self) -> bool {
        self.count == 0
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn clear(&mut self) {
        self.mask = [0; MASK_BYTES];
        self.count = 0;
    }

    pub fn or(&mut self, other: &DirtyMask) {
        for index in other.iter() {
            self.set_bit(index, true);
        }
    }

    /// Set indices in ascending order
    pub fn iter(&self) -> impl Iterator<Item = SyncIndex> + '_ {
        (0..=SyncIndex::MAX).filter(move |index| self.bit(*index))
    }

    fn locate(index: SyncIndex) -> (usize, u8) {
        ((index / 8) as usize, index % 8)
    }
}
