use volley_serde::{ByteReader, ByteWrite, Serde, SerdeErr};

use crate::types::Tick;

/// One input, stamped with the tick it was produced on
#[derive(Clone, Debug, PartialEq)]
pub struct ReplicateEntry<T> {
    pub tick: Tick,
    pub data: T,
}

impl<T> ReplicateEntry<T> {
    pub fn new(tick: Tick, data: T) -> Self {
        Self { tick, data }
    }
}

impl<T: Serde> Serde for ReplicateEntry<T> {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.tick.ser(writer);
        self.data.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let tick = Tick::de(reader)?;
        let data = T::de(reader)?;
        Ok(Self { tick, data })
    }

    fn byte_length(&self) -> usize {
        4 + self.data.byte_length()
    }
}
