use volley_serde::{ByteReader, ByteWrite, Serde, SerdeErr};

pub type Tick = u32;
pub type SyncIndex = u8;
pub type ChangeId = u32;
pub type MethodHash = u32;

/// Identity of a remote peer, as assigned by the transport
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u32);

impl ConnectionId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl Serde for ConnectionId {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.0.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self(u32::de(reader)?))
    }

    fn byte_length(&self) -> usize {
        4
    }
}
