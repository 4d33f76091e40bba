use volley_serde::{ByteReader, ByteWrite, Serde, SerdeErr};

/// Delivery guarantee requested from the transport
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Channel {
    Unreliable,
    #[default]
    Reliable,
}

impl Channel {
    pub fn is_reliable(&self) -> bool {
        matches!(self, Channel::Reliable)
    }
}

impl Serde for Channel {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        let index: u8 = match self {
            Channel::Unreliable => 0,
            Channel::Reliable => 1,
        };
        writer.write_byte(index);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match reader.read_byte()? {
            0 => Ok(Channel::Unreliable),
            1 => Ok(Channel::Reliable),
            value => Err(SerdeErr::InvalidDiscriminant {
                type_name: "Channel",
                value,
            }),
        }
    }

    fn byte_length(&self) -> usize {
        1
    }
}
