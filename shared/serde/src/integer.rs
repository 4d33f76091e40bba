use crate::{ByteReader, ByteWrite, Serde, SerdeErr};

/// Unsigned integer packed 7 bits per byte, low bits first, with the high bit
/// of each byte signalling that another byte follows.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct VarUint {
    inner: u64,
}

impl VarUint {
    pub fn new<T: Into<u64>>(value: T) -> Self {
        Self {
            inner: value.into(),
        }
    }

    pub fn get(&self) -> u64 {
        self.inner
    }

    /// Converts to a `usize`, failing on 32-bit targets for huge values
    pub fn to_usize(&self) -> Result<usize, SerdeErr> {
        usize::try_from(self.inner).map_err(|_| SerdeErr::LengthOverflow {
            bits: usize::BITS as u8,
        })
    }
}

impl From<usize> for VarUint {
    fn from(value: usize) -> Self {
        Self {
            inner: value as u64,
        }
    }
}

impl Serde for VarUint {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        let mut value = self.inner;
        loop {
            let low = (value & 0x7F) as u8;
            value >>= 7;
            let proceed = value != 0;
            if proceed {
                writer.write_byte(low | 0x80);
            } else {
                writer.write_byte(low);
                return;
            }
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let mut output: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let byte = reader.read_byte()?;
            if shift >= 64 || (shift == 63 && (byte & 0x7F) > 1) {
                return Err(SerdeErr::LengthOverflow { bits: 64 });
            }
            output |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(Self { inner: output });
            }
            shift += 7;
        }
    }

    fn byte_length(&self) -> usize {
        let mut output = 1;
        let mut value = self.inner >> 7;
        while value != 0 {
            output += 1;
            value >>= 7;
        }
        output
    }
}
