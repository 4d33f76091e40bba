use crate::{ByteCounter, ByteReader, ByteWrite, SerdeErr};

/// A type that can be written to and read from the wire
pub trait Serde: Sized + Clone + PartialEq {
    /// Encodes value into outgoing byte stream
    fn ser(&self, writer: &mut dyn ByteWrite);

    /// Parses value from incoming byte stream
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;

    /// Number of bytes `ser` will emit
    fn byte_length(&self) -> usize {
        let mut counter = ByteCounter::new();
        self.ser(&mut counter);
        counter.count()
    }
}
