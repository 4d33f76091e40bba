use volley_serde::{ByteReader, ByteWrite, ByteWriter, Serde, SerdeErr};

use crate::{channel::Channel, types::MethodHash};

/// `[method_hash: u32][channel: u8]`, followed by the call's arguments
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RpcHeader {
    pub hash: MethodHash,
    pub channel: Channel,
}

impl RpcHeader {
    pub fn new(hash: MethodHash, channel: Channel) -> Self {
        Self { hash, channel }
    }
}

impl Serde for RpcHeader {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.hash.ser(writer);
        self.channel.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let hash = MethodHash::de(reader)?;
        let channel = Channel::de(reader)?;
        Ok(Self { hash, channel })
    }

    fn byte_length(&self) -> usize {
        5
    }
}

/// Encodes a complete RPC message
pub fn write_rpc<A: Serde>(hash: MethodHash, channel: Channel, args: &A) -> Vec<u8> {
    let mut writer = ByteWriter::new();
    RpcHeader::new(hash, channel).ser(&mut writer);
    args.ser(&mut writer);
    writer.to_bytes()
}
