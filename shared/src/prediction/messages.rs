use volley_serde::{ByteReader, ByteWriter, Serde};

use crate::{
    prediction::{error::PredictionError, replicate_entry::ReplicateEntry},
    types::{MethodHash, Tick},
};

fn read_hash(reader: &mut ByteReader, expected: MethodHash) -> Result<(), PredictionError> {
    let found = MethodHash::de(reader)?;
    if found != expected {
        return Err(PredictionError::UnexpectedHash { expected, found });
    }
    Ok(())
}

/// `[method_hash: u32]` followed by entries until the end of the message
pub fn write_replicate_batch<T: Serde>(hash: MethodHash, entries: &[ReplicateEntry<T>]) -> Vec<u8> {
    let mut writer = ByteWriter::new();
    hash.ser(&mut writer);
    for entry in entries {
        entry.ser(&mut writer);
    }
    writer.to_bytes()
}

pub fn read_replicate_batch<T: Serde>(
    reader: &mut ByteReader,
    hash: MethodHash,
) -> Result<Vec<ReplicateEntry<T>>, PredictionError> {
    read_hash(reader, hash)?;
    let mut entries = Vec::new();
    while !reader.is_empty() {
        entries.push(ReplicateEntry::de(reader)?);
    }
    Ok(entries)
}

/// Authoritative state as of the last input the server processed
#[derive(Clone, Debug, PartialEq)]
pub struct ReconcileSnapshot<S> {
    pub tick: Tick,
    pub state: S,
}

impl<S: Serde> ReconcileSnapshot<S> {
    /// `[method_hash: u32][tick: u32][state]`
    pub fn write(&self, hash: MethodHash) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        hash.ser(&mut writer);
        self.tick.ser(&mut writer);
        self.state.ser(&mut writer);
        writer.to_bytes()
    }

    pub fn read(reader: &mut ByteReader, hash: MethodHash) -> Result<Self, PredictionError> {
        read_hash(reader, hash)?;
        let tick = Tick::de(reader)?;
        let state = S::de(reader)?;
        Ok(Self { tick, state })
    }
}
