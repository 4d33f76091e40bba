use std::{
    collections::{HashMap, HashSet, VecDeque},
    hash::Hash,
};

use crate::{ByteReader, ByteWrite, Serde, SerdeErr, VarUint};

// Fixed-width numbers, little-endian

macro_rules! impl_serde_le {
    ($($ty:ty),*) => {
        $(
            impl Serde for $ty {
                fn ser(&self, writer: &mut dyn ByteWrite) {
                    writer.write_bytes(&self.to_le_bytes());
                }

                fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
                    Ok(<$ty>::from_le_bytes(reader.read_array()?))
                }

                fn byte_length(&self) -> usize {
                    std::mem::size_of::<$ty>()
                }
            }
        )*
    };
}

impl_serde_le!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl Serde for bool {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        writer.write_byte(u8::from(*self));
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match reader.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(SerdeErr::InvalidBool { byte }),
        }
    }

    fn byte_length(&self) -> usize {
        1
    }
}

impl Serde for () {
    fn ser(&self, _writer: &mut dyn ByteWrite) {}

    fn de(_reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(())
    }

    fn byte_length(&self) -> usize {
        0
    }
}

impl Serde for String {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        VarUint::from(self.len()).ser(writer);
        writer.write_bytes(self.as_bytes());
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let length = VarUint::de(reader)?.to_usize()?;
        let bytes = reader.read_slice(length)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| SerdeErr::InvalidUtf8)
    }
}

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        match self {
            Some(value) => {
                true.ser(writer);
                value.ser(writer);
            }
            None => false.ser(writer),
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        if bool::de(reader)? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }
}

// Collections carry a VarUint length prefix

impl<T: Serde> Serde for Vec<T> {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        VarUint::from(self.len()).ser(writer);
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let length = VarUint::de(reader)?.to_usize()?;
        // never trust the length prefix for preallocation
        let mut output = Vec::with_capacity(length.min(reader.remaining()));
        for _ in 0..length {
            output.push(T::de(reader)?);
        }
        Ok(output)
    }
}

impl<T: Serde> Serde for VecDeque<T> {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        VarUint::from(self.len()).ser(writer);
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(VecDeque::from(Vec::<T>::de(reader)?))
    }
}

impl<T: Serde + Eq + Hash> Serde for HashSet<T> {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        VarUint::from(self.len()).ser(writer);
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let length = VarUint::de(reader)?.to_usize()?;
        let mut output = HashSet::new();
        for _ in 0..length {
            output.insert(T::de(reader)?);
        }
        Ok(output)
    }
}

impl<K: Serde + Eq + Hash, V: Serde> Serde for HashMap<K, V> {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        VarUint::from(self.len()).ser(writer);
        for (key, value) in self {
            key.ser(writer);
            value.ser(writer);
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let length = VarUint::de(reader)?.to_usize()?;
        let mut output = HashMap::new();
        for _ in 0..length {
            let key = K::de(reader)?;
            let value = V::de(reader)?;
            output.insert(key, value);
        }
        Ok(output)
    }
}

// Tuples, used for multi-argument RPC payloads

macro_rules! impl_serde_tuple {
    ($($name:ident $index:tt),+) => {
        impl<$($name: Serde),+> Serde for ($($name,)+) {
            fn ser(&self, writer: &mut dyn ByteWrite) {
                $(self.$index.ser(writer);)+
            }

            fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
                Ok(($($name::de(reader)?,)+))
            }
        }
    };
}

impl_serde_tuple!(A 0);
impl_serde_tuple!(A 0, B 1);
impl_serde_tuple!(A 0, B 1, C 2);
impl_serde_tuple!(A 0, B 1, C 2, D 3);
