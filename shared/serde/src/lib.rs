//! # Volley Serde
//! Byte-oriented serialization shared by every volley message: little-endian
//! fixed-width integers, LEB128 variable-length unsigned integers, and the
//! `Serde` trait implemented by everything that crosses the wire.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod byte_reader;
mod byte_writer;
mod error;
mod impls;
mod integer;
mod serde;

pub use byte_reader::ByteReader;
pub use byte_writer::{ByteCounter, ByteWrite, ByteWriter};
pub use error::SerdeErr;
pub use integer::VarUint;
pub use serde::Serde;
