use crate::types::MethodHash;

const FNV_OFFSET_BASIS: u32 = 0x811C_9DC5;
const FNV_PRIME: u32 = 0x0100_0193;

/// FNV-1a over the UTF-8 bytes of `name`. Identical on every peer and
/// every build, so it is safe to use as a wire identifier for RPCs and
/// prediction methods.
pub const fn stable_hash32(name: &str) -> MethodHash {
    let bytes = name.as_bytes();
    let mut hash = FNV_OFFSET_BASIS;
    let mut index = 0;
    while index < bytes.len() {
        hash ^= bytes[index] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        index += 1;
    }
    hash
}
