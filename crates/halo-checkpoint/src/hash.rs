//! FNV-1a checksums for tile blocks.
//!
//! Not cryptographic. The checksum only guards against torn or corrupted
//! files being restored silently.

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

#[inline]
fn fnv1a_u64(mut hash: u64, v: u64) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

/// Checksum of one tile block: the tile index, then every value's bits.
///
/// Folding in the index means two tiles holding the same values still
/// checksum differently, so swapped block files are caught.
pub fn block_checksum(tile: u32, values: &[f64]) -> u64 {
    let mut hash = fnv1a_u64(FNV_OFFSET, u64::from(tile));
    for &v in values {
        hash = fnv1a_u64(hash, v.to_bits());
    }
    hash
}
