//! Hash material for proto filters
//!
//! A value is hashed once into a 128-bit MurmurHash3 digest, split into two
//! 64-bit halves. Concrete bit positions are only derived later, against a
//! specific `FilterConfig`, using double hashing: `h(i) = h1 + i * h2`.

use std::hash::Hash;
use std::io::Cursor;

use serde::{Deserialize, Serialize};
use siphasher::sip128::{Hasher128, SipHasher13};

/// Seed used for every digest so proto filters are reproducible across runs.
pub const MURMUR_SEED: u32 = 0x9747_b28c;

/// The two halves of one value's digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HashPair {
    pub h1: u64,
    pub h2: u64,
}

/// Hash raw bytes with MurmurHash3 x64/128.
pub fn murmur_pair(element: &[u8]) -> HashPair {
    let mut cursor = Cursor::new(element);

    // Reading from an in-memory cursor cannot fail
    let hash = murmur3::murmur3_x64_128(&mut cursor, MURMUR_SEED).unwrap_or(0);
    HashPair {
        h1: hash as u64,
        h2: (hash >> 64) as u64,
    }
}

/// Reduce an arbitrary `Hash` value to 16 bytes of hash material.
///
/// `std::hash::Hash` carries no byte representation of its own, so the value
/// is first fed through SipHash-1-3 (fixed zero key) and the 128-bit output
/// becomes the input to [`murmur_pair`].
pub fn hashed_material<H: Hash + ?Sized>(value: &H) -> [u8; 16] {
    let mut hasher = SipHasher13::new();
    value.hash(&mut hasher);
    hasher.finish128().as_bytes()
}

/// Compute the `k` probe positions of one hash pair in a filter of `m` bits.
///
/// `m` must be non-zero; `FilterConfig` validation guarantees it.
pub fn probe_positions(pair: HashPair, k: usize, m: usize) -> impl Iterator<Item = usize> {
    let m = m as u64;
    (0..k as u64).map(move |i| (pair.h1.wrapping_add(i.wrapping_mul(pair.h2)) % m) as usize)
}
