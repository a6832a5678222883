//! Bloom filter bit vector
//!
//! INVARIANTS:
//! - No false negatives: a filter realized from a proto, or merged with one,
//!   covers every bit that proto produces under the same config.
//! - Operands of different widths are compared as if the shorter one were
//!   zero-extended, so [`Filter::empty`] interoperates with any width.

use std::hash::{Hash, Hasher};

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::FilterConfig;
use super::hash_functions::probe_positions;
use super::proto::ProtoFilter;
use crate::error::GateError;

/// Fixed-width bit vector built from proto filters or merges of other filters.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Filter {
    #[serde(with = "bitvec_serde")]
    bits: BitVec<u64, Lsb0>,
}

/// Serde support for BitVec
mod bitvec_serde {
    use bitvec::prelude::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(bits: &BitVec<u64, Lsb0>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (bits.as_raw_slice(), bits.len()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BitVec<u64, Lsb0>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (words, len): (Vec<u64>, usize) = Deserialize::deserialize(deserializer)?;
        if len > words.len() * u64::BITS as usize {
            return Err(serde::de::Error::custom("bit length exceeds stored words"));
        }
        let mut bits = BitVec::<u64, Lsb0>::from_vec(words);
        bits.truncate(len);
        bits.set_uninitialized(false);
        Ok(bits)
    }
}

impl Filter {
    /// The all-zero filter.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Realize `proto` against `config`.
    pub fn from_proto(proto: &ProtoFilter, config: &FilterConfig) -> Self {
        let m = config.bit_width();
        let k = config.hash_probe_count();
        let mut bits = bitvec![u64, Lsb0; 0; m];
        for pair in proto.pairs() {
            for pos in probe_positions(*pair, k, m) {
                bits.set(pos, true);
            }
        }
        Self { bits }
    }

    /// Bitwise OR of `self` and `other`.
    pub fn merge(&self, other: &Filter) -> Filter {
        let mut merged = self.clone();
        merged.merge_in_place(other);
        merged
    }

    /// OR `other` into `self`, widening `self` if `other` is wider.
    pub fn merge_in_place(&mut self, other: &Filter) {
        if other.bits.len() > self.bits.len() {
            self.bits.resize(other.bits.len(), false);
        }
        let self_raw = self.bits.as_raw_mut_slice();
        for (s, o) in self_raw.iter_mut().zip(other.words()) {
            *s |= *o;
        }
    }

    /// Every bit set in `other` is also set in `self`.
    ///
    /// `gate.matches(&query)` is the "query matches the gate" test: if it
    /// fails, nothing that produced `query` was ever folded into `gate`.
    pub fn matches(&self, other: &Filter) -> bool {
        other
            .words()
            .iter()
            .enumerate()
            .all(|(i, &o)| self.word(i) & o == o)
    }

    /// Every bit set in `self` is also set in `other`.
    pub fn inverse_matches(&self, other: &Filter) -> bool {
        other.matches(self)
    }

    /// Hamming distance between the two bit patterns.
    pub fn distance(&self, other: &Filter) -> u32 {
        let len = self.words().len().max(other.words().len());
        (0..len)
            .map(|i| (self.word(i) ^ other.word(i)).count_ones())
            .sum()
    }

    /// Number of set bits.
    pub fn hamming_weight(&self) -> u32 {
        self.words().iter().map(|w| w.count_ones()).sum()
    }

    /// True when no bit is set.
    pub fn is_empty(&self) -> bool {
        self.words().iter().all(|&w| w == 0)
    }

    /// Allocated width in bits; zero for [`Filter::empty`].
    pub fn bit_width(&self) -> usize {
        self.bits.len()
    }

    /// Positions of the set bits, ascending.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// Serialize the filter to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, GateError> {
        bincode::serialize(self).map_err(|e| GateError::Serialization(e.to_string()))
    }

    /// Deserialize a filter from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GateError> {
        bincode::deserialize(bytes).map_err(|e| GateError::Serialization(e.to_string()))
    }

    fn words(&self) -> &[u64] {
        self.bits.as_raw_slice()
    }

    fn word(&self, i: usize) -> u64 {
        self.words().get(i).copied().unwrap_or(0)
    }

    /// Words up to and including the last non-zero one.
    fn significant_words(&self) -> &[u64] {
        let words = self.words();
        let end = words.iter().rposition(|&w| w != 0).map_or(0, |i| i + 1);
        &words[..end]
    }
}

// Equality is on set bits only: a cleared 64-bit filter equals `Filter::empty()`.
impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        self.significant_words() == other.significant_words()
    }
}

impl Eq for Filter {}

impl Hash for Filter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_words().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FilterConfig {
        FilterConfig::with_parameters(100, 1000, 7).unwrap()
    }

    fn filter_of(value: &str) -> Filter {
        ProtoFilter::of(value).to_filter(&config())
    }

    #[test]
    fn test_from_proto_sets_bits() {
        let filter = filter_of("test_element_0xABCD1234");

        assert!(filter.hamming_weight() > 0, "Some bits should be set");
        assert!(filter.hamming_weight() <= 7, "At most k=7 bits for one value");
        assert_eq!(filter.bit_width(), 1000);
    }

    #[test]
    fn test_empty_filter() {
        let empty = Filter::empty();

        assert!(empty.is_empty());
        assert_eq!(empty.hamming_weight(), 0);
        assert_eq!(empty.bit_width(), 0);
        assert_eq!(empty, Filter::from_proto(&ProtoFilter::default(), &config()));
    }

    #[test]
    fn test_merge_covers_both() {
        let a = filter_of("address_A");
        let b = filter_of("address_B");

        let merged = a.merge(&b);

        assert!(merged.matches(&a), "Merged filter should cover A");
        assert!(merged.matches(&b), "Merged filter should cover B");
        assert!(a.inverse_matches(&merged));
        assert!(b.inverse_matches(&merged));
    }

    #[test]
    fn test_merge_with_empty_widens() {
        let a = filter_of("Hello");
        let mut gate = Filter::empty();

        gate.merge_in_place(&a);

        assert_eq!(gate, a);
        assert_eq!(gate.bit_width(), a.bit_width());
    }

    #[test]
    fn test_matches_is_directional() {
        let a = filter_of("Hello");
        let both = a.merge(&filter_of("World"));

        assert!(both.matches(&a));
        assert!(!a.matches(&both), "A single value cannot cover two");
        assert!(Filter::empty().inverse_matches(&a), "Empty is covered by anything");
        assert!(a.matches(&Filter::empty()));
    }

    #[test]
    fn test_distance_and_weight() {
        let a = filter_of("Hello");
        let b = filter_of("World");

        assert_eq!(a.distance(&a), 0);
        assert_eq!(a.distance(&Filter::empty()), a.hamming_weight());
        assert_eq!(a.distance(&b), b.distance(&a));

        let shared = a.ones().filter(|p| b.ones().any(|q| q == *p)).count() as u32;
        assert_eq!(
            a.distance(&b),
            a.hamming_weight() + b.hamming_weight() - 2 * shared
        );
    }

    #[test]
    fn test_no_false_negatives_bulk() {
        let cfg = config();
        let mut gate = Filter::empty();
        let values: Vec<String> = (0..100).map(|i| format!("address_{:04x}", i)).collect();

        for v in &values {
            gate.merge_in_place(&ProtoFilter::of(v).to_filter(&cfg));
        }

        for v in &values {
            assert!(
                gate.matches(&ProtoFilter::of(v).to_filter(&cfg)),
                "False negative for {}",
                v
            );
        }
    }

    #[test]
    fn test_serialization() {
        let filter = filter_of("element_1").merge(&filter_of("element_2"));

        let bytes = filter.to_bytes().expect("serializes");
        let restored = Filter::from_bytes(&bytes).expect("Deserialization should succeed");

        assert_eq!(restored, filter);
        assert_eq!(restored.bit_width(), filter.bit_width());
        assert!(restored.matches(&filter_of("element_1")));
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(matches!(
            Filter::from_bytes(&[1, 2, 3]),
            Err(GateError::Serialization(_))
        ));
    }
}
