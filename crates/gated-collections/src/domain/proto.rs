//! Config-independent hash material for one or more values
//!
//! A `ProtoFilter` remembers the digest of every value fed to it. It only
//! becomes a concrete [`Filter`](super::Filter) once realized against a
//! [`FilterConfig`](super::FilterConfig), which lets one proto serve gates
//! of different widths (e.g. the top level and the buckets of a nested
//! collection).

use std::collections::BTreeSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use super::config::FilterConfig;
use super::filter::Filter;
use super::hash_functions::{hashed_material, murmur_pair, HashPair};

/// Accumulated hash material.
///
/// Equality and hashing are structural so a proto can key a map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProtoFilter {
    pairs: BTreeSet<HashPair>,
}

impl ProtoFilter {
    /// Proto for a single byte-representable value.
    pub fn of<V: AsRef<[u8]> + ?Sized>(value: &V) -> Self {
        ProtoFilterBuilder::new().with(value).build()
    }

    /// Proto for a single value through its `Hash` impl.
    pub fn of_hashed<H: Hash + ?Sized>(value: &H) -> Self {
        ProtoFilterBuilder::new().with_hashed(value).build()
    }

    /// Proto covering everything in `self` and `other`.
    pub fn union(&self, other: &ProtoFilter) -> Self {
        let mut pairs = self.pairs.clone();
        pairs.extend(other.pairs.iter().copied());
        Self { pairs }
    }

    /// Realize into a concrete filter for `config`.
    pub fn to_filter(&self, config: &FilterConfig) -> Filter {
        Filter::from_proto(self, config)
    }

    pub fn pairs(&self) -> impl Iterator<Item = &HashPair> {
        self.pairs.iter()
    }

    /// Number of distinct digests held.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Builder combining values and other protos into one [`ProtoFilter`].
#[derive(Default)]
pub struct ProtoFilterBuilder {
    pairs: BTreeSet<HashPair>,
}

impl ProtoFilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value by its byte representation
    pub fn with<V: AsRef<[u8]> + ?Sized>(mut self, value: &V) -> Self {
        self.pairs.insert(murmur_pair(value.as_ref()));
        self
    }

    /// Add a value through its `Hash` impl
    pub fn with_hashed<H: Hash + ?Sized>(mut self, value: &H) -> Self {
        self.pairs.insert(murmur_pair(&hashed_material(value)));
        self
    }

    /// Add every digest held by `proto`
    pub fn with_proto(mut self, proto: &ProtoFilter) -> Self {
        self.pairs.extend(proto.pairs.iter().copied());
        self
    }

    pub fn build(self) -> ProtoFilter {
        ProtoFilter { pairs: self.pairs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_value_same_proto() {
        assert_eq!(ProtoFilter::of("Hello"), ProtoFilter::of(b"Hello"));
        assert_ne!(ProtoFilter::of("Hello"), ProtoFilter::of("World"));
    }

    #[test]
    fn test_builder_combines_values_and_protos() {
        let hello = ProtoFilter::of("Hello");
        let combined = ProtoFilterBuilder::new()
            .with("World")
            .with_proto(&hello)
            .build();

        assert_eq!(combined.len(), 2);
        assert_eq!(combined, hello.union(&ProtoFilter::of("World")));
    }

    #[test]
    fn test_duplicate_values_collapse() {
        let proto = ProtoFilterBuilder::new().with("Hello").with("Hello").build();
        assert_eq!(proto.len(), 1, "Repeated values add no new material");
    }

    #[test]
    fn test_hashed_values() {
        let a = ProtoFilter::of_hashed(&(42u64, "key"));
        let b = ProtoFilter::of_hashed(&(42u64, "key"));
        let c = ProtoFilter::of_hashed(&(43u64, "key"));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_empty_proto() {
        let proto = ProtoFilterBuilder::new().build();
        assert!(proto.is_empty());
        assert_eq!(proto, ProtoFilter::default());
    }
}
