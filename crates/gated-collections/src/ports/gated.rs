//! The contract shared by flat and nested gated collections

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{CollectionStats, Filter, GateConfig, ProtoFilter};

/// Lazy sequence of (possibly matching) elements.
pub type Candidates<'a, T> = Box<dyn Iterator<Item = &'a T> + 'a>;

/// Values to keep, grouped under the proto filter they were hashed from.
pub type RetainMap<T> = HashMap<ProtoFilter, Vec<T>>;

/// A collection fronted by a Bloom filter gate.
///
/// The gate summarizes every element ever added since the last `clear()`.
/// Queries whose filter the gate does not cover are answered without
/// touching the elements. The `proto` passed alongside a value must be the
/// one built from that value; a mismatch silently breaks the gate.
pub trait BloomFilterGated<T>: Send + Sync
where
    T: 'static,
{
    fn gate_config(&self) -> &GateConfig;

    /// Copy of the current gate.
    fn gate(&self) -> Filter {
        self.gate_config().gate()
    }

    fn stats(&self) -> &Arc<CollectionStats> {
        self.gate_config().stats()
    }

    /// Advisory: the design capacity of the gate's config has been reached.
    fn is_full(&self) -> bool {
        self.count() >= self.gate_config().filter_config().number_of_items() as u64
    }

    /// Hamming distance between the gate and `filter`.
    fn distance(&self, filter: &Filter) -> u32 {
        self.gate_config().with_gate(|gate| gate.distance(filter))
    }

    /// Hamming distance between the gate and `proto` realized under the gate's config.
    fn distance_proto(&self, proto: &ProtoFilter) -> u32 {
        self.distance(&self.gate_config().build(proto))
    }

    /// The gate covers every bit of `filter`.
    fn matches(&self, filter: &Filter) -> bool {
        self.gate_config().covers(filter)
    }

    fn matches_proto(&self, proto: &ProtoFilter) -> bool {
        self.matches(&self.gate_config().build(proto))
    }

    /// `filter` covers every bit of the gate.
    fn inverse_match(&self, filter: &Filter) -> bool {
        self.gate_config().with_gate(|gate| gate.inverse_matches(filter))
    }

    fn inverse_match_proto(&self, proto: &ProtoFilter) -> bool {
        self.inverse_match(&self.gate_config().build(proto))
    }

    /// Elements that may have produced `filter`.
    fn candidates(&self, filter: &Filter) -> Candidates<'_, T>;

    /// Elements that may have produced `proto`.
    fn candidates_proto(&self, proto: &ProtoFilter) -> Candidates<'_, T>;

    /// Every element, unfiltered.
    fn data(&self) -> Candidates<'_, T>;

    fn contains(&self, proto: &ProtoFilter, value: &T) -> bool;

    /// All `values` are present.
    ///
    /// Rejects the whole batch at once when the gate does not cover the
    /// union of the protos.
    fn contains_all(&self, values: &[(ProtoFilter, T)]) -> bool {
        let union = values
            .iter()
            .fold(ProtoFilter::default(), |acc, (proto, _)| acc.union(proto));
        if !self.matches_proto(&union) {
            return false;
        }
        values.iter().all(|(proto, value)| self.contains(proto, value))
    }

    /// Remove every element and reset the gate and stats.
    fn clear(&mut self);

    /// Add `value`, folding `proto` into the gate when the value was accepted.
    fn add(&mut self, proto: &ProtoFilter, value: T) -> bool;

    /// Remove one occurrence of `value`. The gate never shrinks.
    fn remove(&mut self, proto: &ProtoFilter, value: &T) -> bool;

    /// Keep only the values listed in `keep`. Returns whether anything changed.
    fn retain_all(&mut self, keep: &RetainMap<T>) -> bool;

    /// Exact number of elements held.
    fn count(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.count() == 0
    }
}
