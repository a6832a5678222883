//! Nested (sharded) gated collection
//!
//! Holds a growable list of buckets, each a gated collection of its own,
//! behind a top-level gate that summarizes all of them.
//!
//! INVARIANTS:
//! - After every `add`, at least `min_free` buckets are not full.
//! - Buckets are never removed, only filled, cleared and counted.
//! - Top-level `filter_count` equals the sum of the buckets' `filter_count`:
//!   the top level records its own inserts when it routes one, and every
//!   bucket forwards its deletes upward through an `ActionMapper`.

use std::fmt;

use tracing::{debug, trace};

use crate::domain::{Filter, FilterConfig, GateConfig, NestedConfig, ProtoFilter};
use crate::error::GateError;
use crate::ports::{BloomFilterGated, Bucket, BucketFactory, Candidates, RetainMap};

/// Buckets of gated collections routed by Hamming distance.
pub struct GatedNestedCollection<T: 'static> {
    buckets: Vec<Bucket<T>>,
    gate_config: GateConfig,
    factory: Box<dyn BucketFactory<T>>,
    config: NestedConfig,
}

impl<T: 'static> GatedNestedCollection<T> {
    /// Create a nested collection with `config.min_free` empty buckets.
    ///
    /// `filter_config` shapes the top-level gate; buckets use the factory's config.
    pub fn new<F>(
        filter_config: FilterConfig,
        factory: F,
        config: NestedConfig,
    ) -> Result<Self, GateError>
    where
        F: BucketFactory<T> + 'static,
    {
        Self::with_boxed_factory(filter_config, Box::new(factory), config)
    }

    pub fn with_boxed_factory(
        filter_config: FilterConfig,
        factory: Box<dyn BucketFactory<T>>,
        config: NestedConfig,
    ) -> Result<Self, GateError> {
        filter_config.validate()?;
        factory.filter_config().validate()?;
        config.validate()?;
        Ok(Self::from_parts(filter_config, factory, config))
    }

    /// Assemble from pre-validated parts.
    pub(crate) fn from_parts(
        filter_config: FilterConfig,
        factory: Box<dyn BucketFactory<T>>,
        config: NestedConfig,
    ) -> Self {
        let mut collection = Self {
            buckets: Vec::with_capacity(config.min_free),
            gate_config: GateConfig::new(filter_config),
            factory,
            config,
        };
        collection.ensure_free_floor();
        collection
    }

    pub fn buckets(&self) -> &[Bucket<T>] {
        &self.buckets
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Buckets that have not reached their design capacity.
    pub fn free_bucket_count(&self) -> usize {
        self.buckets.iter().filter(|b| !b.is_full()).count()
    }

    pub fn min_free(&self) -> usize {
        self.config.min_free
    }

    /// Filter config of the buckets.
    pub fn bucket_filter_config(&self) -> &FilterConfig {
        self.factory.filter_config()
    }

    /// Top-level and bucket filters are built under the same config.
    fn same_config_throughout(&self) -> bool {
        self.gate_config.filter_config() == self.factory.filter_config()
    }

    fn create_bucket(&mut self, reason: &'static str) -> usize {
        let bucket = self.factory.create_bucket();
        bucket.stats().forward_deletes_to(self.gate_config.stats());
        self.buckets.push(bucket);

        let index = self.buckets.len() - 1;
        debug!(bucket = index, reason, "Created bucket");
        index
    }

    fn ensure_free_floor(&mut self) {
        let mut free = self.free_bucket_count();
        while free < self.config.min_free {
            self.create_bucket("free bucket floor");
            free += 1;
        }
    }

    /// Bucket already holding `value`, if the top-level gate allows one.
    fn holding_bucket(&self, proto: &ProtoFilter, value: &T) -> Option<usize> {
        if !self.gate_config.covers(&self.gate_config.build(proto)) {
            return None;
        }
        self.buckets
            .iter()
            .position(|bucket| bucket.contains(proto, value))
    }

    /// Free bucket nearest to `proto`; ties go to the earliest bucket.
    fn select_bucket(&self, proto: &ProtoFilter) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for (index, bucket) in self.buckets.iter().enumerate() {
            if bucket.is_full() {
                continue;
            }
            let distance = bucket.distance_proto(proto);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| index)
    }
}

impl<T> BloomFilterGated<T> for GatedNestedCollection<T>
where
    T: Send + Sync + 'static,
{
    fn gate_config(&self) -> &GateConfig {
        &self.gate_config
    }

    /// Recurses into the buckets when they share the top-level config;
    /// otherwise yields every element.
    fn candidates(&self, filter: &Filter) -> Candidates<'_, T> {
        if !self.gate_config.covers(filter) {
            trace!("Top-level gate rejected candidate query");
            return Box::new(std::iter::empty());
        }
        if !self.same_config_throughout() {
            return self.data();
        }
        let filter = filter.clone();
        Box::new(
            self.buckets
                .iter()
                .flat_map(move |bucket| bucket.candidates(&filter)),
        )
    }

    fn candidates_proto(&self, proto: &ProtoFilter) -> Candidates<'_, T> {
        if !self.matches_proto(proto) {
            trace!("Top-level gate rejected candidate query");
            return Box::new(std::iter::empty());
        }
        let proto = proto.clone();
        Box::new(
            self.buckets
                .iter()
                .flat_map(move |bucket| bucket.candidates_proto(&proto)),
        )
    }

    fn data(&self) -> Candidates<'_, T> {
        Box::new(self.buckets.iter().flat_map(|bucket| bucket.data()))
    }

    fn contains(&self, proto: &ProtoFilter, value: &T) -> bool {
        if !self.matches_proto(proto) {
            trace!("Top-level gate rejected contains");
            return false;
        }
        self.buckets.iter().any(|bucket| bucket.contains(proto, value))
    }

    fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.gate_config.clear();
    }

    fn add(&mut self, proto: &ProtoFilter, value: T) -> bool {
        // A held value goes back to its bucket, whose duplicate policy decides
        let routed = self
            .holding_bucket(proto, &value)
            .or_else(|| self.select_bucket(proto));
        let index = match routed {
            Some(index) => index,
            None => self.create_bucket("no free bucket"),
        };

        let added = self.buckets[index].add(proto, value);
        if added {
            self.gate_config.merge_proto(proto);
        }
        if self.buckets[index].is_full() {
            self.ensure_free_floor();
        }
        added
    }

    /// Fans out to every bucket; bucket deletes reach the top-level stats
    /// through their action mappers.
    fn remove(&mut self, proto: &ProtoFilter, value: &T) -> bool {
        if !self.matches_proto(proto) {
            trace!("Top-level gate rejected remove");
            return false;
        }
        self.buckets
            .iter_mut()
            .fold(false, |removed, bucket| bucket.remove(proto, value) | removed)
    }

    fn retain_all(&mut self, keep: &RetainMap<T>) -> bool {
        self.buckets
            .iter_mut()
            .fold(false, |changed, bucket| bucket.retain_all(keep) | changed)
    }

    fn count(&self) -> u64 {
        self.buckets.iter().map(|bucket| bucket.count()).sum()
    }
}

impl<T: 'static> fmt::Debug for GatedNestedCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatedNestedCollection")
            .field("buckets", &self.buckets.len())
            .field("min_free", &self.config.min_free)
            .field("gate_config", &self.gate_config)
            .field("bucket_filter_config", self.factory.filter_config())
            .finish()
    }
}
