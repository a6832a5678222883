//! Flat gated collection: one backing collection behind one gate
//!
//! INVARIANTS:
//! - Every element in the backing collection has been folded into the gate
//!   at least once, so the gate can false-positive but never false-negative.
//! - Removal never shrinks the gate.

use std::fmt;
use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::domain::{Filter, FilterConfig, GateConfig, ProtoFilter};
use crate::error::GateError;
use crate::ports::{BackingCollection, BloomFilterGated, Candidates, RetainMap};

/// A backing collection `C` of `T` fronted by a single gate.
pub struct GatedCollection<T, C> {
    backing: C,
    gate_config: GateConfig,
    _marker: PhantomData<fn() -> T>,
}

impl<T, C> GatedCollection<T, C>
where
    C: BackingCollection<T>,
{
    /// Gate `backing` under `filter_config`.
    ///
    /// `backing` must start empty: the gate has no proto filters for
    /// elements it never saw.
    pub fn new(backing: C, filter_config: FilterConfig) -> Result<Self, GateError> {
        filter_config.validate()?;
        if !backing.is_empty() {
            return Err(GateError::InvalidConfig(format!(
                "backing collection must start empty, found {} elements",
                backing.len()
            )));
        }
        Ok(Self::from_parts(backing, filter_config))
    }

    /// Gate an empty backing collection created with `C::default()`.
    pub fn with_config(filter_config: FilterConfig) -> Result<Self, GateError>
    where
        C: Default,
    {
        Self::new(C::default(), filter_config)
    }

    /// Assemble from pre-validated parts.
    pub(crate) fn from_parts(backing: C, filter_config: FilterConfig) -> Self {
        Self {
            backing,
            gate_config: GateConfig::new(filter_config),
            _marker: PhantomData,
        }
    }

    /// Read-only view of the backing collection.
    pub fn backing(&self) -> &C {
        &self.backing
    }

    /// Number of elements, as reported by the backing collection.
    pub fn size(&self) -> usize {
        self.backing.len()
    }
}

impl<T, C> BloomFilterGated<T> for GatedCollection<T, C>
where
    T: PartialEq + Send + Sync + 'static,
    C: BackingCollection<T> + Send + Sync,
{
    fn gate_config(&self) -> &GateConfig {
        &self.gate_config
    }

    /// At the flat level the gate cannot narrow past "somewhere in here".
    fn candidates(&self, filter: &Filter) -> Candidates<'_, T> {
        if !self.gate_config.covers(filter) {
            trace!("Gate rejected candidate query");
            return Box::new(std::iter::empty());
        }
        self.backing.iter()
    }

    fn candidates_proto(&self, proto: &ProtoFilter) -> Candidates<'_, T> {
        self.candidates(&self.gate_config.build(proto))
    }

    fn data(&self) -> Candidates<'_, T> {
        self.backing.iter()
    }

    fn contains(&self, proto: &ProtoFilter, value: &T) -> bool {
        if !self.matches_proto(proto) {
            trace!("Gate rejected contains");
            return false;
        }
        self.backing.contains(value)
    }

    fn clear(&mut self) {
        self.backing.clear();
        self.gate_config.clear();
    }

    fn add(&mut self, proto: &ProtoFilter, value: T) -> bool {
        if !self.backing.insert(value) {
            return false;
        }
        self.gate_config.merge_proto(proto);
        true
    }

    fn remove(&mut self, proto: &ProtoFilter, value: &T) -> bool {
        if !self.matches_proto(proto) {
            trace!("Gate rejected remove");
            return false;
        }
        if !self.backing.remove(value) {
            return false;
        }
        self.gate_config.stats().delete(1);
        true
    }

    fn retain_all(&mut self, keep: &RetainMap<T>) -> bool {
        let config = self.gate_config.filter_config();

        // Keys the gate does not cover name nothing stored here
        let retained: Vec<&T> = self.gate_config.with_gate(|gate| {
            keep.iter()
                .filter(|(proto, _)| gate.matches(&proto.to_filter(config)))
                .flat_map(|(_, values)| values.iter())
                .collect()
        });

        let before = self.backing.len();
        let changed = self.backing.retain_all(&retained);
        let dropped = before.saturating_sub(self.backing.len());
        if dropped > 0 {
            self.gate_config.stats().delete(dropped as u64);
            debug!(dropped, remaining = self.backing.len(), "retain_all dropped elements");
        }
        changed
    }

    fn count(&self) -> u64 {
        self.backing.len() as u64
    }
}

impl<T, C: BackingCollection<T>> fmt::Debug for GatedCollection<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatedCollection")
            .field("len", &self.backing.len())
            .field("gate_config", &self.gate_config)
            .finish()
    }
}
