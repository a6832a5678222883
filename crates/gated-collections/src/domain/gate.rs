//! Gate: the accumulated filter of one collection plus its statistics
//!
//! INVARIANTS:
//! - `gate` is the OR of every filter merged since the last `clear()`.
//! - Bits only leave `gate` through `clear()`.
//! - A gate change and its paired stats update happen under one lock, so
//!   [`GateConfig::snapshot`] never sees one without the other.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::config::FilterConfig;
use super::filter::Filter;
use super::proto::ProtoFilter;
use super::stats::{CollectionStats, StatsSnapshot};

/// Gate filter and stats read together.
#[derive(Clone, Debug, PartialEq)]
pub struct GateSnapshot {
    pub gate: Filter,
    pub stats: StatsSnapshot,
}

/// Owns one filter config, the gate built under it, and the gate's stats.
#[derive(Debug)]
pub struct GateConfig {
    filter_config: FilterConfig,
    gate: Mutex<Filter>,
    stats: Arc<CollectionStats>,
}

impl GateConfig {
    pub fn new(filter_config: FilterConfig) -> Self {
        Self {
            filter_config,
            gate: Mutex::new(Filter::empty()),
            stats: Arc::new(CollectionStats::new()),
        }
    }

    /// Fold `filter` into the gate and record one insert.
    ///
    /// The bits are only OR-ed when `filter` adds something the gate lacks;
    /// the insert is recorded either way.
    pub fn merge(&self, filter: &Filter) {
        let mut gate = self.gate.lock();
        if !gate.matches(filter) {
            gate.merge_in_place(filter);
        }
        self.stats.insert();
    }

    /// Realize `proto` under this gate's config, then [`merge`](Self::merge) it.
    pub fn merge_proto(&self, proto: &ProtoFilter) {
        self.merge(&self.build(proto));
    }

    /// Reset the gate to empty and zero the stats.
    pub fn clear(&self) {
        let mut gate = self.gate.lock();
        *gate = Filter::empty();
        self.stats.clear();
        debug!(bit_width = self.filter_config.bit_width(), "Gate cleared");
    }

    /// Realize `proto` under this gate's config.
    pub fn build(&self, proto: &ProtoFilter) -> Filter {
        proto.to_filter(&self.filter_config)
    }

    /// Copy of the current gate.
    pub fn gate(&self) -> Filter {
        self.gate.lock().clone()
    }

    /// Run `f` against the gate without copying it.
    pub fn with_gate<R>(&self, f: impl FnOnce(&Filter) -> R) -> R {
        f(&self.gate.lock())
    }

    /// The gate covers every bit of `filter`.
    pub fn covers(&self, filter: &Filter) -> bool {
        self.with_gate(|gate| gate.matches(filter))
    }

    pub fn filter_config(&self) -> &FilterConfig {
        &self.filter_config
    }

    pub fn stats(&self) -> &Arc<CollectionStats> {
        &self.stats
    }

    pub fn snapshot(&self) -> GateSnapshot {
        let gate = self.gate.lock();
        GateSnapshot {
            gate: gate.clone(),
            stats: self.stats.snapshot(),
        }
    }
}
