//! Per-collection insert/delete statistics with change notification
//!
//! Every mutation runs its counter update and the notification of all
//! registered consumers inside one critical section.
//!
//! Nested collections keep their top-level counters in step with their
//! buckets through [`ActionMapper`]: each bucket forwards its deletes to the
//! parent, while the parent records its own inserts at routing time.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// A change reported to stats consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsAction {
    Insert(u64),
    Delete(u64),
    Clear(u64),
}

type StatsConsumer = Box<dyn Fn(StatsAction) + Send + Sync>;

struct StatsState {
    inserts: u64,
    deletes: u64,
    consumers: Vec<StatsConsumer>,
}

/// Point-in-time copy of the counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub inserts: u64,
    pub deletes: u64,
    /// `inserts - deletes`
    pub filter_count: u64,
    /// `inserts + deletes`
    pub txn_count: u64,
}

/// Insert and delete counters for one gated collection.
///
/// Counters saturate at `u64::MAX` instead of overflowing.
pub struct CollectionStats {
    state: Mutex<StatsState>,
}

impl CollectionStats {
    pub fn new() -> Self {
        Self::with_counts(0, 0)
    }

    /// Start from existing counters, e.g. a restored [`StatsSnapshot`].
    pub fn with_counts(inserts: u64, deletes: u64) -> Self {
        Self {
            state: Mutex::new(StatsState {
                inserts,
                deletes,
                consumers: Vec::new(),
            }),
        }
    }

    /// Record one insert.
    pub fn insert(&self) {
        let mut state = self.state.lock();
        state.inserts = state.inserts.saturating_add(1);
        Self::notify(&state, StatsAction::Insert(1));
    }

    /// Record `count` deletes.
    pub fn delete(&self, count: u64) {
        let mut state = self.state.lock();
        state.deletes = state.deletes.saturating_add(count);
        Self::notify(&state, StatsAction::Delete(count));
    }

    /// Reset both counters. Registered consumers stay registered.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.inserts = 0;
        state.deletes = 0;
        Self::notify(&state, StatsAction::Clear(1));
    }

    /// Append a consumer invoked, in registration order, on every later action.
    ///
    /// A consumer must not call back into the stats instance that notifies it.
    pub fn add_consumer<F>(&self, consumer: F)
    where
        F: Fn(StatsAction) + Send + Sync + 'static,
    {
        self.state.lock().consumers.push(Box::new(consumer));
    }

    /// Adapter that folds a child's deletes into these stats.
    pub fn action_mapper(self: &Arc<Self>) -> ActionMapper {
        ActionMapper {
            target: Arc::downgrade(self),
        }
    }

    /// Register `parent`'s action mapper as a consumer of `self`.
    pub fn forward_deletes_to(&self, parent: &Arc<CollectionStats>) {
        let mapper = parent.action_mapper();
        self.add_consumer(move |action| mapper.accept(action));
    }

    pub fn insert_count(&self) -> u64 {
        self.state.lock().inserts
    }

    pub fn delete_count(&self) -> u64 {
        self.state.lock().deletes
    }

    /// `inserts - deletes`: the number of values believed present.
    pub fn filter_count(&self) -> u64 {
        let state = self.state.lock();
        state.inserts.saturating_sub(state.deletes)
    }

    /// `inserts + deletes`
    pub fn txn_count(&self) -> u64 {
        let state = self.state.lock();
        state.inserts.saturating_add(state.deletes)
    }

    pub fn consumer_count(&self) -> usize {
        self.state.lock().consumers.len()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let state = self.state.lock();
        StatsSnapshot {
            inserts: state.inserts,
            deletes: state.deletes,
            filter_count: state.inserts.saturating_sub(state.deletes),
            txn_count: state.inserts.saturating_add(state.deletes),
        }
    }

    /// Same insert and delete counts; consumers are ignored.
    pub fn same_values(&self, other: &CollectionStats) -> bool {
        let ours = self.snapshot();
        let theirs = other.snapshot();
        ours.inserts == theirs.inserts && ours.deletes == theirs.deletes
    }

    fn notify(state: &StatsState, action: StatsAction) {
        for consumer in &state.consumers {
            consumer(action);
        }
    }
}

impl Default for CollectionStats {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CollectionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("CollectionStats")
            .field("inserts", &snapshot.inserts)
            .field("deletes", &snapshot.deletes)
            .finish()
    }
}

/// Forwards a child's deletes to a parent's stats.
///
/// Inserts are ignored because the parent counts its own inserts when it
/// routes them; clears are ignored because only the collection the caller
/// clears resets. Holds the parent weakly: once the parent is gone every
/// action is dropped.
#[derive(Clone, Debug)]
pub struct ActionMapper {
    target: Weak<CollectionStats>,
}

impl ActionMapper {
    pub fn accept(&self, action: StatsAction) {
        if let StatsAction::Delete(count) = action {
            if let Some(target) = self.target.upgrade() {
                target.delete(count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let stats = CollectionStats::new();
        stats.insert();
        stats.insert();
        stats.insert();
        stats.delete(2);

        assert_eq!(stats.insert_count(), 3);
        assert_eq!(stats.delete_count(), 2);
        assert_eq!(stats.filter_count(), 1);
        assert_eq!(stats.txn_count(), 5);
    }

    #[test]
    fn test_counters_saturate() {
        let stats = CollectionStats::with_counts(u64::MAX, 0);
        stats.insert();
        stats.delete(u64::MAX);
        stats.delete(1);

        assert_eq!(stats.insert_count(), u64::MAX, "Inserts clamp at the maximum");
        assert_eq!(stats.delete_count(), u64::MAX, "Deletes clamp at the maximum");
        assert_eq!(stats.txn_count(), u64::MAX);
        assert_eq!(stats.filter_count(), 0);
    }

    #[test]
    fn test_consumers_see_actions_in_order() {
        let stats = CollectionStats::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        stats.add_consumer(move |a| first.lock().push(("first", a)));
        let second = Arc::clone(&seen);
        stats.add_consumer(move |a| second.lock().push(("second", a)));

        stats.insert();
        stats.delete(3);
        stats.clear();

        assert_eq!(
            *seen.lock(),
            vec![
                ("first", StatsAction::Insert(1)),
                ("second", StatsAction::Insert(1)),
                ("first", StatsAction::Delete(3)),
                ("second", StatsAction::Delete(3)),
                ("first", StatsAction::Clear(1)),
                ("second", StatsAction::Clear(1)),
            ]
        );
    }

    #[test]
    fn test_late_consumer_gets_no_replay() {
        let stats = CollectionStats::new();
        stats.insert();

        let seen = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&seen);
        stats.add_consumer(move |_| *counter.lock() += 1);

        assert_eq!(*seen.lock(), 0, "Already-fired events are not replayed");
        stats.insert();
        assert_eq!(*seen.lock(), 1);
    }

    #[test]
    fn test_clear_keeps_consumers() {
        let stats = CollectionStats::new();
        stats.add_consumer(|_| {});
        stats.insert();
        stats.clear();

        assert_eq!(stats.insert_count(), 0);
        assert_eq!(stats.delete_count(), 0);
        assert_eq!(stats.consumer_count(), 1);
    }

    #[test]
    fn test_action_mapper_forwards_only_deletes() {
        let parent = Arc::new(CollectionStats::new());
        let child = CollectionStats::new();
        child.forward_deletes_to(&parent);

        child.insert();
        child.insert();
        child.delete(1);
        child.clear();

        assert_eq!(parent.insert_count(), 0, "Inserts are not forwarded");
        assert_eq!(parent.delete_count(), 1, "Deletes are forwarded");

        parent.insert();
        child.clear();
        assert_eq!(parent.insert_count(), 1, "Clears are not forwarded");
    }

    #[test]
    fn test_action_mapper_with_dropped_parent() {
        let parent = Arc::new(CollectionStats::new());
        let child = CollectionStats::new();
        child.forward_deletes_to(&parent);
        let mapper = parent.action_mapper();

        child.delete(1);
        assert_eq!(parent.delete_count(), 1);
        drop(parent);

        child.insert();
        child.delete(1);
        mapper.accept(StatsAction::Delete(5));

        assert_eq!(child.delete_count(), 2, "Child keeps counting after the parent is gone");
        assert_eq!(child.insert_count(), 1);
        assert_eq!(child.consumer_count(), 1);
    }

    #[test]
    fn test_same_values_ignores_consumers() {
        let a = CollectionStats::new();
        let b = CollectionStats::new();
        b.add_consumer(|_| {});

        a.insert();
        b.insert();
        assert!(a.same_values(&b));
        assert!(a.same_values(&a));

        b.delete(1);
        assert!(!a.same_values(&b));
    }

    #[test]
    fn test_snapshot() {
        let stats = CollectionStats::with_counts(4, 1);

        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                inserts: 4,
                deletes: 1,
                filter_count: 3,
                txn_count: 5,
            }
        );
    }
}
