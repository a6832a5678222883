//! Backing collections holding the actual elements behind a gate
//!
//! Duplicate policy belongs to the backing collection: list-like types
//! (`Vec`, `VecDeque`) always append, set-like types (`HashSet`, `BTreeSet`)
//! reject values already present.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::hash::Hash;

/// Minimal mutable collection a gated collection can front.
pub trait BackingCollection<T> {
    fn contains(&self, value: &T) -> bool;

    /// Returns false when the collection rejected the value as a duplicate.
    fn insert(&mut self, value: T) -> bool;

    /// Remove one occurrence. Returns false when nothing was removed.
    fn remove(&mut self, value: &T) -> bool;

    /// Keep only elements equal to one in `keep`. Returns whether anything changed.
    fn retain_all(&mut self, keep: &[&T]) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &T> + '_>;

    fn clear(&mut self);
}

fn is_kept<T: PartialEq>(keep: &[&T], value: &T) -> bool {
    keep.iter().any(|k| *k == value)
}

impl<T: PartialEq> BackingCollection<T> for Vec<T> {
    fn contains(&self, value: &T) -> bool {
        <[T]>::contains(self, value)
    }

    fn insert(&mut self, value: T) -> bool {
        Vec::push(self, value);
        true
    }

    fn remove(&mut self, value: &T) -> bool {
        match <[T]>::iter(self).position(|v| v == value) {
            Some(idx) => {
                Vec::remove(self, idx);
                true
            }
            None => false,
        }
    }

    fn retain_all(&mut self, keep: &[&T]) -> bool {
        let before = Vec::len(self);
        Vec::retain(self, |v| is_kept(keep, v));
        Vec::len(self) != before
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(<[T]>::iter(self))
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }
}

impl<T: PartialEq> BackingCollection<T> for VecDeque<T> {
    fn contains(&self, value: &T) -> bool {
        VecDeque::contains(self, value)
    }

    fn insert(&mut self, value: T) -> bool {
        VecDeque::push_back(self, value);
        true
    }

    fn remove(&mut self, value: &T) -> bool {
        match VecDeque::iter(self).position(|v| v == value) {
            Some(idx) => VecDeque::remove(self, idx).is_some(),
            None => false,
        }
    }

    fn retain_all(&mut self, keep: &[&T]) -> bool {
        let before = VecDeque::len(self);
        VecDeque::retain(self, |v| is_kept(keep, v));
        VecDeque::len(self) != before
    }

    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(VecDeque::iter(self))
    }

    fn clear(&mut self) {
        VecDeque::clear(self);
    }
}

impl<T: Eq + Hash> BackingCollection<T> for HashSet<T> {
    fn contains(&self, value: &T) -> bool {
        HashSet::contains(self, value)
    }

    fn insert(&mut self, value: T) -> bool {
        HashSet::insert(self, value)
    }

    fn remove(&mut self, value: &T) -> bool {
        HashSet::remove(self, value)
    }

    fn retain_all(&mut self, keep: &[&T]) -> bool {
        let keep: HashSet<&T> = keep.iter().copied().collect();
        let before = HashSet::len(self);
        HashSet::retain(self, |v| keep.contains(v));
        HashSet::len(self) != before
    }

    fn len(&self) -> usize {
        HashSet::len(self)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(HashSet::iter(self))
    }

    fn clear(&mut self) {
        HashSet::clear(self);
    }
}

impl<T: Ord> BackingCollection<T> for BTreeSet<T> {
    fn contains(&self, value: &T) -> bool {
        BTreeSet::contains(self, value)
    }

    fn insert(&mut self, value: T) -> bool {
        BTreeSet::insert(self, value)
    }

    fn remove(&mut self, value: &T) -> bool {
        BTreeSet::remove(self, value)
    }

    fn retain_all(&mut self, keep: &[&T]) -> bool {
        let keep: BTreeSet<&T> = keep.iter().copied().collect();
        let before = BTreeSet::len(self);
        BTreeSet::retain(self, |v| keep.contains(v));
        BTreeSet::len(self) != before
    }

    fn len(&self) -> usize {
        BTreeSet::len(self)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(BTreeSet::iter(self))
    }

    fn clear(&mut self) {
        BTreeSet::clear(self);
    }
}
