//! Bounded ordered dictionary.
//!
//! A key to score map paired with a [`SkipList`] of `(score, key)` nodes:
//! the map answers membership and score lookups in O(1), the list answers
//! order questions in O(log n). Every public call leaves the two agreeing on
//! which keys exist and what their scores are.
//!
//! Size is bounded per call rather than per instance: the `set_with_evict_*`
//! methods take a capacity and trim from the low or high end of the order
//! until the dictionary fits. The list's `max_level` is a separate setting
//! fixed at construction.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::level::Geometric;
use crate::level::LevelGenerator;
use crate::node::Node;
use crate::skiplist::DEFAULT_MAX_LEVEL;
use crate::skiplist::SkipList;

/// Which end of the order to trim when over capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Evict {
    /// Drop the lowest ranked keys.
    Front,
    /// Drop the highest ranked keys.
    Back,
}

/// Keys ordered by score, with O(1) score lookup and eviction by rank.
pub struct BoundedDict<G = Geometric> {
    scores: FxHashMap<String, u64>,
    list: SkipList<G>,
}

impl BoundedDict<Geometric> {
    pub fn new() -> Self {
        Self::with_max_level(DEFAULT_MAX_LEVEL)
    }

    pub fn with_max_level(max_level: usize) -> Self {
        Self::with_generator(max_level, Geometric::from_entropy())
    }
}

impl Default for BoundedDict<Geometric> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: LevelGenerator> BoundedDict<G> {
    pub fn with_generator(max_level: usize, generator: G) -> Self {
        BoundedDict {
            scores: FxHashMap::default(),
            list: SkipList::with_generator(max_level, generator),
        }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn max_level(&self) -> usize {
        self.list.max_level()
    }

    /// The underlying list, for order queries not exposed here.
    pub fn list(&self) -> &SkipList<G> {
        &self.list
    }

    pub fn score(&self, key: &str) -> Option<u64> {
        self.scores.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.scores.contains_key(key)
    }

    /// 1-based rank of `key` in ascending score order.
    pub fn rank(&self, key: &str) -> Option<usize> {
        let score = self.score(key)?;
        self.list.rank(score, key)
    }

    /// Insert `key` with `score`, replacing any previous score.
    pub fn set(&mut self, key: impl Into<String>, score: u64) {
        let key = key.into();
        if let Some(&old) = self.scores.get(&key) {
            // The map takes the new score whether or not the old node was found.
            self.list.delete(old, &key);
        }
        self.list.insert(score, key.clone());
        self.scores.insert(key, score);
        self.check_invariants();
    }

    /// `set`, then drop the lowest ranked keys until at most `capacity` remain.
    pub fn set_with_evict_front(
        &mut self,
        key: impl Into<String>,
        score: u64,
        capacity: usize,
    ) -> Vec<String> {
        self.set_with_evict(key, score, capacity, Evict::Front)
    }

    /// `set`, then drop the highest ranked keys until at most `capacity` remain.
    pub fn set_with_evict_back(
        &mut self,
        key: impl Into<String>,
        score: u64,
        capacity: usize,
    ) -> Vec<String> {
        self.set_with_evict(key, score, capacity, Evict::Back)
    }

    /// `set`, then trim from `evict`'s end down to `capacity`.
    /// Returns the evicted keys in the order they were removed.
    pub fn set_with_evict(
        &mut self,
        key: impl Into<String>,
        score: u64,
        capacity: usize,
        evict: Evict,
    ) -> Vec<String> {
        self.set(key, score);

        let mut evicted = Vec::new();
        while self.list.len() > capacity {
            let removed = match evict {
                Evict::Front => self.list.delete_first(),
                Evict::Back => self.list.delete_last(),
            };
            let Some(node) = removed else {
                break;
            };
            let key = node.into_value();
            self.scores.remove(&key);
            evicted.push(key);
        }

        self.check_invariants();
        evicted
    }

    /// Remove `key`. Returns false if it was absent.
    pub fn delete(&mut self, key: &str) -> bool {
        let Some(score) = self.scores.remove(key) else {
            return false;
        };
        self.list.delete(score, key);
        self.check_invariants();
        true
    }

    /// Keys at 0-based ranks `start..=end`; see [`SkipList::range`].
    pub fn range(&self, start: isize, end: isize, reverse: bool) -> Vec<&str> {
        self.list
            .range(start, end, reverse)
            .into_iter()
            .map(Node::value)
            .collect()
    }

    /// Ascending `(key, score)` pairs.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, u64)> + '_ {
        self.list.iter().map(|node| (node.value(), node.score()))
    }

    #[cfg(debug_assertions)]
    fn check_invariants(&self) {
        assert_eq!(
            self.scores.len(),
            self.list.len(),
            "INVARIANT VIOLATED: map has {} keys, list has {} nodes",
            self.scores.len(),
            self.list.len()
        );
        for node in self.list.iter() {
            assert_eq!(
                self.scores.get(node.value()),
                Some(&node.score()),
                "INVARIANT VIOLATED: list node {} disagrees with map",
                node
            );
        }
    }

    #[cfg(not(debug_assertions))]
    #[inline(always)]
    fn check_invariants(&self) {}
}

impl<G> fmt::Display for BoundedDict<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.list, f)
    }
}

impl<G> fmt::Debug for BoundedDict<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedDict")
            .field("list", &self.list)
            .finish_non_exhaustive()
    }
}
