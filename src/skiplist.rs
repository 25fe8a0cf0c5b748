//! Skip List with order statistics
//!
//! A classic one-item-per-node skip list ordered by `(score, value)`, where
//! every forward edge also records its *span*: how many level 0 steps it
//! covers. Summing spans along a search path gives the rank of the node the
//! path ends on, which turns rank lookup and rank windows into O(log n)
//! expected-time operations.
//!
//! # Span Semantics
//!
//! - `node.levels[i].span` = rank(`node.levels[i].forward`) - rank(`node`)
//! - The head has rank 0, so the first node always has rank 1
//! - An edge whose forward is `NULL` covers the distance to the end of the
//!   list; only the head's values for such edges are ever read
//!
//! ```text
//! Level 2: HEAD --3-----------------> C --------------------> NULL
//! Level 1: HEAD --1--> A --2--------> C --2--------> E -----> NULL
//! Level 0: HEAD --1--> A --1--> B --1--> C --1--> D --1--> E --> NULL
//! ```
//!
//! # Operations
//!
//! - `insert(score, value)`: O(log n) - duplicates are kept as distinct nodes
//! - `delete(score, value)`: O(log n) - removes one exact match
//! - `delete_first()` / `delete_last()`: O(log n) - remove an end
//! - `get_node_by_rank(rank)`: O(log n) - 1-based
//! - `rank(score, value)`: O(log n) - 1-based
//! - `range(start, end, reverse)`: O(log n + m) - 0-based inclusive window
//! - `len()`: O(1)
//!
//! The list is not synchronised: mutation takes `&mut self`, and sharing an
//! instance across threads needs an outer lock.

use std::fmt;
use std::iter::FusedIterator;

use crate::level::Geometric;
use crate::level::LevelGenerator;
use crate::node::Idx;
use crate::node::Level;
use crate::node::NULL;
use crate::node::Node;

/// Max level used when the caller doesn't pick one.
pub const DEFAULT_MAX_LEVEL: usize = 10;

/// Hard cap on `max_level`. 32 levels at p = 1/4 covers 2^64 elements.
pub const MAX_LEVEL: usize = 32;

/// The head always occupies the first arena slot.
const HEAD: Idx = 0;

/// Per-level predecessors of a search position.
type Update = [Idx; MAX_LEVEL];

/// An ordered multiset of `(score, value)` pairs with rank queries.
///
/// Nodes live in an arena that never shrinks: removed slots go on a free
/// list and are reused by later inserts, so memory stays at the peak node
/// count reached so far.
pub struct SkipList<G = Geometric> {
    /// Arena of nodes. Slot 0 is the head.
    nodes: Vec<Node>,
    /// Free arena slots to reuse.
    free_list: Vec<Idx>,
    /// Last node, or `NULL` when empty.
    tail: Idx,
    /// Number of levels in use, `1..=max_level`.
    level: usize,
    /// Height of the head, fixed at construction.
    max_level: usize,
    /// Number of nodes (not counting head).
    len: usize,
    /// Source of node heights.
    generator: G,
}

impl SkipList<Geometric> {
    /// Create an empty list whose nodes reach at most `max_level` levels.
    ///
    /// `max_level` is clamped to `1..=MAX_LEVEL`.
    pub fn new(max_level: usize) -> Self {
        Self::with_generator(max_level, Geometric::from_entropy())
    }
}

impl Default for SkipList<Geometric> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEVEL)
    }
}

impl<G: LevelGenerator> SkipList<G> {
    /// Create an empty list drawing node heights from `generator`.
    pub fn with_generator(max_level: usize, generator: G) -> Self {
        let max_level = max_level.clamp(1, MAX_LEVEL);
        let list = SkipList {
            nodes: vec![Node::new_head(max_level)],
            free_list: Vec::new(),
            tail: NULL,
            level: 1,
            max_level,
            len: 0,
            generator,
        };
        list.check_invariants();
        list
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels currently in use.
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }

    // --- Node access helpers ---

    fn node(&self, idx: Idx) -> &Node {
        &self.nodes[idx as usize]
    }

    fn node_mut(&mut self, idx: Idx) -> &mut Node {
        &mut self.nodes[idx as usize]
    }

    fn alloc_node(&mut self, height: usize, score: u64, value: String) -> Idx {
        let node = Node::new(height, score, value);
        if let Some(idx) = self.free_list.pop() {
            *self.node_mut(idx) = node;
            idx
        } else {
            let idx = self.nodes.len() as Idx;
            self.nodes.push(node);
            idx
        }
    }

    fn release_node(&mut self, idx: Idx) -> Node {
        self.free_list.push(idx);
        std::mem::replace(self.node_mut(idx), Node::vacant())
    }

    fn random_level(&mut self) -> usize {
        self.generator
            .random_level(self.max_level)
            .clamp(1, self.max_level)
    }

    // --- Invariant checking ---

    #[cfg(debug_assertions)]
    fn check_invariants(&self) {
        assert!(
            self.level >= 1 && self.level <= self.max_level,
            "INVARIANT VIOLATED: level={} outside 1..={}",
            self.level,
            self.max_level
        );
        if self.level > 1 {
            assert_ne!(
                self.node(HEAD).levels[self.level - 1].forward,
                NULL,
                "INVARIANT VIOLATED: top level {} is empty",
                self.level
            );
        }

        // Level 0: order, backward links, tail, length.
        let mut ranks = vec![0usize; self.nodes.len()];
        let mut prev = NULL;
        let mut idx = self.node(HEAD).levels[0].forward;
        let mut count = 0usize;
        while idx != NULL {
            let node = self.node(idx);
            count += 1;
            ranks[idx as usize] = count;
            assert_eq!(
                node.backward, prev,
                "INVARIANT VIOLATED: backward link of rank {} is wrong",
                count
            );
            assert!(
                node.height() >= 1 && node.height() <= self.max_level,
                "INVARIANT VIOLATED: node height {} outside 1..={}",
                node.height(),
                self.max_level
            );
            if prev != NULL {
                let before = self.node(prev);
                assert!(
                    !node.precedes(before.score(), before.value()),
                    "INVARIANT VIOLATED: rank {} sorts before rank {}",
                    count,
                    count - 1
                );
            }
            prev = idx;
            idx = node.levels[0].forward;
        }
        assert_eq!(count, self.len, "INVARIANT VIOLATED: walked {} != len()={}", count, self.len);
        assert_eq!(prev, self.tail, "INVARIANT VIOLATED: tail is not the last node");

        // Every active level: spans add up to ranks.
        for level in 0..self.level {
            let mut idx = HEAD;
            let mut rank = 0usize;
            loop {
                let edge = self.node(idx).levels[level];
                if edge.forward == NULL {
                    break;
                }
                rank += edge.span;
                assert_eq!(
                    rank,
                    ranks[edge.forward as usize],
                    "INVARIANT VIOLATED: span sum at level {} disagrees with rank",
                    level
                );
                idx = edge.forward;
            }
        }
    }

    #[cfg(not(debug_assertions))]
    #[inline(always)]
    fn check_invariants(&self) {}

    // --- Search paths ---

    /// Last node before `(score, value)` at every active level, and the rank
    /// of each of those nodes.
    fn find_update(&self, score: u64, value: &str) -> (Update, [usize; MAX_LEVEL]) {
        let mut update = [HEAD; MAX_LEVEL];
        let mut rank = [0usize; MAX_LEVEL];
        let mut idx = HEAD;

        for level in (0..self.level).rev() {
            if level + 1 < self.level {
                rank[level] = rank[level + 1];
            }
            loop {
                let edge = self.node(idx).levels[level];
                if edge.forward == NULL || !self.node(edge.forward).precedes(score, value) {
                    break;
                }
                rank[level] += edge.span;
                idx = edge.forward;
            }
            update[level] = idx;
        }

        (update, rank)
    }

    /// Last node before the node at `rank` at every active level.
    fn find_update_by_rank(&self, rank: usize) -> Update {
        let mut update = [HEAD; MAX_LEVEL];
        let mut idx = HEAD;
        let mut traversed = 0usize;

        for level in (0..self.level).rev() {
            loop {
                let edge = self.node(idx).levels[level];
                if edge.forward == NULL || traversed + edge.span >= rank {
                    break;
                }
                traversed += edge.span;
                idx = edge.forward;
            }
            update[level] = idx;
        }

        update
    }

    fn index_of_rank(&self, rank: usize) -> Option<Idx> {
        if rank < 1 || rank > self.len {
            return None;
        }

        let mut idx = HEAD;
        let mut traversed = 0usize;
        for level in (0..self.level).rev() {
            loop {
                let edge = self.node(idx).levels[level];
                if edge.forward == NULL || traversed + edge.span > rank {
                    break;
                }
                traversed += edge.span;
                idx = edge.forward;
            }
            if traversed == rank {
                return Some(idx);
            }
        }

        None
    }

    // --- Core operations ---

    /// Insert `(score, value)` and return the new node.
    ///
    /// No duplicate check is made: inserting a pair that is already present
    /// adds a second node with the same key.
    pub fn insert(&mut self, score: u64, value: impl Into<String>) -> &Node {
        let value = value.into();
        let (mut update, mut rank) = self.find_update(score, &value);

        let height = self.random_level();
        if height > self.level {
            for level in self.level..height {
                rank[level] = 0;
                update[level] = HEAD;
                let len = self.len;
                self.node_mut(HEAD).levels[level].span = len;
            }
            self.level = height;
        }

        let new_idx = self.alloc_node(height, score, value);

        for level in 0..height {
            let pred_idx = update[level];
            let old = self.node(pred_idx).levels[level];
            // Nodes between pred and the insertion point at this level.
            let skipped = rank[0] - rank[level];

            self.node_mut(new_idx).levels[level] = Level {
                forward: old.forward,
                span: old.span - skipped,
            };
            self.node_mut(pred_idx).levels[level] = Level {
                forward: new_idx,
                span: skipped + 1,
            };
        }

        // Edges passing over the new node get one step longer.
        for level in height..self.level {
            self.node_mut(update[level]).levels[level].span += 1;
        }

        let backward = if update[0] == HEAD { NULL } else { update[0] };
        self.node_mut(new_idx).backward = backward;

        let next = self.node(new_idx).levels[0].forward;
        if next != NULL {
            self.node_mut(next).backward = new_idx;
        } else {
            self.tail = new_idx;
        }

        self.len += 1;
        self.check_invariants();

        self.node(new_idx)
    }

    /// Remove one node matching `(score, value)` exactly.
    /// Returns false, leaving the list untouched, when there is none.
    pub fn delete(&mut self, score: u64, value: &str) -> bool {
        let (update, _) = self.find_update(score, value);

        let target = self.node(update[0]).levels[0].forward;
        if target == NULL || !self.node(target).matches(score, value) {
            return false;
        }

        self.delete_node(target, &update);
        true
    }

    /// Remove and return the lowest ranked node.
    pub fn delete_first(&mut self) -> Option<Node> {
        self.delete_rank(1)
    }

    /// Remove and return the highest ranked node.
    pub fn delete_last(&mut self) -> Option<Node> {
        self.delete_rank(self.len)
    }

    /// Remove and return the node at 1-based `rank`.
    pub fn delete_rank(&mut self, rank: usize) -> Option<Node> {
        if rank < 1 || rank > self.len {
            return None;
        }

        let update = self.find_update_by_rank(rank);
        let target = self.node(update[0]).levels[0].forward;
        if target == NULL {
            return None;
        }

        Some(self.delete_node(target, &update))
    }

    /// Unlink `target` given its predecessor at every active level.
    fn delete_node(&mut self, target: Idx, update: &Update) -> Node {
        for level in 0..self.level {
            let pred_idx = update[level];
            if self.node(pred_idx).levels[level].forward == target {
                let removed = self.node(target).levels[level];
                let pred = &mut self.node_mut(pred_idx).levels[level];
                pred.span = pred.span + removed.span - 1;
                pred.forward = removed.forward;
            } else {
                self.node_mut(pred_idx).levels[level].span -= 1;
            }
        }

        let next = self.node(target).levels[0].forward;
        let backward = self.node(target).backward;
        if next != NULL {
            self.node_mut(next).backward = backward;
        } else {
            self.tail = backward;
        }

        while self.level > 1 && self.node(HEAD).levels[self.level - 1].forward == NULL {
            self.level -= 1;
        }
        self.len -= 1;

        let node = self.release_node(target);
        self.check_invariants();
        node
    }

    // --- Queries ---

    /// Node at 1-based `rank`, or `None` outside `1..=len()`.
    pub fn get_node_by_rank(&self, rank: usize) -> Option<&Node> {
        self.index_of_rank(rank).map(|idx| self.node(idx))
    }

    /// 1-based rank of the node matching `(score, value)` exactly.
    ///
    /// With duplicate keys, the rank of the last duplicate is returned.
    pub fn rank(&self, score: u64, value: &str) -> Option<usize> {
        let mut idx = HEAD;
        let mut rank = 0usize;

        for level in (0..self.level).rev() {
            loop {
                let edge = self.node(idx).levels[level];
                if edge.forward == NULL || self.node(edge.forward).cmp_key(score, value).is_gt() {
                    break;
                }
                rank += edge.span;
                idx = edge.forward;
            }
        }

        (idx != HEAD && self.node(idx).matches(score, value)).then_some(rank)
    }

    pub fn first(&self) -> Option<&Node> {
        let idx = self.node(HEAD).levels[0].forward;
        (idx != NULL).then(|| self.node(idx))
    }

    pub fn last(&self) -> Option<&Node> {
        (self.tail != NULL).then(|| self.node(self.tail))
    }

    /// Nodes at 0-based ranks `start..=end`, lowest first, or highest first
    /// when `reverse` is set (rank 0 then meaning the last node).
    ///
    /// Negative `start` is clamped to 0 and `end` past the last rank is
    /// clamped to it. An empty window yields an empty `Vec`.
    pub fn range(&self, start: isize, end: isize, reverse: bool) -> Vec<&Node> {
        if self.len == 0 || start > end {
            return Vec::new();
        }

        let last = self.len as isize - 1;
        let start = start.max(0);
        let end = end.min(last);
        if start > end {
            return Vec::new();
        }

        let size = (end - start + 1) as usize;
        let mut nodes = Vec::with_capacity(size);

        if !reverse {
            let mut idx = self.index_of_rank(start as usize + 1).unwrap_or(NULL);
            while nodes.len() < size && idx != NULL {
                let node = self.node(idx);
                nodes.push(node);
                idx = node.levels[0].forward;
            }
        } else {
            let mut idx = self.tail;
            for _ in 0..start {
                if idx == NULL {
                    break;
                }
                idx = self.node(idx).backward;
            }
            while nodes.len() < size && idx != NULL {
                let node = self.node(idx);
                nodes.push(node);
                idx = node.backward;
            }
        }

        nodes
    }

    /// Iterate over all nodes in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            nodes: &self.nodes,
            front: self.node(HEAD).levels[0].forward,
            back: self.tail,
            remaining: self.len,
        }
    }

    /// Every node present above level 0, one block per level, top first.
    pub fn dump_levels(&self) -> String {
        let mut out = format!("length: {}\n", self.len);
        for level in (1..self.level).rev() {
            let mut idx = self.node(HEAD).levels[level].forward;
            while idx != NULL {
                let node = self.node(idx);
                out.push_str(&format!(
                    "value: {}\tscore: {}\tlevel: {}\n",
                    node.value(),
                    node.score(),
                    level
                ));
                idx = node.levels[level].forward;
            }
            out.push('\n');
        }
        out
    }
}

impl<G> fmt::Display for SkipList<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "length: {}", self.len)?;
        let mut idx = self.nodes[HEAD as usize].levels[0].forward;
        while idx != NULL {
            let node = &self.nodes[idx as usize];
            writeln!(f, "{}", node)?;
            idx = node.levels[0].forward;
        }
        Ok(())
    }
}

impl<G> fmt::Debug for SkipList<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let iter = Iter {
            nodes: &self.nodes,
            front: self.nodes[HEAD as usize].levels[0].forward,
            back: self.tail,
            remaining: self.len,
        };
        f.debug_list()
            .entries(iter.map(|node| (node.score(), node.value())))
            .finish()
    }
}

impl<'a, G: LevelGenerator> IntoIterator for &'a SkipList<G> {
    type Item = &'a Node;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Ascending iterator over the nodes of a [`SkipList`].
pub struct Iter<'a> {
    nodes: &'a [Node],
    front: Idx,
    back: Idx,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let node = &self.nodes[self.front as usize];
        self.front = node.levels[0].forward;
        self.remaining -= 1;
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a> DoubleEndedIterator for Iter<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let node = &self.nodes[self.back as usize];
        self.back = node.backward;
        self.remaining -= 1;
        Some(node)
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
