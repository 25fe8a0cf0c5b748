//! Skip list nodes.
//!
//! Nodes live in an arena owned by the list and refer to each other by
//! index, so the forward and backward links never form ownership cycles.

use std::cmp::Ordering;
use std::fmt;

use smallvec::SmallVec;

/// Arena index. u32 saves space vs usize on 64-bit.
pub(crate) type Idx = u32;

/// Null index marker: "no node".
pub(crate) const NULL: Idx = Idx::MAX;

/// One forward edge of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Level {
    /// Next node at this level, or `NULL`.
    pub(crate) forward: Idx,
    /// Number of level 0 steps covered by taking `forward`.
    pub(crate) span: usize,
}

impl Level {
    pub(crate) const EMPTY: Level = Level {
        forward: NULL,
        span: 0,
    };
}

/// A scored entry in a [`SkipList`](crate::SkipList).
///
/// Nodes order by `score` first and `value` second.
pub struct Node {
    score: u64,
    value: String,
    /// Previous node at level 0, `NULL` when the predecessor is the head.
    pub(crate) backward: Idx,
    /// Forward edges, one per level this node reaches.
    pub(crate) levels: SmallVec<[Level; 4]>,
}

impl Node {
    pub(crate) fn new(height: usize, score: u64, value: String) -> Node {
        Node {
            score,
            value,
            backward: NULL,
            levels: SmallVec::from_elem(Level::EMPTY, height),
        }
    }

    /// The sentinel head carries no data and an edge for every level.
    pub(crate) fn new_head(max_level: usize) -> Node {
        Node::new(max_level, 0, String::new())
    }

    /// Placeholder left in a freed arena slot.
    pub(crate) fn vacant() -> Node {
        Node::new(0, 0, String::new())
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn into_value(self) -> String {
        self.value
    }

    pub fn into_parts(self) -> (u64, String) {
        (self.score, self.value)
    }

    /// Number of levels this node participates in.
    pub fn height(&self) -> usize {
        self.levels.len()
    }

    /// Compare this node's key against `(score, value)`.
    pub(crate) fn cmp_key(&self, score: u64, value: &str) -> Ordering {
        self.score
            .cmp(&score)
            .then_with(|| self.value.as_str().cmp(value))
    }

    pub(crate) fn precedes(&self, score: u64, value: &str) -> bool {
        self.cmp_key(score, value) == Ordering::Less
    }

    pub(crate) fn matches(&self, score: u64, value: &str) -> bool {
        self.score == score && self.value == value
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("score", &self.score)
            .field("value", &self.value)
            .finish()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "score={} value={}", self.score, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_score_then_value() {
        let node = Node::new(1, 5, "m".to_string());
        assert!(node.precedes(6, "a"));
        assert!(node.precedes(5, "n"));
        assert!(!node.precedes(5, "m"));
        assert!(!node.precedes(5, "a"));
        assert!(!node.precedes(4, "z"));
    }

    #[test]
    fn matches_needs_both_fields() {
        let node = Node::new(2, 7, "seven".to_string());
        assert!(node.matches(7, "seven"));
        assert!(!node.matches(7, "eight"));
        assert!(!node.matches(8, "seven"));
    }

    #[test]
    fn fresh_node_is_unlinked() {
        let node = Node::new(3, 1, "x".to_string());
        assert_eq!(node.height(), 3);
        assert_eq!(node.backward, NULL);
        assert!(node.levels.iter().all(|level| *level == Level::EMPTY));
    }

    #[test]
    fn display_shows_score_and_value() {
        let node = Node::new(1, 42, "answer".to_string());
        assert_eq!(node.to_string(), "score=42 value=answer");
        assert_eq!(node.into_parts(), (42, "answer".to_string()));
    }
}
