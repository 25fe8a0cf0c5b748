//! zskip - a sorted set with rank queries and bounded eviction.
//!
//! # Quick Start
//!
//! ```
//! use zskip::BoundedDict;
//!
//! let mut dict = BoundedDict::new();
//!
//! // Keep the three highest scores.
//! for (key, score) in [("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5)] {
//!     dict.set_with_evict_front(key, score, 3);
//! }
//!
//! assert_eq!(dict.range(0, dict.len() as isize - 1, false), vec!["c", "d", "e"]);
//! assert_eq!(dict.score("d"), Some(4));
//! assert_eq!(dict.rank("e"), Some(3));
//! ```
//!
//! # Modules
//!
//! - [`skiplist`]: the `(score, value)` ordered skip list with per-edge spans
//! - [`dict`]: key to score map plus a skip list, with front/back eviction
//! - [`level`]: pluggable node height generator (geometric, p = 1/4)

pub mod dict;
pub mod level;
mod node;
pub mod skiplist;

pub use dict::BoundedDict;
pub use dict::Evict;
pub use level::Geometric;
pub use level::LevelGenerator;
pub use node::Node;
pub use skiplist::SkipList;
