//! Ranked sorted sets: a span-counting skip list plus a hash index.
//!
//! A sorted set keeps keyed members ordered by a floating-point score and
//! answers, in O(log n), "what is this key's rank", "who is at rank 17" and
//! "who scores between 10 and 20". Lookups by key are O(1).
//!
//! # Design
//!
//! ```text
//! SortedSet<K, V>
//!     ├── HashMap<K, u32>        key -> node handle, O(1) membership
//!     └── SkipList<K, V>         (score, value) order, rank via spans
//!             └── Arena<Node>    nodes addressed by u32 handles
//! ```
//!
//! - **Spans, not stored ranks**: every forward link records how many
//!   base-level nodes it skips. Ranks are summed on the way down, so inserts
//!   and deletes never renumber anything.
//! - **Handles, not pointers**: nodes live in an [`Arena`] and link by
//!   [`Index`] handle with a `NONE` sentinel. No `unsafe`, no `Rc`.
//! - **Stack scratch**: per-level predecessor and rank arrays are
//!   `[_; MAX_LEVEL]` on the stack; searches do not allocate.
//! - **Misses vs bugs**: absent keys and out-of-range ranks come back as
//!   `None`/`false`. NaN scores, rank 0 and inverted ranges panic.
//!
//! # Quick Start
//!
//! ```
//! use nexus_sortedset::{ScoreRange, SortedSet};
//!
//! let mut set: SortedSet<String, u64> = SortedSet::new();
//!
//! set.insert("alice".to_string(), 92.5, 1);
//! set.insert("bob".to_string(), 71.0, 2);
//! set.insert("carol".to_string(), 88.0, 3);
//!
//! // 1-based rank, lowest score first
//! assert_eq!(set.rank("bob"), Some(1));
//! assert_eq!(set.rev_rank("alice"), Some(1));
//!
//! // Range queries walk the base level from the first match
//! let passing: Vec<&str> = set
//!     .range_by_score(&ScoreRange::inclusive(80.0, 100.0))
//!     .map(|m| m.key().as_str())
//!     .collect();
//! assert_eq!(passing, ["carol", "alice"]);
//!
//! // Score updates reposition only when order changes
//! set.update_score("bob", 95.0);
//! assert_eq!(set.get_by_rank(3).map(|m| m.key().as_str()), Some("bob"));
//! ```
//!
//! # Using the Skip List Directly
//!
//! [`SkipList`] works on its own when no key index is needed. It hands out
//! node handles and rejects duplicate positions instead of overwriting:
//!
//! ```
//! use nexus_sortedset::SkipList;
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//!
//! let mut list: SkipList<(), u32> = SkipList::new(SmallRng::seed_from_u64(1));
//!
//! let idx = list.insert((), 1.0, 7).unwrap();
//! let dup = list.insert((), 1.0, 7).unwrap_err();
//! assert_eq!(dup.existing, idx);
//! assert_eq!(list.rank_at(idx), 1);
//! ```
//!
//! # Operations
//!
//! | Operation | Cost | Notes |
//! |-----------|------|-------|
//! | `get` / `contains_key` / `score` | O(1) | hash index |
//! | `insert` / `remove` | O(log n) | |
//! | `rank` / `get_by_rank` | O(log n) | span sums |
//! | `count_by_score` | O(log n) | two rank lookups |
//! | `range_by_*` | O(log n + m) | m = members returned |
//! | `delete_range_by_*` | O(log n + m) | predecessors located once |
//! | `update_score` | O(1) or O(log n) | in place when order holds |
//! | `first` / `last` | O(1) | head and tail links |
//!
//! # Tuning
//!
//! [`Config`] sets the level-up probability `p`, the initial capacity and an
//! optional RNG seed. The defaults (`p = 0.25`, 32 levels) match common
//! production sorted sets.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod index;
pub mod member;
pub mod range;
pub mod skiplist;
pub mod sorted_set;
pub mod storage;

pub use config::{Config, DEFAULT_LEVEL_PROBABILITY, DEFAULT_MAX_LEVEL};
pub use error::{ConfigError, Duplicate};
pub use index::Index;
pub use member::Member;
pub use range::{ScoreRange, ValueRange};
pub use skiplist::{Iter, SkipList};
pub use sorted_set::SortedSet;
pub use storage::Arena;
