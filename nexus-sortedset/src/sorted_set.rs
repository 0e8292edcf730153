//! Sorted set - hash index over a ranked skip list.
//!
//! The skip list orders members by `(score, value)` and answers rank and
//! range queries. The hash index maps each external key to its node handle,
//! giving O(1) membership and score lookup and letting key-addressed
//! operations reach a node without searching.
//!
//! ```text
//! index: HashMap<K, u32>       list: SkipList<K, V, u32>
//!   "carol" -> 2                 #0 alice 10.0
//!   "alice" -> 0                 #1 bob   20.0
//!   "bob"   -> 1                 #2 carol 30.0
//! ```
//!
//! Both structures are updated in the same call. After every mutation the
//! index and the list hold the same number of entries; a mismatch is a bug
//! and panics.
//!
//! # Example
//!
//! ```rust
//! use nexus_sortedset::{ScoreRange, SortedSet};
//!
//! let mut board: SortedSet<&str, u64> = SortedSet::new();
//! board.insert("alice", 30.0, 1);
//! board.insert("bob", 10.0, 2);
//! board.insert("carol", 20.0, 3);
//!
//! assert_eq!(board.rank("carol"), Some(2));
//! assert_eq!(board.score("alice"), Some(30.0));
//!
//! let top: Vec<&str> = board.range_by_score(&ScoreRange::inclusive(15.0, 40.0))
//!     .map(|m| *m.key())
//!     .collect();
//! assert_eq!(top, ["carol", "alice"]);
//!
//! board.update_score("bob", 50.0);
//! assert_eq!(board.last().map(|m| *m.key()), Some("bob"));
//! ```

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use log::debug;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand_core::RngCore;

use crate::config::{Config, DEFAULT_MAX_LEVEL};
use crate::error::ConfigError;
use crate::member::Member;
use crate::range::{ScoreRange, ValueRange};
use crate::skiplist::{Iter, SkipList};

/// A set of keyed members ordered by score, with O(1) key lookup and
/// O(log n) rank queries.
///
/// Keys are unique. Positions `(score, value)` are unique too: inserting a
/// new key at a position another key already holds is rejected.
///
/// # Panics
///
/// Caller bugs panic: NaN scores, rank `0` and inverted score or value
/// ranges.
#[derive(Debug)]
pub struct SortedSet<K, V, R = SmallRng> {
    list: SkipList<K, V, u32, R, DEFAULT_MAX_LEVEL>,
    index: HashMap<K, u32>,
}

impl<K, V> SortedSet<K, V, SmallRng>
where
    K: Hash + Eq + Clone,
    V: Ord,
{
    /// Creates an empty set with default parameters and an OS-seeded RNG.
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_os_rng())
    }

    /// Creates an empty set from validated parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter is out of range.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let mut list = SkipList::with_level_probability(rng, config.level_probability);
        list.reserve(config.capacity);
        debug!(
            "sorted set built: p={} capacity={} seeded={}",
            config.level_probability,
            config.capacity,
            config.seed.is_some()
        );
        Ok(Self {
            list,
            index: HashMap::with_capacity(config.capacity),
        })
    }
}

impl<K, V> Default for SortedSet<K, V, SmallRng>
where
    K: Hash + Eq + Clone,
    V: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, R> SortedSet<K, V, R>
where
    K: Hash + Eq + Clone,
    V: Ord,
    R: RngCore,
{
    /// Creates an empty set drawing tower heights from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self {
            list: SkipList::new(rng),
            index: HashMap::new(),
        }
    }

    /// Returns the number of members.
    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns `true` if `key` is a member.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Returns the member stored under `key`. O(1).
    pub fn get<Q>(&self, key: &Q) -> Option<&Member<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.index.get(key)?;
        self.list.member(idx)
    }

    /// Returns the score of `key`. O(1).
    #[inline]
    pub fn score<Q>(&self, key: &Q) -> Option<f64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).map(Member::score)
    }

    /// Inserts a new member.
    ///
    /// Returns `false` and leaves the set unchanged if `key` is already
    /// present or another member already sits at `(score, value)`. Use
    /// [`update_score`](Self::update_score) to move an existing key.
    ///
    /// # Panics
    ///
    /// Panics if `score` is NaN.
    pub fn insert(&mut self, key: K, score: f64, value: V) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        let inserted = match self.list.insert(key.clone(), score, value) {
            Ok(idx) => {
                self.index.insert(key, idx);
                true
            }
            Err(_) => false,
        };
        self.assert_synced();
        inserted
    }

    /// Removes `key`, returning its member.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<Member<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index.remove(key)?;
        let member = self.list.remove_at(idx);
        self.assert_synced();
        Some(member)
    }

    /// Moves `key` to `new_score`, returning the updated member.
    ///
    /// The node is rewritten in place when its position does not change,
    /// otherwise re-inserted; the index follows the node either way.
    ///
    /// Returns `None` and leaves the set unchanged if `key` is absent or
    /// another member already sits at `(new_score, value)`.
    ///
    /// # Panics
    ///
    /// Panics if `new_score` is NaN.
    pub fn update_score<Q>(&mut self, key: &Q, new_score: f64) -> Option<&Member<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.index.get_mut(key)?;
        let idx = self.list.update_score_at(*slot, new_score)?;
        *slot = idx;
        self.assert_synced();
        self.list.member(idx)
    }

    // ========================================================================
    // Rank queries
    // ========================================================================

    /// Returns the 1-based ascending rank of `key`.
    pub fn rank<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.index.get(key)?;
        Some(self.list.rank_at(idx))
    }

    /// Returns the 1-based descending rank of `key` (highest score is 1).
    pub fn rev_rank<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.rank(key).map(|rank| self.len() - rank + 1)
    }

    /// Returns the member at 1-based `rank`.
    ///
    /// # Panics
    ///
    /// Panics if `rank` is 0.
    #[inline]
    pub fn get_by_rank(&self, rank: usize) -> Option<&Member<K, V>> {
        self.list.get_by_rank(rank)
    }

    /// Iterates members with ranks between `start` and `end` inclusive.
    ///
    /// Bounds may be given in either order and are clipped to the length.
    ///
    /// # Panics
    ///
    /// Panics if either bound is 0.
    pub fn range_by_rank(&self, start: usize, end: usize) -> Iter<'_, K, V, u32> {
        let (start, end) = ordered(start, end);
        self.list.range_by_rank(start, end)
    }

    /// Removes members with ranks between `start` and `end` inclusive,
    /// returned in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if either bound is 0.
    pub fn delete_range_by_rank(&mut self, start: usize, end: usize) -> Vec<Member<K, V>> {
        let (start, end) = ordered(start, end);
        let removed = self.list.delete_range_by_rank(start, end);
        self.forget(removed)
    }

    // ========================================================================
    // Score and value queries
    // ========================================================================

    /// Iterates members whose score lies in `range`, ascending.
    ///
    /// # Panics
    ///
    /// Panics if `range` is inverted or has a NaN bound.
    #[inline]
    pub fn range_by_score(&self, range: &ScoreRange) -> Iter<'_, K, V, u32> {
        self.list.range_by_score(range)
    }

    /// Counts members whose score lies in `range`. O(log n).
    ///
    /// # Panics
    ///
    /// Panics if `range` is inverted or has a NaN bound.
    #[inline]
    pub fn count_by_score(&self, range: &ScoreRange) -> usize {
        self.list.count_in_score_range(range)
    }

    /// Removes members whose score lies in `range`, returned ascending.
    ///
    /// # Panics
    ///
    /// Panics if `range` is inverted or has a NaN bound.
    pub fn delete_range_by_score(&mut self, range: &ScoreRange) -> Vec<Member<K, V>> {
        let removed = self.list.delete_range_by_score(range);
        self.forget(removed)
    }

    /// Iterates members whose value lies in `range`.
    ///
    /// Meaningful when every member in the stretch shares one score, which
    /// makes list order agree with value order.
    ///
    /// # Panics
    ///
    /// Panics if `range` is inverted.
    #[inline]
    pub fn range_by_value(&self, range: &ValueRange<V>) -> Iter<'_, K, V, u32> {
        self.list.range_by_value(range)
    }

    /// Removes members whose value lies in `range`, returned in order.
    ///
    /// # Panics
    ///
    /// Panics if `range` is inverted.
    pub fn delete_range_by_value(&mut self, range: &ValueRange<V>) -> Vec<Member<K, V>> {
        let removed = self.list.delete_range_by_value(range);
        self.forget(removed)
    }

    // ========================================================================
    // Ends and iteration
    // ========================================================================

    /// Returns the member with the lowest position.
    #[inline]
    pub fn first(&self) -> Option<&Member<K, V>> {
        self.list.first()
    }

    /// Returns the member with the highest position.
    #[inline]
    pub fn last(&self) -> Option<&Member<K, V>> {
        self.list.last()
    }

    /// Removes and returns the member with the lowest position.
    pub fn pop_first(&mut self) -> Option<Member<K, V>> {
        let member = self.list.pop_first()?;
        self.index.remove(member.key());
        self.assert_synced();
        Some(member)
    }

    /// Removes and returns the member with the highest position.
    pub fn pop_last(&mut self) -> Option<Member<K, V>> {
        let member = self.list.pop_last()?;
        self.index.remove(member.key());
        self.assert_synced();
        Some(member)
    }

    /// Iterates every member in ascending order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, K, V, u32> {
        self.list.iter()
    }

    /// Removes every member.
    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    /// Verifies the skip list and that every key maps to its own live node.
    ///
    /// O(n · level). Meant for tests and debugging.
    pub fn check_invariants(&self) {
        self.list.check_invariants();
        self.assert_synced();
        for (key, &idx) in &self.index {
            let member = self.list.member(idx).expect("index points at a dead node");
            assert!(member.key() == key, "index entry points at another key");
        }
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Drops the index entries of members already unlinked from the list.
    fn forget(&mut self, removed: Vec<Member<K, V>>) -> Vec<Member<K, V>> {
        for member in &removed {
            self.index.remove(member.key());
        }
        self.assert_synced();
        removed
    }

    #[inline]
    #[track_caller]
    fn assert_synced(&self) {
        assert_eq!(
            self.index.len(),
            self.list.len(),
            "hash index and skip list out of sync"
        );
    }
}

impl<'a, K, V, R> IntoIterator for &'a SortedSet<K, V, R>
where
    K: Hash + Eq + Clone,
    V: Ord,
    R: RngCore,
{
    type Item = &'a Member<K, V>;
    type IntoIter = Iter<'a, K, V, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[inline]
fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}
