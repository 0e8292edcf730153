//! Ranked skip list - members ordered by `(score, value)` with O(log n) rank.
//!
//! Every forward link records a *span*: how many base-level steps it jumps.
//! Summing spans along a search path yields a node's 1-based rank, so rank
//! lookups and rank-addressed access cost the same O(log n) as a plain
//! search. Ranks are never stored; spans are the single source of truth.
//!
//! ```text
//! Level 2:  HEAD ─────────(3)─────────────► 30 ──► NIL
//! Level 1:  HEAD ─(1)─► 10 ──────(2)──────► 30 ─(1)─► 40 ──► NIL
//! Level 0:  HEAD ─(1)─► 10 ─(1)─► 20 ─(1)─► 30 ─(1)─► 40 ──► NIL
//!                           ◄──        ◄──        ◄──        (backward)
//!
//! rank(40) = 3 + 1 = 4, summed along level 2 then level 1
//! ```
//!
//! Nodes live in an [`Arena`] and link to each other by [`Index`] handle.
//! The base level is doubly linked for reverse walks; `tail` gives O(1)
//! access to the largest member.
//!
//! # Example
//!
//! ```rust
//! use nexus_sortedset::SkipList;
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//!
//! let mut list: SkipList<&str, u64> = SkipList::new(SmallRng::seed_from_u64(12345));
//!
//! list.insert("b", 20.0, 2).unwrap();
//! list.insert("a", 10.0, 1).unwrap();
//! list.insert("c", 20.0, 3).unwrap();
//!
//! assert_eq!(list.rank(20.0, &3), Some(3));
//! assert_eq!(list.get_by_rank(1).map(|m| *m.key()), Some("a"));
//! assert_eq!(list.last().map(|m| *m.key()), Some("c"));
//! ```

use core::iter::FusedIterator;

use log::trace;
use rand::Rng;
use rand::rngs::SmallRng;
use rand_core::RngCore;

use crate::Index;
use crate::config::{DEFAULT_LEVEL_PROBABILITY, DEFAULT_MAX_LEVEL};
use crate::error::Duplicate;
use crate::member::{Member, assert_score};
use crate::range::{ScoreRange, ValueRange};
use crate::storage::Arena;

// ============================================================================
// Node
// ============================================================================

/// One forward link and the number of base-level steps it covers.
#[derive(Debug, Clone, Copy)]
struct Link<Idx> {
    forward: Idx,
    span: usize,
}

impl<Idx: Index> Link<Idx> {
    const EMPTY: Self = Self {
        forward: Idx::NONE,
        span: 0,
    };
}

/// A skip-list node: payload, one link per level, base-level back link.
#[derive(Debug)]
pub(crate) struct Node<K, V, Idx> {
    member: Member<K, V>,
    /// `links.len()` is the node's height.
    links: Box<[Link<Idx>]>,
    /// Previous node at level 0, `NONE` for the first node.
    backward: Idx,
}

// ============================================================================
// SkipList
// ============================================================================

/// A probabilistic ordered list of [`Member`]s with span-counted links.
///
/// Members are ordered by score, then value. No two members may share both.
///
/// # Type Parameters
///
/// - `K`: External key carried with each member (not used for ordering)
/// - `V`: Satellite value, breaks score ties; must implement `Ord`
/// - `Idx`: Node handle type, defaults to `u32`
/// - `R`: Random number generator for tower heights
/// - `MAX_LEVEL`: Height cap, defaults to 32
///
/// # Panics
///
/// Caller bugs panic rather than returning a miss: NaN scores, rank `0`,
/// `start > end` rank ranges and inverted score/value ranges.
#[derive(Debug)]
pub struct SkipList<K, V, Idx = u32, R = SmallRng, const MAX_LEVEL: usize = DEFAULT_MAX_LEVEL>
where
    Idx: Index,
{
    /// Node storage.
    nodes: Arena<Node<K, V, Idx>, Idx>,
    /// Head sentinel links. `head[i]` is the first node at level i.
    head: [Link<Idx>; MAX_LEVEL],
    /// Last node at level 0 for O(1) `last()`.
    tail: Idx,
    /// Number of levels in use; 0 when empty.
    level: usize,
    /// Number of members.
    len: usize,
    /// Level-up probability in `[0, 1)`.
    probability: f64,
    /// Source of tower heights.
    rng: R,
}

impl<K, V, Idx, R, const MAX_LEVEL: usize> SkipList<K, V, Idx, R, MAX_LEVEL>
where
    V: Ord,
    Idx: Index,
    R: RngCore,
{
    /// Creates an empty skip list with the default level-up probability (0.25).
    pub fn new(rng: R) -> Self {
        Self::with_level_probability(rng, DEFAULT_LEVEL_PROBABILITY)
    }

    /// Creates an empty skip list with a custom level-up probability.
    ///
    /// `probability` controls memory vs search speed:
    /// - 0.5: ~2 links per node, shallower searches
    /// - 0.25: ~1.33 links per node (Redis default)
    /// - 0.0: every node has height 1, the list degrades to a linked list
    ///
    /// # Panics
    ///
    /// Panics if `probability` is outside `[0, 1)` or `MAX_LEVEL` is 0.
    pub fn with_level_probability(rng: R, probability: f64) -> Self {
        assert!(
            (0.0..1.0).contains(&probability),
            "level-up probability {probability} outside [0, 1)"
        );
        assert!(MAX_LEVEL > 0, "MAX_LEVEL must be > 0");
        Self {
            nodes: Arena::new(),
            head: [Link::EMPTY; MAX_LEVEL],
            tail: Idx::NONE,
            level: 0,
            len: 0,
            probability,
            rng,
        }
    }

    /// Reserves room for at least `additional` more members.
    pub fn reserve(&mut self, additional: usize) {
        self.nodes.reserve(additional);
    }

    /// Returns the number of members.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no members.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of levels currently in use (0 when empty).
    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Returns the level-up probability.
    #[inline]
    pub fn level_probability(&self) -> f64 {
        self.probability
    }

    /// Returns the member behind a handle, or `None` if the handle is stale.
    #[inline]
    pub fn member(&self, idx: Idx) -> Option<&Member<K, V>> {
        self.nodes.get(idx).map(|node| &node.member)
    }

    /// Returns the smallest member. O(1).
    #[inline]
    pub fn first(&self) -> Option<&Member<K, V>> {
        self.member(self.head[0].forward)
    }

    /// Returns the largest member. O(1) through the tail link.
    #[inline]
    pub fn last(&self) -> Option<&Member<K, V>> {
        self.member(self.tail)
    }

    // ========================================================================
    // Point operations
    // ========================================================================

    /// Returns the handle of the node at `(score, value)`.
    pub fn find(&self, score: f64, value: &V) -> Option<Idx> {
        assert_score(score);
        let mut update = [Idx::NONE; MAX_LEVEL];
        let mut rank = [0; MAX_LEVEL];
        let (next, _) = self.seek(|m| m.precedes(score, value), &mut update, &mut rank);
        self.is_at(next, score, value).then_some(next)
    }

    /// Returns the member at `(score, value)`.
    #[inline]
    pub fn get(&self, score: f64, value: &V) -> Option<&Member<K, V>> {
        self.find(score, value).and_then(|idx| self.member(idx))
    }

    /// Returns `true` if a member sits at `(score, value)`.
    #[inline]
    pub fn contains(&self, score: f64, value: &V) -> bool {
        self.find(score, value).is_some()
    }

    /// Inserts a member, returning its handle.
    ///
    /// Duplicates are rejected, never overwritten: if a node already sits at
    /// `(score, value)` the new member is handed back together with the
    /// existing handle.
    ///
    /// # Panics
    ///
    /// Panics if `score` is NaN.
    pub fn insert(
        &mut self,
        key: K,
        score: f64,
        value: V,
    ) -> Result<Idx, Duplicate<Member<K, V>, Idx>> {
        assert_score(score);

        let mut update = [Idx::NONE; MAX_LEVEL];
        let mut rank = [0; MAX_LEVEL];
        let (next, _) = self.seek(|m| m.precedes(score, &value), &mut update, &mut rank);
        if self.is_at(next, score, &value) {
            return Err(Duplicate {
                existing: next,
                rejected: Member { key, score, value },
            });
        }

        let height = self.random_level();
        if height > self.level {
            // Fresh levels start at the head and span the whole list
            for i in self.level..height {
                update[i] = Idx::NONE;
                rank[i] = 0;
                self.head[i] = Link {
                    forward: Idx::NONE,
                    span: self.len,
                };
            }
            trace!("skip list level raised {} -> {}", self.level, height);
            self.level = height;
        }

        let idx = self.nodes.insert(Node {
            member: Member { key, score, value },
            links: vec![Link::EMPTY; height].into_boxed_slice(),
            backward: Idx::NONE,
        });

        for i in 0..height {
            let prev = *self.link(update[i], i);
            // Steps from this level's predecessor to the base-level predecessor
            let offset = rank[0] - rank[i];
            self.nodes[idx].links[i] = Link {
                forward: prev.forward,
                span: prev.span - offset,
            };
            *self.link_mut(update[i], i) = Link {
                forward: idx,
                span: offset + 1,
            };
        }

        // Taller predecessors now jump over one more node
        for i in height..self.level {
            self.link_mut(update[i], i).span += 1;
        }

        self.nodes[idx].backward = update[0];
        let next = self.nodes[idx].links[0].forward;
        if next.is_some() {
            self.nodes[next].backward = idx;
        } else {
            self.tail = idx;
        }

        self.len += 1;
        Ok(idx)
    }

    /// Removes the member at `(score, value)`.
    pub fn remove(&mut self, score: f64, value: &V) -> Option<Member<K, V>> {
        assert_score(score);
        let mut update = [Idx::NONE; MAX_LEVEL];
        let mut rank = [0; MAX_LEVEL];
        let (next, _) = self.seek(|m| m.precedes(score, value), &mut update, &mut rank);
        if !self.is_at(next, score, value) {
            return None;
        }
        Some(self.unlink(next, &update))
    }

    /// Removes the node behind a handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn remove_at(&mut self, idx: Idx) -> Member<K, V> {
        let update = self.predecessors(idx);
        self.unlink(idx, &update)
    }

    /// Changes the score of the member at `(score, value)`.
    ///
    /// Returns the member's handle afterwards, which differs from the old one
    /// when the node had to move. `None` if no member sits at `(score, value)`
    /// or the target position is taken. See
    /// [`update_score_at`](Self::update_score_at).
    pub fn update_score(&mut self, score: f64, value: &V, new_score: f64) -> Option<Idx> {
        let idx = self.find(score, value)?;
        self.update_score_at(idx, new_score)
    }

    /// Changes the score of the node behind a handle.
    ///
    /// If the node still sorts strictly between its base-level neighbours
    /// the score is overwritten in place, O(1). Otherwise the node is removed
    /// and re-inserted, O(log n), and the new handle is returned.
    ///
    /// Returns `None` and leaves the list untouched if another member
    /// already sits at `(new_score, value)`.
    ///
    /// # Panics
    ///
    /// Panics if `new_score` is NaN or the handle is stale.
    pub fn update_score_at(&mut self, idx: Idx, new_score: f64) -> Option<Idx> {
        assert_score(new_score);

        let node = &self.nodes[idx];
        let value = &node.member.value;
        let after_prev = node.backward.is_none()
            || self.nodes[node.backward].member.precedes(new_score, value);
        let next = node.links[0].forward;
        let before_next = next.is_none() || self.nodes[next].member.follows(new_score, value);

        if after_prev && before_next {
            self.nodes[idx].member.score = new_score;
            return Some(idx);
        }

        // Checked before unlinking so a clash leaves the list as it was
        if self.contains(new_score, value) {
            return None;
        }

        let (key, _, value) = self.remove_at(idx).into_parts();
        match self.insert(key, new_score, value) {
            Ok(idx) => Some(idx),
            Err(_) => unreachable!("target position verified vacant"),
        }
    }

    // ========================================================================
    // Rank operations
    // ========================================================================

    /// Returns the 1-based rank of the member at `(score, value)`.
    pub fn rank(&self, score: f64, value: &V) -> Option<usize> {
        assert_score(score);
        let mut update = [Idx::NONE; MAX_LEVEL];
        let mut rank = [0; MAX_LEVEL];
        let (next, next_rank) = self.seek(|m| m.precedes(score, value), &mut update, &mut rank);
        self.is_at(next, score, value).then_some(next_rank)
    }

    /// Returns the 1-based rank of the node behind a handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn rank_at(&self, idx: Idx) -> usize {
        let member = &self.nodes[idx].member;
        let mut update = [Idx::NONE; MAX_LEVEL];
        let mut rank = [0; MAX_LEVEL];
        let (found, found_rank) = self.seek(
            |m| m.precedes(member.score, &member.value),
            &mut update,
            &mut rank,
        );
        assert!(found == idx, "node {idx:?} is not linked into the list");
        found_rank
    }

    /// Returns the handle of the node at 1-based `rank`.
    ///
    /// # Panics
    ///
    /// Panics if `rank` is 0.
    pub fn find_by_rank(&self, rank: usize) -> Option<Idx> {
        assert!(rank > 0, "rank is 1-based, got 0");
        if rank > self.len {
            return None;
        }

        let mut current = Idx::NONE;
        let mut traversed = 0;
        for i in (0..self.level).rev() {
            loop {
                let link = self.link(current, i);
                if link.forward.is_none() || traversed + link.span > rank {
                    break;
                }
                traversed += link.span;
                current = link.forward;
            }
            if traversed == rank {
                return Some(current);
            }
        }
        None
    }

    /// Returns the member at 1-based `rank`.
    ///
    /// # Panics
    ///
    /// Panics if `rank` is 0.
    #[inline]
    pub fn get_by_rank(&self, rank: usize) -> Option<&Member<K, V>> {
        self.find_by_rank(rank).and_then(|idx| self.member(idx))
    }

    /// Iterates members with ranks in `start ..= end`, clipped to the length.
    ///
    /// # Panics
    ///
    /// Panics unless `1 <= start <= end`.
    pub fn range_by_rank(&self, start: usize, end: usize) -> Iter<'_, K, V, Idx> {
        assert_rank_range(start, end);
        if start > self.len {
            return self.empty_iter();
        }
        let end = end.min(self.len);
        let front = self.find_by_rank(start).expect("rank within length");
        let back = self.find_by_rank(end).expect("rank within length");
        Iter {
            nodes: &self.nodes,
            front,
            back,
            remaining: end - start + 1,
        }
    }

    /// Removes members with ranks in `start ..= end`, returned in order.
    ///
    /// # Panics
    ///
    /// Panics unless `1 <= start <= end`.
    pub fn delete_range_by_rank(&mut self, start: usize, end: usize) -> Vec<Member<K, V>> {
        assert_rank_range(start, end);

        let mut update = [Idx::NONE; MAX_LEVEL];
        let mut current = Idx::NONE;
        let mut traversed = 0;
        for i in (0..self.level).rev() {
            loop {
                let link = self.link(current, i);
                if link.forward.is_none() || traversed + link.span >= start {
                    break;
                }
                traversed += link.span;
                current = link.forward;
            }
            update[i] = current;
        }

        let first = self.link(current, 0).forward;
        let mut budget = end - start + 1;
        let removed = self.delete_from(first, &update, |_| {
            if budget == 0 {
                return false;
            }
            budget -= 1;
            true
        });
        trace!("deleted {} members by rank [{start}, {end}]", removed.len());
        removed
    }

    // ========================================================================
    // Score ranges
    // ========================================================================

    /// Returns the handle of the smallest member inside `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is inverted or has a NaN bound.
    pub fn first_in_score_range(&self, range: &ScoreRange) -> Option<Idx> {
        self.score_bounds(range).map(|((first, _), _)| first)
    }

    /// Returns the handle of the largest member inside `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is inverted or has a NaN bound.
    pub fn last_in_score_range(&self, range: &ScoreRange) -> Option<Idx> {
        self.score_bounds(range).map(|(_, (last, _))| last)
    }

    /// Iterates members whose score lies in `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is inverted or has a NaN bound.
    pub fn range_by_score(&self, range: &ScoreRange) -> Iter<'_, K, V, Idx> {
        match self.score_bounds(range) {
            Some(bounds) => self.bounded_iter(bounds),
            None => self.empty_iter(),
        }
    }

    /// Counts members whose score lies in `range`. O(log n).
    ///
    /// # Panics
    ///
    /// Panics if `range` is inverted or has a NaN bound.
    pub fn count_in_score_range(&self, range: &ScoreRange) -> usize {
        self.score_bounds(range)
            .map_or(0, |((_, first), (_, last))| last - first + 1)
    }

    /// Removes members whose score lies in `range`, returned in order.
    ///
    /// # Panics
    ///
    /// Panics if `range` is inverted or has a NaN bound.
    pub fn delete_range_by_score(&mut self, range: &ScoreRange) -> Vec<Member<K, V>> {
        range.assert_valid();
        if range.is_empty() {
            return Vec::new();
        }
        let mut update = [Idx::NONE; MAX_LEVEL];
        let mut rank = [0; MAX_LEVEL];
        let (first, _) = self.seek(|m| !range.gte_min(m.score), &mut update, &mut rank);
        let removed = self.delete_from(first, &update, |m| range.lte_max(m.score));
        trace!("deleted {} members by score {range}", removed.len());
        removed
    }

    // ========================================================================
    // Value ranges
    // ========================================================================

    /// Returns the handle of the first member whose value lies in `range`.
    ///
    /// Only meaningful when list order agrees with value order over the
    /// queried stretch (all members share one score).
    ///
    /// # Panics
    ///
    /// Panics if `range` is inverted.
    pub fn first_in_value_range(&self, range: &ValueRange<V>) -> Option<Idx> {
        self.value_bounds(range).map(|((first, _), _)| first)
    }

    /// Returns the handle of the last member whose value lies in `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is inverted.
    pub fn last_in_value_range(&self, range: &ValueRange<V>) -> Option<Idx> {
        self.value_bounds(range).map(|(_, (last, _))| last)
    }

    /// Iterates members whose value lies in `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is inverted.
    pub fn range_by_value(&self, range: &ValueRange<V>) -> Iter<'_, K, V, Idx> {
        match self.value_bounds(range) {
            Some(bounds) => self.bounded_iter(bounds),
            None => self.empty_iter(),
        }
    }

    /// Removes members whose value lies in `range`, returned in order.
    ///
    /// # Panics
    ///
    /// Panics if `range` is inverted.
    pub fn delete_range_by_value(&mut self, range: &ValueRange<V>) -> Vec<Member<K, V>> {
        range.assert_valid();
        if range.is_empty() {
            return Vec::new();
        }
        let mut update = [Idx::NONE; MAX_LEVEL];
        let mut rank = [0; MAX_LEVEL];
        let (first, _) = self.seek(|m| !range.gte_min(&m.value), &mut update, &mut rank);
        let removed = self.delete_from(first, &update, |m| range.lte_max(&m.value));
        trace!("deleted {} members by value range", removed.len());
        removed
    }

    // ========================================================================
    // Whole-list operations
    // ========================================================================

    /// Removes and returns the smallest member.
    pub fn pop_first(&mut self) -> Option<Member<K, V>> {
        let first = self.head[0].forward;
        if first.is_none() {
            return None;
        }
        // The head precedes the first node at every level
        Some(self.unlink(first, &[Idx::NONE; MAX_LEVEL]))
    }

    /// Removes and returns the largest member. O(log n) to find predecessors.
    pub fn pop_last(&mut self) -> Option<Member<K, V>> {
        if self.tail.is_none() {
            return None;
        }
        Some(self.remove_at(self.tail))
    }

    /// Removes every member.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = [Link::EMPTY; MAX_LEVEL];
        self.tail = Idx::NONE;
        self.level = 0;
        self.len = 0;
    }

    /// Returns a double-ended iterator over members in ascending order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, K, V, Idx> {
        Iter {
            nodes: &self.nodes,
            front: self.head[0].forward,
            back: self.tail,
            remaining: self.len,
        }
    }

    /// Verifies every structural invariant, panicking on the first violation.
    ///
    /// Walks the whole list, O(n · level). Meant for tests and debugging.
    pub fn check_invariants(&self) {
        assert!(self.level <= MAX_LEVEL, "level above MAX_LEVEL");
        assert_eq!(self.nodes.len(), self.len, "arena holds stray nodes");

        // Base level: order, back links, tail, length; record ranks
        let mut ranks = std::collections::HashMap::with_capacity(self.len);
        let mut prev = Idx::NONE;
        let mut current = self.head[0].forward;
        let mut count = 0;
        while current.is_some() {
            let node = &self.nodes[current];
            count += 1;
            assert!(node.links.len() <= self.level, "node taller than list level");
            assert!(node.backward == prev, "broken backward link at rank {count}");
            if prev.is_some() {
                let before = &self.nodes[prev].member;
                assert!(
                    before.precedes(node.member.score, &node.member.value),
                    "members out of order at rank {count}"
                );
            }
            ranks.insert(current.slot(), count);
            prev = current;
            current = node.links[0].forward;
        }
        assert_eq!(count, self.len, "base level length mismatch");
        assert!(self.tail == prev, "tail is not the last node");

        if self.len == 0 {
            assert_eq!(self.level, 0, "empty list keeps levels");
        } else {
            assert!(
                self.head[self.level - 1].forward.is_some(),
                "top level is empty"
            );
        }
        for i in self.level..MAX_LEVEL {
            assert!(self.head[i].forward.is_none(), "head linked above level");
        }

        // Every level: spans equal rank distances
        for i in 0..self.level {
            let mut at = Idx::NONE;
            let mut at_rank = 0;
            loop {
                let link = self.link(at, i);
                if link.forward.is_none() {
                    assert_eq!(
                        link.span,
                        self.len - at_rank,
                        "bad trailing span at level {i}"
                    );
                    break;
                }
                let next_rank = ranks[&link.forward.slot()];
                assert!(next_rank > at_rank, "level {i} goes backwards");
                assert_eq!(link.span, next_rank - at_rank, "bad span at level {i}");
                at = link.forward;
                at_rank = next_rank;
            }
        }
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Link at `level` leaving `at`; `NONE` designates the head.
    #[inline]
    fn link(&self, at: Idx, level: usize) -> &Link<Idx> {
        if at.is_none() {
            &self.head[level]
        } else {
            &self.nodes[at].links[level]
        }
    }

    #[inline]
    fn link_mut(&mut self, at: Idx, level: usize) -> &mut Link<Idx> {
        if at.is_none() {
            &mut self.head[level]
        } else {
            &mut self.nodes[at].links[level]
        }
    }

    #[inline]
    fn is_at(&self, idx: Idx, score: f64, value: &V) -> bool {
        idx.is_some() && self.nodes[idx].member.is_at(score, value)
    }

    /// Descends from the top level, advancing while `before` holds for the
    /// next node.
    ///
    /// Fills `update[i]` with the last node at level i for which `before`
    /// holds (`NONE` for the head) and `rank[i]` with its rank. Returns the
    /// first node for which `before` is false, with its rank.
    fn seek<F>(
        &self,
        mut before: F,
        update: &mut [Idx; MAX_LEVEL],
        rank: &mut [usize; MAX_LEVEL],
    ) -> (Idx, usize)
    where
        F: FnMut(&Member<K, V>) -> bool,
    {
        let mut current = Idx::NONE;
        let mut traversed = 0;
        for i in (0..self.level).rev() {
            loop {
                let link = self.link(current, i);
                let next = link.forward;
                if next.is_none() || !before(&self.nodes[next].member) {
                    break;
                }
                traversed += link.span;
                current = next;
            }
            update[i] = current;
            rank[i] = traversed;
        }
        (self.link(current, 0).forward, traversed + 1)
    }

    /// Last node (and its rank) for which `within` holds; `(NONE, 0)` if none.
    fn seek_last<F>(&self, mut within: F) -> (Idx, usize)
    where
        F: FnMut(&Member<K, V>) -> bool,
    {
        let mut current = Idx::NONE;
        let mut traversed = 0;
        for i in (0..self.level).rev() {
            loop {
                let link = self.link(current, i);
                let next = link.forward;
                if next.is_none() || !within(&self.nodes[next].member) {
                    break;
                }
                traversed += link.span;
                current = next;
            }
        }
        (current, traversed)
    }

    /// Per-level predecessors of a linked node.
    fn predecessors(&self, idx: Idx) -> [Idx; MAX_LEVEL] {
        let member = &self.nodes[idx].member;
        let mut update = [Idx::NONE; MAX_LEVEL];
        let mut rank = [0; MAX_LEVEL];
        let (found, _) = self.seek(
            |m| m.precedes(member.score, &member.value),
            &mut update,
            &mut rank,
        );
        assert!(found == idx, "node {idx:?} is not linked into the list");
        update
    }

    /// Splices `idx` out of every level, given its predecessors.
    fn unlink(&mut self, idx: Idx, update: &[Idx; MAX_LEVEL]) -> Member<K, V> {
        let node = self.nodes.remove(idx).expect("invalid index");

        for i in 0..self.level {
            let link = self.link_mut(update[i], i);
            if link.forward == idx {
                link.span = link.span + node.links[i].span - 1;
                link.forward = node.links[i].forward;
            } else {
                link.span -= 1;
            }
        }

        let next = node.links[0].forward;
        if next.is_some() {
            self.nodes[next].backward = node.backward;
        } else {
            self.tail = node.backward;
        }

        let old_level = self.level;
        while self.level > 0 && self.head[self.level - 1].forward.is_none() {
            self.level -= 1;
        }
        if self.level != old_level {
            trace!("skip list level lowered {} -> {}", old_level, self.level);
        }

        self.len -= 1;
        node.member
    }

    /// Unlinks nodes from `first` onwards while `keep_going` holds.
    ///
    /// `update` must be the predecessors of `first`; it stays valid because
    /// every removed node is the successor of those same predecessors.
    fn delete_from<F>(
        &mut self,
        first: Idx,
        update: &[Idx; MAX_LEVEL],
        mut keep_going: F,
    ) -> Vec<Member<K, V>>
    where
        F: FnMut(&Member<K, V>) -> bool,
    {
        let mut removed = Vec::new();
        let mut current = first;
        while current.is_some() && keep_going(&self.nodes[current].member) {
            let next = self.nodes[current].links[0].forward;
            removed.push(self.unlink(current, update));
            current = next;
        }
        removed
    }

    /// First and last node (with ranks) inside a score range.
    fn score_bounds(&self, range: &ScoreRange) -> Option<((Idx, usize), (Idx, usize))> {
        range.assert_valid();
        if range.is_empty() || !self.overlaps(|m| range.gte_min(m.score), |m| range.lte_max(m.score))
        {
            return None;
        }
        let mut update = [Idx::NONE; MAX_LEVEL];
        let mut rank = [0; MAX_LEVEL];
        let first = self.seek(|m| !range.gte_min(m.score), &mut update, &mut rank);
        if first.0.is_none() || !range.lte_max(self.nodes[first.0].member.score) {
            return None;
        }
        let last = self.seek_last(|m| range.lte_max(m.score));
        debug_assert!(last.1 >= first.1);
        Some((first, last))
    }

    /// First and last node (with ranks) inside a value range.
    fn value_bounds(&self, range: &ValueRange<V>) -> Option<((Idx, usize), (Idx, usize))> {
        range.assert_valid();
        if range.is_empty()
            || !self.overlaps(|m| range.gte_min(&m.value), |m| range.lte_max(&m.value))
        {
            return None;
        }
        let mut update = [Idx::NONE; MAX_LEVEL];
        let mut rank = [0; MAX_LEVEL];
        let first = self.seek(|m| !range.gte_min(&m.value), &mut update, &mut rank);
        if first.0.is_none() || !range.lte_max(&self.nodes[first.0].member.value) {
            return None;
        }
        let last = self.seek_last(|m| range.lte_max(&m.value));
        debug_assert!(last.1 >= first.1);
        Some((first, last))
    }

    /// Cheap rejection: the largest member must reach the lower bound and
    /// the smallest must not pass the upper bound.
    fn overlaps<L, U>(&self, gte_min: L, lte_max: U) -> bool
    where
        L: FnOnce(&Member<K, V>) -> bool,
        U: FnOnce(&Member<K, V>) -> bool,
    {
        match (self.last(), self.first()) {
            (Some(last), Some(first)) => gte_min(last) && lte_max(first),
            _ => false,
        }
    }

    fn bounded_iter(
        &self,
        ((front, first), (back, last)): ((Idx, usize), (Idx, usize)),
    ) -> Iter<'_, K, V, Idx> {
        Iter {
            nodes: &self.nodes,
            front,
            back,
            remaining: last - first + 1,
        }
    }

    fn empty_iter(&self) -> Iter<'_, K, V, Idx> {
        Iter {
            nodes: &self.nodes,
            front: Idx::NONE,
            back: Idx::NONE,
            remaining: 0,
        }
    }

    /// Draws a tower height in `1..=MAX_LEVEL`.
    ///
    /// Each extra level is granted with probability `p`, so
    /// `P(height >= k) = p^(k-1)`.
    #[inline]
    fn random_level(&mut self) -> usize {
        let mut height = 1;
        while height < MAX_LEVEL && self.rng.random::<f64>() < self.probability {
            height += 1;
        }
        height
    }
}

#[inline]
#[track_caller]
fn assert_rank_range(start: usize, end: usize) {
    assert!(
        start > 0 && start <= end,
        "invalid rank range [{start}, {end}]: ranks are 1-based and start must not exceed end"
    );
}

// ============================================================================
// Iterator
// ============================================================================

/// Iterator over a contiguous run of members, ascending from the front and
/// descending from the back.
pub struct Iter<'a, K, V, Idx: Index> {
    nodes: &'a Arena<Node<K, V, Idx>, Idx>,
    front: Idx,
    back: Idx,
    remaining: usize,
}

impl<'a, K, V, Idx: Index> Iterator for Iter<'a, K, V, Idx> {
    type Item = &'a Member<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let nodes = self.nodes;
        let node = &nodes[self.front];
        self.front = node.links[0].forward;
        self.remaining -= 1;
        Some(&node.member)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, Idx: Index> DoubleEndedIterator for Iter<'_, K, V, Idx> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let nodes = self.nodes;
        let node = &nodes[self.back];
        self.back = node.backward;
        self.remaining -= 1;
        Some(&node.member)
    }
}

impl<K, V, Idx: Index> ExactSizeIterator for Iter<'_, K, V, Idx> {}

impl<K, V, Idx: Index> FusedIterator for Iter<'_, K, V, Idx> {}

impl<K, V, Idx: Index> Clone for Iter<'_, K, V, Idx> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V, Idx, R, const MAX_LEVEL: usize> IntoIterator for &'a SkipList<K, V, Idx, R, MAX_LEVEL>
where
    V: Ord,
    Idx: Index,
    R: RngCore,
{
    type Item = &'a Member<K, V>;
    type IntoIter = Iter<'a, K, V, Idx>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
