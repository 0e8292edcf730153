//! The payload carried by every skip-list node.

use core::cmp::Ordering;

/// An element of a sorted set: external key, score and satellite value.
///
/// Members are ordered by `score` ascending, ties broken by `value`. The key
/// plays no part in ordering; it is carried so the hash index can be kept in
/// step when nodes are removed by rank or score.
///
/// # Example
///
/// ```
/// use nexus_sortedset::Member;
///
/// let m = Member::new("alice", 42.0, 7u64);
/// assert_eq!(m.key(), &"alice");
/// assert_eq!(m.score(), 42.0);
/// assert!(m.precedes(42.0, &8));
/// assert!(m.follows(41.5, &100));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Member<K, V> {
    pub(crate) key: K,
    pub(crate) score: f64,
    pub(crate) value: V,
}

impl<K, V> Member<K, V> {
    /// Creates a member.
    ///
    /// # Panics
    ///
    /// Panics if `score` is NaN.
    pub fn new(key: K, score: f64, value: V) -> Self {
        assert_score(score);
        Self { key, score, value }
    }

    /// Returns the external key.
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Returns the score.
    #[inline]
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Returns the satellite value.
    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Splits the member into `(key, score, value)`.
    #[inline]
    pub fn into_parts(self) -> (K, f64, V) {
        (self.key, self.score, self.value)
    }
}

impl<K, V: Ord> Member<K, V> {
    /// Compares this member's position against `(score, value)`.
    #[inline]
    pub fn position_cmp(&self, score: f64, value: &V) -> Ordering {
        match self.score.partial_cmp(&score) {
            Some(Ordering::Equal) => self.value.cmp(value),
            Some(ord) => ord,
            None => panic!("score must not be NaN"),
        }
    }

    /// Returns `true` if this member sorts strictly before `(score, value)`.
    #[inline]
    pub fn precedes(&self, score: f64, value: &V) -> bool {
        self.position_cmp(score, value) == Ordering::Less
    }

    /// Returns `true` if this member sorts strictly after `(score, value)`.
    #[inline]
    pub fn follows(&self, score: f64, value: &V) -> bool {
        self.position_cmp(score, value) == Ordering::Greater
    }

    /// Returns `true` if this member sits exactly at `(score, value)`.
    #[inline]
    pub fn is_at(&self, score: f64, value: &V) -> bool {
        self.position_cmp(score, value) == Ordering::Equal
    }
}

/// Fails fast on a NaN score.
#[inline]
#[track_caller]
pub(crate) fn assert_score(score: f64) {
    assert!(!score.is_nan(), "score must not be NaN");
}
