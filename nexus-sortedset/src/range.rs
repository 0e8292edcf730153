//! Score and value ranges with independently open or closed ends.
//!
//! A range is *inverted* when `min > max` (or a score bound is NaN); passing
//! one to a query is a caller bug and panics. A range with `min == max` and
//! either end exclusive is well formed but matches nothing.

use core::fmt;
use core::ops::RangeInclusive;

/// A score interval `min ..= max`, either end optionally exclusive.
///
/// # Example
///
/// ```
/// use nexus_sortedset::ScoreRange;
///
/// // (1.0, 5.0]
/// let r = ScoreRange::new(1.0, true, 5.0, false);
/// assert!(!r.contains(1.0));
/// assert!(r.contains(5.0));
///
/// let all: ScoreRange = (0.0..=10.0).into();
/// assert!(all.contains(0.0) && all.contains(10.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
    /// `true` excludes `min` itself.
    pub min_exclusive: bool,
    /// `true` excludes `max` itself.
    pub max_exclusive: bool,
}

impl ScoreRange {
    /// Creates a range with explicit exclusivity on each end.
    pub const fn new(min: f64, min_exclusive: bool, max: f64, max_exclusive: bool) -> Self {
        Self {
            min,
            max,
            min_exclusive,
            max_exclusive,
        }
    }

    /// `[min, max]`
    pub const fn inclusive(min: f64, max: f64) -> Self {
        Self::new(min, false, max, false)
    }

    /// `(min, max)`
    pub const fn exclusive(min: f64, max: f64) -> Self {
        Self::new(min, true, max, true)
    }

    /// Every score, infinities included.
    pub const fn all() -> Self {
        Self::inclusive(f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Returns `true` if `score` satisfies the lower bound.
    #[inline]
    pub fn gte_min(&self, score: f64) -> bool {
        if self.min_exclusive {
            score > self.min
        } else {
            score >= self.min
        }
    }

    /// Returns `true` if `score` satisfies the upper bound.
    #[inline]
    pub fn lte_max(&self, score: f64) -> bool {
        if self.max_exclusive {
            score < self.max
        } else {
            score <= self.max
        }
    }

    /// Returns `true` if `score` lies inside the range.
    #[inline]
    pub fn contains(&self, score: f64) -> bool {
        self.gte_min(score) && self.lte_max(score)
    }

    /// Returns `true` if no score can satisfy both bounds.
    ///
    /// An inverted range is not "empty", it is invalid.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min == self.max && (self.min_exclusive || self.max_exclusive)
    }

    #[track_caller]
    pub(crate) fn assert_valid(&self) {
        assert!(
            !self.min.is_nan() && !self.max.is_nan(),
            "score range bound is NaN: {self}"
        );
        assert!(self.min <= self.max, "inverted score range: {self}");
    }
}

impl From<RangeInclusive<f64>> for ScoreRange {
    fn from(range: RangeInclusive<f64>) -> Self {
        let (min, max) = range.into_inner();
        Self::inclusive(min, max)
    }
}

impl fmt::Display for ScoreRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.min_exclusive { '(' } else { '[' };
        let close = if self.max_exclusive { ')' } else { ']' };
        write!(f, "{open}{}, {}{close}", self.min, self.max)
    }
}

/// A satellite-value interval `min ..= max`, either end optionally exclusive.
///
/// Value ranges only make sense when skip-list order agrees with value
/// order, i.e. every member in the queried stretch shares one score (the
/// "lexicographic range" use of a sorted set).
///
/// # Example
///
/// ```
/// use nexus_sortedset::ValueRange;
///
/// let r = ValueRange::new("b", false, "d", true);
/// assert!(r.contains(&"b"));
/// assert!(r.contains(&"c"));
/// assert!(!r.contains(&"d"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueRange<V> {
    /// Lower bound.
    pub min: V,
    /// Upper bound.
    pub max: V,
    /// `true` excludes `min` itself.
    pub min_exclusive: bool,
    /// `true` excludes `max` itself.
    pub max_exclusive: bool,
}

impl<V: Ord> ValueRange<V> {
    /// Creates a range with explicit exclusivity on each end.
    pub const fn new(min: V, min_exclusive: bool, max: V, max_exclusive: bool) -> Self {
        Self {
            min,
            max,
            min_exclusive,
            max_exclusive,
        }
    }

    /// `[min, max]`
    pub const fn inclusive(min: V, max: V) -> Self {
        Self::new(min, false, max, false)
    }

    /// Returns `true` if `value` satisfies the lower bound.
    #[inline]
    pub fn gte_min(&self, value: &V) -> bool {
        if self.min_exclusive {
            *value > self.min
        } else {
            *value >= self.min
        }
    }

    /// Returns `true` if `value` satisfies the upper bound.
    #[inline]
    pub fn lte_max(&self, value: &V) -> bool {
        if self.max_exclusive {
            *value < self.max
        } else {
            *value <= self.max
        }
    }

    /// Returns `true` if `value` lies inside the range.
    #[inline]
    pub fn contains(&self, value: &V) -> bool {
        self.gte_min(value) && self.lte_max(value)
    }

    /// Returns `true` if no value can satisfy both bounds.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min == self.max && (self.min_exclusive || self.max_exclusive)
    }

    #[track_caller]
    pub(crate) fn assert_valid(&self) {
        assert!(self.min <= self.max, "inverted value range");
    }
}

impl<V: Ord> From<RangeInclusive<V>> for ValueRange<V> {
    fn from(range: RangeInclusive<V>) -> Self {
        let (min, max) = range.into_inner();
        Self::inclusive(min, max)
    }
}
