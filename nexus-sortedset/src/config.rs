//! Construction parameters for a [`SortedSet`](crate::SortedSet).

use crate::Index;
use crate::error::ConfigError;

/// Height cap for skip-list nodes. Enough for 2^64 elements at `p = 0.25`.
pub const DEFAULT_MAX_LEVEL: usize = 32;

/// Probability of promoting a node one level higher (Redis-style).
///
/// On average a node carries `1 / (1 - p)` ≈ 1.33 links.
pub const DEFAULT_LEVEL_PROBABILITY: f64 = 0.25;

/// Sorted-set parameters.
///
/// # Example
///
/// ```
/// use nexus_sortedset::{Config, SortedSet};
///
/// let config = Config::new()
///     .with_level_probability(0.5)
///     .with_capacity(1024)
///     .with_seed(7);
///
/// let mut set: SortedSet<u64, u64> = SortedSet::from_config(&config).unwrap();
/// assert!(set.insert(1, 10.0, 1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Level-up probability `p`, in `[0, 1)`.
    ///
    /// Higher values build taller towers: faster search, more links per node.
    pub level_probability: f64,
    /// Number of members to pre-allocate room for.
    pub capacity: usize,
    /// Seed for the level RNG. `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Config {
    /// Default parameters: `p = 0.25`, no pre-allocation, OS-seeded RNG.
    pub const fn new() -> Self {
        Self {
            level_probability: DEFAULT_LEVEL_PROBABILITY,
            capacity: 0,
            seed: None,
        }
    }

    /// Sets the level-up probability.
    pub const fn with_level_probability(mut self, probability: f64) -> Self {
        self.level_probability = probability;
        self
    }

    /// Sets the number of members to pre-allocate room for.
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Seeds the level RNG for reproducible tower heights.
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks every parameter.
    ///
    /// Capacity is checked against `u32` handles, which is what
    /// [`SortedSet`](crate::SortedSet) uses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.level_probability) {
            return Err(ConfigError::LevelProbability(self.level_probability));
        }
        let max = u32::CAPACITY;
        if self.capacity > max {
            return Err(ConfigError::Capacity {
                requested: self.capacity,
                max,
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
