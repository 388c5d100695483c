//! Construction parameters for the chained tables

use std::num::NonZeroUsize;

use crate::HashError;

/// Bucket count used by `new()` and `Default`
pub const DEFAULT_CAPACITY: usize = 16;

/// Ratio of stored keys to buckets at which the table doubles
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Smallest accepted load factor. Below it a single key doubles a small table many times over.
pub const MIN_LOAD_FACTOR: f64 = 0.1;

/// [`DEFAULT_CAPACITY`] as a bucket count
pub(crate) const DEFAULT_BUCKETS: NonZeroUsize = match NonZeroUsize::new(DEFAULT_CAPACITY) {
    Some(buckets) => buckets,
    None => NonZeroUsize::MIN,
};

/// Parameters a table is built from.
///
/// ```rust
/// use chained_hash::{ChainedHashMap, TableConfig};
///
/// let config = TableConfig::new(8).with_load_factor(0.5);
/// let map: ChainedHashMap<String, u32> = ChainedHashMap::with_config(config).unwrap();
/// assert_eq!(map.capacity(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    /// Initial number of buckets, must be positive
    pub capacity: usize,
    /// Growth trigger, must lie in `[MIN_LOAD_FACTOR, 1]`
    pub load_factor: f64,
    /// Largest bucket count the table may grow to, at least `capacity`
    pub max_capacity: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
            max_capacity: usize::MAX,
        }
    }
}

impl TableConfig {
    /// Creates a config with `capacity` buckets and the default load factor
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { capacity, ..Self::default() }
    }

    /// Replaces the load factor
    #[must_use]
    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// Caps the bucket count; growth past it fails with [`HashError::CapacityOverflow`]
    #[must_use]
    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Checks the parameters and returns the initial capacity, load factor and capacity limit
    /// in their validated forms.
    ///
    /// # Errors
    ///
    /// [`HashError::InvalidCapacity`] for a zero capacity,
    /// [`HashError::CapacityAboveLimit`] for a capacity over `max_capacity` and
    /// [`HashError::InvalidLoadFactor`] for a factor outside `[MIN_LOAD_FACTOR, 1]`.
    pub fn validate(self) -> Result<(NonZeroUsize, LoadFactor, NonZeroUsize), HashError> {
        let capacity =
            NonZeroUsize::new(self.capacity).ok_or(HashError::InvalidCapacity(self.capacity))?;
        let max_capacity = NonZeroUsize::new(self.max_capacity)
            .filter(|max| *max >= capacity)
            .ok_or(HashError::CapacityAboveLimit {
                capacity: self.capacity,
                max_capacity: self.max_capacity,
            })?;
        let load_factor = LoadFactor::new(self.load_factor)?;
        Ok((capacity, load_factor, max_capacity))
    }
}

/// A validated load factor.
///
/// Bounded above by 1 so that a table never holds more keys than it has buckets, and below by
/// [`MIN_LOAD_FACTOR`] so that one insert grows a table by a bounded number of doublings.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct LoadFactor(f64);

impl Default for LoadFactor {
    fn default() -> Self {
        Self(DEFAULT_LOAD_FACTOR)
    }
}

impl LoadFactor {
    /// Wraps `factor` if it lies in `[MIN_LOAD_FACTOR, 1]`
    ///
    /// # Errors
    ///
    /// [`HashError::InvalidLoadFactor`] otherwise, NaN included.
    pub fn new(factor: f64) -> Result<Self, HashError> {
        if (MIN_LOAD_FACTOR..=1.0).contains(&factor) {
            Ok(Self(factor))
        } else {
            Err(HashError::InvalidLoadFactor(factor))
        }
    }

    /// Returns the raw ratio
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Number of keys at which a table of `capacity` buckets grows: `floor(capacity * factor)`
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn threshold(self, capacity: NonZeroUsize) -> usize {
        // non-negative and at most `capacity`, so the cast back only drops the fraction
        (capacity.get() as f64 * self.0).floor() as usize
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cap(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN)
    }

    #[test]
    fn test_default_config() {
        let config = TableConfig::default();
        assert_eq!(config.capacity, 16);
        assert!((config.load_factor - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let result = TableConfig::new(0).validate();
        assert!(matches!(result, Err(HashError::InvalidCapacity(0))));
    }

    #[test]
    fn test_validate_rejects_bad_load_factors() {
        for factor in [0.0, -0.5, 1.01, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = TableConfig::new(8).with_load_factor(factor).validate();
            assert!(matches!(result, Err(HashError::InvalidLoadFactor(_))), "accepted {factor}");
        }
    }

    #[test]
    fn test_validate_rejects_tiny_load_factor() {
        for factor in [1e-6, f64::MIN_POSITIVE, 0.099] {
            let result = TableConfig::new(8).with_load_factor(factor).validate();
            assert!(matches!(result, Err(HashError::InvalidLoadFactor(_))), "accepted {factor}");
        }
        assert!(LoadFactor::new(MIN_LOAD_FACTOR).is_ok());
    }

    #[test]
    fn test_validate_accepts_full_load() {
        let (capacity, factor, max_capacity) =
            TableConfig::new(4).with_load_factor(1.0).validate().unwrap();
        assert_eq!(capacity.get(), 4);
        assert_eq!(factor.threshold(capacity), 4);
        assert_eq!(max_capacity.get(), usize::MAX);
    }

    #[test]
    fn test_validate_checks_capacity_limit() {
        let result = TableConfig::new(16).with_max_capacity(8).validate();
        assert!(matches!(
            result,
            Err(HashError::CapacityAboveLimit { capacity: 16, max_capacity: 8 })
        ));

        let (capacity, _, max_capacity) =
            TableConfig::new(8).with_max_capacity(8).validate().unwrap();
        assert_eq!(capacity, max_capacity);
    }

    #[test]
    fn test_thresholds() {
        let factor = LoadFactor::default();
        assert_eq!(factor.threshold(cap(8)), 6);
        assert_eq!(factor.threshold(cap(16)), 12);
        assert_eq!(factor.threshold(cap(1)), 0);
        assert_eq!(factor.threshold(cap(2)), 1);

        let half = LoadFactor::new(0.5).unwrap();
        assert_eq!(half.threshold(cap(7)), 3);
    }
}
