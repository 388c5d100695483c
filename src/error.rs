//! Error kinds reported by table construction and growth

use std::collections::TryReserveError;

use thiserror::Error;

/// Failures surfaced by [`HashEngine`](crate::HashEngine) and the adapters built on it.
///
/// Missing keys are never errors: lookups and removals report them through `Option` and
/// `bool` results.
#[derive(Error, Debug)]
pub enum HashError {
    /// The requested initial capacity was zero
    #[error("initial capacity must be positive, got {0}")]
    InvalidCapacity(usize),
    /// The initial capacity was above the configured growth limit
    #[error("initial capacity {capacity} exceeds the limit of {max_capacity} buckets")]
    CapacityAboveLimit {
        /// Requested initial bucket count
        capacity: usize,
        /// Configured largest bucket count
        max_capacity: usize,
    },
    /// The load factor was not a number in `[MIN_LOAD_FACTOR, 1]`
    #[error("load factor must lie in [0.1, 1], got {0}")]
    InvalidLoadFactor(f64),
    /// Doubling the bucket count would pass the configured limit or overflow `usize`
    #[error("cannot grow past {capacity} buckets")]
    CapacityOverflow {
        /// Bucket count at the time growth was attempted
        capacity: usize,
    },
    /// The allocator refused the replacement table
    #[error("failed to allocate a table of {capacity} buckets")]
    Allocation {
        /// Bucket count of the table that could not be allocated
        capacity: usize,
        /// Underlying reservation failure
        #[source]
        source: TryReserveError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_value() {
        assert_eq!(
            HashError::InvalidCapacity(0).to_string(),
            "initial capacity must be positive, got 0"
        );
        assert_eq!(
            HashError::InvalidLoadFactor(1.5).to_string(),
            "load factor must lie in [0.1, 1], got 1.5"
        );
        assert_eq!(
            HashError::CapacityAboveLimit { capacity: 16, max_capacity: 8 }.to_string(),
            "initial capacity 16 exceeds the limit of 8 buckets"
        );
        assert_eq!(
            HashError::CapacityOverflow { capacity: 8 }.to_string(),
            "cannot grow past 8 buckets"
        );
    }

    #[test]
    fn test_allocation_error_keeps_its_source() {
        use std::error::Error as _;

        let Err(source) = Vec::<u64>::new().try_reserve_exact(usize::MAX) else {
            return;
        };
        let err = HashError::Allocation { capacity: usize::MAX, source };
        assert!(err.source().is_some());
    }
}
