//! Utility functions and traits shared by `ChainedHashMap` and `ChainedHashSet`

use std::borrow::Borrow;

use crate::{ChainStats, ChainedHashMap, ChainedHashSet, HashError, key::CodeUnits};

/// Extension trait letting callers treat both chained collections uniformly
pub trait KeyedCollection<K> {
    /// Returns the stored keys as a Vec
    fn key_snapshot(&self) -> Vec<&K>;

    /// Returns true if the collection contains the given key
    fn has_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: CodeUnits + Eq + ?Sized;

    /// Returns the number of stored keys
    fn entry_count(&self) -> usize;

    /// Returns bucket occupancy figures
    fn chain_stats(&self) -> ChainStats;
}

impl<K, V> KeyedCollection<K> for ChainedHashMap<K, V>
where
    K: CodeUnits + Eq,
{
    fn key_snapshot(&self) -> Vec<&K> {
        self.keys()
    }

    fn has_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: CodeUnits + Eq + ?Sized,
    {
        self.contains_key(key)
    }

    fn entry_count(&self) -> usize {
        self.len()
    }

    fn chain_stats(&self) -> ChainStats {
        self.stats()
    }
}

impl<K> KeyedCollection<K> for ChainedHashSet<K>
where
    K: CodeUnits + Eq,
{
    fn key_snapshot(&self) -> Vec<&K> {
        self.keys()
    }

    fn has_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: CodeUnits + Eq + ?Sized,
    {
        self.contains(key)
    }

    fn entry_count(&self) -> usize {
        self.len()
    }

    fn chain_stats(&self) -> ChainStats {
        self.stats()
    }
}

/// Creates a `ChainedHashMap` with `capacity` buckets from an iterator of key-value pairs
///
/// # Errors
///
/// [`HashError::InvalidCapacity`] if `capacity` is zero.
pub fn from_pairs<K, V, I>(capacity: usize, iter: I) -> Result<ChainedHashMap<K, V>, HashError>
where
    K: CodeUnits + Eq,
    I: IntoIterator<Item = (K, V)>,
{
    let mut map = ChainedHashMap::with_capacity(capacity)?;
    map.extend(iter);
    Ok(map)
}
