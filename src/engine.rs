use std::{
    borrow::Borrow,
    fmt,
    iter::{Flatten, FusedIterator},
    mem,
    num::NonZeroUsize,
    slice, vec,
};

use log::{debug, trace};

use crate::{
    HashError,
    config::{DEFAULT_BUCKETS, LoadFactor, TableConfig},
    key::{CodeUnits, polynomial_index},
};

/// Entries that hashed to the same slot, in the order they were added
type Bucket<K, V> = Vec<(K, V)>;

/// The table behind [`ChainedHashMap`](crate::ChainedHashMap) and
/// [`ChainedHashSet`](crate::ChainedHashSet).
///
/// Every slot holds either nothing or a chain of the entries whose keys hash to that slot under
/// the current capacity. The table doubles before a new key would bring the number of stored
/// keys up to `floor(capacity * load_factor)`, moving every entry to its bucket under the new
/// capacity in one pass.
///
/// Note: This implementation is not thread-safe. Wrap it in a lock to share it between threads.
#[derive(Clone)]
pub struct HashEngine<K, V> {
    /// One slot per bucket; `None` until a key hashes there, and again once its last key leaves
    table: Vec<Option<Bucket<K, V>>>,
    /// Number of slots, always equal to `table.len()`
    capacity: NonZeroUsize,
    /// Number of distinct keys across all buckets
    size: usize,
    /// Ratio at which the table grows
    load_factor: LoadFactor,
    /// Bucket count growth may not pass
    max_capacity: NonZeroUsize,
    /// Doublings performed since construction
    resizes: usize,
}

/// Bucket occupancy figures for a table, see [`HashEngine::stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChainStats {
    /// Number of buckets
    pub capacity: usize,
    /// Number of stored keys
    pub len: usize,
    /// Buckets holding at least one key
    pub occupied_buckets: usize,
    /// Length of the fullest bucket
    pub longest_chain: usize,
    /// Doublings performed since the table was created
    pub resizes: usize,
}

impl ChainStats {
    /// Average number of keys per occupied bucket, `0.0` for an empty table
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::arithmetic_side_effects)]
    pub fn mean_chain_length(&self) -> f64 {
        if self.occupied_buckets == 0 {
            0.0
        } else {
            self.len as f64 / self.occupied_buckets as f64
        }
    }
}

impl<K, V> fmt::Debug for HashEngine<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashEngine")
            .field("capacity", &self.capacity)
            .field("size", &self.size)
            .field("load_factor", &self.load_factor)
            .field("max_capacity", &self.max_capacity)
            .field("resizes", &self.resizes)
            .finish_non_exhaustive()
    }
}

impl<K, V> Default for HashEngine<K, V> {
    fn default() -> Self {
        Self {
            table: std::iter::repeat_with(|| None).take(DEFAULT_BUCKETS.get()).collect(),
            capacity: DEFAULT_BUCKETS,
            size: 0,
            load_factor: LoadFactor::default(),
            max_capacity: NonZeroUsize::MAX,
            resizes: 0,
        }
    }
}

impl<K, V> HashEngine<K, V> {
    /// Creates an empty table from `config`
    ///
    /// # Errors
    ///
    /// Fails if the config does not validate or the table cannot be allocated.
    pub fn with_config(config: TableConfig) -> Result<Self, HashError> {
        let (capacity, load_factor, max_capacity) = config.validate()?;
        let table = Self::allocate(capacity)?;
        Ok(Self { table, capacity, size: 0, load_factor, max_capacity, resizes: 0 })
    }

    /// Creates an empty table with `capacity` buckets and the default load factor
    ///
    /// # Errors
    ///
    /// [`HashError::InvalidCapacity`] if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self, HashError> {
        Self::with_config(TableConfig::new(capacity))
    }

    /// Returns the number of buckets
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Returns the number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if no keys are stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the current ratio of stored keys to buckets
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.capacity.get() as f64
    }

    /// Returns the ratio the table was configured to grow at
    #[must_use]
    pub fn max_load_factor(&self) -> f64 {
        self.load_factor.get()
    }

    /// Number of keys at which the table grows under its current capacity
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.load_factor.threshold(self.capacity)
    }

    /// Returns the bucket `key` is stored in, or would be stored in, under the current capacity
    #[must_use]
    pub fn bucket_index<Q: CodeUnits + ?Sized>(&self, key: &Q) -> usize {
        polynomial_index(key, self.capacity)
    }

    /// Empties every bucket. The capacity is kept.
    pub fn clear(&mut self) {
        for bucket in &mut self.table {
            *bucket = None;
        }
        self.size = 0;
        trace!("cleared table of {} buckets", self.capacity);
    }

    /// Iterates over the entries in bucket order, then in the order they joined their bucket
    #[must_use]
    #[allow(clippy::iter_without_into_iter)]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { buckets: self.table.iter(), entries: slice::Iter::default(), remaining: self.size }
    }

    /// Snapshot of the stored keys, in iteration order
    #[must_use]
    pub fn keys(&self) -> Vec<&K> {
        self.iter().map(|(key, _)| key).collect()
    }

    /// Snapshot of the stored values, in iteration order
    #[must_use]
    pub fn values(&self) -> Vec<&V> {
        self.iter().map(|(_, value)| value).collect()
    }

    /// Snapshot of the stored entries, in iteration order
    #[must_use]
    pub fn entries(&self) -> Vec<(&K, &V)> {
        self.iter().collect()
    }

    /// Collects occupancy figures by walking every bucket
    #[must_use]
    pub fn stats(&self) -> ChainStats {
        let chains = self.table.iter().flatten().map(Vec::len);
        let (occupied_buckets, longest_chain) = chains
            .fold((0_usize, 0_usize), |(occupied, longest), chain| {
                (occupied.saturating_add(1), longest.max(chain))
            });
        ChainStats {
            capacity: self.capacity.get(),
            len: self.size,
            occupied_buckets,
            longest_chain,
            resizes: self.resizes,
        }
    }

    /// Allocates `capacity` empty slots, reporting allocator failure instead of aborting
    fn allocate(capacity: NonZeroUsize) -> Result<Vec<Option<Bucket<K, V>>>, HashError> {
        let mut table = Vec::new();
        table
            .try_reserve_exact(capacity.get())
            .map_err(|source| HashError::Allocation { capacity: capacity.get(), source })?;
        table.resize_with(capacity.get(), || None);
        Ok(table)
    }

    /// Appends an entry to the chain at `index`, creating the chain if the slot is empty
    fn push_entry(table: &mut [Option<Bucket<K, V>>], index: usize, key: K, value: V) {
        debug_assert!(index < table.len(), "bucket index {index} out of range");
        if let Some(slot) = table.get_mut(index) {
            slot.get_or_insert_with(Vec::new).push((key, value));
        }
    }
}

impl<K, V> HashEngine<K, V>
where
    K: CodeUnits + Eq,
{
    /// Retrieve the stored key and value matching `key`
    #[must_use]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: CodeUnits + Eq + ?Sized,
    {
        let bucket = self.table.get(self.bucket_index(key))?.as_ref()?;
        bucket
            .iter()
            .find(|(stored, _)| stored.borrow() == key)
            .map(|(stored, value)| (stored, value))
    }

    /// Retrieve the value stored for `key`
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: CodeUnits + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Get a mutable reference to the value stored for `key`
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: CodeUnits + Eq + ?Sized,
    {
        let index = self.bucket_index(key);
        let bucket = self.table.get_mut(index)?.as_mut()?;
        bucket.iter_mut().find(|(stored, _)| stored.borrow() == key).map(|(_, value)| value)
    }

    /// Returns true if `key` is stored
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: CodeUnits + Eq + ?Sized,
    {
        self.get_key_value(key).is_some()
    }

    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// A new key that would bring the table up to its threshold first doubles the capacity,
    /// repeatedly if a small table's threshold is still reached after one doubling.
    ///
    /// # Errors
    ///
    /// [`HashError::CapacityOverflow`] if growing would pass the configured capacity limit or
    /// overflow `usize`, [`HashError::Allocation`] if the larger table cannot be allocated. The key
    /// is not stored in either case and every stored entry stays reachable.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>, HashError> {
        if let Some(slot) = self.get_mut(&key) {
            return Ok(Some(mem::replace(slot, value)));
        }

        let len = self
            .size
            .checked_add(1)
            .ok_or(HashError::CapacityOverflow { capacity: self.capacity.get() })?;
        while self.threshold() <= len {
            self.grow()?;
        }

        let index = self.bucket_index(&key);
        Self::push_entry(&mut self.table, index, key, value);
        self.size = len;
        Ok(None)
    }

    /// Stores `value` under `key`, returning the value it replaced
    ///
    /// # Panics
    ///
    /// Panics if the table has to grow and the larger table cannot be allocated.
    #[allow(clippy::panic)]
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.try_insert(key, value).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Removes `key`, returning the stored key and value.
    ///
    /// The rest of the bucket keeps its order; a bucket left without keys goes back to empty.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: CodeUnits + Eq + ?Sized,
    {
        let index = self.bucket_index(key);
        let slot = self.table.get_mut(index)?;
        let bucket = slot.as_mut()?;
        let position = bucket.iter().position(|(stored, _)| stored.borrow() == key)?;
        let entry = bucket.remove(position);
        if bucket.is_empty() {
            *slot = None;
        }
        debug_assert!(self.size > 0, "removed an entry from a table of size 0");
        self.size = self.size.saturating_sub(1);
        Some(entry)
    }

    /// Removes `key`, returning whether it was stored
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: CodeUnits + Eq + ?Sized,
    {
        self.remove_entry(key).is_some()
    }

    /// Doubles the capacity and moves every entry to its bucket under the new capacity.
    ///
    /// Entries go straight into the new table, so the size is unchanged and no growth check
    /// runs while rehashing.
    fn grow(&mut self) -> Result<(), HashError> {
        let old_capacity = self.capacity;
        let new_capacity = old_capacity
            .checked_add(old_capacity.get())
            .filter(|capacity| *capacity <= self.max_capacity)
            .ok_or(HashError::CapacityOverflow { capacity: old_capacity.get() })?;

        let old_table = mem::replace(&mut self.table, Self::allocate(new_capacity)?);
        self.capacity = new_capacity;
        for (key, value) in old_table.into_iter().flatten().flatten() {
            let index = polynomial_index(&key, new_capacity);
            Self::push_entry(&mut self.table, index, key, value);
        }

        self.resizes = self.resizes.saturating_add(1);
        debug!(
            "resized table from {old_capacity} to {new_capacity} buckets, rehashed {} entries",
            self.size
        );
        Ok(())
    }
}

impl<K, V> Extend<(K, V)> for HashEngine<K, V>
where
    K: CodeUnits + Eq,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a HashEngine<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> IntoIterator for HashEngine<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { entries: self.table.into_iter().flatten().flatten(), remaining: self.size }
    }
}

/// Iterator over the entries of a table, see [`HashEngine::iter`]
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    /// Slots not yet visited
    buckets: slice::Iter<'a, Option<Bucket<K, V>>>,
    /// Rest of the chain being walked
    entries: slice::Iter<'a, (K, V)>,
    /// Entries not yet yielded
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, value)) = self.entries.next() {
                self.remaining = self.remaining.saturating_sub(1);
                return Some((key, value));
            }
            self.entries = self.buckets.next()?.as_deref().unwrap_or_default().iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Owning iterator over the entries of a table, in the same order as [`Iter`]
pub struct IntoIter<K, V> {
    /// Remaining chains, flattened into entries
    entries: Flatten<Flatten<vec::IntoIter<Option<Bucket<K, V>>>>>,
    /// Entries not yet yielded
    remaining: usize,
}

impl<K, V> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter").field("remaining", &self.remaining).finish_non_exhaustive()
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn engine(capacity: usize) -> HashEngine<String, u32> {
        HashEngine::with_capacity(capacity).unwrap()
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let result = HashEngine::<String, u32>::with_capacity(0);
        assert!(matches!(result, Err(HashError::InvalidCapacity(0))));
    }

    #[test]
    fn test_default_engine() {
        let table: HashEngine<String, u32> = HashEngine::default();
        assert_eq!(table.capacity(), 16);
        assert_eq!(table.threshold(), 12);
        assert!(table.is_empty());
        assert_eq!(table.table.len(), table.capacity());
    }

    #[test]
    fn test_insert_get_and_overwrite() {
        let mut table = engine(8);
        assert_eq!(table.insert("apple".to_string(), 1), None);
        assert_eq!(table.insert("apple".to_string(), 2), Some(1));
        assert_eq!(table.get("apple"), Some(&2));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("pear"), None);
    }

    #[test]
    fn test_colliding_keys_share_a_bucket() {
        let mut table = engine(8);
        table.insert("dog".to_string(), 1);
        table.insert("frog".to_string(), 2);

        assert_eq!(table.bucket_index("dog"), 4);
        assert_eq!(table.bucket_index("frog"), 4);
        assert_eq!(table.get("dog"), Some(&1));
        assert_eq!(table.get("frog"), Some(&2));
        assert_eq!(table.len(), 2);

        let stats = table.stats();
        assert_eq!(stats.occupied_buckets, 1);
        assert_eq!(stats.longest_chain, 2);
        assert!((stats.mean_chain_length() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_emptied_bucket_reverts_to_absent() {
        let mut table = engine(8);
        table.insert("dog".to_string(), 1);
        table.insert("frog".to_string(), 2);

        assert!(table.remove("dog"));
        assert!(matches!(table.table.get(4), Some(Some(chain)) if chain.len() == 1));
        assert!(table.remove("frog"));
        assert!(matches!(table.table.get(4), Some(None)));
        assert!(table.is_empty());
    }

    #[test]
    fn test_remove_missing_key() {
        let mut table = engine(8);
        table.insert("kite".to_string(), 1);
        assert!(!table.remove("lion"));
        assert_eq!(table.remove_entry("kite"), Some(("kite".to_string(), 1)));
        assert!(!table.remove("kite"));
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_sixth_key_doubles_capacity_once() {
        let mut table = engine(8);
        for (value, key) in ["apple", "banana", "carrot", "dog", "elephant"].iter().enumerate() {
            table.insert((*key).to_string(), u32::try_from(value).unwrap());
        }
        assert_eq!(table.capacity(), 8);

        table.insert("frog".to_string(), 5);
        assert_eq!(table.capacity(), 16);
        assert_eq!(table.threshold(), 12);
        assert_eq!(table.len(), 6);
        assert_eq!(table.stats().resizes, 1);
        assert_eq!(table.get("apple"), Some(&0));
        assert_eq!(table.get("frog"), Some(&5));
        // "apple" moved from bucket 2 to bucket 10
        assert_eq!(table.bucket_index("apple"), 10);
        assert!(matches!(table.table.get(10), Some(Some(_))));
    }

    #[test]
    fn test_overwrite_never_grows() {
        let mut table = engine(8);
        for key in ["a", "b", "c", "d", "e"] {
            table.insert(key.to_string(), 0);
        }
        for _ in 0..10 {
            table.insert("e".to_string(), 1);
        }
        assert_eq!(table.capacity(), 8);
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn test_tiny_table_grows_until_below_threshold() {
        let mut table = engine(1);
        assert_eq!(table.threshold(), 0);

        table.insert("a".to_string(), 1);
        assert_eq!(table.capacity(), 4);
        assert_eq!(table.stats().resizes, 2);
        assert!(table.len() < table.threshold());
    }

    #[test]
    fn test_failed_growth_leaves_entries_reachable() {
        let config = TableConfig::new(4).with_max_capacity(8);
        let mut table = HashEngine::with_config(config).unwrap();
        for (value, key) in ["apple", "banana", "carrot", "dog", "elephant"].iter().enumerate() {
            table.try_insert((*key).to_string(), u32::try_from(value).unwrap()).unwrap();
        }
        assert_eq!(table.capacity(), 8);

        // the sixth key reaches floor(8 * 0.75) and would need 16 buckets
        let result = table.try_insert("frog".to_string(), 5);
        assert!(matches!(result, Err(HashError::CapacityOverflow { capacity: 8 })));
        assert_eq!(table.len(), 5);
        assert_eq!(table.capacity(), 8);
        assert_eq!(table.stats().resizes, 1);
        assert!(!table.contains("frog"));
        for (value, key) in ["apple", "banana", "carrot", "dog", "elephant"].iter().enumerate() {
            assert_eq!(table.get(*key), Some(&u32::try_from(value).unwrap()));
        }

        // overwriting never needs to grow
        assert_eq!(table.try_insert("dog".to_string(), 30).unwrap(), Some(3));
        assert!(table.remove("apple"));
        assert_eq!(table.try_insert("frog".to_string(), 5).unwrap(), None);
        assert_eq!(table.len(), 5);
    }

    #[test]
    #[should_panic(expected = "cannot grow past 2 buckets")]
    fn test_insert_panics_when_growth_fails() {
        let mut table = HashEngine::with_config(TableConfig::new(2).with_max_capacity(2)).unwrap();
        table.insert("a".to_string(), 1);
    }

    #[test]
    fn test_unallocatable_table_is_reported() {
        let result = HashEngine::<String, u32>::with_capacity(usize::MAX / 2);
        assert!(matches!(
            result,
            Err(HashError::Allocation { capacity, .. }) if capacity == usize::MAX / 2
        ));
    }

    #[test]
    fn test_full_load_factor_keeps_size_within_capacity() {
        let mut table =
            HashEngine::with_config(TableConfig::new(2).with_load_factor(1.0)).unwrap();
        for i in 0..50_u32 {
            table.insert(format!("key-{i}"), i);
            assert!(table.len() <= table.capacity());
        }
        assert_eq!(table.capacity(), 64);
    }

    #[test]
    fn test_capacity_only_doubles() {
        let mut table = engine(3);
        let mut capacities = vec![table.capacity()];
        for i in 0..200_u32 {
            table.insert(i.to_string(), i);
            if capacities.last() != Some(&table.capacity()) {
                capacities.push(table.capacity());
            }
        }
        for pair in capacities.windows(2) {
            if let [before, after] = pair {
                assert_eq!(*after, before * 2);
            }
        }
        assert_eq!(table.stats().resizes, capacities.len() - 1);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut table = engine(4);
        for i in 0..10_u32 {
            table.insert(i.to_string(), i);
        }
        let capacity = table.capacity();

        table.clear();
        assert_eq!(table.len(), 0);
        assert_eq!(table.capacity(), capacity);
        assert!(table.table.iter().all(Option::is_none));
        assert!(!table.contains("3"));
        assert_eq!(table.stats().occupied_buckets, 0);
    }

    #[test]
    fn test_iteration_follows_bucket_then_chain_order() {
        let mut table = engine(8);
        for (value, key) in ["frog", "banana", "dog", "apple"].iter().enumerate() {
            table.insert((*key).to_string(), u32::try_from(value).unwrap());
        }

        let keys: Vec<&str> = table.keys().into_iter().map(String::as_str).collect();
        assert_eq!(keys, vec!["apple", "frog", "dog", "banana"]);
        assert_eq!(table.values(), vec![&3, &0, &2, &1]);
        assert_eq!(table.iter().len(), 4);

        let owned: Vec<(String, u32)> = table.into_iter().collect();
        assert_eq!(owned.first(), Some(&("apple".to_string(), 3)));
        assert_eq!(owned.len(), 4);
    }

    #[test]
    fn test_remove_preserves_chain_order() {
        let mut table = engine(8);
        // all three hash to bucket 4 under capacity 8
        for key in ["dog", "frog", "lion"] {
            table.insert(key.to_string(), 0);
        }
        table.remove("frog");
        let keys: Vec<&str> = table.keys().into_iter().map(String::as_str).collect();
        assert_eq!(keys, vec!["dog", "lion"]);
    }

    #[test]
    fn test_get_mut_and_key_value() {
        let mut table = engine(8);
        table.insert("moon".to_string(), 1);
        if let Some(value) = table.get_mut("moon") {
            *value += 10;
        }
        assert_eq!(table.get_key_value("moon"), Some((&"moon".to_string(), &11)));
    }

    #[test]
    fn test_debug_does_not_need_debug_entries() {
        struct Opaque;
        let table: HashEngine<String, Opaque> = HashEngine::default();
        let text = format!("{table:?}");
        assert!(text.starts_with("HashEngine"));
    }
}
