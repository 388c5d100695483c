use std::{
    borrow::Borrow,
    fmt,
    ops::Index,
};

use crate::{
    HashError, TableConfig,
    engine::{ChainStats, HashEngine, IntoIter, Iter},
    key::CodeUnits,
};

/// A key-value map over a separate-chaining [`HashEngine`].
///
/// Keys are hashed by their code units (see [`CodeUnits`]), so a map keyed by `String` can be
/// queried with `&str`. Snapshots (`keys`, `values`, `entries`) walk the buckets in index order
/// and each bucket in the order its keys arrived.
#[derive(Clone)]
pub struct ChainedHashMap<K, V> {
    /// Storage and growth policy
    engine: HashEngine<K, V>,
}

impl<K, V> Default for ChainedHashMap<K, V> {
    fn default() -> Self {
        Self { engine: HashEngine::default() }
    }
}

impl<K, V> ChainedHashMap<K, V> {
    /// Creates an empty map with 16 buckets and a load factor of 0.75
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty map with `capacity` buckets
    ///
    /// # Errors
    ///
    /// [`HashError::InvalidCapacity`] if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self, HashError> {
        HashEngine::with_capacity(capacity).map(|engine| Self { engine })
    }

    /// Creates an empty map from `config`
    ///
    /// # Errors
    ///
    /// Fails if `config` does not validate, see [`TableConfig::validate`].
    pub fn with_config(config: TableConfig) -> Result<Self, HashError> {
        HashEngine::with_config(config).map(|engine| Self { engine })
    }

    /// Returns the number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.engine.len()
    }

    /// Returns true if the map holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    /// Returns the number of buckets
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.engine.capacity()
    }

    /// Removes every entry, keeping the capacity
    pub fn clear(&mut self) {
        self.engine.clear();
    }

    /// Returns an iterator over the entries
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.engine.iter()
    }

    /// Snapshot of the keys
    #[must_use]
    pub fn keys(&self) -> Vec<&K> {
        self.engine.keys()
    }

    /// Snapshot of the values
    #[must_use]
    pub fn values(&self) -> Vec<&V> {
        self.engine.values()
    }

    /// Snapshot of the key-value pairs
    #[must_use]
    pub fn entries(&self) -> Vec<(&K, &V)> {
        self.engine.entries()
    }

    /// Bucket occupancy figures
    #[must_use]
    pub fn stats(&self) -> ChainStats {
        self.engine.stats()
    }
}

impl<K, V> ChainedHashMap<K, V>
where
    K: CodeUnits + Eq,
{
    /// Insert a key-value pair, returning the value previously stored under `key`
    ///
    /// # Panics
    ///
    /// Panics if the map has to grow and the larger table cannot be allocated.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.engine.insert(key, value)
    }

    /// Insert a key-value pair, reporting growth failure instead of panicking
    ///
    /// # Errors
    ///
    /// See [`HashEngine::try_insert`]. The map is left without the new key.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>, HashError> {
        self.engine.try_insert(key, value)
    }

    /// Retrieve a value for a given key
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: CodeUnits + Eq + ?Sized,
    {
        self.engine.get(key)
    }

    /// Get a mutable reference to a value for a given key
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: CodeUnits + Eq + ?Sized,
    {
        self.engine.get_mut(key)
    }

    /// Retrieve the stored key and its value
    #[must_use]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: CodeUnits + Eq + ?Sized,
    {
        self.engine.get_key_value(key)
    }

    /// Returns true if the map contains `key`
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: CodeUnits + Eq + ?Sized,
    {
        self.engine.contains(key)
    }

    /// Removes `key`, returning whether an entry was deleted
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: CodeUnits + Eq + ?Sized,
    {
        self.engine.remove(key)
    }

    /// Removes `key`, handing back the stored key and value
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: CodeUnits + Eq + ?Sized,
    {
        self.engine.remove_entry(key)
    }
}

impl<K, V> fmt::Debug for ChainedHashMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> PartialEq for ChainedHashMap<K, V>
where
    K: CodeUnits + Eq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K, V> Eq for ChainedHashMap<K, V>
where
    K: CodeUnits + Eq,
    V: Eq,
{
}

impl<K, V, Q> Index<&Q> for ChainedHashMap<K, V>
where
    K: CodeUnits + Eq + Borrow<Q>,
    Q: CodeUnits + Eq + ?Sized,
{
    type Output = V;

    /// Returns the value stored for `key`
    ///
    /// # Panics
    ///
    /// Panics if `key` is not in the map.
    #[allow(clippy::panic)]
    fn index(&self, key: &Q) -> &V {
        self.get(key).unwrap_or_else(|| panic!("no entry found for key"))
    }
}

impl<K, V> Extend<(K, V)> for ChainedHashMap<K, V>
where
    K: CodeUnits + Eq,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.engine.extend(iter);
    }
}

impl<K, V> FromIterator<(K, V)> for ChainedHashMap<K, V>
where
    K: CodeUnits + Eq,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V> IntoIterator for &'a ChainedHashMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> IntoIterator for ChainedHashMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.engine.into_iter()
    }
}
