use std::{borrow::Borrow, fmt, iter::FusedIterator};

use crate::{
    HashError, TableConfig,
    engine::{self, ChainStats, HashEngine},
    key::CodeUnits,
};

/// A set of keys over a separate-chaining [`HashEngine`] carrying no values.
///
/// Inserting a key that is already present leaves the set unchanged, so every key is counted
/// and listed once.
#[derive(Clone)]
pub struct ChainedHashSet<K> {
    /// Storage and growth policy, with presence as the only payload
    engine: HashEngine<K, ()>,
}

impl<K> Default for ChainedHashSet<K> {
    fn default() -> Self {
        Self { engine: HashEngine::default() }
    }
}

impl<K> ChainedHashSet<K> {
    /// Creates an empty set with 16 buckets and a load factor of 0.75
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set with `capacity` buckets
    ///
    /// # Errors
    ///
    /// [`HashError::InvalidCapacity`] if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self, HashError> {
        HashEngine::with_capacity(capacity).map(|engine| Self { engine })
    }

    /// Creates an empty set from `config`
    ///
    /// # Errors
    ///
    /// Fails if `config` does not validate, see [`TableConfig::validate`].
    pub fn with_config(config: TableConfig) -> Result<Self, HashError> {
        HashEngine::with_config(config).map(|engine| Self { engine })
    }

    /// Returns the number of keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.engine.len()
    }

    /// Returns true if the set holds no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    /// Returns the number of buckets
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.engine.capacity()
    }

    /// Removes every key, keeping the capacity
    pub fn clear(&mut self) {
        self.engine.clear();
    }

    /// Returns an iterator over the keys
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K> {
        Iter { inner: self.engine.iter() }
    }

    /// Snapshot of the keys
    #[must_use]
    pub fn keys(&self) -> Vec<&K> {
        self.engine.keys()
    }

    /// Snapshot of the stored records; a set's records are its keys
    #[must_use]
    pub fn entries(&self) -> Vec<&K> {
        self.keys()
    }

    /// Bucket occupancy figures
    #[must_use]
    pub fn stats(&self) -> ChainStats {
        self.engine.stats()
    }
}

impl<K> ChainedHashSet<K>
where
    K: CodeUnits + Eq,
{
    /// Adds `key`, returning true if it was not already present
    ///
    /// # Panics
    ///
    /// Panics if the set has to grow and the larger table cannot be allocated.
    pub fn insert(&mut self, key: K) -> bool {
        self.engine.insert(key, ()).is_none()
    }

    /// Adds `key`, reporting growth failure instead of panicking
    ///
    /// # Errors
    ///
    /// See [`HashEngine::try_insert`]. The set is left without the new key.
    pub fn try_insert(&mut self, key: K) -> Result<bool, HashError> {
        self.engine.try_insert(key, ()).map(|previous| previous.is_none())
    }

    /// Returns the stored key equal to `key`
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: CodeUnits + Eq + ?Sized,
    {
        self.engine.get_key_value(key).map(|(stored, ())| stored)
    }

    /// Returns true if the set contains `key`
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: CodeUnits + Eq + ?Sized,
    {
        self.engine.contains(key)
    }

    /// Removes `key`, returning whether it was present
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: CodeUnits + Eq + ?Sized,
    {
        self.engine.remove(key)
    }

    /// Removes `key`, handing back the stored key
    pub fn take<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: CodeUnits + Eq + ?Sized,
    {
        self.engine.remove_entry(key).map(|(stored, ())| stored)
    }
}

impl<K: fmt::Debug> fmt::Debug for ChainedHashSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K> PartialEq for ChainedHashSet<K>
where
    K: CodeUnits + Eq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|key| other.contains(key))
    }
}

impl<K> Eq for ChainedHashSet<K> where K: CodeUnits + Eq {}

impl<K> Extend<K> for ChainedHashSet<K>
where
    K: CodeUnits + Eq,
{
    fn extend<T: IntoIterator<Item = K>>(&mut self, iter: T) {
        self.engine.extend(iter.into_iter().map(|key| (key, ())));
    }
}

impl<K> FromIterator<K> for ChainedHashSet<K>
where
    K: CodeUnits + Eq,
{
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a, K> IntoIterator for &'a ChainedHashSet<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K> IntoIterator for ChainedHashSet<K> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { inner: self.engine.into_iter() }
    }
}

/// Iterator over the keys of a [`ChainedHashSet`]
#[derive(Debug, Clone)]
pub struct Iter<'a, K> {
    /// Entry iterator of the underlying table
    inner: engine::Iter<'a, K, ()>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, ())| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

/// Owning iterator over the keys of a [`ChainedHashSet`]
#[derive(Debug)]
pub struct IntoIter<K> {
    /// Owning entry iterator of the underlying table
    inner: engine::IntoIter<K, ()>,
}

impl<K> Iterator for IntoIter<K> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, ())| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for IntoIter<K> {}

impl<K> FusedIterator for IntoIter<K> {}
