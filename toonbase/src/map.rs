use std::borrow::Borrow;
use std::collections::BTreeMap;

/// An insertion-ordered list with constant-time lookup by key.
#[derive(Debug, Clone)]
pub struct Map<K, V> {
    entries: BTreeMap<K, usize>,
    values: Vec<V>,
    to_key: fn(&V) -> K,
}

impl<K, V> Map<K, V>
where
    K: Ord,
{
    pub fn new(to_key: fn(&V) -> K) -> Self {
        Self {
            entries: BTreeMap::new(),
            values: Vec::new(),
            to_key,
        }
    }

    /// Appends a value, unless its key is already taken.
    ///
    /// Returns `false` if the value was rejected.
    pub fn push(&mut self, value: V) -> bool {
        let key = (self.to_key)(&value);

        if self.entries.contains_key(&key) {
            return false;
        }

        let _ = self.entries.insert(key, self.values.len());
        self.values.push(value);

        true
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Some(&self.values[*self.entries.get(key)?])
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Some(&mut self.values[*self.entries.get(key)?])
    }

    pub fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.get(key).copied()
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.values.clear();
    }
}

impl<K, V> PartialEq for Map<K, V>
where
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}
