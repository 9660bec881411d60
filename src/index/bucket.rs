//! Buckets and single-attribute value maps
//!
//! A bucket holds the ids sharing one value. Buckets are never left empty:
//! whoever removes the last id also removes the bucket from its parent map.

use std::collections::{BTreeSet, HashMap};

use super::key::IndexKey;
use super::record::ItemId;

/// Identity-deduplicated set of members sharing one key.
///
/// Iteration is ascending by id, i.e. insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bucket {
    ids: BTreeSet<ItemId>,
}

impl Bucket {
    /// Creates a new empty bucket
    pub fn new() -> Self {
        Self {
            ids: BTreeSet::new(),
        }
    }

    /// Insert an id. Returns false if it was already present.
    pub fn insert(&mut self, id: ItemId) -> bool {
        self.ids.insert(id)
    }

    /// Remove an id. Returns false if it was not present.
    pub fn remove(&mut self, id: ItemId) -> bool {
        self.ids.remove(&id)
    }

    /// Returns true if the bucket contains `id`
    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    /// Number of ids in the bucket
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if the bucket holds nothing
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in ascending order
    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.ids.iter().copied()
    }

    /// Ids as a vector, ascending
    pub fn to_vec(&self) -> Vec<ItemId> {
        self.ids.iter().copied().collect()
    }
}

/// Value -> bucket map for one attribute.
#[derive(Debug, Default)]
pub struct AttributeIndex {
    buckets: HashMap<IndexKey, Bucket>,
}

impl AttributeIndex {
    /// Creates a new empty attribute index
    pub fn new() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }

    /// Insert an id under `key`, creating the bucket if absent.
    pub fn insert(&mut self, key: IndexKey, id: ItemId) {
        self.buckets.entry(key).or_default().insert(id);
    }

    /// Remove an id from the bucket at `key`.
    ///
    /// Returns true if the bucket became empty and was pruned.
    pub fn remove(&mut self, key: &IndexKey, id: ItemId) -> bool {
        let Some(bucket) = self.buckets.get_mut(key) else {
            return false;
        };
        bucket.remove(id);
        if bucket.is_empty() {
            self.buckets.remove(key);
            return true;
        }
        false
    }

    /// Bucket for an exact key match, if one exists
    pub fn bucket(&self, key: &IndexKey) -> Option<&Bucket> {
        self.buckets.get(key)
    }

    /// Ids for an exact key match, ascending
    pub fn lookup_eq(&self, key: &IndexKey) -> Vec<ItemId> {
        self.buckets.get(key).map(Bucket::to_vec).unwrap_or_default()
    }

    /// Every key that currently has a non-empty bucket, sorted
    pub fn keys(&self) -> Vec<IndexKey> {
        let mut keys: Vec<IndexKey> = self.buckets.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Returns the number of distinct keys
    pub fn key_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the total number of ids across buckets
    pub fn id_count(&self) -> usize {
        self.buckets.values().map(Bucket::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> ItemId {
        ItemId::new(n)
    }

    #[test]
    fn test_bucket_dedup_and_order() {
        let mut bucket = Bucket::new();
        assert!(bucket.insert(id(3)));
        assert!(bucket.insert(id(1)));
        assert!(!bucket.insert(id(3)));

        assert_eq!(bucket.to_vec(), vec![id(1), id(3)]);
        assert_eq!(bucket.len(), 2);
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut index = AttributeIndex::new();

        index.insert(IndexKey::from_string("alice"), id(1));
        index.insert(IndexKey::from_string("alice"), id(2));
        index.insert(IndexKey::from_string("bob"), id(3));

        assert_eq!(
            index.lookup_eq(&IndexKey::from_string("alice")),
            vec![id(1), id(2)]
        );
        assert_eq!(index.lookup_eq(&IndexKey::from_string("bob")), vec![id(3)]);
        assert!(index.lookup_eq(&IndexKey::from_string("carol")).is_empty());
    }

    #[test]
    fn test_remove_prunes_empty_bucket() {
        let mut index = AttributeIndex::new();

        index.insert(IndexKey::from_int(1), id(1));
        index.insert(IndexKey::from_int(1), id(2));

        assert!(!index.remove(&IndexKey::from_int(1), id(1)));
        assert_eq!(index.lookup_eq(&IndexKey::from_int(1)), vec![id(2)]);

        assert!(index.remove(&IndexKey::from_int(1), id(2)));
        assert_eq!(index.key_count(), 0);
        assert!(index.bucket(&IndexKey::from_int(1)).is_none());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut index = AttributeIndex::new();
        index.insert(IndexKey::from_int(1), id(1));

        assert!(!index.remove(&IndexKey::from_int(2), id(1)));
        assert!(!index.remove(&IndexKey::from_int(1), id(9)));
        assert_eq!(index.id_count(), 1);
    }

    #[test]
    fn test_keys_sorted() {
        let mut index = AttributeIndex::new();
        index.insert(IndexKey::from_int(30), id(1));
        index.insert(IndexKey::from_int(10), id(2));
        index.insert(IndexKey::from_int(20), id(3));

        assert_eq!(
            index.keys(),
            vec![
                IndexKey::from_int(10),
                IndexKey::from_int(20),
                IndexKey::from_int(30)
            ]
        );
    }
}
