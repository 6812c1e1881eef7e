//! Ordered bucket store
//!
//! Sorted mapping from [`Value`] to [`Bucket`], backed by a persistent
//! B-tree. Cloning the store is O(1) and the clone is fully isolated from
//! later writes, which is what reader snapshots are built on.
//!
//! No locking happens here; the owning engine serialises writes.

use crate::core::value::Value;
use crate::storage::bucket::Bucket;
use im::OrdMap;
use std::cmp::Ordering;
use std::ops::Bound;

/// Boxed iterator over buckets in value order
pub type BucketIter<'a> = Box<dyn Iterator<Item = &'a Bucket> + 'a>;

/// Sorted mapping from indexed value to identifier bucket
#[derive(Clone, Debug, Default)]
pub struct OrderedBucketStore {
    map: OrdMap<Value, Bucket>,
}

impl OrderedBucketStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self { map: OrdMap::new() }
    }

    /// Bucket for `value`, if any
    pub fn get(&self, value: &Value) -> Option<&Bucket> {
        self.map.get(value)
    }

    /// Stored key equal to `value`, with its bucket.
    ///
    /// Equal values can differ in form (`0` and `-0.0`); the stored key is
    /// the one inserted first.
    pub fn get_entry(&self, value: &Value) -> Option<(&Value, &Bucket)> {
        self.sub_range_entries(Bound::Included(value), Bound::Included(value)).next()
    }

    /// Insert or replace the bucket for `value`.
    ///
    /// An empty bucket deletes the key instead.
    pub fn put(&mut self, value: Value, bucket: Bucket) {
        if bucket.is_empty() {
            self.map.remove(&value);
        } else {
            self.map.insert(value, bucket);
        }
    }

    /// Delete `value` and its bucket entirely
    pub fn remove_key(&mut self, value: &Value) -> Option<Bucket> {
        self.map.remove(value)
    }

    /// Buckets whose values fall within the bounds, in value order
    pub fn sub_range(&self, lower: Bound<&Value>, upper: Bound<&Value>) -> BucketIter<'_> {
        Box::new(self.sub_range_entries(lower, upper).map(|(_, bucket)| bucket))
    }

    /// `(value, bucket)` pairs within the bounds, in value order
    ///
    /// The bounds are only read while positioning the iterator, so they may
    /// be temporaries.
    pub fn sub_range_entries(
        &self,
        lower: Bound<&Value>,
        upper: Bound<&Value>,
    ) -> Box<dyn Iterator<Item = (&Value, &Bucket)> + '_> {
        if is_empty_range(lower, upper) {
            return Box::new(std::iter::empty());
        }
        Box::new(self.map.range((lower, upper)))
    }

    /// Every bucket, in value order
    pub fn all_buckets(&self) -> BucketIter<'_> {
        Box::new(self.map.values())
    }

    /// Every `(value, bucket)` pair, in value order
    pub fn entries(&self) -> impl Iterator<Item = (&Value, &Bucket)> + '_ {
        self.map.iter()
    }

    /// Rewrite buckets in place.
    ///
    /// `rewrite` returns `Some(new_bucket)` to replace a bucket (an empty one
    /// deletes the key) or `None` to leave it untouched.
    pub fn rewrite_buckets(&mut self, mut rewrite: impl FnMut(&Value, &Bucket) -> Option<Bucket>) {
        let changes: Vec<(Value, Bucket)> = self
            .map
            .iter()
            .filter_map(|(value, bucket)| rewrite(value, bucket).map(|b| (value.clone(), b)))
            .collect();
        for (value, bucket) in changes {
            self.put(value, bucket);
        }
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Point-in-time copy sharing structure with this store
    pub fn snapshot(&self) -> Self {
        self.clone()
    }
}

/// True when no value can satisfy both bounds
fn is_empty_range(lower: Bound<&Value>, upper: Bound<&Value>) -> bool {
    match (lower, upper) {
        (Bound::Included(lo), Bound::Included(hi)) => lo > hi,
        (Bound::Included(lo), Bound::Excluded(hi))
        | (Bound::Excluded(lo), Bound::Included(hi))
        | (Bound::Excluded(lo), Bound::Excluded(hi)) => lo.cmp(hi) != Ordering::Less,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_of(pairs: &[(i64, u64)]) -> OrderedBucketStore {
        let mut store = OrderedBucketStore::new();
        for &(v, id) in pairs {
            let value = Value::from(v);
            let bucket = match store.get(&value) {
                Some(b) => b.with(id).unwrap_or_else(|| b.clone()),
                None => Bucket::single(id),
            };
            store.put(value, bucket);
        }
        store
    }

    fn ids(iter: BucketIter<'_>) -> Vec<u64> {
        iter.flat_map(|b| b.iter().copied()).collect()
    }

    #[test]
    fn put_get_remove() {
        let mut store = store_of(&[(1, 10), (1, 11), (2, 20)]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&Value::from(1)).unwrap().as_slice(), &[10, 11]);
        assert!(store.remove_key(&Value::from(1)).is_some());
        assert!(store.get(&Value::from(1)).is_none());
        assert!(store.remove_key(&Value::from(1)).is_none());
    }

    #[test]
    fn get_entry_returns_the_stored_form() {
        let mut store = OrderedBucketStore::new();
        store.put(Value::from(-0.0), Bucket::single(1));
        let (key, bucket) = store.get_entry(&Value::from(0)).unwrap();
        assert_eq!(key.to_string(), "-0");
        assert_eq!(bucket.as_slice(), &[1]);
        assert!(store.get_entry(&Value::from(1)).is_none());
    }

    #[test]
    fn empty_bucket_is_never_stored() {
        let mut store = store_of(&[(1, 10)]);
        let emptied = store.get(&Value::from(1)).unwrap().without(10).unwrap();
        store.put(Value::from(1), emptied);
        assert!(store.is_empty());
    }

    #[test]
    fn sub_range_honours_bound_kinds() {
        let store = store_of(&[(1, 1), (2, 2), (3, 3), (4, 4)]);
        let (two, four) = (Value::from(2), Value::from(4));
        assert_eq!(ids(store.sub_range(Bound::Included(&two), Bound::Included(&four))), vec![2, 3, 4]);
        assert_eq!(ids(store.sub_range(Bound::Excluded(&two), Bound::Excluded(&four))), vec![3]);
        assert_eq!(ids(store.sub_range(Bound::Unbounded, Bound::Excluded(&two))), vec![1]);
        assert_eq!(ids(store.sub_range(Bound::Excluded(&four), Bound::Unbounded)), Vec::<u64>::new());
    }

    #[test]
    fn inverted_range_is_empty() {
        let store = store_of(&[(1, 1), (2, 2), (3, 3)]);
        let (one, three) = (Value::from(1), Value::from(3));
        assert!(ids(store.sub_range(Bound::Included(&three), Bound::Included(&one))).is_empty());
        assert!(ids(store.sub_range(Bound::Excluded(&three), Bound::Included(&three))).is_empty());
    }

    #[test]
    fn all_buckets_in_value_order() {
        let store = store_of(&[(3, 30), (1, 10), (2, 20)]);
        assert_eq!(ids(store.all_buckets()), vec![10, 20, 30]);
        let values: Vec<&Value> = store.entries().map(|(v, _)| v).collect();
        assert_eq!(values, vec![&Value::from(1), &Value::from(2), &Value::from(3)]);
    }

    #[test]
    fn rewrite_buckets_drops_emptied() {
        let mut store = store_of(&[(1, 10), (2, 20), (2, 21)]);
        store.rewrite_buckets(|_, b| b.without(20).or_else(|| b.without(10)));
        assert!(store.get(&Value::from(1)).is_none());
        assert_eq!(store.get(&Value::from(2)).unwrap().as_slice(), &[21]);
    }

    #[test]
    fn snapshot_is_isolated_from_later_writes() {
        let mut store = store_of(&[(1, 10)]);
        let snapshot = store.snapshot();
        store.put(Value::from(2), Bucket::single(20));
        store.remove_key(&Value::from(1));
        assert_eq!(ids(snapshot.all_buckets()), vec![10]);
        assert_eq!(ids(store.all_buckets()), vec![20]);
    }
}
