//! Snapshot query handles
//!
//! A [`QueryReader`] holds its own copy of the bucket store, taken in O(1)
//! when the reader was created. Writes made afterwards, including `drop` and
//! `shutdown`, are invisible to it. Only the sampler is shared live with the
//! engine.
//!
//! Range bounds are handed to the store as real inclusive/exclusive bounds.
//! No bound is nudged to a neighbouring value, so the largest matching
//! number and strings ending in `char::MAX` are never dropped.

use crate::core::types::EntityId;
use crate::core::value::{Number, Value, ValueKind};
use crate::sampling::{NonUniqueSampler, SampleResult};
use crate::storage::{BucketIter, CombiningSequence, IdSequence, OrderedBucketStore};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::ops::Bound;
use std::sync::Arc;

/// Read-only, point-in-time view of one index
pub struct QueryReader {
    snapshot: OrderedBucketStore,
    value_kinds: BTreeSet<ValueKind>,
    sampler: Arc<Mutex<NonUniqueSampler>>,
}

impl QueryReader {
    pub(crate) fn new(
        snapshot: OrderedBucketStore,
        value_kinds: BTreeSet<ValueKind>,
        sampler: Arc<Mutex<NonUniqueSampler>>,
    ) -> Self {
        Self { snapshot, value_kinds, sampler }
    }

    /// Entities indexed under exactly `value`
    pub fn seek(&self, value: &Value) -> IdSequence<'_> {
        CombiningSequence::new(Box::new(self.snapshot.get(value).into_iter()))
    }

    /// Entities whose numeric value lies in `lower..=upper`.
    ///
    /// Both bounds are inclusive. `None` leaves that side open but the scan
    /// never leaves the numbers; strings are not matched.
    pub fn range_numeric(&self, lower: Option<Number>, upper: Option<Number>) -> IdSequence<'_> {
        let lower = lower.map(Value::from);
        let upper = upper.map(Value::from);
        // Every number sorts below the empty string
        let strings_start = Value::min_string();

        let lower_bound = match &lower {
            Some(v) => Bound::Included(v),
            None => Bound::Unbounded,
        };
        let upper_bound = match &upper {
            Some(v) => Bound::Included(v),
            None => Bound::Excluded(&strings_start),
        };
        CombiningSequence::new(self.snapshot.sub_range(lower_bound, upper_bound))
    }

    /// Entities whose string value lies between `lower` and `upper`.
    ///
    /// `None` leaves that side open (ignoring its include flag); numbers are
    /// never matched.
    pub fn range_by_string(
        &self,
        lower: Option<&str>,
        include_lower: bool,
        upper: Option<&str>,
        include_upper: bool,
    ) -> IdSequence<'_> {
        let lower = lower.map(Value::from);
        let upper = upper.map(Value::from);
        let strings_start = Value::min_string();

        let lower_bound = match &lower {
            Some(v) if include_lower => Bound::Included(v),
            Some(v) => Bound::Excluded(v),
            None => Bound::Included(&strings_start),
        };
        let upper_bound = match &upper {
            Some(v) if include_upper => Bound::Included(v),
            Some(v) => Bound::Excluded(v),
            None => Bound::Unbounded,
        };
        CombiningSequence::new(self.snapshot.sub_range(lower_bound, upper_bound))
    }

    /// Entities whose string value starts with `prefix`.
    ///
    /// Scans forward from `prefix` and stops at the first value that does not
    /// share it, so no successor string has to be computed.
    pub fn range_by_prefix(&self, prefix: &str) -> IdSequence<'_> {
        let start = Value::from(prefix);
        let prefix = prefix.to_owned();
        let buckets: BucketIter<'_> = Box::new(
            self.snapshot
                .sub_range_entries(Bound::Included(&start), Bound::Unbounded)
                .take_while(move |(value, _)| value.as_str().is_some_and(|s| s.starts_with(&prefix)))
                .map(|(_, bucket)| bucket),
        );
        CombiningSequence::new(buckets)
    }

    /// Every indexed entity, in value order
    pub fn scan(&self) -> IdSequence<'_> {
        CombiningSequence::new(self.snapshot.all_buckets())
    }

    /// Number of entities indexed under `value`
    pub fn count_for_value(&self, value: &Value) -> usize {
        self.snapshot.get(value).map_or(0, |bucket| bucket.len())
    }

    /// Kinds of value inserted up to the time this reader was created
    pub fn observed_value_kinds(&self) -> &BTreeSet<ValueKind> {
        &self.value_kinds
    }

    /// Current distinct-value estimate from the engine's sampler
    pub fn sample(&self) -> SampleResult {
        self.sampler.lock().result()
    }

    /// Number of distinct values in the snapshot
    pub fn distinct_values(&self) -> usize {
        self.snapshot.len()
    }
}

/// Full-scan handle with a size hint for progress reporting
pub struct AllEntriesReader {
    snapshot: OrderedBucketStore,
    max_count: u64,
}

impl AllEntriesReader {
    pub(crate) fn new(snapshot: OrderedBucketStore, max_count: u64) -> Self {
        Self { snapshot, max_count }
    }

    /// Entry count when the reader was created. A hint, not a guarantee.
    pub fn max_count(&self) -> u64 {
        self.max_count
    }

    /// Every indexed entity, in value order
    pub fn iter(&self) -> IdSequence<'_> {
        CombiningSequence::new(self.snapshot.all_buckets())
    }
}

impl<'a> IntoIterator for &'a AllEntriesReader {
    type Item = EntityId;
    type IntoIter = IdSequence<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
