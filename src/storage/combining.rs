//! Lazy flattening of bucket sequences
//!
//! Range and scan queries match many buckets; [`CombiningSequence`] walks them
//! one at a time and yields every identifier of each non-empty bucket before
//! moving on, without collecting anything up front.

use crate::core::error::{Error, Result};
use crate::core::types::EntityId;
use crate::storage::bucket::Bucket;
use crate::storage::bucket_store::BucketIter;
use std::iter::FusedIterator;

/// Identifier sequence produced by every query
pub type IdSequence<'a> = CombiningSequence<'a, BucketIter<'a>>;

/// Forward-only, single pass sequence of identifiers over a run of buckets
pub struct CombiningSequence<'a, I> {
    buckets: I,
    current: std::slice::Iter<'a, EntityId>,
}

impl<'a, I> CombiningSequence<'a, I>
where
    I: Iterator<Item = &'a Bucket>,
{
    /// Start a sequence over `buckets`
    pub fn new(buckets: I) -> Self {
        let empty: &'a [EntityId] = &[];
        let mut seq = Self { buckets, current: empty.iter() };
        seq.advance();
        seq
    }

    /// Move to the next bucket with identifiers left, if the current one is spent
    fn advance(&mut self) {
        while self.current.len() == 0 {
            match self.buckets.next() {
                Some(bucket) => self.current = bucket.iter(),
                None => return,
            }
        }
    }

    /// True when another identifier is available
    pub fn has_next(&self) -> bool {
        self.current.len() > 0
    }

    /// Next identifier, or [`Error::ExhaustedIterator`] once the sequence is spent
    pub fn next_id(&mut self) -> Result<EntityId> {
        let id = *self.current.next().ok_or(Error::ExhaustedIterator)?;
        self.advance();
        Ok(id)
    }
}

impl<'a, I> Iterator for CombiningSequence<'a, I>
where
    I: Iterator<Item = &'a Bucket>,
{
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        self.next_id().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.current.len(), None)
    }
}

impl<'a, I> FusedIterator for CombiningSequence<'a, I> where I: Iterator<Item = &'a Bucket> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_in_bucket_order() {
        let buckets = [Bucket::from(vec![1, 2]), Bucket::single(3), Bucket::from(vec![4, 5, 6])];
        let ids: Vec<u64> = CombiningSequence::new(buckets.iter()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn skips_empty_buckets() {
        let buckets = [
            Bucket::from(vec![]),
            Bucket::single(1),
            Bucket::from(vec![]),
            Bucket::from(vec![]),
            Bucket::single(2),
            Bucket::from(vec![]),
        ];
        let ids: Vec<u64> = CombiningSequence::new(buckets.iter()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn empty_input_has_nothing() {
        let buckets: [Bucket; 0] = [];
        let mut seq = CombiningSequence::new(buckets.iter());
        assert!(!seq.has_next());
        assert!(matches!(seq.next_id(), Err(Error::ExhaustedIterator)));
    }

    #[test]
    fn next_id_past_end_fails() {
        let buckets = [Bucket::single(7)];
        let mut seq = CombiningSequence::new(buckets.iter());
        assert!(seq.has_next());
        assert_eq!(seq.next_id().unwrap(), 7);
        assert!(!seq.has_next());
        assert!(matches!(seq.next_id(), Err(Error::ExhaustedIterator)));
        // Stays exhausted
        assert_eq!(seq.next(), None);
    }

    #[test]
    fn only_pulls_buckets_as_needed() {
        let buckets = [Bucket::single(1), Bucket::single(2), Bucket::single(3)];
        let mut pulled = 0;
        let mut seq = CombiningSequence::new(buckets.iter().inspect(|_| pulled += 1));
        assert_eq!(seq.next(), Some(1));
        drop(seq);
        // First bucket on construction, second when the first ran dry
        assert_eq!(pulled, 2);
    }
}
