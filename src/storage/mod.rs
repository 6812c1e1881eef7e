//! Storage layer for Memory Index
//!
//! Everything is held in memory. The ordered bucket store maps each indexed
//! value to its bucket of entity identifiers, and combining sequences turn
//! runs of buckets into flat identifier streams for queries.

/// Array-backed identifier buckets
pub mod bucket;

/// Sorted value to bucket mapping
pub mod bucket_store;

/// Lazy identifier sequences over buckets
pub mod combining;

/// Re-export main storage types
pub use bucket::Bucket;
pub use bucket_store::{BucketIter, OrderedBucketStore};
pub use combining::{CombiningSequence, IdSequence};
