//! Array-backed identifier buckets
//!
//! A bucket is immutable once built. Adding or removing an identifier makes a
//! new array, so snapshots holding the old bucket keep seeing exactly what
//! they saw when they were taken.

use crate::core::types::EntityId;
use std::collections::HashSet;
use std::sync::Arc;

/// Entity identifiers associated with one indexed value, in insertion order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bucket {
    ids: Arc<[EntityId]>,
}

impl Bucket {
    /// Bucket holding a single identifier
    pub fn single(id: EntityId) -> Self {
        Self { ids: Arc::from(vec![id]) }
    }

    /// Number of identifiers
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when the bucket holds no identifiers
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifiers as a slice
    pub fn as_slice(&self) -> &[EntityId] {
        &self.ids
    }

    /// Iterate identifiers in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, EntityId> {
        self.ids.iter()
    }

    /// Position of an identifier, if present
    pub fn position(&self, id: EntityId) -> Option<usize> {
        self.ids.iter().position(|&existing| existing == id)
    }

    /// True when the identifier is present
    pub fn contains(&self, id: EntityId) -> bool {
        self.position(id).is_some()
    }

    /// New bucket with `id` appended, or `None` if it is already present
    pub fn with(&self, id: EntityId) -> Option<Self> {
        if self.contains(id) {
            return None;
        }
        let mut ids = Vec::with_capacity(self.ids.len() + 1);
        ids.extend_from_slice(&self.ids);
        ids.push(id);
        Some(Self { ids: ids.into() })
    }

    /// New bucket with `id` removed, or `None` if it is absent.
    ///
    /// The result may be empty; the store never keeps empty buckets.
    pub fn without(&self, id: EntityId) -> Option<Self> {
        let idx = self.position(id)?;
        let mut ids = Vec::with_capacity(self.ids.len() - 1);
        ids.extend_from_slice(&self.ids[..idx]);
        ids.extend_from_slice(&self.ids[idx + 1..]);
        Some(Self { ids: ids.into() })
    }

    /// New bucket without any of `ids`, plus how many were removed.
    ///
    /// Returns `None` when nothing matched, so untouched buckets are not copied.
    pub fn without_all(&self, ids: &HashSet<EntityId>) -> Option<(Self, usize)> {
        let kept: Vec<EntityId> = self.ids.iter().copied().filter(|id| !ids.contains(id)).collect();
        let removed = self.ids.len() - kept.len();
        if removed == 0 {
            return None;
        }
        Some((Self { ids: kept.into() }, removed))
    }
}

impl From<Vec<EntityId>> for Bucket {
    /// Build a bucket from raw identifiers, dropping duplicates but keeping
    /// first-seen order.
    fn from(raw: Vec<EntityId>) -> Self {
        let mut seen = HashSet::with_capacity(raw.len());
        let ids: Vec<EntityId> = raw.into_iter().filter(|id| seen.insert(*id)).collect();
        Self { ids: ids.into() }
    }
}

impl<'a> IntoIterator for &'a Bucket {
    type Item = &'a EntityId;
    type IntoIter = std::slice::Iter<'a, EntityId>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
