//! Index engine
//!
//! Owns the ordered bucket store, both samplers and the lifecycle state of a
//! single index. Writes take `&mut self`; the host serialises them (the
//! provider does so through a lock). Readers never see later writes because
//! each one gets its own snapshot of the store.
//!
//! Lifecycle:
//!
//! ```text
//! Populating --close(true)--> Online
//! Populating --close(false)--> Failed
//! ```
//!
//! `close` may be called again in any state and simply re-evaluates.

use crate::core::config::IndexConfig;
use crate::core::error::Result;
use crate::core::types::{EntityId, IndexId};
use crate::core::update::IndexUpdate;
use crate::core::value::{Value, ValueKind};
use crate::index::reader::{AllEntriesReader, QueryReader};
use crate::index::{CapacityGuard, IndexState, IndexUpdater};
use crate::sampling::{NonUniqueSampler, SampleResult, UniqueSampler};
use crate::storage::{Bucket, OrderedBucketStore};
use crate::system::metrics::IndexMetrics;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// In-memory index over one property
pub struct IndexEngine {
    index_id: IndexId,
    store: OrderedBucketStore,
    /// Every kind ever inserted, never shrinks
    value_kinds: BTreeSet<ValueKind>,
    state: IndexState,
    failure: Option<String>,
    /// Shared with readers so `sample()` is always current
    non_unique: Arc<Mutex<NonUniqueSampler>>,
    unique: UniqueSampler,
    /// Running count of (value, entity) pairs
    max_count: u64,
    capacity: Option<Arc<dyn CapacityGuard>>,
    metrics: Option<&'static IndexMetrics>,
}

impl IndexEngine {
    /// Create an engine in the `Populating` state
    pub fn new(index_id: IndexId, config: &IndexConfig) -> Self {
        let metrics = if config.metrics.enabled {
            match IndexMetrics::try_global() {
                Ok(metrics) => Some(metrics),
                Err(e) => {
                    warn!("Index {} running without metrics: {}", index_id, e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            index_id,
            store: OrderedBucketStore::new(),
            value_kinds: BTreeSet::new(),
            state: IndexState::Populating,
            failure: None,
            non_unique: Arc::new(Mutex::new(NonUniqueSampler::new(config.sampling.buffer_size))),
            unique: UniqueSampler::new(),
            max_count: 0,
            capacity: None,
            metrics,
        }
    }

    /// Install the host's resource limit hook
    pub fn with_capacity_guard(mut self, guard: Arc<dyn CapacityGuard>) -> Self {
        self.capacity = Some(guard);
        self
    }

    /// Identifier the host assigned to this index
    pub fn index_id(&self) -> IndexId {
        self.index_id
    }

    /// Clear indexed data, counters and samplers before population. Safe to
    /// call repeatedly.
    pub fn create(&mut self) {
        debug!("Creating index {}", self.index_id);
        self.clear();
    }

    /// Index `entity_id` under `value`.
    ///
    /// A duplicate pair is a no-op and leaves samplers and counters alone.
    /// Capacity errors from the host guard are returned with nothing changed.
    pub fn add(&mut self, entity_id: EntityId, value: impl Into<Value>) -> Result<()> {
        self.insert(entity_id, value.into(), true)
    }

    fn insert(&mut self, entity_id: EntityId, value: Value, guarded: bool) -> Result<()> {
        let kind = value.kind();
        // Equal values share the key stored first, and its string form
        let (key, bucket) = match self.store.get_entry(&value) {
            Some((stored, existing)) => match existing.with(entity_id) {
                Some(grown) => (stored.clone(), grown),
                None => return Ok(()),
            },
            None => (value, Bucket::single(entity_id)),
        };

        if guarded {
            if let Some(guard) = &self.capacity {
                guard.reserve(self.index_id, self.max_count + 1)?;
            }
        }

        self.non_unique.lock().include(&key.to_string());
        self.value_kinds.insert(kind);
        self.unique.increment(1);
        self.store.put(key, bucket);
        self.max_count += 1;
        if let Some(metrics) = self.metrics {
            metrics.entries_added.inc();
        }
        Ok(())
    }

    /// Remove the listed entities from every bucket.
    ///
    /// Visits every bucket; meant for bulk maintenance, not the hot path.
    pub fn remove_entries(&mut self, entity_ids: &HashSet<EntityId>) {
        if entity_ids.is_empty() {
            return;
        }

        let mut removed: Vec<(String, usize)> = Vec::new();
        self.store.rewrite_buckets(|value, bucket| {
            let (kept, count) = bucket.without_all(entity_ids)?;
            removed.push((value.to_string(), count));
            Some(kept)
        });

        let mut total = 0u64;
        {
            let mut sampler = self.non_unique.lock();
            for (form, count) in &removed {
                for _ in 0..*count {
                    sampler.exclude(form);
                }
                total += *count as u64;
            }
        }
        self.max_count = self.max_count.saturating_sub(total);
        if let Some(metrics) = self.metrics {
            metrics.entries_removed.inc_by(total);
        }
        debug!(
            "Removed {} entries for {} entities from index {}",
            total,
            entity_ids.len(),
            self.index_id
        );
    }

    /// Remove a single `(value, entity)` pair. Returns whether it was present.
    pub fn remove_one(&mut self, entity_id: EntityId, value: &Value) -> bool {
        let removal = self
            .store
            .get_entry(value)
            .and_then(|(stored, bucket)| bucket.without(entity_id).map(|shrunk| (stored.clone(), shrunk)));
        let Some((stored, shrunk)) = removal else {
            return false;
        };

        self.non_unique.lock().exclude(&stored.to_string());
        self.store.put(stored, shrunk);
        self.max_count = self.max_count.saturating_sub(1);
        if let Some(metrics) = self.metrics {
            metrics.entries_removed.inc();
        }
        true
    }

    /// Apply one online update.
    ///
    /// A change is a removal followed by an add; readers created before the
    /// call keep seeing the old value either way. If the add is refused the
    /// old pair is put back before the error is returned.
    pub fn process_update(&mut self, update: IndexUpdate) -> Result<()> {
        match update {
            IndexUpdate::Added { entity_id, after } => self.add(entity_id, after)?,
            IndexUpdate::Changed { entity_id, before, after } => {
                let removed = self.remove_one(entity_id, &before);
                if let Err(e) = self.add(entity_id, after) {
                    if removed {
                        self.insert(entity_id, before, false)?;
                    }
                    return Err(e);
                }
            }
            IndexUpdate::Removed { entity_id, before } => {
                self.remove_one(entity_id, &before);
            }
        }
        if let Some(metrics) = self.metrics {
            metrics.updates_processed.inc();
        }
        Ok(())
    }

    /// Updater used while populating
    pub fn populating_updater(&mut self) -> &mut dyn IndexUpdater {
        self
    }

    /// Updater used once online
    pub fn updater(&mut self) -> &mut dyn IndexUpdater {
        self
    }

    /// Finish population. Success goes `Online` and clears any failure
    /// message, otherwise the index is `Failed`.
    pub fn close(&mut self, success: bool) {
        if success {
            self.state = IndexState::Online;
            self.failure = None;
            info!(
                "Index {} online with {} entries over {} values",
                self.index_id,
                self.max_count,
                self.store.len()
            );
        } else {
            self.state = IndexState::Failed;
            if let Some(metrics) = self.metrics {
                metrics.population_failures.inc();
            }
            warn!(
                "Index {} failed: {}",
                self.index_id,
                self.failure.as_deref().unwrap_or("no failure message")
            );
        }
    }

    /// Record why population failed without changing state
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("Index {} population failure: {}", self.index_id, message);
        self.failure = Some(message);
    }

    /// Current lifecycle state
    pub fn state(&self) -> IndexState {
        self.state
    }

    /// Failure message recorded by `mark_failed`, if any
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Read handle over a snapshot of the current store
    pub fn new_reader(&self) -> QueryReader {
        QueryReader::new(
            self.store.snapshot(),
            self.value_kinds.clone(),
            Arc::clone(&self.non_unique),
        )
    }

    /// Full-scan handle carrying the current entry count as a size hint
    pub fn new_all_entries_reader(&self) -> AllEntriesReader {
        AllEntriesReader::new(self.store.snapshot(), self.max_count)
    }

    /// Running-total sample taken on the write side
    pub fn sample_result(&self) -> SampleResult {
        self.unique.result()
    }

    /// Number of (value, entity) pairs currently indexed
    pub fn max_count(&self) -> u64 {
        self.max_count
    }

    /// Number of distinct values currently indexed
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True when nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Drop all indexed data. The engine must be `create`d again before reuse.
    pub fn drop_index(&mut self) {
        debug!("Dropping index {}", self.index_id);
        self.clear();
    }

    /// Release all indexed data on host shutdown
    pub fn shutdown(&mut self) {
        debug!("Shutting down index {}", self.index_id);
        self.clear();
    }

    // Observed kinds survive every reset
    fn clear(&mut self) {
        self.store.clear();
        self.non_unique.lock().clear();
        self.unique.clear();
        self.max_count = 0;
    }
}

impl IndexUpdater for IndexEngine {
    fn process(&mut self, update: IndexUpdate) -> Result<()> {
        self.process_update(update)
    }

    fn remove(&mut self, entity_ids: &HashSet<EntityId>) {
        self.remove_entries(entity_ids);
    }
}
