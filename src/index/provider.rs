//! Index provider
//!
//! Registry of index engines keyed by the host's index identifier. The host
//! owns the provider; there is no process-wide registry. Engines are fully
//! independent of each other.

use crate::core::config::IndexConfig;
use crate::core::error::{Error, Result};
use crate::core::types::IndexId;
use crate::index::engine::IndexEngine;
use crate::index::{CapacityGuard, IndexState};
use crate::system::metrics::IndexMetrics;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Engine handle shared between the provider and the host
pub type SharedIndex = Arc<RwLock<IndexEngine>>;

/// Registry of in-memory indexes
pub struct IndexProvider {
    config: IndexConfig,
    indexes: DashMap<IndexId, SharedIndex>,
    capacity: Option<Arc<dyn CapacityGuard>>,
}

impl IndexProvider {
    /// Create an empty provider
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            indexes: DashMap::new(),
            capacity: None,
        }
    }

    /// Install a capacity guard handed to every engine created afterwards
    pub fn with_capacity_guard(mut self, guard: Arc<dyn CapacityGuard>) -> Self {
        self.capacity = Some(guard);
        self
    }

    /// Configuration engines are created with
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Create a fresh engine for `index_id`, ready to populate.
    ///
    /// Replaces any engine already registered under the same identifier.
    pub fn populator(&self, index_id: IndexId) -> SharedIndex {
        let mut engine = IndexEngine::new(index_id, &self.config);
        if let Some(guard) = &self.capacity {
            engine = engine.with_capacity_guard(Arc::clone(guard));
        }
        engine.create();

        let shared = Arc::new(RwLock::new(engine));
        if self.indexes.insert(index_id, Arc::clone(&shared)).is_none() {
            self.with_metrics(|m| m.live_indexes.inc());
        }
        info!("Populating index {}", index_id);
        shared
    }

    /// Engine for `index_id`, only if it is online
    pub fn online_accessor(&self, index_id: IndexId) -> Result<SharedIndex> {
        let index = self.get(index_id).ok_or(Error::IndexNotFound(index_id))?;
        let state = index.read().state();
        if state != IndexState::Online {
            return Err(Error::IllegalQueryState { index_id, state });
        }
        Ok(index)
    }

    /// Engine for `index_id` regardless of state
    pub fn get(&self, index_id: IndexId) -> Option<SharedIndex> {
        self.indexes.get(&index_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Failure message recorded for `index_id`, if any
    pub fn population_failure(&self, index_id: IndexId) -> Option<String> {
        let index = self.get(index_id)?;
        let failure = index.read().failure().map(str::to_owned);
        failure
    }

    /// State of `index_id`; unknown indexes are reported as populating
    pub fn initial_state(&self, index_id: IndexId) -> IndexState {
        match self.get(index_id) {
            Some(index) => {
                let state = index.read().state();
                state
            }
            None => IndexState::Populating,
        }
    }

    /// Drop and unregister `index_id`. Returns whether it existed.
    pub fn drop_index(&self, index_id: IndexId) -> bool {
        match self.indexes.remove(&index_id) {
            Some((_, index)) => {
                index.write().drop_index();
                self.with_metrics(|m| m.live_indexes.dec());
                debug!("Dropped index {}", index_id);
                true
            }
            None => false,
        }
    }

    /// Shut down every registered engine
    pub fn shutdown(&self) {
        for entry in self.indexes.iter() {
            entry.value().write().shutdown();
        }
        info!("Shut down {} indexes", self.indexes.len());
    }

    /// Identifiers of every registered index, ascending
    pub fn index_ids(&self) -> Vec<IndexId> {
        let mut ids: Vec<IndexId> = self.indexes.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered indexes
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// True when no index is registered
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    fn with_metrics(&self, f: impl FnOnce(&IndexMetrics)) {
        if self.config.metrics.enabled {
            if let Ok(metrics) = IndexMetrics::try_global() {
                f(metrics);
            }
        }
    }
}

impl Default for IndexProvider {
    fn default() -> Self {
        Self::new(IndexConfig::default())
    }
}
