//! Index engine, readers and provider
//!
//! One [`IndexEngine`] per index owns the bucket store and samplers and takes
//! every write. [`QueryReader`]s are point-in-time snapshots handed out by the
//! engine. The [`IndexProvider`] is the registry a host keeps to look engines
//! up by index identifier and to refuse queries against indexes that are not
//! online.

use crate::core::error::Result;
use crate::core::types::{EntityId, IndexId};
use crate::core::update::IndexUpdate;
use std::collections::HashSet;
use std::fmt;

/// Write path, lifecycle and reader factory
pub mod engine;

/// Snapshot query handles
pub mod reader;

/// Registry of engines keyed by index identifier
pub mod provider;

pub use engine::IndexEngine;
pub use provider::{IndexProvider, SharedIndex};
pub use reader::{AllEntriesReader, QueryReader};
pub use crate::storage::IdSequence;

/// Lifecycle state of an index
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IndexState {
    /// Bulk population in progress, not yet queryable
    #[default]
    Populating,
    /// Population finished successfully
    Online,
    /// Population finished unsuccessfully
    Failed,
}

impl fmt::Display for IndexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndexState::Populating => "POPULATING",
            IndexState::Online => "ONLINE",
            IndexState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Host resource limit consulted before an index grows.
///
/// The engine never invents capacity errors; whatever this returns is
/// propagated from `add` unchanged.
pub trait CapacityGuard: Send + Sync {
    /// Allow or refuse growing `index_id` to `entries` entries
    fn reserve(&self, index_id: IndexId, entries: u64) -> Result<()>;
}

/// Sink for property updates, used both while populating and once online
pub trait IndexUpdater {
    /// Apply one update
    fn process(&mut self, update: IndexUpdate) -> Result<()>;

    /// Remove every listed entity from every bucket
    fn remove(&mut self, entity_ids: &HashSet<EntityId>);

    /// Apply updates in order, stopping at the first error
    fn process_batch(&mut self, updates: Vec<IndexUpdate>) -> Result<()> {
        for update in updates {
            self.process(update)?;
        }
        Ok(())
    }
}
