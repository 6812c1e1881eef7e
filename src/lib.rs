//! Memory Index - An in-memory ordered property index for graph databases
//!
//! Maps comparable property values to sets of entity identifiers and answers
//! equality seeks, numeric and string range scans, prefix scans and full
//! scans. Indexes are populated in bulk, switched online, then kept current
//! with single property updates. Approximate cardinality is sampled as
//! entries come and go.
//!
//! Nothing is persisted: an index lives exactly as long as its engine.
#![warn(missing_docs)]

// Core foundational modules
pub mod core;

// Main functional modules
pub mod storage;
pub mod sampling;
pub mod index;
pub mod system;

// Re-export commonly used items for convenience
pub use core::{Error, Result, IndexConfig, Value, ValueKind, Number};
pub use core::{EntityId, IndexId, IndexUpdate, UpdateMode};
pub use index::{
    AllEntriesReader, CapacityGuard, IdSequence, IndexEngine, IndexProvider, IndexState,
    IndexUpdater, QueryReader, SharedIndex,
};
pub use sampling::SampleResult;

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging and metrics for an embedding host
pub fn init(config: &IndexConfig) -> Result<()> {
    system::logging::init_logging(&config.logging)?;

    tracing::info!("Initializing {} v{}", NAME, VERSION);

    if config.metrics.enabled {
        system::metrics::IndexMetrics::try_global()?;
    }

    Ok(())
}
